//! Contact form submission: validate, assemble the lead, forward it once.

use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument};

use super::crm::LeadGateway;
use crate::config::LeadValidation;
use crate::domain::leads::ContactForm;
use crate::domain::FieldErrors;

#[derive(Debug, Error)]
pub enum LeadError {
    #[error("contact form is invalid")]
    Validation(FieldErrors),

    #[error("lead delivery failed: {0}")]
    Delivery(anyhow::Error),
}

#[derive(Clone)]
pub struct LeadService {
    gateway: Arc<dyn LeadGateway>,
    mode: LeadValidation,
}

impl LeadService {
    pub fn new(gateway: Arc<dyn LeadGateway>, mode: LeadValidation) -> Self {
        Self { gateway, mode }
    }

    #[instrument(skip_all)]
    pub async fn submit(
        &self,
        form: ContactForm,
        request_id: Option<String>,
    ) -> Result<(), LeadError> {
        form.validate(self.mode).map_err(LeadError::Validation)?;

        let lead = form.into_lead();
        self.gateway
            .submit(lead, request_id)
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to forward lead to CRM");
                LeadError::Delivery(e)
            })?;

        info!("Lead forwarded to CRM");
        Ok(())
    }
}
