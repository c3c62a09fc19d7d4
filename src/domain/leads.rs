//! Contact form and the lead record forwarded to the CRM.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::validation::{is_blank, looks_like_email, FieldErrors};
use crate::config::LeadValidation;

static INDIAN_MOBILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[6-9]\d{9}$").expect("valid regex"));
static PINCODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").expect("valid regex"));

/// Contact page submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
}

impl ContactForm {
    pub fn validate(&self, mode: LeadValidation) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if is_blank(&self.name) {
            errors.add("name", "Name is required");
        }
        if is_blank(&self.email) {
            errors.add("email", "Email is required");
        } else if !looks_like_email(&self.email) {
            errors.add("email", "Please enter a valid email");
        }
        if is_blank(&self.phone) {
            errors.add("phone", "Phone number is required");
        } else if mode == LeadValidation::Strict && !INDIAN_MOBILE_RE.is_match(self.phone.trim())
        {
            errors.add("phone", "Please enter a valid 10-digit mobile number");
        }
        if is_blank(&self.subject) {
            errors.add("subject", "Subject is required");
        }
        if is_blank(&self.message) {
            errors.add("message", "Message is required");
        }
        if mode == LeadValidation::Strict {
            if let Some(pincode) = non_blank(&self.pincode) {
                if !PINCODE_RE.is_match(pincode) {
                    errors.add("pincode", "Please enter a valid 6-digit pincode");
                }
            }
        }

        errors.into_result()
    }

    /// Assemble the CRM lead. Expects a form that passed validation.
    pub fn into_lead(self) -> Lead {
        let name = self.name.trim();
        let (first_name, last_name) = match name.split_once(' ') {
            Some((first, rest)) => (first.to_string(), Some(rest.trim().to_string())),
            None => (name.to_string(), None),
        };

        Lead {
            first_name,
            last_name: last_name.filter(|l| !l.is_empty()),
            phone_number: self.phone.trim().to_string(),
            email_id: self.email.trim().to_string(),
            address_city: non_blank(&self.city).map(str::to_string),
            address_state: non_blank(&self.state).map(str::to_string),
            address_pin: non_blank(&self.pincode).map(str::to_string),
            comments: format!(
                "Subject: {}\n\nMessage: {}",
                self.subject.trim(),
                self.message.trim()
            ),
            user_type: LeadUserType::Home,
            lead_source: "website".to_string(),
            notify_sms: NotifyPreference::from(true),
            notify_whatsapp: NotifyPreference::from(true),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LeadUserType {
    Home,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotifyPreference {
    Yes,
    No,
}

impl From<bool> for NotifyPreference {
    fn from(opted_in: bool) -> Self {
        if opted_in {
            Self::Yes
        } else {
            Self::No
        }
    }
}

/// Lead payload in the CRM's intake format
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Lead {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    #[serde(rename = "emailId")]
    pub email_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_pin: Option<String>,
    pub comments: String,
    #[serde(rename = "userType")]
    pub user_type: LeadUserType,
    #[serde(rename = "leadSource")]
    pub lead_source: String,
    #[serde(rename = "notifySms")]
    pub notify_sms: NotifyPreference,
    #[serde(rename = "notifyWhatsapp")]
    pub notify_whatsapp: NotifyPreference,
}


#[cfg(test)]
mod tests {
    use super::fixtures::contact_form;
    use super::*;

    #[test]
    fn every_required_field_is_reported() {
        let errors = ContactForm::default()
            .validate(LeadValidation::Standard)
            .unwrap_err();

        assert_eq!(errors.len(), 5);
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("phone"), Some("Phone number is required"));
        assert_eq!(errors.get("subject"), Some("Subject is required"));
        assert_eq!(errors.get("message"), Some("Message is required"));
    }

    #[test]
    fn malformed_email_is_rejected() {
        let form = ContactForm {
            email: "asha.example.in".to_string(),
            ..contact_form()
        };
        let errors = form.validate(LeadValidation::Standard).unwrap_err();
        assert_eq!(errors.get("email"), Some("Please enter a valid email"));
    }

    #[test]
    fn strict_mode_checks_mobile_and_pincode() {
        let form = ContactForm {
            phone: "12345".to_string(),
            pincode: Some("4520".to_string()),
            ..contact_form()
        };
        assert!(form.validate(LeadValidation::Standard).is_ok());

        let errors = form.validate(LeadValidation::Strict).unwrap_err();
        assert!(errors.get("phone").is_some());
        assert!(errors.get("pincode").is_some());
    }

    #[test]
    fn strict_mode_allows_missing_pincode() {
        let form = ContactForm {
            pincode: Some(" ".to_string()),
            ..contact_form()
        };
        assert!(form.validate(LeadValidation::Strict).is_ok());
    }

    #[test]
    fn lead_splits_name_and_folds_subject_into_comments() {
        let lead = ContactForm {
            name: "  Asha Rani Verma ".to_string(),
            city: Some(String::new()),
            ..contact_form()
        }
        .into_lead();

        assert_eq!(lead.first_name, "Asha");
        assert_eq!(lead.last_name.as_deref(), Some("Rani Verma"));
        assert_eq!(lead.address_city, None);
        assert_eq!(
            lead.comments,
            "Subject: New connection\n\nMessage: Is fibre available in Indore?"
        );
    }

    #[test]
    fn lead_serializes_in_crm_format() {
        let lead = ContactForm {
            name: "Asha".to_string(),
            ..contact_form()
        }
        .into_lead();
        let json = serde_json::to_value(&lead).unwrap();

        assert_eq!(json["firstName"], "Asha");
        assert!(json.get("lastName").is_none());
        assert_eq!(json["phoneNumber"], "9876543210");
        assert_eq!(json["emailId"], "asha@example.in");
        assert_eq!(json["address_pin"], "452001");
        assert_eq!(json["userType"], "home");
        assert_eq!(json["leadSource"], "website");
        assert_eq!(json["notifySms"], "yes");
        assert_eq!(json["notifyWhatsapp"], "yes");
    }
}
