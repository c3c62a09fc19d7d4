//! Rupee amount formatting for catalog display.

use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount the way `en-IN` formats INR: rupee sign, lakh/crore digit
/// grouping, no trailing zero decimals, at most two fractional digits.
///
/// `1200` becomes `₹1,200` and `123456.5` becomes `₹1,23,456.5`.
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();

    let digits = rounded.abs().to_string();
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut out = String::new();
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    out.push('₹');
    out.push_str(&group_indian(whole));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Last three digits form one group, every two digits before that another.
fn group_indian(whole: &str) -> String {
    if whole.len() <= 3 {
        return whole.to_string();
    }

    let (head, tail) = whole.split_at(whole.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// Whole-number percentage saved against the original price, if there is a saving.
pub fn discount_percent(price: Decimal, original_price: Option<Decimal>) -> Option<u32> {
    use rust_decimal::prelude::ToPrimitive;

    let original = original_price?;
    if original <= price || original.is_zero() {
        return None;
    }

    ((original - price) / original * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_amounts_are_not_grouped() {
        assert_eq!(format_inr(Decimal::from(599)), "₹599");
        assert_eq!(format_inr(Decimal::ZERO), "₹0");
    }

    #[test]
    fn indian_grouping() {
        assert_eq!(format_inr(Decimal::from(1200)), "₹1,200");
        assert_eq!(format_inr(Decimal::from(123456)), "₹1,23,456");
        assert_eq!(format_inr(Decimal::from(12345678)), "₹1,23,45,678");
    }

    #[test]
    fn fractions_trimmed_to_two_places() {
        assert_eq!(format_inr(Decimal::new(1234565, 1)), "₹1,23,456.5");
        assert_eq!(format_inr(Decimal::new(59900, 2)), "₹599");
        assert_eq!(format_inr(Decimal::new(99999, 3)), "₹100");
    }

    #[test]
    fn negative_amounts_keep_sign() {
        assert_eq!(format_inr(Decimal::from(-2500)), "-₹2,500");
    }

    #[test]
    fn discount_only_when_cheaper_than_original() {
        assert_eq!(
            discount_percent(Decimal::from(799), Some(Decimal::from(999))),
            Some(20)
        );
        assert_eq!(discount_percent(Decimal::from(999), Some(Decimal::from(999))), None);
        assert_eq!(discount_percent(Decimal::from(999), None), None);
    }
}
