//! Indian Rupee formatting (`en-IN` grouping: 12,34,567.89).

/// Format an amount as rupees with two decimals and lakh/crore grouping.
///
/// `1234567.891` becomes `₹12,34,567.89`; negative amounts get a leading `-`.
pub fn format_inr(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("₹{amount}");
    }

    let fixed = format!("{:.2}", amount.abs());
    let (whole, paise) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };

    format!("{sign}₹{}.{paise}", group_indian(whole))
}

/// Last three digits form one group, everything before it groups in pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_in_lakhs_and_crores() {
        assert_eq!(format_inr(0.0), "₹0.00");
        assert_eq!(format_inr(999.5), "₹999.50");
        assert_eq!(format_inr(1000.0), "₹1,000.00");
        assert_eq!(format_inr(123456.0), "₹1,23,456.00");
        assert_eq!(format_inr(1234567.891), "₹12,34,567.89");
        assert_eq!(format_inr(123456789.0), "₹12,34,56,789.00");
    }

    #[test]
    fn negative_amounts_keep_sign() {
        assert_eq!(format_inr(-1180.0), "-₹1,180.00");
        assert_eq!(format_inr(-0.001), "₹0.00");
    }
}
