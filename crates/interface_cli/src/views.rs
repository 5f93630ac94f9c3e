//! Text rendering for clients and policies
//!
//! Every renderer returns a `String` so commands decide where output goes.
//! Missing values never fail rendering: amounts show as `$0`, dates and
//! text as `N/A`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt::Write;

use domain_client::Client;
use domain_policy::{Policy, PolicyType};

pub const NOT_AVAILABLE: &str = "N/A";

/// Formats an amount as dollars with thousands separators
///
/// Trailing zero cents are dropped: `1234.50` renders as `$1,234.5`,
/// `125.00` as `$125`.
pub fn format_currency(value: Option<Decimal>) -> String {
    let Some(value) = value else {
        return "$0".to_string();
    };

    let rounded = value.round_dp(2).normalize();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = rounded.abs().to_string();
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(fraction) => format!("${sign}{grouped}.{fraction}"),
        None => format!("${sign}{grouped}"),
    }
}

/// Formats a premium estimate with exactly two decimals
pub fn format_estimate(value: Decimal) -> String {
    format!("Estimated Monthly Premium: ${:.2}", value.round_dp(2))
}

pub fn format_date(value: Option<NaiveDate>) -> String {
    match value {
        Some(date) => date.format("%-m/%-d/%Y").to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_policy_type(value: Option<PolicyType>) -> String {
    match value {
        Some(policy_type) => policy_type.label(),
        None => "Unknown Policy Type".to_string(),
    }
}

fn or_na(value: Option<&str>) -> &str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(NOT_AVAILABLE)
}

/// Renders the client list as an aligned table
pub fn render_client_table(clients: &[Client]) -> String {
    if clients.is_empty() {
        return "No clients found.\n".to_string();
    }

    let headers = ["ID", "Name", "Email", "Phone", "Occupation"];
    let rows: Vec<[String; 5]> = clients
        .iter()
        .map(|c| {
            [
                c.id.map(|id| id.to_string()).unwrap_or_default(),
                c.full_name(),
                c.email.clone().unwrap_or_default(),
                c.phone.clone().unwrap_or_default(),
                c.occupation.clone().unwrap_or_default(),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: &[&str]| {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    };

    push_row(&headers);
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        push_row(&cells);
    }
    out
}

/// Renders one policy as an indented card
pub fn render_policy_card(policy: &Policy) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {}", format_policy_type(policy.policy_type));
    let _ = writeln!(out, "    Coverage Amount: {}", format_currency(policy.coverage_amount));
    let _ = writeln!(out, "    Premium Amount: {}", format_currency(policy.premium_amount));
    let _ = writeln!(out, "    Start Date: {}", format_date(policy.start_date));
    if let Some(end) = policy.effective_end_date() {
        let _ = writeln!(out, "    End Date: {}", format_date(Some(end)));
    }
    let _ = writeln!(
        out,
        "    Beneficiary: {} ({})",
        or_na(policy.beneficiary_name.as_deref()),
        or_na(policy.beneficiary_relation.as_deref())
    );
    out
}

/// Renders the client detail view with its policies
pub fn render_client_details(client: &Client) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Client Details");
    let _ = writeln!(out, "  Name: {}", client.full_name());
    let _ = writeln!(out, "  Email: {}", or_na(client.email.as_deref()));
    let _ = writeln!(out, "  Phone: {}", or_na(client.phone.as_deref()));
    let _ = writeln!(out, "  Date of Birth: {}", format_date(client.date_of_birth));
    let _ = writeln!(out, "  Occupation: {}", or_na(client.occupation.as_deref()));
    let _ = writeln!(out, "  Annual Income: {}", format_currency(client.annual_income));
    let _ = writeln!(out, "  Address: {}", or_na(client.address.as_deref()));
    let _ = writeln!(out);
    let _ = writeln!(out, "Policies");

    let policies = client.policies();
    if policies.is_empty() {
        let _ = writeln!(out, "  No policies found.");
    }
    for (i, policy) in policies.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&render_policy_card(policy));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(None), "$0");
        assert_eq!(format_currency(Some(dec!(0))), "$0");
        assert_eq!(format_currency(Some(dec!(125.00))), "$125");
        assert_eq!(format_currency(Some(dec!(999))), "$999");
        assert_eq!(format_currency(Some(dec!(1000))), "$1,000");
        assert_eq!(format_currency(Some(dec!(1234.5))), "$1,234.5");
        assert_eq!(format_currency(Some(dec!(250000))), "$250,000");
        assert_eq!(format_currency(Some(dec!(1234567.891))), "$1,234,567.89");
        assert_eq!(format_currency(Some(dec!(-1500))), "$-1,500");
    }

    #[test]
    fn test_format_estimate_two_decimals() {
        assert_eq!(format_estimate(dec!(125)), "Estimated Monthly Premium: $125.00");
        assert_eq!(format_estimate(dec!(62.456)), "Estimated Monthly Premium: $62.46");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(None), "N/A");
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2024, 1, 5)), "1/5/2024");
    }

    #[test]
    fn test_format_policy_type() {
        assert_eq!(
            format_policy_type(Some(PolicyType::IndexedUniversalLife)),
            "INDEXED UNIVERSAL LIFE"
        );
        assert_eq!(format_policy_type(None), "Unknown Policy Type");
    }

    #[test]
    fn test_policy_card_missing_values() {
        let card = render_policy_card(&Policy::default());
        assert!(card.contains("Unknown Policy Type"));
        assert!(card.contains("Coverage Amount: $0"));
        assert!(card.contains("Start Date: N/A"));
        assert!(!card.contains("End Date"));
        assert!(card.contains("Beneficiary: N/A (N/A)"));
    }

    #[test]
    fn test_empty_client_table() {
        assert_eq!(render_client_table(&[]), "No clients found.\n");
    }
}
