#![forbid(unsafe_code)]

//! Placeholder-aware formatting for node fields.

use crate::node::{PvValue, TreeNode};

/// Avatar initials from a full name.
///
/// First character of the first space-delimited token, uppercased, followed
/// by the first character of the second token as written. Absent or empty
/// names give an empty string.
///
/// ```
/// use gtree_model::initials;
///
/// assert_eq!(initials(Some("Jane Doe")), "JD");
/// assert_eq!(initials(Some("jane doe")), "Jd");
/// assert_eq!(initials(Some("jane")), "J");
/// assert_eq!(initials(None), "");
/// ```
pub fn initials(fullname: Option<&str>) -> String {
    let Some(name) = fullname else {
        return String::new();
    };
    let mut tokens = name.split(' ');
    let mut out = String::new();
    if let Some(c) = tokens.next().and_then(|t| t.chars().next()) {
        out.extend(c.to_uppercase());
    }
    if let Some(c) = tokens.next().and_then(|t| t.chars().next()) {
        out.push(c);
    }
    out
}

/// Plan name, `-` when absent or empty.
pub fn plan_label(plan: Option<&str>) -> &str {
    match plan {
        Some(p) if !p.is_empty() => p,
        _ => "-",
    }
}

/// Rank name, `No Rank` when absent or empty.
pub fn rank_label(rank: Option<&str>) -> &str {
    match rank {
        Some(r) if !r.is_empty() => r,
        _ => "No Rank",
    }
}

/// Personal PV coerced to a number and formatted.
///
/// Non-numeric or missing input renders as `NaN`.
pub fn pv_display(pv: Option<&PvValue>) -> String {
    let n = pv.map_or(f64::NAN, PvValue::as_number);
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    format!("{n}")
}

/// Title for a card: full name, then username, then `-`.
pub fn display_name(node: &TreeNode) -> &str {
    match node.fullname.as_deref() {
        Some(f) if !f.trim().is_empty() => f,
        _ if !node.username.is_empty() => &node.username,
        _ => "-",
    }
}

/// Text shown for an optional string field.
pub fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
