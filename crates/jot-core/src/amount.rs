//! Amount extraction
//!
//! Scans text for the first decimal numeral, with date-like substrings
//! pre-masked so a date numeral is never mistaken for an amount.

use regex::Regex;

/// Replace date-like substrings with spaces so their digits can't be read as
/// amounts: `YYYY/M/D`, `YYYY-M-D`, and short `M/D` forms
fn mask_dates(text: &str) -> String {
    let full = Regex::new(r"\d{4}[/-]\d{1,2}[/-]\d{1,2}").expect("valid regex");
    let short = Regex::new(r"\b\d{1,2}/\d{1,2}\b").expect("valid regex");

    let masked = full.replace_all(text, |m: &regex::Captures| " ".repeat(m[0].len()));
    short
        .replace_all(&masked, |m: &regex::Captures| " ".repeat(m[0].len()))
        .into_owned()
}

/// Extract the first decimal numeral that isn't part of a date
///
/// A bare trailing decimal point is not part of the amount: "180." yields 180.
pub fn extract_amount(text: &str) -> Option<f64> {
    let masked = mask_dates(text);
    let number = Regex::new(r"\d+(?:\.\d+)?").expect("valid regex");
    number
        .find(&masked)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}
