//! JSON parsing helpers for remote service responses
//!
//! These functions extract JSON from model responses, which often include
//! code-fence markers or extra prose before/after the JSON payload.

use crate::error::{Error, Result};

use super::types::RemoteParse;

/// Extract the first balanced JSON object from a response
fn extract_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let mut depth = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in response[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&response[start..=start + i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a structured entry from a remote response
///
/// Tolerates code fences and surrounding text; rejects responses with no
/// JSON object or with a payload that doesn't deserialize.
pub fn parse_remote_entry(response: &str) -> Result<RemoteParse> {
    let response = response.trim();
    let response = response
        .strip_prefix("```json")
        .or_else(|| response.strip_prefix("```"))
        .unwrap_or(response);
    let response = response.strip_suffix("```").unwrap_or(response).trim();

    match extract_object(response) {
        Some(json_str) => serde_json::from_str(json_str).map_err(|e| {
            // Truncate long responses for the error message
            let truncated = if json_str.len() > 200 {
                format!("{}...", &json_str[..200])
            } else {
                json_str.to_string()
            };
            Error::InvalidData(format!("Invalid JSON from remote: {} | Raw: {}", e, truncated))
        }),
        None => Err(Error::InvalidData(format!(
            "No JSON found in remote response | Raw: {}",
            if response.len() > 200 {
                format!("{}...", &response[..200])
            } else {
                response.to_string()
            }
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let response = r#"{"amount": 180, "type": "expense", "accountName": "Cash"}"#;
        let result = parse_remote_entry(response).unwrap();
        assert_eq!(result.amount, Some(180.0));
        assert_eq!(result.kind.as_deref(), Some("expense"));
        assert_eq!(result.account_name.as_deref(), Some("Cash"));
    }

    #[test]
    fn test_parse_code_fenced_json() {
        let response = "```json\n{\"amount\": 42.5, \"categoryName\": \"Food\"}\n```";
        let result = parse_remote_entry(response).unwrap();
        assert_eq!(result.amount, Some(42.5));
        assert_eq!(result.category_name.as_deref(), Some("Food"));
    }

    #[test]
    fn test_parse_json_with_surrounding_text() {
        let response = "Here's the structured entry:\n{\"amount\": 9.9}\nDone!";
        let result = parse_remote_entry(response).unwrap();
        assert_eq!(result.amount, Some(9.9));
    }

    #[test]
    fn test_parse_json_with_braces_in_strings() {
        let response = r#"{"description": "dinner {with} friends", "amount": 60}"#;
        let result = parse_remote_entry(response).unwrap();
        assert_eq!(result.description.as_deref(), Some("dinner {with} friends"));
    }

    #[test]
    fn test_no_json_is_an_error() {
        assert!(parse_remote_entry("I could not parse that.").is_err());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(parse_remote_entry("{\"amount\": }").is_err());
    }
}
