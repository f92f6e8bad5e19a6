//! Parser for the hOCR `title` attribute micro-syntax.
//!
//! hOCR carries per-element metadata in the `title` attribute as a
//! semicolon-delimited list of `key value...` properties:
//!
//! ```text
//! title="bbox 100 50 350 120; x_wconf 96"
//! ```

use std::collections::HashMap;

use crate::error::{HocrError, Result};

/// Properties parsed from one element's `title` attribute.
///
/// Keys are unique within one node; a later duplicate key overwrites an
/// earlier one.
pub type HocrProperties = HashMap<String, String>;

/// Parses a raw `title` attribute value into a property mapping.
///
/// Splits the input on `;`, trims each segment, and skips segments that are
/// empty after trimming (a trailing semicolon is not an error). Each
/// remaining segment splits at its first whitespace run into a key and a
/// value.
///
/// # Errors
///
/// Returns [`HocrError::MalformedOcr`] naming the offending segment when it
/// does not split into exactly two parts.
pub fn parse_properties(title: &str) -> Result<HocrProperties> {
    let mut properties = HocrProperties::new();
    if title.is_empty() {
        return Ok(properties);
    }

    for segment in title.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let (key, value) = match segment.split_once(char::is_whitespace) {
            Some((key, rest)) => (key, rest.trim_start()),
            None => {
                return Err(HocrError::MalformedOcr(format!(
                    "malformed properties: {segment}"
                )))
            }
        };

        properties.insert(key.to_string(), value.to_string());
    }

    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_title() {
        assert!(parse_properties("").unwrap().is_empty());
    }

    #[test]
    fn test_single_property() {
        let props = parse_properties("x_wconf 80").unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props["x_wconf"], "80");
    }

    #[test]
    fn test_multiple_properties() {
        let props = parse_properties("bbox 103 215 194 247; x_wconf 93").unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(props["bbox"], "103 215 194 247");
        assert_eq!(props["x_wconf"], "93");
    }

    #[test]
    fn test_trailing_semicolon_is_skipped() {
        let props = parse_properties("bbox 1 2 3 4;").unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props["bbox"], "1 2 3 4");
    }

    #[test]
    fn test_value_keeps_internal_structure() {
        let props = parse_properties("x_confs 20 7 90").unwrap();
        assert_eq!(props["x_confs"], "20 7 90");
    }

    #[test]
    fn test_key_value_split_on_first_whitespace_run() {
        let props = parse_properties("image  \"foo bar.png\"").unwrap();
        assert_eq!(props["image"], "\"foo bar.png\"");
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let props = parse_properties("x_wconf 10; x_wconf 90").unwrap();
        assert_eq!(props["x_wconf"], "90");
    }

    #[test]
    fn test_segment_without_value_is_malformed() {
        let err = parse_properties("bbox 1 2 3 4; nonsense").unwrap_err();
        match err {
            HocrError::MalformedOcr(msg) => assert!(msg.contains("nonsense")),
            other => panic!("expected MalformedOcr, got {other:?}"),
        }
    }
}
