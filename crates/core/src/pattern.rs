//! Known-document patterns: sets of attribute constraints a single span must
//! satisfy.
//!
//! Patterns are written as JSON objects keyed by dotted attribute paths:
//!
//! ```json
//! [
//!   {"text": "Invoice", "page.number": 0},
//!   {"text": "Total", "font_name": "Helvetica-Bold"}
//! ]
//! ```

use serde_json::Value as Json;

use crate::error::{ContentsError, Result};
use crate::key::Key;
use crate::model::Content;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pattern {
    constraints: Vec<(Key, Value)>,
}

impl Pattern {
    pub fn new(constraints: Vec<(Key, Value)>) -> Self {
        Self { constraints }
    }

    pub fn constraints(&self) -> &[(Key, Value)] {
        &self.constraints
    }

    /// Build a pattern from one JSON object.
    pub fn from_json(json: &Json) -> Result<Self> {
        let object = json.as_object().ok_or_else(|| {
            ContentsError::invalid(format!("a pattern must be a JSON object, got {json}"))
        })?;

        let constraints = object
            .iter()
            .map(|(path, value)| Ok((path.parse::<Key>()?, Value::from_json(value)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { constraints })
    }

    /// Whether `content` satisfies every constraint.
    ///
    /// The `text` constraint is a substring test unless `exact_text` is set.
    /// Other constraints use [`Value`] equality, so `1` matches `1.0` and
    /// `null` matches an unassigned bucket.
    pub fn matches(&self, content: &Content, exact_text: bool) -> bool {
        self.constraints.iter().all(|(key, expected)| match (key, expected) {
            (Key::Text, Value::Text(needle)) if !exact_text => content.text.contains(needle.as_str()),
            _ => key.resolve(content) == *expected,
        })
    }
}

/// Parse a JSON array of pattern objects.
pub fn patterns_from_json(json: &Json) -> Result<Vec<Pattern>> {
    json.as_array()
        .ok_or_else(|| ContentsError::invalid("patterns must be a JSON array of objects"))?
        .iter()
        .map(Pattern::from_json)
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::fixtures::*;

    #[test]
    fn test_from_json() {
        let pattern = Pattern::from_json(&json!({"text": "Total", "page.number": 0})).unwrap();
        assert_eq!(pattern.constraints().len(), 2);
        assert!(pattern
            .constraints()
            .contains(&(Key::PageNumber, Value::Int(0))));
        assert!(pattern
            .constraints()
            .contains(&(Key::Text, Value::Text("Total".to_string()))));
    }

    #[test]
    fn test_from_json_rejects_bad_documents() {
        assert!(Pattern::from_json(&json!(["text"])).is_err());
        assert!(Pattern::from_json(&json!({"colour": 1})).is_err());
        assert!(Pattern::from_json(&json!({"text": ["a"]})).is_err());
        assert!(patterns_from_json(&json!({"text": "a"})).is_err());
        assert!(patterns_from_json(&json!([{"text": "a"}, 3])).is_err());
    }

    #[test]
    fn test_patterns_from_json() {
        let patterns = patterns_from_json(&json!([{"text": "a"}, {"size": 10}])).unwrap();
        assert_eq!(patterns.len(), 2);
        assert!(patterns_from_json(&json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_text_substring_versus_exact() {
        let line = line_on(&page(0), 0, 0);
        let c = span(&line, 0, "Total due", 10.0, 100.0, 40.0);
        let pattern = Pattern::new(vec![(Key::Text, Value::from("due"))]);
        assert!(pattern.matches(&c, false));
        assert!(!pattern.matches(&c, true));

        let exact = Pattern::new(vec![(Key::Text, Value::from("Total due"))]);
        assert!(exact.matches(&c, true));
    }

    #[test]
    fn test_numeric_and_null_constraints() {
        let line = line_on(&page(2), 0, 0);
        let c = span(&line, 0, "Total", 10.0, 100.0, 40.0);

        let page = Pattern::from_json(&json!({"page.number": 2.0, "size": 10})).unwrap();
        assert!(page.matches(&c, false));

        let unassigned = Pattern::from_json(&json!({"horizontal_bucket": null})).unwrap();
        assert!(unassigned.matches(&c, false));
        c.set_horizontal_bucket(Some(0));
        assert!(!unassigned.matches(&c, false));
    }

    #[test]
    fn test_empty_pattern_matches_anything() {
        let line = line_on(&page(0), 0, 0);
        let c = span(&line, 0, "x", 10.0, 100.0, 4.0);
        assert!(Pattern::default().matches(&c, true));
    }
}
