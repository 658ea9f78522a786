use crate::domain::ToolResultSidecar;
use serde_json::Value;

/// One parsed line of a session log.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionRecord {
    value: Value,
}

#[derive(Debug)]
pub enum ParsedLine {
    Record(SessionRecord),
    Malformed(serde_json::Error),
}

pub fn parse_record_line(line: &str) -> ParsedLine {
    match serde_json::from_str::<Value>(line) {
        Ok(value) => ParsedLine::Record(SessionRecord::from_value(value)),
        Err(error) => ParsedLine::Malformed(error),
    }
}

impl SessionRecord {
    pub fn from_value(value: Value) -> Self {
        Self { value }
    }

    pub fn record_type(&self) -> Option<&str> {
        self.value.get("type").and_then(|v| v.as_str())
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.value.get("timestamp").and_then(|v| v.as_str())
    }

    /// `message.content`: either a plain string or an array of content items.
    pub fn content(&self) -> Option<&Value> {
        self.value
            .get("message")
            .and_then(|message| message.get("content"))
            .filter(|content| !content.is_null())
    }

    pub fn content_items(&self) -> Option<&Vec<Value>> {
        self.content().and_then(|content| content.as_array())
    }

    pub fn sidecar(&self) -> Option<ToolResultSidecar> {
        self.value
            .get("toolUseResult")
            .and_then(ToolResultSidecar::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_line_into_record() {
        let line = r#"{"type":"user","timestamp":"2026-02-19T00:00:00Z","message":{"content":"hi"}}"#;
        let ParsedLine::Record(record) = parse_record_line(line) else {
            panic!("expected record");
        };
        assert_eq!(record.record_type(), Some("user"));
        assert_eq!(record.timestamp(), Some("2026-02-19T00:00:00Z"));
        assert_eq!(record.content().and_then(|v| v.as_str()), Some("hi"));
        assert!(record.content_items().is_none());
    }

    #[test]
    fn truncated_json_is_malformed() {
        let line = r#"{"type":"user","message":{"content":"#;
        assert!(matches!(parse_record_line(line), ParsedLine::Malformed(_)));
        assert!(matches!(parse_record_line("not json"), ParsedLine::Malformed(_)));
    }

    #[test]
    fn reads_object_sidecar_and_ignores_string_sidecar() {
        let with_object = SessionRecord::from_value(serde_json::json!({
            "toolUseResult": { "stdout": "out", "stderr": "", "is_error": true }
        }));
        let sidecar = with_object.sidecar().expect("sidecar");
        assert_eq!(sidecar.stdout.as_deref(), Some("out"));
        assert!(sidecar.is_error);

        let with_string = SessionRecord::from_value(serde_json::json!({
            "toolUseResult": "Error: file not found"
        }));
        assert_eq!(with_string.sidecar(), None);
    }
}
