use crate::domain::{DisplayEvent, DisplayOptions, EventBody, SessionRecord};
use serde_json::Value;

/// Turns one record into zero or more display events, in content order.
pub fn classify_record(record: &SessionRecord, options: &DisplayOptions) -> Vec<DisplayEvent> {
    let timestamp = record.timestamp().map(|s| s.to_string());

    if record.record_type() == Some("user") {
        if let Some(content) = record.content() {
            return classify_user_record(record, content, timestamp, options);
        }
    }

    let Some(items) = record.content_items() else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for item in items {
        let item_type = item.get("type").and_then(|v| v.as_str()).unwrap_or("");
        let body = match item_type {
            "thinking" if options.thinking => {
                let text = item.get("thinking").and_then(|v| v.as_str()).unwrap_or("");
                if text.trim().is_empty() {
                    continue;
                }
                EventBody::Thinking {
                    text: text.to_string(),
                }
            }
            "tool_use" if options.tool_calls => EventBody::ToolCall {
                name: item
                    .get("name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("tool")
                    .to_string(),
                input: item.get("input").cloned().unwrap_or(Value::Null),
            },
            "tool_result" if options.tool_results => tool_result_body(record, item),
            "text" if options.text => {
                let text = item.get("text").and_then(|v| v.as_str()).unwrap_or("");
                if text.trim().is_empty() {
                    continue;
                }
                EventBody::TextResponse {
                    text: text.to_string(),
                }
            }
            _ => continue,
        };
        out.push(DisplayEvent {
            timestamp: timestamp.clone(),
            body,
        });
    }
    out
}

// Tool results arrive on user-role records, so a user record can yield both kinds.
fn classify_user_record(
    record: &SessionRecord,
    content: &Value,
    timestamp: Option<String>,
    options: &DisplayOptions,
) -> Vec<DisplayEvent> {
    let mut out = Vec::new();

    if options.user {
        let text = extract_text_blocks(content);
        if !text.trim().is_empty() {
            out.push(DisplayEvent {
                timestamp: timestamp.clone(),
                body: EventBody::UserMessage { text },
            });
        }
    }

    if options.tool_results {
        if let Some(items) = content.as_array() {
            for item in items {
                if item.get("type").and_then(|v| v.as_str()) != Some("tool_result") {
                    continue;
                }
                out.push(DisplayEvent {
                    timestamp: timestamp.clone(),
                    body: tool_result_body(record, item),
                });
            }
        }
    }

    out
}

// The sidecar belongs to the enclosing record; every tool_result in it shares the same one.
fn tool_result_body(record: &SessionRecord, item: &Value) -> EventBody {
    let sidecar = record.sidecar();
    let item_error = item
        .get("is_error")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let is_error = item_error || sidecar.as_ref().is_some_and(|s| s.is_error);
    EventBody::ToolResult {
        content: item.get("content").cloned().unwrap_or(Value::Null),
        sidecar,
        is_error,
    }
}

pub fn extract_text_blocks(value: &Value) -> String {
    match value {
        Value::String(text) => text.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(|block| {
                if block.get("type").and_then(|v| v.as_str()) == Some("text") {
                    return block.get("text").and_then(|v| v.as_str());
                }
                None
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> SessionRecord {
        SessionRecord::from_value(value)
    }

    fn labels(events: &[DisplayEvent]) -> Vec<&'static str> {
        events.iter().map(|event| event.body.label()).collect()
    }

    #[test]
    fn emits_one_event_per_assistant_item_in_order() {
        let value = json!({
            "type": "assistant",
            "timestamp": "2026-02-19T00:00:00Z",
            "message": { "content": [
                { "type": "thinking", "thinking": "step one" },
                { "type": "text", "text": "done" },
                { "type": "tool_use", "name": "Bash", "input": { "command": "ls" } }
            ]}
        });
        let events = classify_record(&record(value), &DisplayOptions::all());
        assert_eq!(labels(&events), vec!["thinking", "response", "tool"]);
        assert_eq!(events[0].timestamp.as_deref(), Some("2026-02-19T00:00:00Z"));
        assert_eq!(
            events[2].body,
            EventBody::ToolCall {
                name: "Bash".to_string(),
                input: json!({ "command": "ls" })
            }
        );
    }

    #[test]
    fn assistant_items_respect_their_toggles() {
        let value = json!({
            "message": { "content": [
                { "type": "thinking", "thinking": "hmm" },
                { "type": "text", "text": "reply" }
            ]}
        });
        let options = DisplayOptions {
            thinking: true,
            ..DisplayOptions::default()
        };
        let events = classify_record(&record(value), &options);
        assert_eq!(labels(&events), vec!["thinking"]);
    }

    #[test]
    fn skips_empty_thinking_and_text() {
        let value = json!({
            "message": { "content": [
                { "type": "thinking", "thinking": "" },
                { "type": "text", "text": "   " }
            ]}
        });
        assert!(classify_record(&record(value), &DisplayOptions::all()).is_empty());
    }

    #[test]
    fn user_string_content_becomes_user_message() {
        let value = json!({ "type": "user", "message": { "content": "hello" } });
        let events = classify_record(&record(value.clone()), &DisplayOptions::all());
        assert_eq!(
            events,
            vec![DisplayEvent {
                timestamp: None,
                body: EventBody::UserMessage {
                    text: "hello".to_string()
                }
            }]
        );

        let hidden = classify_record(&record(value), &DisplayOptions::default());
        assert!(hidden.is_empty());
    }

    #[test]
    fn user_array_content_joins_text_items_and_emits_tool_results() {
        let value = json!({
            "type": "user",
            "message": { "content": [
                { "type": "text", "text": "first" },
                { "type": "tool_result", "tool_use_id": "t1", "content": "ok" },
                { "type": "text", "text": "second" }
            ]},
            "toolUseResult": { "stdout": "captured", "stderr": "" }
        });
        let events = classify_record(&record(value), &DisplayOptions::all());
        assert_eq!(labels(&events), vec!["user", "result"]);
        assert_eq!(
            events[0].body,
            EventBody::UserMessage {
                text: "first\nsecond".to_string()
            }
        );
        let EventBody::ToolResult { content, sidecar, is_error } = &events[1].body else {
            panic!("expected tool result");
        };
        assert_eq!(content, &json!("ok"));
        assert_eq!(
            sidecar.as_ref().and_then(|s| s.stdout.as_deref()),
            Some("captured")
        );
        assert!(!is_error);
    }

    #[test]
    fn user_record_with_only_tool_result_drops_empty_user_message() {
        let value = json!({
            "type": "user",
            "message": { "content": [
                { "type": "tool_result", "content": "boom", "is_error": true }
            ]}
        });
        let events = classify_record(&record(value), &DisplayOptions::all());
        assert_eq!(labels(&events), vec!["result"]);
        assert!(matches!(
            events[0].body,
            EventBody::ToolResult { is_error: true, .. }
        ));
    }

    #[test]
    fn every_tool_result_in_a_record_shares_its_sidecar() {
        let value = json!({
            "type": "user",
            "message": { "content": [
                { "type": "tool_result", "content": "a" },
                { "type": "tool_result", "content": "b" }
            ]},
            "toolUseResult": { "stdout": "shared" }
        });
        let events = classify_record(&record(value), &DisplayOptions::all());
        assert_eq!(events.len(), 2);
        for event in &events {
            let EventBody::ToolResult { sidecar, .. } = &event.body else {
                panic!("expected tool result");
            };
            assert_eq!(
                sidecar.as_ref().and_then(|s| s.stdout.as_deref()),
                Some("shared")
            );
        }
    }

    #[test]
    fn unrecognized_shapes_yield_nothing() {
        let options = DisplayOptions::all();
        for value in [
            json!({ "type": "summary", "summary": "x" }),
            json!({ "type": "user" }),
            json!({ "message": { "content": "plain assistant string" } }),
            json!({ "message": { "content": [{ "type": "image" }] } }),
            json!(42),
        ] {
            assert!(classify_record(&record(value), &options).is_empty());
        }
    }
}
