mod diff;
mod highlight;
mod theme;
mod tools;
mod wrap;

pub use highlight::*;
pub use theme::Painter;
pub use tools::*;
pub use wrap::*;

use crate::domain::{DisplayEvent, EventBody, ToolResultSidecar};
use crossterm::style::Color;
use serde_json::Value;
use std::io::{self, Write};
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing::debug;

const BODY_INDENT: usize = 2;
const RESULT_MAX_LINES: usize = 15;
const STDERR_MAX_CHARS: usize = 200;
const TIME_PLACEHOLDER: &str = "--:--:--";
const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RenderConfig {
    /// Terminal columns; `None` disables wrapping.
    pub width: Option<usize>,
    pub color: bool,
    pub utc_offset: UtcOffset,
}

/// Formats display events for the terminal.
///
/// Holds the thinking-block counter that picks each block's palette color. The counter
/// starts at zero when the renderer is built and is never reset, so colors keep
/// rotating across follow-mode batches.
pub struct Renderer {
    width: Option<usize>,
    painter: Painter,
    utc_offset: UtcOffset,
    thinking_count: usize,
    tools: ToolLayouts,
    highlighter: Option<Box<dyn Highlight>>,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        let highlighter: Option<Box<dyn Highlight>> = if config.color {
            Some(Box::new(SyntectHighlighter::new()))
        } else {
            None
        };
        Self {
            width: config.width,
            painter: Painter::new(config.color),
            utc_offset: config.utc_offset,
            thinking_count: 0,
            tools: ToolLayouts::with_defaults(),
            highlighter,
        }
    }

    pub fn thinking_count(&self) -> usize {
        self.thinking_count
    }

    pub fn render(&mut self, out: &mut impl Write, event: &DisplayEvent) -> io::Result<()> {
        for line in self.render_lines(event) {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    pub fn render_lines(&mut self, event: &DisplayEvent) -> Vec<String> {
        let time = format_time_of_day(event.timestamp.as_deref(), self.utc_offset);
        let mut lines = match &event.body {
            EventBody::Thinking { text } => self.render_thinking(text, &time),
            EventBody::ToolCall { name, input } => self.render_tool_call(name, input, &time),
            EventBody::ToolResult {
                content,
                sidecar,
                is_error,
            } => self.render_tool_result(content, sidecar.as_ref(), *is_error, &time),
            EventBody::TextResponse { text } => self.render_text_response(text, &time),
            EventBody::UserMessage { text } => self.render_user_message(text, &time),
        };
        lines.push(String::new());
        lines
    }

    fn header(&self, label: &str, detail: Option<&str>, time: &str, color: Color) -> String {
        let mut header = self.painter.bold(label, color);
        if let Some(detail) = detail {
            header.push_str(&self.painter.paint(" · ", theme::DIM));
            header.push_str(&self.painter.bold(detail, theme::HEADER));
        }
        header.push_str(&self.painter.paint(&format!(" · {time}"), theme::DIM));
        header
    }

    fn render_thinking(&mut self, text: &str, time: &str) -> Vec<String> {
        let color = theme::thinking_color(self.thinking_count);
        self.thinking_count += 1;

        let mut out = vec![self.header("thinking", None, time, color)];
        let mut in_span = false;
        for line in wrap_lines(text.trim_end(), self.width, BODY_INDENT) {
            out.push(highlight_code_spans(&line, color, &self.painter, &mut in_span));
        }
        out
    }

    fn render_tool_call(&self, name: &str, input: &Value, time: &str) -> Vec<String> {
        let mut out = vec![self.header("tool", Some(name), time, theme::ACCENT)];
        let ctx = LayoutContext {
            painter: &self.painter,
        };
        out.extend(self.tools.render(name, input, &ctx));
        out
    }

    fn render_tool_result(
        &self,
        content: &Value,
        sidecar: Option<&ToolResultSidecar>,
        is_error: bool,
        time: &str,
    ) -> Vec<String> {
        let (detail, color) = if is_error {
            (Some("error"), theme::ERROR)
        } else {
            (None, theme::MUTED)
        };
        let mut out = vec![self.header("result", detail, time, color)];

        // The sidecar's captured stdout wins over the inline content when it has any.
        let body = sidecar
            .and_then(|sidecar| sidecar.stdout.as_deref())
            .filter(|stdout| !stdout.trim().is_empty())
            .map(|stdout| stdout.to_string())
            .unwrap_or_else(|| tool_result_text(content));

        let body_lines: Vec<&str> = body.trim_end().lines().collect();
        if body_lines.is_empty() {
            out.push(indent(&self.painter.paint("(no output)", theme::DIM)));
        }
        for line in body_lines.iter().take(RESULT_MAX_LINES) {
            out.push(indent(line));
        }
        if body_lines.len() > RESULT_MAX_LINES {
            let more = body_lines.len() - RESULT_MAX_LINES;
            out.push(indent(
                &self.painter.paint(&format!("+{more} more lines"), theme::DIM),
            ));
        }

        let stderr = sidecar
            .and_then(|sidecar| sidecar.stderr.as_deref())
            .map(str::trim_end)
            .filter(|stderr| !stderr.trim().is_empty());
        if let Some(stderr) = stderr {
            let excerpt = truncate_chars(stderr, STDERR_MAX_CHARS);
            for (idx, line) in excerpt.lines().enumerate() {
                let text = if idx == 0 {
                    format!("stderr: {line}")
                } else {
                    format!("        {line}")
                };
                out.push(indent(&self.painter.paint(&text, theme::ERROR)));
            }
        }
        out
    }

    fn render_text_response(&self, text: &str, time: &str) -> Vec<String> {
        let mut out = vec![self.header("response", None, time, theme::HEADER)];
        for segment in split_code_fences(text.trim_end()) {
            match segment {
                Segment::Prose(prose) => out.extend(wrap_lines(&prose, self.width, BODY_INDENT)),
                Segment::Code {
                    open,
                    language,
                    body,
                    close,
                } => {
                    out.push(indent(&self.painter.paint(&open, theme::DIM)));
                    out.extend(self.code_block_lines(&language, &body));
                    if let Some(close) = close {
                        out.push(indent(&self.painter.paint(&close, theme::DIM)));
                    }
                }
            }
        }
        out
    }

    fn code_block_lines(&self, language: &str, body: &[String]) -> Vec<String> {
        let plain = || body.iter().map(|line| indent(line)).collect::<Vec<_>>();
        let Some(highlighter) = self.highlighter.as_ref() else {
            return plain();
        };
        if language.is_empty() || body.is_empty() {
            return plain();
        }

        let mut code = body.join("\n");
        code.push('\n');
        match highlighter.highlight(&code, language) {
            Ok(lines) => lines.iter().map(|line| indent(line)).collect(),
            Err(error) => {
                debug!(%error, language, "code block left unhighlighted");
                plain()
            }
        }
    }

    fn render_user_message(&self, text: &str, time: &str) -> Vec<String> {
        let mut out = vec![self.header("user", None, time, theme::ACCENT)];
        out.extend(wrap_lines(text.trim_end(), self.width, BODY_INDENT));
        out
    }
}

pub fn format_time_of_day(timestamp: Option<&str>, offset: UtcOffset) -> String {
    timestamp
        .and_then(|value| OffsetDateTime::parse(value, &Rfc3339).ok())
        .and_then(|value| value.to_offset(offset).format(TIME_FORMAT).ok())
        .unwrap_or_else(|| TIME_PLACEHOLDER.to_string())
}

fn indent(text: &str) -> String {
    format!("{}{text}", " ".repeat(BODY_INDENT))
}

/// At most `max` characters, the last one being `…` when anything was cut.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{head}…")
}

fn tool_result_text(content: &Value) -> String {
    match content {
        Value::Null => String::new(),
        Value::String(text) => text.to_string(),
        Value::Array(parts) => parts
            .iter()
            .map(|part| match part.get("text").and_then(|v| v.as_str()) {
                Some(text) if part.get("type").and_then(|v| v.as_str()) == Some("text") => {
                    text.to_string()
                }
                _ => serde_json::to_string_pretty(part).unwrap_or_else(|_| part.to_string()),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Colors backtick-delimited spans; `in_span` carries an open span across wrapped lines.
fn highlight_code_spans(line: &str, base: Color, painter: &Painter, in_span: &mut bool) -> String {
    if !painter.enabled() {
        return line.to_string();
    }

    let mut out = String::new();
    for (idx, part) in line.split('`').enumerate() {
        if idx > 0 {
            if *in_span {
                out.push_str(&painter.paint("`", theme::CODE_SPAN));
                *in_span = false;
            } else {
                *in_span = true;
                out.push_str(&painter.paint("`", theme::CODE_SPAN));
            }
        }
        if part.is_empty() {
            continue;
        }
        let color = if *in_span { theme::CODE_SPAN } else { base };
        out.push_str(&painter.paint(part, color));
    }
    out
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Segment {
    Prose(String),
    Code {
        open: String,
        language: String,
        body: Vec<String>,
        close: Option<String>,
    },
}

// An unterminated fence runs to the end of the text.
fn split_code_fences(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut prose: Vec<&str> = Vec::new();
    let mut code: Option<(String, String, Vec<String>)> = None;

    for line in text.lines() {
        let is_fence = line.trim_start().starts_with("```");
        match code.take() {
            Some((open, language, body)) if is_fence => segments.push(Segment::Code {
                open,
                language,
                body,
                close: Some(line.to_string()),
            }),
            Some((open, language, mut body)) => {
                body.push(line.to_string());
                code = Some((open, language, body));
            }
            None if is_fence => {
                if !prose.is_empty() {
                    segments.push(Segment::Prose(prose.join("\n")));
                    prose.clear();
                }
                let language = line
                    .trim_start()
                    .trim_start_matches('`')
                    .trim()
                    .to_string();
                code = Some((line.to_string(), language, Vec::new()));
            }
            None => prose.push(line),
        }
    }

    if let Some((open, language, body)) = code {
        segments.push(Segment::Code {
            open,
            language,
            body,
            close: None,
        });
    }
    if !prose.is_empty() {
        segments.push(Segment::Prose(prose.join("\n")));
    }
    segments
}
