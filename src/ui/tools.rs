use crate::domain::{
    BashInput, EditInput, MultiEditInput, ReadInput, SearchInput, TaskInput, TodoWriteInput,
    WriteInput,
};
use crate::ui::diff::{DEFAULT_CONTEXT_LINES, render_diff};
use crate::ui::theme::{self, Painter};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

const BODY_INDENT: usize = 2;
const WRITE_PREVIEW_LINES: usize = 5;

pub struct LayoutContext<'a> {
    pub painter: &'a Painter,
}

/// Body layout for one tool. `None` means the input did not fit the expected shape.
pub trait ToolLayout {
    fn render(&self, input: &Value, ctx: &LayoutContext<'_>) -> Option<Vec<String>>;
}

/// Tool name -> layout table; unknown names fall back to pretty-printed input.
pub struct ToolLayouts {
    layouts: HashMap<String, Box<dyn ToolLayout>>,
}

impl ToolLayouts {
    pub fn empty() -> Self {
        Self {
            layouts: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut table = Self::empty();
        table.register("Edit", EditLayout);
        table.register("MultiEdit", MultiEditLayout);
        table.register("Write", WriteLayout);
        table.register("Bash", BashLayout);
        table.register("Read", ReadLayout);
        for name in ["Grep", "Glob", "LS", "WebSearch", "WebFetch"] {
            table.register(name, SearchLayout);
        }
        table.register("Task", TaskLayout);
        table.register("TodoWrite", TodoLayout);
        table
    }

    pub fn register(&mut self, name: &str, layout: impl ToolLayout + 'static) {
        self.layouts.insert(name.to_string(), Box::new(layout));
    }

    pub fn render(&self, name: &str, input: &Value, ctx: &LayoutContext<'_>) -> Vec<String> {
        self.layouts
            .get(name)
            .and_then(|layout| layout.render(input, ctx))
            .unwrap_or_else(|| raw_input_lines(input))
    }
}

fn typed<T: DeserializeOwned>(input: &Value) -> Option<T> {
    serde_json::from_value(input.clone()).ok()
}

fn indented(text: &str) -> String {
    format!("{}{text}", " ".repeat(BODY_INDENT))
}

fn path_line(path: &str, ctx: &LayoutContext<'_>) -> String {
    indented(&ctx.painter.bold(path, theme::ACCENT))
}

fn raw_input_lines(input: &Value) -> Vec<String> {
    let pretty = serde_json::to_string_pretty(input).unwrap_or_else(|_| input.to_string());
    pretty.lines().map(indented).collect()
}

struct EditLayout;

impl ToolLayout for EditLayout {
    fn render(&self, input: &Value, ctx: &LayoutContext<'_>) -> Option<Vec<String>> {
        let edit: EditInput = typed(input)?;
        let mut path = edit.file_path.clone();
        if edit.replace_all {
            path.push_str(" (replace all)");
        }
        let mut out = vec![path_line(&path, ctx)];
        out.extend(render_diff(
            &edit.old_string,
            &edit.new_string,
            DEFAULT_CONTEXT_LINES,
            BODY_INDENT,
            ctx.painter,
        ));
        Some(out)
    }
}

struct MultiEditLayout;

impl ToolLayout for MultiEditLayout {
    fn render(&self, input: &Value, ctx: &LayoutContext<'_>) -> Option<Vec<String>> {
        let multi: MultiEditInput = typed(input)?;
        let mut out = vec![path_line(
            &format!("{} ({} edits)", multi.file_path, multi.edits.len()),
            ctx,
        )];
        for (idx, edit) in multi.edits.iter().enumerate() {
            if idx > 0 {
                out.push(indented(&ctx.painter.paint("--", theme::DIM)));
            }
            out.extend(render_diff(
                &edit.old_string,
                &edit.new_string,
                DEFAULT_CONTEXT_LINES,
                BODY_INDENT,
                ctx.painter,
            ));
        }
        Some(out)
    }
}

struct WriteLayout;

impl ToolLayout for WriteLayout {
    fn render(&self, input: &Value, ctx: &LayoutContext<'_>) -> Option<Vec<String>> {
        let write: WriteInput = typed(input)?;
        let lines: Vec<&str> = write.content.lines().collect();
        let mut out = vec![
            path_line(&write.file_path, ctx),
            indented(&ctx.painter.paint(&format!("{} lines", lines.len()), theme::MUTED)),
        ];
        for line in lines.iter().take(WRITE_PREVIEW_LINES) {
            out.push(indented(&ctx.painter.paint(&format!("+ {line}"), theme::ADDED)));
        }
        if lines.len() > WRITE_PREVIEW_LINES {
            let more = lines.len() - WRITE_PREVIEW_LINES;
            out.push(indented(&ctx.painter.paint(&format!("+{more} more"), theme::DIM)));
        }
        Some(out)
    }
}

struct BashLayout;

impl ToolLayout for BashLayout {
    fn render(&self, input: &Value, ctx: &LayoutContext<'_>) -> Option<Vec<String>> {
        let bash: BashInput = typed(input)?;
        let mut out = Vec::new();
        if let Some(description) = bash.description.as_deref().filter(|d| !d.trim().is_empty()) {
            out.push(indented(&ctx.painter.paint(&format!("# {description}"), theme::DIM)));
        }
        for (idx, line) in bash.command.lines().enumerate() {
            let lead = if idx == 0 { "$ " } else { "  " };
            out.push(indented(&format!(
                "{}{}",
                ctx.painter.paint(lead, theme::ADDED),
                line
            )));
        }
        Some(out)
    }
}

struct ReadLayout;

impl ToolLayout for ReadLayout {
    fn render(&self, input: &Value, ctx: &LayoutContext<'_>) -> Option<Vec<String>> {
        let read: ReadInput = typed(input)?;
        let mut out = vec![path_line(&read.file_path, ctx)];
        let range = match (read.offset, read.limit) {
            (Some(offset), Some(limit)) => Some(format!(
                "lines {offset}-{}",
                offset.saturating_add(limit).saturating_sub(1)
            )),
            (Some(offset), None) => Some(format!("from line {offset}")),
            (None, Some(limit)) => Some(format!("first {limit} lines")),
            (None, None) => None,
        };
        if let Some(range) = range {
            out.push(indented(&ctx.painter.paint(&range, theme::MUTED)));
        }
        Some(out)
    }
}

struct SearchLayout;

impl ToolLayout for SearchLayout {
    fn render(&self, input: &Value, ctx: &LayoutContext<'_>) -> Option<Vec<String>> {
        let search: SearchInput = typed(input)?;
        let mut out = Vec::new();
        if let Some(subject) = search.subject() {
            out.push(indented(&ctx.painter.bold(subject, theme::ACCENT)));
        }
        let mut scope = Vec::new();
        if let Some(path) = search.path.as_deref() {
            scope.push(format!("in {path}"));
        }
        if let Some(glob) = search.glob.as_deref() {
            scope.push(format!("glob {glob}"));
        }
        if !scope.is_empty() {
            out.push(indented(&ctx.painter.paint(&scope.join(", "), theme::MUTED)));
        }
        if out.is_empty() {
            return None;
        }
        Some(out)
    }
}

struct TaskLayout;

impl ToolLayout for TaskLayout {
    fn render(&self, input: &Value, ctx: &LayoutContext<'_>) -> Option<Vec<String>> {
        let task: TaskInput = typed(input)?;
        let kind = task.subagent_type.as_deref().unwrap_or("task");
        let label = ctx.painter.bold(&format!("[{kind}]"), theme::ACCENT);
        let description = task.description.as_deref().unwrap_or("");
        Some(vec![indented(format!("{label} {description}").trim_end())])
    }
}

struct TodoLayout;

impl ToolLayout for TodoLayout {
    fn render(&self, input: &Value, ctx: &LayoutContext<'_>) -> Option<Vec<String>> {
        let todos: TodoWriteInput = typed(input)?;
        Some(
            todos
                .todos
                .iter()
                .map(|todo| {
                    let (mark, color) = match todo.status.as_deref() {
                        Some("completed") => ("[x]", theme::ADDED),
                        Some("in_progress") => ("[~]", theme::ACCENT),
                        _ => ("[ ]", theme::MUTED),
                    };
                    indented(&format!("{} {}", ctx.painter.paint(mark, color), todo.content))
                })
                .collect(),
        )
    }
}
