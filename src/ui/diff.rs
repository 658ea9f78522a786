use crate::ui::theme::{self, Painter};
use similar::{Algorithm, DiffOp, capture_diff_slices};

pub const DEFAULT_CONTEXT_LINES: usize = 3;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DiffLineKind {
    Added,
    Removed,
    Context,
}

/// Removed lines are numbered against the old text; added and context lines against the new.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiffLine {
    pub kind: DiffLineKind,
    pub number: usize,
    pub text: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DiffRow {
    Line(DiffLine),
    Ellipsis,
}

/// Changed lines plus up to `context` unchanged lines around each run. Empty when nothing changed.
pub fn diff_rows(old: &str, new: &str, context: usize) -> Vec<DiffRow> {
    let lines = diff_lines(old, new);
    if lines.iter().all(|line| line.kind == DiffLineKind::Context) {
        return Vec::new();
    }

    let mut keep = vec![false; lines.len()];
    for (idx, line) in lines.iter().enumerate() {
        if line.kind == DiffLineKind::Context {
            continue;
        }
        let from = idx.saturating_sub(context);
        let to = (idx + context).min(lines.len() - 1);
        for slot in &mut keep[from..=to] {
            *slot = true;
        }
    }

    let mut rows = Vec::new();
    for (line, kept) in lines.into_iter().zip(keep) {
        if kept {
            rows.push(DiffRow::Line(line));
        } else if rows.last() != Some(&DiffRow::Ellipsis) {
            rows.push(DiffRow::Ellipsis);
        }
    }
    rows
}

fn diff_lines(old: &str, new: &str) -> Vec<DiffLine> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    let mut out = Vec::with_capacity(old_lines.len().max(new_lines.len()));
    // Within a change run, removals always print before additions.
    let mut removed = Vec::new();
    let mut added = Vec::new();

    for op in capture_diff_slices(Algorithm::Myers, &old_lines, &new_lines) {
        match op {
            DiffOp::Equal { new_index, len, .. } => {
                out.append(&mut removed);
                out.append(&mut added);
                push_range(&mut out, DiffLineKind::Context, &new_lines, new_index, len);
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                push_range(&mut removed, DiffLineKind::Removed, &old_lines, old_index, old_len);
            }
            DiffOp::Insert {
                new_index, new_len, ..
            } => {
                push_range(&mut added, DiffLineKind::Added, &new_lines, new_index, new_len);
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                push_range(&mut removed, DiffLineKind::Removed, &old_lines, old_index, old_len);
                push_range(&mut added, DiffLineKind::Added, &new_lines, new_index, new_len);
            }
        }
    }
    out.append(&mut removed);
    out.append(&mut added);
    out
}

fn push_range(
    out: &mut Vec<DiffLine>,
    kind: DiffLineKind,
    source: &[&str],
    start: usize,
    len: usize,
) {
    for (offset, text) in source[start..start + len].iter().enumerate() {
        out.push(DiffLine {
            kind,
            number: start + offset + 1,
            text: (*text).to_string(),
        });
    }
}

/// Formats the diff block, one string per terminal line, indented by `indent` spaces.
pub fn render_diff(
    old: &str,
    new: &str,
    context: usize,
    indent: usize,
    painter: &Painter,
) -> Vec<String> {
    let rows = diff_rows(old, new, context);
    let number_width = rows
        .iter()
        .filter_map(|row| match row {
            DiffRow::Line(line) => Some(line.number),
            DiffRow::Ellipsis => None,
        })
        .max()
        .unwrap_or(0)
        .max(old.lines().count())
        .max(new.lines().count())
        .to_string()
        .len();
    let prefix = " ".repeat(indent);

    rows.iter()
        .map(|row| match row {
            DiffRow::Ellipsis => {
                let marker = format!("{:>number_width$} ...", "");
                format!("{prefix}{}", painter.paint(&marker, theme::DIM))
            }
            DiffRow::Line(line) => {
                let (sign, color) = match line.kind {
                    DiffLineKind::Added => ('+', theme::ADDED),
                    DiffLineKind::Removed => ('-', theme::REMOVED),
                    DiffLineKind::Context => (' ', theme::DIM),
                };
                let body = format!("{:>number_width$} {sign} {}", line.number, line.text);
                format!("{prefix}{}", painter.paint(&body, color))
            }
        })
        .collect()
}
