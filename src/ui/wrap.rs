use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Below this many usable columns wrapping is skipped.
pub const MIN_WRAP_WIDTH: usize = 20;

/// Splits `text` on newlines and greedily re-packs any line wider than `width - indent`.
///
/// Every returned line carries `indent` leading spaces. With `width == None`, or when
/// the usable width is below [`MIN_WRAP_WIDTH`], lines pass through unchanged.
pub fn wrap_lines(text: &str, width: Option<usize>, indent: usize) -> Vec<String> {
    let prefix = " ".repeat(indent);
    let available = width
        .map(|width| width.saturating_sub(indent))
        .filter(|available| *available >= MIN_WRAP_WIDTH);

    let mut out = Vec::new();
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        match available {
            Some(available) if line.width() > available => {
                for wrapped in wrap_line(line, available) {
                    out.push(format!("{prefix}{wrapped}"));
                }
            }
            _ => out.push(format!("{prefix}{line}")),
        }
    }
    out
}

fn wrap_line(line: &str, available: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;

    for token in line.split_whitespace() {
        let token_width = token.width();

        if token_width > available {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let mut chunks = split_by_width(token, available);
            let last = chunks.pop().unwrap_or_default();
            out.extend(chunks);
            current_width = last.width();
            current = last;
            continue;
        }

        if current.is_empty() {
            current.push_str(token);
            current_width = token_width;
        } else if current_width + 1 + token_width <= available {
            current.push(' ');
            current.push_str(token);
            current_width += 1 + token_width;
        } else {
            out.push(std::mem::take(&mut current));
            current.push_str(token);
            current_width = token_width;
        }
    }

    // A whitespace-only line still takes a row.
    if !current.is_empty() || out.is_empty() {
        out.push(current);
    }
    out
}

fn split_by_width(token: &str, available: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut chunk = String::new();
    let mut chunk_width = 0usize;
    for c in token.chars() {
        let w = c.width().unwrap_or(0);
        if chunk_width + w > available && !chunk.is_empty() {
            chunks.push(std::mem::take(&mut chunk));
            chunk_width = 0;
        }
        chunk.push(c);
        chunk_width += w;
    }
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_whitespace(text: &str) -> String {
        text.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn short_lines_are_only_indented() {
        assert_eq!(
            wrap_lines("one\ntwo", Some(80), 2),
            vec!["  one".to_string(), "  two".to_string()]
        );
    }

    #[test]
    fn long_line_packs_words_greedily() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let lines = wrap_lines(text, Some(24), 2);
        assert_eq!(
            lines,
            vec![
                "  alpha beta gamma delta",
                "  epsilon zeta eta theta",
                "  iota kappa",
            ]
        );
    }

    #[test]
    fn wrapping_keeps_content_and_respects_width() {
        let text = "a fairly long sentence with a supercalifragilisticexpialidociousword in it\nand `code spans` plus ünïcödé wörds that need wrapping too";
        for width in [24usize, 30, 41, 80] {
            let lines = wrap_lines(text, Some(width), 4);
            for line in &lines {
                assert!(line.width() <= width, "{line:?} wider than {width}");
            }
            assert_eq!(non_whitespace(&lines.join("\n")), non_whitespace(text));
        }
    }

    #[test]
    fn wide_blank_line_keeps_its_row() {
        let blank = " ".repeat(40);
        assert_eq!(wrap_lines(&blank, Some(30), 2), vec!["  ".to_string()]);
        assert_eq!(
            wrap_lines(&format!("a\n{blank}\nb"), Some(30), 2),
            vec!["  a".to_string(), "  ".to_string(), "  b".to_string()]
        );
    }

    #[test]
    fn narrow_width_passes_text_through() {
        let text = "this line is definitely longer than the usable width";
        assert_eq!(wrap_lines(text, Some(25), 10), vec![format!("          {text}")]);
        assert_eq!(wrap_lines(text, None, 0), vec![text.to_string()]);
    }
}
