use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use thiserror::Error;

/// Byte offset up to which the session file has been consumed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TailCursor {
    offset: u64,
}

impl TailCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn advance_to(&mut self, offset: u64) {
        self.offset = self.offset.max(offset);
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineMode {
    /// Stop at the last newline; a trailing partial line waits for more bytes.
    CompleteOnly,
    /// Also hand back a trailing line that has no newline yet.
    IncludePartial,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeltaRead {
    pub lines: Vec<String>,
    pub start: u64,
    pub end: u64,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReadOutcome {
    Lines(DeltaRead),
    /// Nothing new, or only an unterminated line.
    Unchanged,
    /// The file is now shorter than the cursor.
    Shrunk { file_len: u64 },
}

#[derive(Debug, Error)]
pub enum TailReadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Reads `[cursor, file_len)` and returns its lines, advancing the cursor over what it returns.
pub fn read_new_lines(
    path: &Path,
    cursor: &mut TailCursor,
    mode: LineMode,
) -> Result<ReadOutcome, TailReadError> {
    let io_error = |source| TailReadError::Io {
        path: path.display().to_string(),
        source,
    };

    let mut file = File::open(path).map_err(io_error)?;
    let file_len = file.metadata().map_err(io_error)?.len();
    let start = cursor.offset();
    if file_len < start {
        return Ok(ReadOutcome::Shrunk { file_len });
    }
    if file_len == start {
        return Ok(ReadOutcome::Unchanged);
    }

    file.seek(SeekFrom::Start(start)).map_err(io_error)?;
    let mut buf = Vec::new();
    file.take(file_len - start)
        .read_to_end(&mut buf)
        .map_err(io_error)?;

    let consumed = match (buf.iter().rposition(|b| *b == b'\n'), mode) {
        (Some(last_newline), LineMode::CompleteOnly) => last_newline + 1,
        (None, LineMode::CompleteOnly) => return Ok(ReadOutcome::Unchanged),
        (_, LineMode::IncludePartial) => buf.len(),
    };

    let lines = split_lines(&buf[..consumed]);
    let end = start + consumed as u64;
    cursor.advance_to(end);

    Ok(ReadOutcome::Lines(DeltaRead { lines, start, end }))
}

// Split on raw bytes so a multi-byte character is never cut by a read boundary.
fn split_lines(bytes: &[u8]) -> Vec<String> {
    bytes
        .split(|b| *b == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .filter(|line| !line.iter().all(|b| b.is_ascii_whitespace()))
        .map(|line| String::from_utf8_lossy(line).into_owned())
        .collect()
}
