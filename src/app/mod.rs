use crate::domain::{DisplayOptions, ParsedLine, classify_record, parse_record_line};
use crate::infra::{
    ChangeNotifier, LineMode, ReadOutcome, TailCursor, TailReadError, WatchSignal, read_new_lines,
};
use crate::ui::Renderer;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace, warn};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Read(#[from] TailReadError),

    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
}

/// What one consume cycle did.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ConsumeReport {
    pub lines: usize,
    pub malformed: usize,
    pub events: usize,
    pub bytes: u64,
}

/// Replays a session file and then renders whatever gets appended to it.
///
/// Lines are processed strictly in file order, and a batch is fully rendered and
/// flushed before the next read starts. The cursor only moves forward.
pub struct TailEngine<W: Write> {
    path: PathBuf,
    cursor: TailCursor,
    options: DisplayOptions,
    renderer: Renderer,
    out: W,
    shrink_reported: bool,
}

impl<W: Write> TailEngine<W> {
    pub fn new(path: &Path, options: DisplayOptions, renderer: Renderer, out: W) -> Self {
        Self {
            path: path.to_path_buf(),
            cursor: TailCursor::new(),
            options,
            renderer,
            out,
            shrink_reported: false,
        }
    }

    #[cfg(test)]
    pub fn cursor(&self) -> u64 {
        self.cursor.offset()
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Renders every complete line currently in the file.
    pub fn replay(&mut self) -> Result<ConsumeReport, EngineError> {
        self.consume(LineMode::CompleteOnly)
    }

    /// Renders a trailing line that never got its newline; used when not following.
    pub fn drain_pending(&mut self) -> Result<ConsumeReport, EngineError> {
        self.consume(LineMode::IncludePartial)
    }

    /// Handles one change notification. Read failures are logged and skipped.
    pub fn on_change(&mut self) -> Result<ConsumeReport, EngineError> {
        match self.consume(LineMode::CompleteOnly) {
            Err(EngineError::Read(error)) => {
                warn!(%error, "session read failed; waiting for next change");
                Ok(ConsumeReport::default())
            }
            other => other,
        }
    }

    /// Runs until the notifier closes or delivers an interrupt.
    pub fn follow(&mut self, notifier: &mut impl ChangeNotifier) -> Result<(), EngineError> {
        while let Some(signal) = notifier.next_signal() {
            match signal {
                WatchSignal::Changed => {
                    self.on_change()?;
                }
                WatchSignal::Error(message) => {
                    warn!(%message, "session watch error");
                }
                WatchSignal::Interrupted => {
                    debug!("interrupted; stopping follow");
                    break;
                }
            }
        }
        Ok(())
    }

    fn consume(&mut self, mode: LineMode) -> Result<ConsumeReport, EngineError> {
        let read = match read_new_lines(&self.path, &mut self.cursor, mode)? {
            ReadOutcome::Lines(read) => read,
            ReadOutcome::Unchanged => return Ok(ConsumeReport::default()),
            ReadOutcome::Shrunk { file_len } => {
                if !self.shrink_reported {
                    warn!(
                        path = %self.path.display(),
                        file_len,
                        cursor = self.cursor.offset(),
                        "session file shrank; ignoring until it grows past the cursor"
                    );
                    self.shrink_reported = true;
                }
                return Ok(ConsumeReport::default());
            }
        };

        let mut report = ConsumeReport {
            bytes: read.end - read.start,
            ..ConsumeReport::default()
        };
        for line in &read.lines {
            report.lines += 1;
            match self.process_line(line)? {
                Some(events) => report.events += events,
                None => report.malformed += 1,
            }
        }
        self.out.flush()?;

        debug!(
            start = read.start,
            end = read.end,
            lines = report.lines,
            malformed = report.malformed,
            events = report.events,
            thinking_blocks = self.renderer.thinking_count(),
            "consumed session bytes"
        );
        Ok(report)
    }

    /// Returns the number of rendered events, or `None` for a malformed line.
    fn process_line(&mut self, line: &str) -> io::Result<Option<usize>> {
        let record = match parse_record_line(line) {
            ParsedLine::Record(record) => record,
            ParsedLine::Malformed(error) => {
                debug!(%error, len = line.len(), "skipping malformed line");
                return Ok(None);
            }
        };

        let events = classify_record(&record, &self.options);
        for event in &events {
            trace!(kind = event.body.label(), "rendering event");
            self.renderer.render(&mut self.out, event)?;
        }
        Ok(Some(events.len()))
    }
}
