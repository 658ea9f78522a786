use notify::event::EventKind;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::{Receiver, Sender, channel};
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WatchSignal {
    Changed,
    Error(String),
    Interrupted,
}

/// Source of change notifications for a followed session file.
pub trait ChangeNotifier {
    /// Blocks until the next signal; `None` once the source is closed.
    fn next_signal(&mut self) -> Option<WatchSignal>;
}

#[derive(Debug)]
pub struct SessionFileWatcher {
    _watcher: RecommendedWatcher,
    tx: Sender<WatchSignal>,
    rx: Receiver<WatchSignal>,
}

impl SessionFileWatcher {
    /// Sender that lets another thread (the interrupt handler) wake the follow loop.
    pub fn signal_sender(&self) -> Sender<WatchSignal> {
        self.tx.clone()
    }
}

impl ChangeNotifier for SessionFileWatcher {
    fn next_signal(&mut self) -> Option<WatchSignal> {
        self.rx.recv().ok()
    }
}

#[derive(Debug, Error)]
pub enum WatchSessionFileError {
    #[error("watch error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn watch_session_file(path: &Path) -> Result<SessionFileWatcher, WatchSessionFileError> {
    let (tx, rx) = channel::<WatchSignal>();
    let event_tx = tx.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<notify::Event>| match res {
            Ok(event) => {
                if should_trigger_session_reload(&event) {
                    let _ = event_tx.send(WatchSignal::Changed);
                }
            }
            Err(error) => {
                let _ = event_tx.send(WatchSignal::Error(error.to_string()));
            }
        },
        Config::default(),
    )?;

    watcher.watch(path, RecursiveMode::NonRecursive)?;

    Ok(SessionFileWatcher {
        _watcher: watcher,
        tx,
        rx,
    })
}

fn should_trigger_session_reload(event: &notify::Event) -> bool {
    !matches!(event.kind, EventKind::Access(_) | EventKind::Remove(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, ModifyKind, RemoveKind};
    use std::path::PathBuf;

    fn event(kind: EventKind) -> notify::Event {
        notify::Event {
            kind,
            paths: vec![PathBuf::from("/tmp/projects/-p/s.jsonl")],
            attrs: notify::event::EventAttributes::default(),
        }
    }

    #[test]
    fn reload_ignores_access_events() {
        assert!(!should_trigger_session_reload(&event(EventKind::Access(
            AccessKind::Any
        ))));
    }

    #[test]
    fn reload_ignores_removal() {
        assert!(!should_trigger_session_reload(&event(EventKind::Remove(
            RemoveKind::File
        ))));
    }

    #[test]
    fn reload_triggers_on_modify() {
        assert!(should_trigger_session_reload(&event(EventKind::Modify(
            ModifyKind::Any
        ))));
    }

    #[test]
    fn interrupt_sender_wakes_the_watcher() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("s.jsonl");
        std::fs::write(&path, "").expect("write");

        let mut watcher = watch_session_file(&path).expect("watch");
        watcher
            .signal_sender()
            .send(WatchSignal::Interrupted)
            .expect("send");

        let mut seen = Vec::new();
        while let Some(signal) = watcher.next_signal() {
            let done = signal == WatchSignal::Interrupted;
            seen.push(signal);
            if done {
                break;
            }
        }
        assert_eq!(seen.last(), Some(&WatchSignal::Interrupted));
    }
}
