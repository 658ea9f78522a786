use crate::app::{EngineError, TailEngine};
use crate::domain::DisplayOptions;
use crate::infra::{
    LocateError, SESSION_EXTENSION, SessionQuery, SessionTarget, WatchSessionFileError,
    WatchSignal, resolve_claude_projects_dir, resolve_session_path, watch_session_file,
};
use crate::ui::{RenderConfig, Renderer};
use clap::Parser;
use crossterm::terminal::size as terminal_size;
use dirs::home_dir;
use std::ffi::OsString;
use std::io::{self, BufWriter, IsTerminal};
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::UtcOffset;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(
    name = "cctail",
    version,
    about = "Tail Claude Code session logs: thinking, tool calls, tool output, and replies"
)]
pub struct CliArgs {
    /// Session id, project path, or a direct path to a .jsonl log
    pub target: Option<String>,

    /// Project path used to locate the session (defaults to the current directory)
    pub project: Option<PathBuf>,

    /// Show thinking blocks (default)
    #[arg(short = 't', long, overrides_with = "no_thinking")]
    pub thinking: bool,

    /// Hide thinking blocks
    #[arg(long, overrides_with = "thinking")]
    pub no_thinking: bool,

    /// Show tool calls
    #[arg(short = 'c', long)]
    pub tools: bool,

    /// Show tool results
    #[arg(short = 'r', long)]
    pub results: bool,

    /// Show text responses
    #[arg(short = 'x', long)]
    pub text: bool,

    /// Show user messages
    #[arg(short = 'u', long)]
    pub user: bool,

    /// Show everything
    #[arg(short = 'a', long)]
    pub all: bool,

    /// Print the session once and exit instead of following it
    #[arg(long)]
    pub no_follow: bool,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,

    /// Wrap output to this many columns instead of the terminal width
    #[arg(long, value_name = "N")]
    pub width: Option<usize>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TailCommand {
    pub query: SessionQuery,
    pub options: DisplayOptions,
    pub follow: bool,
    pub no_color: bool,
    pub width: Option<usize>,
}

#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error("session file not found: {0}")]
    SessionFileMissing(String),

    #[error("failed to read current directory: {0}")]
    CurrentDir(#[source] io::Error),

    #[error(transparent)]
    Watch(#[from] WatchSessionFileError),

    #[error("failed to install interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl CliArgs {
    pub fn into_command(self) -> Result<TailCommand, CliRunError> {
        let options = DisplayOptions {
            thinking: !self.no_thinking,
            tool_calls: self.tools,
            tool_results: self.results,
            text: self.text,
            user: self.user,
        }
        .with_all(self.all);

        Ok(TailCommand {
            query: session_query_from_args(self.target.as_deref(), self.project)?,
            options,
            follow: !self.no_follow,
            no_color: self.no_color,
            width: self.width,
        })
    }
}

fn session_query_from_args(
    target: Option<&str>,
    project: Option<PathBuf>,
) -> Result<SessionQuery, CliRunError> {
    let project_path = project.map(|path| expand_home(&path.to_string_lossy()));

    let Some(target) = target else {
        return Ok(SessionQuery {
            target: SessionTarget::Latest,
            project_path,
        });
    };

    if Path::new(target)
        .extension()
        .is_some_and(|ext| ext == SESSION_EXTENSION)
    {
        if project_path.is_some() {
            return Err(CliRunError::InvalidArguments(format!(
                "a project path cannot be combined with a log file: {target}"
            )));
        }
        return Ok(SessionQuery {
            target: SessionTarget::File(expand_home(target)),
            project_path: None,
        });
    }

    if project_path.is_none() && looks_like_project_path(target) {
        return Ok(SessionQuery {
            target: SessionTarget::Latest,
            project_path: Some(expand_home(target)),
        });
    }

    Ok(SessionQuery {
        target: SessionTarget::Id(target.to_string()),
        project_path,
    })
}

fn looks_like_project_path(value: &str) -> bool {
    value.starts_with('.')
        || value.starts_with('~')
        || value.contains('/')
        || value.contains('\\')
        || Path::new(value).is_dir()
}

fn expand_home(value: &str) -> PathBuf {
    let rest = match value.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => &rest[1..],
        _ => return PathBuf::from(value),
    };
    match home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(value),
    }
}

/// Resolves the log path and fails when it does not name an existing file.
pub fn locate_session(
    projects_dir: &Path,
    query: &SessionQuery,
    cwd: &Path,
) -> Result<PathBuf, CliRunError> {
    let path = resolve_session_path(projects_dir, query, cwd)?;
    if !path.is_file() {
        return Err(CliRunError::SessionFileMissing(path.display().to_string()));
    }
    Ok(path)
}

pub fn run(command: TailCommand) -> Result<(), CliRunError> {
    // Must run before any thread exists or the local offset is unavailable.
    let utc_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let cwd = std::env::current_dir().map_err(CliRunError::CurrentDir)?;
    let projects_dir = resolve_claude_projects_dir()?;
    let path = locate_session(&projects_dir, &command.query, &cwd)?;
    debug!(path = %path.display(), "resolved session file");

    let stdout_is_tty = io::stdout().is_terminal();
    let config = RenderConfig {
        width: resolve_width(command.width, stdout_is_tty),
        color: color_enabled(
            command.no_color,
            stdout_is_tty,
            std::env::var_os("NO_COLOR"),
            std::env::var_os("TERM"),
        ),
        utc_offset,
    };

    match tail(&path, &command, config) {
        Err(CliRunError::Engine(EngineError::Write(error)))
            if error.kind() == io::ErrorKind::BrokenPipe =>
        {
            debug!("stdout closed; stopping");
            Ok(())
        }
        other => other,
    }
}

fn tail(path: &Path, command: &TailCommand, config: RenderConfig) -> Result<(), CliRunError> {
    let out = BufWriter::new(io::stdout().lock());
    let mut engine = TailEngine::new(path, command.options, Renderer::new(config), out);
    engine.replay()?;

    if !command.follow {
        engine.drain_pending()?;
        return Ok(());
    }

    let mut watcher = watch_session_file(path)?;
    let interrupt = watcher.signal_sender();
    ctrlc::set_handler(move || {
        let _ = interrupt.send(WatchSignal::Interrupted);
    })?;

    // Catch anything appended between the replay and the watch starting.
    engine.on_change()?;
    engine.follow(&mut watcher)?;
    Ok(())
}

fn resolve_width(explicit: Option<usize>, stdout_is_tty: bool) -> Option<usize> {
    if let Some(width) = explicit {
        return Some(width);
    }
    if stdout_is_tty {
        if let Ok((columns, _)) = terminal_size() {
            if columns > 0 {
                return Some(usize::from(columns));
            }
        }
    }
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|width| *width > 0)
}

fn color_enabled(
    no_color_flag: bool,
    stdout_is_tty: bool,
    no_color_env: Option<OsString>,
    term: Option<OsString>,
) -> bool {
    if no_color_flag || !stdout_is_tty {
        return false;
    }
    if no_color_env.is_some_and(|value| !value.is_empty()) {
        return false;
    }
    term.is_none_or(|value| value != "dumb")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> CliArgs {
        let mut argv = vec!["cctail"];
        argv.extend_from_slice(args);
        CliArgs::try_parse_from(argv).expect("parse")
    }

    fn command(args: &[&str]) -> TailCommand {
        parse(args).into_command().expect("command")
    }

    #[test]
    fn defaults_show_only_thinking_and_follow() {
        let command = command(&[]);
        assert_eq!(
            command.options,
            DisplayOptions {
                thinking: true,
                ..DisplayOptions::default()
            }
        );
        assert!(command.follow);
        assert_eq!(command.query.target, SessionTarget::Latest);
        assert_eq!(command.query.project_path, None);
    }

    #[test]
    fn flags_toggle_categories() {
        let command = command(&["-c", "-r", "-x", "-u", "--no-thinking", "--no-follow"]);
        assert_eq!(
            command.options,
            DisplayOptions {
                thinking: false,
                ..DisplayOptions::all()
            }
        );
        assert!(!command.follow);
    }

    #[test]
    fn last_thinking_flag_wins() {
        assert!(!command(&["-t", "--no-thinking"]).options.thinking);
        assert!(command(&["--no-thinking", "-t"]).options.thinking);
    }

    #[test]
    fn all_forces_every_category_on() {
        let command = command(&["--no-thinking", "-a"]);
        assert_eq!(command.options, DisplayOptions::all());
    }

    #[test]
    fn width_and_color_flags_are_captured() {
        let command = command(&["--width", "72", "--no-color"]);
        assert_eq!(command.width, Some(72));
        assert!(command.no_color);
        assert!(CliArgs::try_parse_from(["cctail", "--width", "wide"]).is_err());
    }

    #[test]
    fn log_file_target_is_a_direct_path() {
        let command = command(&["logs/abc.jsonl"]);
        assert_eq!(
            command.query.target,
            SessionTarget::File(PathBuf::from("logs/abc.jsonl"))
        );
        assert!(
            parse(&["abc.jsonl", "/some/project"])
                .into_command()
                .is_err()
        );
    }

    #[test]
    fn lone_path_like_target_is_a_project() {
        let command = command(&["./my-project"]);
        assert_eq!(command.query.target, SessionTarget::Latest);
        assert_eq!(
            command.query.project_path,
            Some(PathBuf::from("./my-project"))
        );
    }

    #[test]
    fn id_with_project_is_two_positionals() {
        let command = command(&["abc-123", "/work/repo"]);
        assert_eq!(command.query.target, SessionTarget::Id("abc-123".to_string()));
        assert_eq!(command.query.project_path, Some(PathBuf::from("/work/repo")));
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = home_dir() else {
            return;
        };
        assert_eq!(expand_home("~"), home);
        assert_eq!(expand_home("~/code/app"), home.join("code/app"));
        assert_eq!(expand_home("~user/x"), PathBuf::from("~user/x"));
    }

    #[test]
    fn color_follows_flag_env_and_tty() {
        assert!(color_enabled(false, true, None, Some("xterm-256color".into())));
        assert!(!color_enabled(true, true, None, None));
        assert!(!color_enabled(false, false, None, None));
        assert!(!color_enabled(false, true, Some("1".into()), None));
        assert!(color_enabled(false, true, Some("".into()), None));
        assert!(!color_enabled(false, true, None, Some("dumb".into())));
    }

    #[test]
    fn explicit_width_wins() {
        assert_eq!(resolve_width(Some(50), true), Some(50));
    }

    #[test]
    fn missing_session_id_names_the_computed_path() {
        let temp = tempdir().expect("tempdir");
        let query = SessionQuery {
            target: SessionTarget::Id("does-not-exist".to_string()),
            project_path: Some(PathBuf::from("/work/repo")),
        };
        let error = locate_session(temp.path(), &query, temp.path()).expect_err("missing");
        let message = error.to_string();
        assert!(message.starts_with("session file not found: "));
        assert!(message.contains("-work-repo"));
        assert!(message.ends_with("does-not-exist.jsonl"));
    }

    #[test]
    fn dot_and_trailing_slash_arguments_find_the_project_directory() {
        let temp = tempdir().expect("tempdir");
        let project_dir = temp.path().join("-work-repo");
        fs::create_dir_all(&project_dir).expect("mkdir");
        let latest = project_dir.join("s1.jsonl");
        let by_id = project_dir.join("abc.jsonl");
        fs::write(&latest, "{}\n").expect("write");
        fs::write(&by_id, "{}\n").expect("write");
        let cwd = Path::new("/work/repo");

        for arg in [".", "./", "../repo"] {
            let query = session_query_from_args(Some(arg), None).expect("query");
            let path = locate_session(temp.path(), &query, cwd).expect("found");
            assert_eq!(path.parent(), Some(project_dir.as_path()), "argument {arg:?}");
        }

        let query =
            session_query_from_args(Some("abc"), Some(PathBuf::from("/work/repo/"))).expect("query");
        assert_eq!(locate_session(temp.path(), &query, cwd).expect("found"), by_id);
    }

    #[test]
    fn locates_existing_latest_session() {
        let temp = tempdir().expect("tempdir");
        let project_dir = temp.path().join("-work-repo");
        fs::create_dir_all(&project_dir).expect("mkdir");
        let log = project_dir.join("s1.jsonl");
        fs::write(&log, "{}\n").expect("write");

        let query = SessionQuery {
            target: SessionTarget::Latest,
            project_path: Some(PathBuf::from("/work/repo")),
        };
        assert_eq!(
            locate_session(temp.path(), &query, temp.path()).expect("found"),
            log
        );
    }

    #[test]
    fn empty_project_directory_is_not_found() {
        let temp = tempdir().expect("tempdir");
        let query = SessionQuery {
            target: SessionTarget::Latest,
            project_path: Some(PathBuf::from("/nowhere")),
        };
        assert!(matches!(
            locate_session(temp.path(), &query, temp.path()),
            Err(CliRunError::Locate(LocateError::NoSessions(_)))
        ));
    }
}
