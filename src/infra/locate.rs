use dirs::home_dir;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::debug;

pub const SESSION_EXTENSION: &str = "jsonl";

const PROJECT_PATH_SEPARATOR_SUBSTITUTE: char = '-';

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SessionTarget {
    /// Direct path to a log file; bypasses the projects directory.
    File(PathBuf),
    Id(String),
    Latest,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionQuery {
    pub target: SessionTarget,
    pub project_path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("home directory not found")]
    HomeDirNotFound,

    #[error("no session found in {0}")]
    NoSessions(String),
}

pub fn resolve_claude_projects_dir() -> Result<PathBuf, LocateError> {
    if let Some(override_dir) = std::env::var_os("CLAUDE_PROJECTS_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let Some(home) = home_dir() else {
        return Err(LocateError::HomeDirNotFound);
    };

    Ok(home.join(".claude").join("projects"))
}

pub fn escape_project_path(path: &Path) -> String {
    path.to_string_lossy()
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' {
                PROJECT_PATH_SEPARATOR_SUBSTITUTE
            } else {
                c
            }
        })
        .collect()
}

pub fn project_dir_for(projects_dir: &Path, project_path: &Path) -> PathBuf {
    projects_dir.join(escape_project_path(project_path))
}

pub fn has_session_extension(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(SESSION_EXTENSION)
}

/// Resolves a query to a log path. Identifier targets are not checked for existence.
pub fn resolve_session_path(
    projects_dir: &Path,
    query: &SessionQuery,
    cwd: &Path,
) -> Result<PathBuf, LocateError> {
    if let SessionTarget::File(path) = &query.target {
        return Ok(absolutize(path, cwd));
    }

    let project_path = query
        .project_path
        .as_deref()
        .map(|path| absolutize(path, cwd))
        .unwrap_or_else(|| cwd.to_path_buf());
    let project_dir = project_dir_for(projects_dir, &project_path);
    debug!(project_dir = %project_dir.display(), "derived project directory");

    match &query.target {
        SessionTarget::Id(id) => Ok(project_dir.join(format!("{id}.{SESSION_EXTENSION}"))),
        _ => find_latest_session(&project_dir)
            .ok_or_else(|| LocateError::NoSessions(project_dir.display().to_string())),
    }
}

/// Most recently modified log in `dir`; the first one seen wins a tie.
pub fn find_latest_session(dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        if !has_session_extension(&path) {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let newer = latest
            .as_ref()
            .is_none_or(|(best_modified, _)| modified > *best_modified);
        if newer {
            latest = Some((modified, path));
        }
    }

    latest.map(|(_, path)| path)
}

/// Joins onto `cwd` and resolves `.`/`..` lexically; trailing separators are dropped.
fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
