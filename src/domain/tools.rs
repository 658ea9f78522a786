use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct EditInput {
    pub file_path: String,

    #[serde(default)]
    pub old_string: String,

    #[serde(default)]
    pub new_string: String,

    #[serde(default)]
    pub replace_all: bool,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct EditPair {
    #[serde(default)]
    pub old_string: String,

    #[serde(default)]
    pub new_string: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct MultiEditInput {
    pub file_path: String,

    #[serde(default)]
    pub edits: Vec<EditPair>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct WriteInput {
    pub file_path: String,

    #[serde(default)]
    pub content: String,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct BashInput {
    pub command: String,

    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ReadInput {
    pub file_path: String,

    #[serde(default)]
    pub offset: Option<u64>,

    #[serde(default)]
    pub limit: Option<u64>,
}

/// Shared shape for search and lookup tools (Grep, Glob, LS, WebSearch, WebFetch).
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct SearchInput {
    #[serde(default)]
    pub pattern: Option<String>,

    #[serde(default)]
    pub query: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub glob: Option<String>,
}

impl SearchInput {
    pub fn subject(&self) -> Option<&str> {
        self.pattern
            .as_deref()
            .or(self.query.as_deref())
            .or(self.url.as_deref())
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct TaskInput {
    #[serde(default)]
    pub subagent_type: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct TodoItem {
    pub content: String,

    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct TodoWriteInput {
    #[serde(default)]
    pub todos: Vec<TodoItem>,
}
