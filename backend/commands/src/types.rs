/// Chat command types.
use serde::{Deserialize, Serialize};

/// A command the chat surface understands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandDef {
    /// Unique key (e.g. "run", "approve").
    pub key: String,
    pub description: String,
    /// Words typed after the prefix (e.g. "run", "exec").
    pub aliases: Vec<String>,
    /// Usage hint shown by `help`, without the prefix.
    pub usage: String,
}

/// A detected command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub key: String,
    pub raw_alias: String,
    /// Whitespace-separated arguments.
    pub args: Vec<String>,
    /// Full remaining text after the command word.
    pub raw_args: String,
}
