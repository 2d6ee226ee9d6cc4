/// Built-in chat commands.
use crate::types::CommandDef;

fn def(key: &str, aliases: &[&str], usage: &str, description: &str) -> CommandDef {
    CommandDef {
        key: key.to_string(),
        description: description.to_string(),
        aliases: aliases.iter().map(|s| s.to_string()).collect(),
        usage: usage.to_string(),
    }
}

pub fn builtin_commands() -> Vec<CommandDef> {
    vec![
        def("run", &["run", "exec"], "run <command>", "Run a shell command (may need approval)."),
        def(
            "approve",
            &["approve"],
            "approve <id>",
            "Approve and run one of your pending commands.",
        ),
        def("reject", &["reject", "deny"], "reject <id>", "Reject a pending command."),
        def("pending", &["pending"], "pending", "List your pending commands."),
        def("help", &["help", "commands"], "help", "Show available commands."),
    ]
}

pub struct CommandRegistry {
    commands: Vec<CommandDef>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self { commands: builtin_commands() }
    }

    pub fn all(&self) -> &[CommandDef] {
        &self.commands
    }

    /// Find a command by alias, case-insensitively.
    pub fn find_by_alias(&self, alias: &str) -> Option<&CommandDef> {
        let lower = alias.to_lowercase();
        self.commands
            .iter()
            .find(|c| c.aliases.iter().any(|a| a.to_lowercase() == lower))
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
