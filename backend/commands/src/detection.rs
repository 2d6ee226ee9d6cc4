/// Command detection: identify prefixed commands in inbound messages.
use crate::registry::CommandRegistry;
use crate::types::CommandInvocation;

/// Detect a command at the start of a message.
///
/// Returns `None` for ordinary chat text, for an unknown command word, and
/// when `prefix` is empty.
pub fn detect_command(
    text: &str,
    prefix: &str,
    registry: &CommandRegistry,
) -> Option<CommandInvocation> {
    if prefix.is_empty() {
        return None;
    }
    let body = text.trim().strip_prefix(prefix)?;

    let (alias, rest) = body
        .split_once(char::is_whitespace)
        .map(|(a, r)| (a, r.trim()))
        .unwrap_or((body, ""));

    let def = registry.find_by_alias(alias)?;

    Some(CommandInvocation {
        key: def.key.clone(),
        raw_alias: alias.to_string(),
        args: rest.split_whitespace().map(str::to_string).collect(),
        raw_args: rest.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_run_with_full_command() {
        let reg = CommandRegistry::new();
        let inv = detect_command("!run  aidevops status --verbose ", "!", &reg).unwrap();
        assert_eq!(inv.key, "run");
        assert_eq!(inv.raw_args, "aidevops status --verbose");
        assert_eq!(inv.args, ["aidevops", "status", "--verbose"]);
    }

    #[test]
    fn aliases_are_case_insensitive() {
        let reg = CommandRegistry::new();
        let inv = detect_command("!EXEC ls", "!", &reg).unwrap();
        assert_eq!(inv.key, "run");
        assert_eq!(inv.raw_alias, "EXEC");
        assert_eq!(detect_command("!deny ab12", "!", &reg).unwrap().key, "reject");
    }

    #[test]
    fn bare_command_has_no_args() {
        let reg = CommandRegistry::new();
        let inv = detect_command("!pending", "!", &reg).unwrap();
        assert!(inv.args.is_empty());
        assert!(inv.raw_args.is_empty());
    }

    #[test]
    fn ignores_plain_text_and_unknown_words() {
        let reg = CommandRegistry::new();
        assert!(detect_command("run ls", "!", &reg).is_none());
        assert!(detect_command("!dance", "!", &reg).is_none());
        assert!(detect_command("!", "!", &reg).is_none());
        assert!(detect_command("!run ls", "", &reg).is_none());
    }

    #[test]
    fn supports_multi_char_prefix() {
        let reg = CommandRegistry::new();
        let inv = detect_command("gate: approve ab12", "gate:", &reg);
        assert!(inv.is_none(), "prefix must be followed directly by the command word");
        let inv = detect_command("gate:approve ab12", "gate:", &reg).unwrap();
        assert_eq!(inv.args, ["ab12"]);
    }
}
