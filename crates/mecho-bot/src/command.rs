//! Parsing of `/<command> <action> ...` lines.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add,
    Name { target: String, alias: String },
    Show { query: String },
    List,
    Delete { query: String },
    Reload,
    /// A known action with missing arguments. Carries the action name.
    Incomplete(&'static str),
    Help,
}

impl Command {
    /// Parse `text` if it starts with `/<word>`. Returns `None` for ordinary
    /// messages.
    ///
    /// The action is case-insensitive; unknown or missing actions give
    /// [`Command::Help`]. Arguments are whitespace separated, and multi-word
    /// arguments are re-joined with single spaces.
    pub fn parse(text: &str, word: &str) -> Option<Command> {
        let parts: Vec<&str> = text.split_whitespace().collect();
        let head = parts.first()?.strip_prefix('/')?;
        if !head.eq_ignore_ascii_case(word) {
            return None;
        }

        let action = parts
            .get(1)
            .map(|a| a.to_lowercase())
            .unwrap_or_default();
        let rest = |from: usize| parts.get(from..).map(|p| p.join(" ")).unwrap_or_default();

        let command = match action.as_str() {
            "add" => Command::Add,
            "name" if parts.len() < 4 => Command::Incomplete("name"),
            "name" => Command::Name {
                target: parts[2].to_string(),
                alias: rest(3),
            },
            "show" if parts.len() < 3 => Command::Incomplete("show"),
            "show" => Command::Show { query: rest(2) },
            "list" => Command::List,
            "del" if parts.len() < 3 => Command::Incomplete("del"),
            "del" => Command::Delete { query: rest(2) },
            "reload" => Command::Reload,
            _ => Command::Help,
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Option<Command> {
        Command::parse(text, "meme")
    }

    #[test]
    fn test_not_a_command() {
        assert_eq!(parse("hello there"), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse("meme add"), None);
        assert_eq!(parse("/memes add"), None);
    }

    #[test]
    fn test_actions_are_case_insensitive() {
        assert_eq!(parse("/meme ADD"), Some(Command::Add));
        assert_eq!(parse("  /meme   List "), Some(Command::List));
        assert_eq!(parse("/meme Reload"), Some(Command::Reload));
    }

    #[test]
    fn test_name_joins_alias_words() {
        assert_eq!(
            parse("/meme name cat   very  angry cat"),
            Some(Command::Name {
                target: "cat".to_string(),
                alias: "very angry cat".to_string(),
            })
        );
        assert_eq!(parse("/meme name cat"), Some(Command::Incomplete("name")));
    }

    #[test]
    fn test_show_and_del_take_rest_of_line() {
        assert_eq!(
            parse("/meme show angry cat"),
            Some(Command::Show {
                query: "angry cat".to_string()
            })
        );
        assert_eq!(
            parse("/meme del angry cat"),
            Some(Command::Delete {
                query: "angry cat".to_string()
            })
        );
        assert_eq!(parse("/meme show"), Some(Command::Incomplete("show")));
        assert_eq!(parse("/meme del"), Some(Command::Incomplete("del")));
    }

    #[test]
    fn test_unknown_or_missing_action_is_help() {
        assert_eq!(parse("/meme"), Some(Command::Help));
        assert_eq!(parse("/meme dance"), Some(Command::Help));
    }

    #[test]
    fn test_custom_command_word() {
        assert_eq!(Command::parse("/sticker list", "sticker"), Some(Command::List));
        assert_eq!(Command::parse("/meme list", "sticker"), None);
    }
}
