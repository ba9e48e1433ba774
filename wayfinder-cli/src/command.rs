//! Input line parsing.

use crate::session::LookupMode;

pub const HELP: &str = "\
Type a place to search for it. Commands:
  :focus            show the suggestions again
  :dismiss          hide the suggestions
  :select <n>       pick suggestion n
  :retry            repeat a failed search
  :clear            clear the search
  :token [value]    set the Mapbox token (no value clears it)
  :mode remote|static
                    choose where suggestions come from
  :map              show the map
  :rides            show rides to the selected destination
  :help             show this help
  :quit             exit";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text: the new query.
    Query(String),
    Focus,
    Dismiss,
    /// 1-based suggestion number.
    Select(usize),
    Retry,
    Clear,
    /// `None` clears the stored token.
    Token(Option<String>),
    Mode(LookupMode),
    Map,
    Rides,
    Help,
    Quit,
}

impl Command {
    /// Parses one input line. Lines not starting with `:` are queries.
    pub fn parse(line: &str) -> Result<Self, String> {
        let Some(rest) = line.trim_start().strip_prefix(':') else {
            return Ok(Command::Query(line.to_string()));
        };

        let (name, arg) = match rest.trim().split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (rest.trim(), None),
        };

        match (name, arg) {
            ("focus", None) => Ok(Command::Focus),
            ("dismiss", None) => Ok(Command::Dismiss),
            ("select", Some(n)) => match n.parse::<usize>() {
                Ok(n) if n > 0 => Ok(Command::Select(n)),
                _ => Err(format!("not a suggestion number: {}", n)),
            },
            ("select", None) => Err("usage: :select <n>".to_string()),
            ("retry", None) => Ok(Command::Retry),
            ("clear", None) => Ok(Command::Clear),
            ("token", arg) => Ok(Command::Token(arg.map(str::to_string))),
            ("mode", Some(mode)) => mode.parse().map(Command::Mode),
            ("mode", None) => Err("usage: :mode remote|static".to_string()),
            ("map", None) => Ok(Command::Map),
            ("rides", None) => Ok(Command::Rides),
            ("help", None) => Ok(Command::Help),
            ("quit" | "q", None) => Ok(Command::Quit),
            (name, Some(_)) if KNOWN.contains(&name) => {
                Err(format!(":{} takes no argument", name))
            }
            (name, _) => Err(format!("unknown command :{} (try :help)", name)),
        }
    }
}

const KNOWN: [&str; 9] = [
    "focus", "dismiss", "retry", "clear", "map", "rides", "help", "quit", "q",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_query() {
        assert_eq!(
            Command::parse("san fr"),
            Ok(Command::Query("san fr".to_string()))
        );
        assert_eq!(Command::parse(""), Ok(Command::Query(String::new())));
    }

    #[test]
    fn test_commands() {
        assert_eq!(Command::parse(":focus"), Ok(Command::Focus));
        assert_eq!(Command::parse("  :select 2 "), Ok(Command::Select(2)));
        assert_eq!(
            Command::parse(":mode static"),
            Ok(Command::Mode(LookupMode::Static))
        );
        assert_eq!(Command::parse(":q"), Ok(Command::Quit));
    }

    #[test]
    fn test_token_argument_is_optional() {
        assert_eq!(
            Command::parse(":token pk.abc"),
            Ok(Command::Token(Some("pk.abc".to_string())))
        );
        assert_eq!(Command::parse(":token"), Ok(Command::Token(None)));
        assert_eq!(Command::parse(":token   "), Ok(Command::Token(None)));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Command::parse(":select 0").is_err());
        assert!(Command::parse(":select two").is_err());
        assert!(Command::parse(":select").is_err());
        assert!(Command::parse(":mode offline").is_err());
        assert!(Command::parse(":clear now").is_err());
        assert!(Command::parse(":fly").is_err());
    }
}
