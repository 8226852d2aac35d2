//! Command line input handling.
//!
//! Maps one line of text from the command source (stdin in the binary) to a
//! command name and its arguments. Dispatching happens in
//! [`CommandRegistry`](crate::command::CommandRegistry).
//!
//! ## For contributors
//!
//! To add a new command:
//!
//! 1. Add a provider (or a job) for it if one doesn't exist.
//! 2. Add a `[[commands]]` entry to `config.toml`.
//! 3. Update the command table in `README.md`.

/// A parsed command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub args: Vec<String>,
}

/// Split `/name arg1 arg2` into an [`Invocation`].
///
/// The leading slash is optional and the name is matched case-insensitively.
/// Blank lines yield `None`.
pub fn parse_line(line: &str) -> Option<Invocation> {
    let line = line.trim();
    let line = line.strip_prefix('/').unwrap_or(line);

    let mut words = line.split_whitespace();
    let name = words.next()?.to_lowercase();
    let args = words.map(String::from).collect();
    Some(Invocation { name, args })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_is_optional() {
        assert_eq!(parse_line("/btc").unwrap().name, "btc");
        assert_eq!(parse_line("btc").unwrap().name, "btc");
    }

    #[test]
    fn args_are_split_on_whitespace() {
        let inv = parse_line("  /Status   emojies  extra ").unwrap();
        assert_eq!(inv.name, "status");
        assert_eq!(inv.args, ["emojies", "extra"]);
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("/"), None);
    }
}
