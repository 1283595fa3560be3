//! Line commands understood by interactive mode

use libbankcode::ExportKind;

pub const HELP: &str = "\
Commands:
    bank <code>       select a bank (no code returns to the bank list)
    branch <code>     select a branch of the current bank
    open <link>       go to /banks/{bank}/{branch} or a full URL
    back, forward     move through address history
    clear             reset the selection
    copy code|url     copy the branch code or shareable URL
    show              print the current state
    help              print this message
    quit              exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Bank(String),
    Branch(String),
    Open(String),
    Back,
    Forward,
    Clear,
    Copy(ExportKind),
    Show,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let arg = words.next().unwrap_or_default().to_string();
        if words.next().is_some() {
            return Err(format!("Too many arguments to '{}'", verb));
        }

        let command = match verb.to_ascii_lowercase().as_str() {
            "bank" | "b" => Command::Bank(arg),
            "branch" | "br" => Command::Branch(arg),
            "open" | "o" if !arg.is_empty() => Command::Open(arg),
            "open" | "o" => return Err("Usage: open <link>".to_string()),
            "back" => Command::Back,
            "forward" => Command::Forward,
            "clear" => Command::Clear,
            "copy" | "c" => Command::Copy(arg.parse()?),
            "show" | "s" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("Unknown command '{}'. Type 'help' for a list", other)),
        };
        Ok(Some(command))
    }
}
