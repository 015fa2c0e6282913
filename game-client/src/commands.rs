use game_types::WORD_LENGTH;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register { username: String, password: String },
    Login { username: String, password: String },
    Logout,
    Play,
    Guess(String),
    Stats,
    ResetStats,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Unknown command '{0}', type help for a list")]
    Unknown(String),
}

pub const HELP: &str = "register <user> <pass> | login <user> <pass> | logout | play | \
guess <word> (or just the word) | stats | reset-stats | quit";

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(Command::Empty);
    };
    let args: Vec<&str> = parts.collect();

    let command = match (head.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("register", [username, password]) => Command::Register {
            username: username.to_string(),
            password: password.to_string(),
        },
        ("register", _) => return Err(CommandError::Usage("register <user> <pass>")),
        ("login", [username, password]) => Command::Login {
            username: username.to_string(),
            password: password.to_string(),
        },
        ("login", _) => return Err(CommandError::Usage("login <user> <pass>")),
        ("logout", []) => Command::Logout,
        ("play", []) => Command::Play,
        ("guess", [word]) => Command::Guess(word.to_string()),
        // Validation happens in the session, so a missing word still reaches it.
        ("guess", []) => Command::Guess(String::new()),
        ("guess", _) => return Err(CommandError::Usage("guess <word>")),
        ("stats", []) => Command::Stats,
        ("reset-stats", []) => Command::ResetStats,
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        (_, []) if head.chars().count() == WORD_LENGTH => Command::Guess(head.to_string()),
        _ => return Err(CommandError::Unknown(head.to_string())),
    };

    Ok(command)
}
