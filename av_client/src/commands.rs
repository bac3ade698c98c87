use aviator::entities::{Amount, is_valid_stake};
use std::fmt;

/// A line of user input, parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Place a bet; `None` uses the current bet amount.
    Bet(Option<Amount>),
    CashOut,
    /// Change the default bet amount.
    SetAmount(Amount),
    Status,
    Help,
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Invalid bet amount (not a positive number).
    InvalidAmount(String),
    /// Amount command missing its value.
    MissingAmount,
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAmount(value) => write!(
                f,
                "Invalid amount '{}'. Must be a positive number (e.g., 'bet 100')",
                value
            ),
            Self::MissingAmount => {
                write!(f, "Amount requires a value (e.g., 'amount 50')")
            }
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type 'help' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Text printed for the `help` command.
pub const COMMAND_HELP: &str = "\
Available commands:
  bet [AMOUNT]     Place a bet (defaults to the current amount)
  cashout          Cash out at the current multiplier (also: cash, c)
  amount AMOUNT    Change the default bet amount
  status           Show balance, round and available actions
  help             Show this help
  quit             Leave (also: exit)
";

/// Parse a command string into a [`Command`].
///
/// # Arguments
///
/// * `input` - The raw command string from user input
///
/// # Returns
///
/// * `Ok(Command)` - Successfully parsed command
/// * `Err(ParseError)` - Parse error with descriptive message
///
/// # Examples
///
/// ```
/// use av_client::commands::{Command, parse_command};
///
/// assert_eq!(parse_command("bet"), Ok(Command::Bet(None)));
/// assert_eq!(parse_command("bet 50"), Ok(Command::Bet(Some(50.0))));
/// assert_eq!(parse_command("c"), Ok(Command::CashOut));
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();

    // Try single-word commands first
    match trimmed.to_ascii_lowercase().as_str() {
        "cashout" | "cash" | "c" => return Ok(Command::CashOut),
        "status" | "s" => return Ok(Command::Status),
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" | "q" => return Ok(Command::Quit),
        _ => {}
    }

    // Parse multi-word commands
    let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();
    match parts.first().map(|word| word.to_ascii_lowercase()).as_deref() {
        Some("bet" | "b") => parse_bet_command(&parts),
        Some("amount") => match parts.get(1) {
            Some(value) => parse_amount(value).map(Command::SetAmount),
            None => Err(ParseError::MissingAmount),
        },
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

/// Parse a bet command: "bet [amount]"
fn parse_bet_command(parts: &[&str]) -> Result<Command, ParseError> {
    match parts.get(1) {
        Some(value) => parse_amount(value).map(|amount| Command::Bet(Some(amount))),
        None => Ok(Command::Bet(None)),
    }
}

fn parse_amount(value: &str) -> Result<Amount, ParseError> {
    value
        .parse::<Amount>()
        .ok()
        .filter(|amount| is_valid_stake(*amount))
        .ok_or_else(|| ParseError::InvalidAmount(value.to_string()))
}
