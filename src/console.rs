//! Text commands for the interactive simulator.
//!
//! One command per line, case-insensitive keywords, whitespace separated:
//!
//! | Input | Command |
//! |-------|---------|
//! | `status`, `s` | [`ConsoleCommand::Status`] |
//! | `sair`, `quit`, `exit`, `q` | [`ConsoleCommand::Quit`] |
//! | `andar <floor>`, `call <floor>` | [`ConsoleCommand::Call`] |
//! | `<elevator> <floor>` | [`ConsoleCommand::Direct`] |
//! | `board <elevator> <floor> <boarding> [<alighting>]` | [`ConsoleCommand::Board`] |
//! | `help`, `?` | [`ConsoleCommand::Help`] |
//!
//! Floor numbers are parsed as signed so that a negative floor reaches the
//! dispatcher and is refused there like any other out-of-range floor.
//!
//! ```rust
//! use elevator_bank::console::ConsoleCommand;
//! use elevator_bank::ElevatorId;
//!
//! assert_eq!(ConsoleCommand::from_text("andar 5"), Ok(ConsoleCommand::Call { floor: 5 }));
//! assert_eq!(
//!     ConsoleCommand::from_text("1 7"),
//!     Ok(ConsoleCommand::Direct { elevator: ElevatorId(1), floor: 7 })
//! );
//! assert!(ConsoleCommand::from_text("fly 3").is_err());
//! ```

use core::fmt;
use core::str::FromStr;

use crate::commands::{ElevatorId, Floor};

/// Usage text printed for `help`.
pub const HELP: &str = "\
commands:
  andar <floor> | call <floor>                  send the best elevator to a floor
  <elevator> <floor>                            send a specific elevator to a floor
  board <elevator> <floor> <in> [<out>]         passengers boarding/alighting at a floor
  status | s                                    show every elevator
  help | ?                                      show this text
  sair | quit | exit | q                        stop all elevators and exit";

/// A parsed console line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Print every car's status.
    Status,
    /// Shut down and exit.
    Quit,
    /// Let the dispatch policy pick a car for this floor.
    Call {
        /// Requested floor.
        floor: Floor,
    },
    /// Send a specific car.
    Direct {
        /// Car to send.
        elevator: ElevatorId,
        /// Requested floor.
        floor: Floor,
    },
    /// Register a passenger exchange and send the car there.
    Board {
        /// Car to send.
        elevator: ElevatorId,
        /// Floor of the exchange.
        floor: Floor,
        /// People getting on.
        boarding: u32,
        /// People getting off.
        alighting: u32,
    },
    /// Print usage.
    Help,
}

impl ConsoleCommand {
    /// Parse one line of input.
    pub fn from_text(line: &str) -> Result<Self, ParseError> {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Err(ParseError::Empty);
        };
        let rest: Vec<&str> = words.collect();
        let keyword = first.to_ascii_lowercase();

        let command = match keyword.as_str() {
            "status" | "s" => no_args(ConsoleCommand::Status, &rest, line)?,
            "sair" | "quit" | "exit" | "q" => no_args(ConsoleCommand::Quit, &rest, line)?,
            "help" | "?" => no_args(ConsoleCommand::Help, &rest, line)?,
            "andar" | "call" => {
                expect_at_most(&rest, 1, line)?;
                ConsoleCommand::Call {
                    floor: number(&rest, 0, "floor")?,
                }
            }
            "board" => {
                expect_at_most(&rest, 4, line)?;
                ConsoleCommand::Board {
                    elevator: ElevatorId(number(&rest, 0, "elevator")?),
                    floor: number(&rest, 1, "floor")?,
                    boarding: number(&rest, 2, "boarding")?,
                    alighting: match rest.get(3) {
                        Some(_) => number(&rest, 3, "alighting")?,
                        None => 0,
                    },
                }
            }
            _ if first.parse::<i64>().is_ok() => {
                expect_at_most(&rest, 1, line)?;
                ConsoleCommand::Direct {
                    elevator: ElevatorId(parse_number(first)?),
                    floor: number(&rest, 0, "floor")?,
                }
            }
            _ => return Err(ParseError::UnknownCommand(first.to_string())),
        };
        Ok(command)
    }
}

impl FromStr for ConsoleCommand {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

/// Why a console line could not be parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Blank line.
    Empty,
    /// First word is not a known command, or the line has extra words.
    UnknownCommand(String),
    /// A word that should be a number is not one.
    InvalidNumber(String),
    /// A required argument is missing.
    MissingArgument(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command"),
            Self::UnknownCommand(cmd) => {
                write!(f, "unknown command '{}' (type 'help' for a list)", cmd)
            }
            Self::InvalidNumber(word) => write!(f, "'{}' is not a valid number", word),
            Self::MissingArgument(name) => write!(f, "missing argument <{}>", name),
        }
    }
}

impl std::error::Error for ParseError {}

fn no_args(
    command: ConsoleCommand,
    rest: &[&str],
    line: &str,
) -> Result<ConsoleCommand, ParseError> {
    expect_at_most(rest, 0, line)?;
    Ok(command)
}

fn expect_at_most(rest: &[&str], max: usize, line: &str) -> Result<(), ParseError> {
    if rest.len() > max {
        return Err(ParseError::UnknownCommand(line.trim().to_string()));
    }
    Ok(())
}

fn number<T: FromStr>(rest: &[&str], index: usize, name: &'static str) -> Result<T, ParseError> {
    let word = rest.get(index).ok_or(ParseError::MissingArgument(name))?;
    parse_number(word)
}

fn parse_number<T: FromStr>(word: &str) -> Result<T, ParseError> {
    word.parse()
        .map_err(|_| ParseError::InvalidNumber(word.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Keyword tests
    // =========================================================================

    #[test]
    fn status_and_quit_aliases() {
        for s in ["status", "s", "STATUS", "  s  "] {
            assert_eq!(ConsoleCommand::from_text(s), Ok(ConsoleCommand::Status));
        }
        for q in ["sair", "quit", "exit", "q", "Sair"] {
            assert_eq!(ConsoleCommand::from_text(q), Ok(ConsoleCommand::Quit));
        }
        assert_eq!(ConsoleCommand::from_text("?"), Ok(ConsoleCommand::Help));
    }

    #[test]
    fn call_parses_floor() {
        assert_eq!(
            ConsoleCommand::from_text("call 8"),
            Ok(ConsoleCommand::Call { floor: 8 })
        );
        assert_eq!(
            ConsoleCommand::from_text("andar -2"),
            Ok(ConsoleCommand::Call { floor: -2 })
        );
    }

    #[test]
    fn board_defaults_alighting_to_zero() {
        assert_eq!(
            ConsoleCommand::from_text("board 2 4 3"),
            Ok(ConsoleCommand::Board {
                elevator: ElevatorId(2),
                floor: 4,
                boarding: 3,
                alighting: 0
            })
        );
        assert_eq!(
            "board 0 1 2 5".parse(),
            Ok(ConsoleCommand::Board {
                elevator: ElevatorId(0),
                floor: 1,
                boarding: 2,
                alighting: 5
            })
        );
    }

    // =========================================================================
    // Error tests
    // =========================================================================

    #[test]
    fn empty_line() {
        assert_eq!(ConsoleCommand::from_text("   "), Err(ParseError::Empty));
    }

    #[test]
    fn missing_arguments() {
        assert_eq!(
            ConsoleCommand::from_text("andar"),
            Err(ParseError::MissingArgument("floor"))
        );
        assert_eq!(
            ConsoleCommand::from_text("2"),
            Err(ParseError::MissingArgument("floor"))
        );
        assert_eq!(
            ConsoleCommand::from_text("board 1 2"),
            Err(ParseError::MissingArgument("boarding"))
        );
    }

    #[test]
    fn bad_numbers() {
        assert_eq!(
            ConsoleCommand::from_text("call five"),
            Err(ParseError::InvalidNumber("five".to_string()))
        );
        assert_eq!(
            ConsoleCommand::from_text("-1 3"),
            Err(ParseError::InvalidNumber("-1".to_string()))
        );
        assert_eq!(
            ConsoleCommand::from_text("board 0 3 -4"),
            Err(ParseError::InvalidNumber("-4".to_string()))
        );
    }

    #[test]
    fn unknown_or_extra_words() {
        assert_eq!(
            ConsoleCommand::from_text("fly 3"),
            Err(ParseError::UnknownCommand("fly".to_string()))
        );
        assert!(matches!(
            ConsoleCommand::from_text("status now"),
            Err(ParseError::UnknownCommand(_))
        ));
        assert!(matches!(
            ConsoleCommand::from_text("1 2 3"),
            Err(ParseError::UnknownCommand(_))
        ));
    }
}
