//! Interactive commands read from stdin.
//!
//! # Commands
//!
//! - `search <text>` - Replace the search text (empty text is allowed)
//! - `variant <p> <v>` - Toggle variant `v` of listed product `p`
//! - `product <p>` - Select or deselect every variant of listed product `p`
//! - `refresh` - Fetch again with the current request
//! - `list` - Show the current products and selection
//! - `confirm` - Close the picker and print the selected keys
//! - `cancel` - Close the picker and print an empty result
//! - `help` - Show this list
//!
//! Product and variant positions are zero-based, as shown by `list`.

pub mod render;

use std::str::FromStr;

use thiserror::Error;

/// Usage text shown by `help` and on unknown commands.
pub const USAGE: &str = "\
commands:
  search <text>     replace the search text
  variant <p> <v>   toggle variant v of product p
  product <p>       toggle every variant of product p
  refresh           fetch again
  list              show products and selection
  confirm           finish and print the selected keys
  cancel            finish with an empty result
  help              show this help";

/// A parsed stdin command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Variant { product: usize, variant: usize },
    Product(usize),
    Refresh,
    List,
    Confirm,
    Cancel,
    Help,
}

/// Errors from parsing a command line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid position {0:?}: expected a non-negative integer")]
    InvalidPosition(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .unwrap_or((line, ""));

        match word {
            "" => Err(CommandError::Empty),
            // Keep inner and trailing spaces; only the separator is dropped.
            "search" => Ok(Self::Search(rest.to_string())),
            "variant" => {
                let mut args = rest.split_whitespace();
                match (args.next(), args.next(), args.next()) {
                    (Some(product), Some(variant), None) => Ok(Self::Variant {
                        product: position(product)?,
                        variant: position(variant)?,
                    }),
                    _ => Err(CommandError::Usage("variant <p> <v>")),
                }
            }
            "product" => {
                let mut args = rest.split_whitespace();
                match (args.next(), args.next()) {
                    (Some(product), None) => Ok(Self::Product(position(product)?)),
                    _ => Err(CommandError::Usage("product <p>")),
                }
            }
            "refresh" => Ok(Self::Refresh),
            "list" | "ls" => Ok(Self::List),
            "confirm" => Ok(Self::Confirm),
            "cancel" | "quit" => Ok(Self::Cancel),
            "help" | "?" => Ok(Self::Help),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn position(arg: &str) -> Result<usize, CommandError> {
    arg.parse()
        .map_err(|_| CommandError::InvalidPosition(arg.to_string()))
}
