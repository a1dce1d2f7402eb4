// src/core/commands.rs

//! The command grammar and validator: turns one line of client input into a
//! typed, immutable `Command`.
//!
//! Validation runs once per line, before dispatch. A recognized prefix with a
//! malformed suffix yields the specific validation error for that form, never
//! the generic `Unsupported operation` path.

use crate::core::ServeError;
use chrono::NaiveDate;

/// Sort order for directory listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    Alphabetical,
    RecencyDescending,
}

/// Direction of a date-based pack relative to the cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateDirection {
    Before,
    After,
}

/// A parsed client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ListDir { order: ListOrder },
    FileInfo { name: String },
    PackByExtension { extensions: Vec<String> },
    PackBySize { min: u64, max: u64 },
    PackByDate { cutoff: NaiveDate, direction: DateDirection },
    Quit,
    Invalid { raw: String },
}

impl Command {
    /// Parses one input line (newline already stripped).
    ///
    /// A recognized form with bad arguments returns the specific
    /// `ServeError`; an unrecognized line returns `Ok(Command::Invalid)`.
    pub fn parse(line: &str) -> Result<Command, ServeError> {
        let line = line.trim_end();

        match line {
            "dirlist -a" => {
                return Ok(Command::ListDir {
                    order: ListOrder::Alphabetical,
                });
            }
            "dirlist -t" => {
                return Ok(Command::ListDir {
                    order: ListOrder::RecencyDescending,
                });
            }
            "quitc" => return Ok(Command::Quit),
            _ => {}
        }

        if let Some(rest) = strip_command(line, "w24fn") {
            let name = rest.trim();
            if name.is_empty() {
                return Err(ServeError::MissingFilename);
            }
            return Ok(Command::FileInfo {
                name: name.to_string(),
            });
        }

        if let Some(rest) = strip_command(line, "w24ft") {
            return parse_extensions(rest);
        }

        if let Some(rest) = strip_command(line, "w24fz") {
            return parse_size_range(rest);
        }

        if let Some(rest) = strip_command(line, "w24fdb") {
            return parse_date(rest, DateDirection::Before);
        }

        if let Some(rest) = strip_command(line, "w24fda") {
            return parse_date(rest, DateDirection::After);
        }

        Ok(Command::Invalid {
            raw: line.to_string(),
        })
    }

    /// The wire-visible command name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::ListDir { .. } => "dirlist",
            Command::FileInfo { .. } => "w24fn",
            Command::PackByExtension { .. } => "w24ft",
            Command::PackBySize { .. } => "w24fz",
            Command::PackByDate {
                direction: DateDirection::Before,
                ..
            } => "w24fdb",
            Command::PackByDate {
                direction: DateDirection::After,
                ..
            } => "w24fda",
            Command::Quit => "quitc",
            Command::Invalid { .. } => "invalid",
        }
    }
}

/// Matches `<keyword>` or `<keyword> <rest>`, so that a bare `w24ft` still
/// reaches that form's own validation instead of falling through.
fn strip_command<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    if line == keyword {
        return Some("");
    }
    line.strip_prefix(keyword)
        .filter(|rest| rest.starts_with(' '))
}

fn parse_extensions(rest: &str) -> Result<Command, ServeError> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(ServeError::NoExtensions);
    }
    if tokens.len() > 3 {
        return Err(ServeError::TooManyExtensions);
    }
    let mut extensions: Vec<String> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if extensions.iter().any(|seen| seen == token) {
            return Err(ServeError::DuplicateExtension(token.to_string()));
        }
        extensions.push(token.to_string());
    }
    Ok(Command::PackByExtension { extensions })
}

fn parse_size_range(rest: &str) -> Result<Command, ServeError> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let [min_token, max_token] = tokens.as_slice() else {
        return Err(ServeError::InvalidSizeRange);
    };
    let (Ok(min), Ok(max)) = (min_token.parse::<u64>(), max_token.parse::<u64>()) else {
        return Err(ServeError::InvalidSizeRange);
    };
    if min >= max {
        return Err(ServeError::InvalidSizeRange);
    }
    Ok(Command::PackBySize { min, max })
}

fn parse_date(rest: &str, direction: DateDirection) -> Result<Command, ServeError> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let [token] = tokens.as_slice() else {
        return Err(ServeError::TooManyArguments);
    };
    let cutoff = NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .map_err(|_| ServeError::InvalidDateFormat(token.to_string()))?;
    Ok(Command::PackByDate { cutoff, direction })
}
