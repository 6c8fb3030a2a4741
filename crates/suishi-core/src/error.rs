use std::fmt;

/// Errors raised while loading or validating a term table.
///
/// All of these are configuration errors: they surface once, at load time,
/// and are never defaulted away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    Empty,
    MalformedAnchor(String),
    InvalidAnchor { month: u32, day: u32 },
    UnknownSeason(String),
    DuplicateId(u8),
    DuplicateAnchor(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Empty => write!(f, "term table is empty"),
            TableError::MalformedAnchor(s) => {
                write!(f, "malformed anchor '{s}': expected \"Mon D\" (e.g. \"Feb 4\")")
            }
            TableError::InvalidAnchor { month, day } => {
                write!(f, "anchor out of range: month {month}, day {day}")
            }
            TableError::UnknownSeason(s) => write!(f, "unknown season '{s}'"),
            TableError::DuplicateId(id) => write!(f, "duplicate term id {id}"),
            TableError::DuplicateAnchor(a) => write!(f, "duplicate anchor '{a}'"),
        }
    }
}

impl std::error::Error for TableError {}

pub type Result<T> = std::result::Result<T, TableError>;
