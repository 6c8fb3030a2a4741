use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{MONTH_ABBREVIATIONS, MONTH_DAYS};
use crate::error::{Result, TableError};
use crate::time::MonthDay;

static ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z][a-z]{2})\s+(\d{1,2})$").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "Spring" => Ok(Season::Spring),
            "Summer" => Ok(Season::Summer),
            "Autumn" => Ok(Season::Autumn),
            "Winter" => Ok(Season::Winter),
            other => Err(TableError::UnknownSeason(other.to_string())),
        }
    }
}

/// One of the 24 solar terms.
///
/// Only `id` and `anchor` matter to the resolver and the layout engine;
/// everything else is carried through for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub id: u8,
    pub name: String,
    pub pinyin: String,
    pub translation: String,
    pub season: Season,
    pub anchor: MonthDay,
    pub color: String,
    pub description: String,
}

impl Term {
    /// Zero-based index of the month wedge this term lives in.
    pub fn month_index(&self) -> usize {
        self.anchor.month_index()
    }

    /// Gregorian date label, e.g. "2月4日".
    pub fn gregorian_label(&self) -> String {
        format!("{}月{}日", self.anchor.month, self.anchor.day)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.pinyin, format_anchor(self.anchor))
    }
}

/// Table input record: the anchor is still in its textual "Mon D" form.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TermRecord {
    pub id: u8,
    pub name: String,
    #[serde(default)]
    pub pinyin: String,
    #[serde(default)]
    pub translation: String,
    pub season: String,
    pub anchor: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
}

impl TermRecord {
    pub fn into_term(self) -> Result<Term> {
        Ok(Term {
            id: self.id,
            season: Season::parse(&self.season)?,
            anchor: parse_anchor(&self.anchor)?,
            name: self.name,
            pinyin: self.pinyin,
            translation: self.translation,
            color: self.color,
            description: self.description,
        })
    }
}

/// Parse an anchor like `"Feb 4"` into a month/day pair.
///
/// Anchors live on the non-leap cycle, so "Feb 29" is rejected.
pub fn parse_anchor(s: &str) -> Result<MonthDay> {
    let caps = ANCHOR
        .captures(s.trim())
        .ok_or_else(|| TableError::MalformedAnchor(s.to_string()))?;
    let month = MONTH_ABBREVIATIONS
        .iter()
        .position(|m| *m == &caps[1])
        .ok_or_else(|| TableError::MalformedAnchor(s.to_string()))? as u32
        + 1;
    let day: u32 = caps[2]
        .parse()
        .map_err(|_| TableError::MalformedAnchor(s.to_string()))?;
    if day == 0 || day > MONTH_DAYS[(month - 1) as usize] {
        return Err(TableError::InvalidAnchor { month, day });
    }
    Ok(MonthDay { month, day })
}

/// Inverse of [`parse_anchor`].
pub fn format_anchor(anchor: MonthDay) -> String {
    format!("{} {}", MONTH_ABBREVIATIONS[anchor.month_index()], anchor.day)
}
