use crate::error::{GridError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single grid cell: empty, numeric or text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Check if the cell is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Get the cell as a number.
    ///
    /// Text is never coerced: a text cell fails even when it looks numeric,
    /// use [`Cell::parse`] at load time to infer numbers from strings.
    pub fn as_number(&self) -> Result<f64> {
        match self {
            Cell::Number(n) => Ok(*n),
            Cell::Text(s) => Err(GridError::conversion(s.clone(), "number")),
            Cell::Empty => Err(GridError::conversion("", "number")),
        }
    }

    /// Get the cell as display text
    #[must_use]
    pub fn as_text(&self) -> String {
        self.to_string()
    }

    /// Parse a string into a `Cell` with type inference
    /// Tries: empty -> number -> text
    #[must_use]
    pub fn parse(s: &str) -> Cell {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Cell::Empty;
        }

        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return Cell::Number(n);
            }
        }

        Cell::Text(trimmed.to_string())
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Empty
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(n) => write!(f, "{}", format_number(*n)),
            Cell::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Format a number without a trailing `.0` for integral values.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Number(i as f64)
    }
}

impl From<i32> for Cell {
    fn from(i: i32) -> Self {
        Cell::Number(f64::from(i))
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s)
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::from(s.to_string())
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Cell::Empty,
        }
    }
}
