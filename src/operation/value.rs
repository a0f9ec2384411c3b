//! Argument and result values passed through the dispatcher

use crate::operation::DomainError;
use std::fmt;
use std::str::FromStr;

/// A numeric scalar, a flat list of numbers or a matrix of rows
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    List(Vec<f64>),
    Matrix(Vec<Vec<f64>>),
}

impl Value {
    /// Short name of the variant for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "a number",
            Value::List(_) => "a list",
            Value::Matrix(_) => "a matrix",
        }
    }

    pub fn as_number(&self) -> Result<f64, DomainError> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(DomainError::new(format!(
                "expected a number, found {}",
                other.kind()
            ))),
        }
    }

    pub fn as_list(&self) -> Result<&[f64], DomainError> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(DomainError::new(format!(
                "expected a list, found {}",
                other.kind()
            ))),
        }
    }

    pub fn as_matrix(&self) -> Result<&[Vec<f64>], DomainError> {
        match self {
            Value::Matrix(rows) => Ok(rows),
            other => Err(DomainError::new(format!(
                "expected a matrix, found {}",
                other.kind()
            ))),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Flatten a sequence of values into a single list of numbers
    ///
    /// Matrices contribute their elements row by row.
    pub fn flatten(values: &[Value]) -> Vec<f64> {
        let mut out = Vec::new();
        for value in values {
            match value {
                Value::Number(n) => out.push(*n),
                Value::List(items) => out.extend_from_slice(items),
                Value::Matrix(rows) => rows.iter().for_each(|row| out.extend_from_slice(row)),
            }
        }
        out
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<Vec<f64>> for Value {
    fn from(items: Vec<f64>) -> Self {
        Value::List(items)
    }
}

impl From<Vec<Vec<f64>>> for Value {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Value::Matrix(rows)
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, items: &[f64]) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::List(items) => write_row(f, items),
            Value::Matrix(rows) => {
                write!(f, "[")?;
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_row(f, row)?;
                }
                write!(f, "]")
            }
        }
    }
}

fn strip_brackets(s: &str) -> Option<&str> {
    s.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .map(str::trim)
}

fn parse_number(text: &str) -> Result<f64, DomainError> {
    let text = text.trim();
    text.parse::<f64>()
        .map_err(|_| DomainError::new(format!("invalid number '{}'", text)))
}

/// Split on commas that are not inside brackets
fn split_top_level(inner: &str) -> Result<Vec<&str>, DomainError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in inner.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| DomainError::new("unbalanced brackets"))?
            }
            ',' if depth == 0 => {
                parts.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(DomainError::new("unbalanced brackets"));
    }
    parts.push(inner[start..].trim());
    Ok(parts)
}

/// Parse `3.5` as a number, `[1, 2, 3]` as a list and `[[1, 2], [3, 4]]`
/// as a matrix
impl FromStr for Value {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = match strip_brackets(trimmed) {
            Some(inner) => inner,
            None => return parse_number(trimmed).map(Value::Number),
        };
        if inner.is_empty() {
            return Ok(Value::List(Vec::new()));
        }
        if !inner.starts_with('[') {
            return inner
                .split(',')
                .map(parse_number)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List);
        }

        let rows = split_top_level(inner)?
            .into_iter()
            .map(|row| match strip_brackets(row) {
                Some("") => Ok(Vec::new()),
                Some(cells) if !cells.contains('[') => {
                    cells.split(',').map(parse_number).collect()
                }
                Some(_) => Err(DomainError::new("matrices nest at most two levels")),
                None => Err(DomainError::new(format!(
                    "expected a bracketed row, found '{}'",
                    row
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Matrix(rows))
    }
}
