//! In-memory tabular data model consumed by the analyzers.
//!
//! A [`Dataset`] is an ordered sequence of [`Row`]s. Each row maps column
//! names to loosely typed [`Cell`]s and keeps its keys in insertion order,
//! which matters for duplicate detection: two rows with the same values under
//! a different key order are different rows.
//!
//! # Example
//!
//! ```rust
//! use insight_engine::dataset::{Cell, Dataset};
//! use serde_json::json;
//!
//! let dataset = Dataset::from_json(&json!([
//!     {"region": "north", "sales": 120.5},
//!     {"region": "south", "sales": "98"},
//!     {"region": "east",  "sales": null},
//! ]))
//! .unwrap();
//!
//! assert_eq!(dataset.row_count(), 3);
//! assert_eq!(dataset.columns(), vec!["region", "sales"]);
//! assert_eq!(dataset.rows()[1].get("sales").and_then(Cell::as_number), Some(98.0));
//! ```

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

use crate::error::{EngineError, Result};

/// Free-form metadata supplied by the caller and echoed into the profile.
pub type Metadata = serde_json::Map<String, Value>;

/// Longest leading float literal accepted by [`parse_numeric_prefix`].
static NUMERIC_PREFIX: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?")
        .expect("numeric prefix pattern is valid")
});

/// Parses the leading float literal of `text`.
///
/// Leading and trailing whitespace is ignored and anything after the literal
/// is discarded, so `"12px"` parses as `12.0` while `"A01"` and `"N/A"` do
/// not parse at all. Non-finite results are rejected.
pub fn parse_numeric_prefix(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let literal = NUMERIC_PREFIX.find(trimmed)?.as_str();
    literal.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A single loosely typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Explicit null.
    Null,
    /// Boolean value. Never numeric.
    Bool(bool),
    /// Numeric value as delivered by the upstream parser.
    Number(f64),
    /// Free text, possibly holding a number.
    Text(String),
}

impl Cell {
    /// Returns the finite numeric value of this cell, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if v.is_finite() => Some(*v),
            Cell::Text(s) => parse_numeric_prefix(s),
            _ => None,
        }
    }

    /// Returns true for null and the empty string.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Returns the primitive kind of this cell.
    pub fn kind(&self) -> CellKind {
        match self {
            Cell::Null => CellKind::Null,
            Cell::Bool(_) => CellKind::Boolean,
            Cell::Number(_) => CellKind::Number,
            Cell::Text(_) => CellKind::String,
        }
    }

    /// Returns the kind of a possibly absent cell; absence counts as null.
    pub fn kind_of(cell: Option<&Cell>) -> CellKind {
        cell.map_or(CellKind::Null, Cell::kind)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "null"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&Value> for Cell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(Cell::Null, Cell::Number),
            Value::String(s) => Cell::Text(s.clone()),
            nested => Cell::Text(nested.to_string()),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Null, Into::into)
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Cell::Null => serializer.serialize_unit(),
            Cell::Bool(b) => serializer.serialize_bool(*b),
            Cell::Number(v) => serializer.serialize_f64(*v),
            Cell::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Primitive kinds used by type-consistency checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Null,
    Boolean,
    Number,
    String,
}

/// A row of named cells in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Cell)>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a row from `(column, value)` pairs, keeping their order.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Cell>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut row = Self::new();
        for (key, value) in pairs {
            row.insert(key, value);
        }
        row
    }

    /// Sets a cell, replacing an existing value in place.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Cell>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(k, _)| *k == column) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((column, value)),
        }
    }

    /// Returns the cell stored under `column`.
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, cell)| cell)
    }

    /// Column names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    /// Cells in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(k, c)| (k.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn from_json_object(object: &serde_json::Map<String, Value>) -> Self {
        Self {
            cells: object
                .iter()
                .map(|(k, v)| (k.clone(), Cell::from(v)))
                .collect(),
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (key, cell) in &self.cells {
            map.serialize_entry(key, cell)?;
        }
        map.end()
    }
}

/// An ordered, read-only collection of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    rows: Vec<Row>,
}

impl Dataset {
    /// Wraps already-built rows.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Builds a dataset from a JSON array of objects.
    ///
    /// Any other JSON shape is rejected. Key order inside each object is
    /// preserved.
    pub fn from_json(value: &Value) -> Result<Self> {
        let items = match value {
            Value::Array(items) => items,
            Value::Null => {
                return Err(EngineError::invalid_input("no data provided for analysis"))
            }
            other => {
                return Err(EngineError::invalid_input(format!(
                    "dataset must be an array of rows, got {}",
                    json_type_name(other)
                )))
            }
        };

        let rows = items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(object) => Ok(Row::from_json_object(object)),
                other => Err(EngineError::invalid_input(format!(
                    "row {index} must be an object, got {}",
                    json_type_name(other)
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rows })
    }

    /// Parses a JSON document and builds a dataset from it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json(&value)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names taken from the first row.
    pub fn columns(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.keys().collect())
            .unwrap_or_default()
    }

    /// Number of columns in the first row.
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Row::len)
    }

    /// Cells of `column` in row order; absent keys yield `None`.
    pub fn column<'a>(&'a self, column: &'a str) -> impl Iterator<Item = Option<&'a Cell>> + 'a {
        self.rows.iter().map(move |row| row.get(column))
    }

    /// Finite numeric values of `column` in row order, unparseable cells dropped.
    pub fn numeric_values(&self, column: &str) -> Vec<f64> {
        self.column(column)
            .filter_map(|cell| cell.and_then(Cell::as_number))
            .collect()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_prefix_parsing() {
        assert_eq!(parse_numeric_prefix("42"), Some(42.0));
        assert_eq!(parse_numeric_prefix("  -3.5 "), Some(-3.5));
        assert_eq!(parse_numeric_prefix("12px"), Some(12.0));
        assert_eq!(parse_numeric_prefix(".5"), Some(0.5));
        assert_eq!(parse_numeric_prefix("1e3"), Some(1000.0));
        assert_eq!(parse_numeric_prefix("1e"), Some(1.0));
        assert_eq!(parse_numeric_prefix("1,234"), Some(1.0));
        assert_eq!(parse_numeric_prefix("A01"), None);
        assert_eq!(parse_numeric_prefix("N/A"), None);
        assert_eq!(parse_numeric_prefix(""), None);
        assert_eq!(parse_numeric_prefix("Infinity"), None);
        assert_eq!(parse_numeric_prefix("1e400"), None);
    }

    #[test]
    fn test_cell_numeric_semantics() {
        assert_eq!(Cell::Number(2.5).as_number(), Some(2.5));
        assert_eq!(Cell::Number(f64::NAN).as_number(), None);
        assert_eq!(Cell::Number(f64::INFINITY).as_number(), None);
        assert_eq!(Cell::Bool(true).as_number(), None);
        assert_eq!(Cell::Null.as_number(), None);
        assert_eq!(Cell::from("7").as_number(), Some(7.0));
    }

    #[test]
    fn test_cell_missing_and_kind() {
        assert!(Cell::Null.is_missing());
        assert!(Cell::from("").is_missing());
        assert!(!Cell::from(" ").is_missing());
        assert!(!Cell::Number(0.0).is_missing());

        assert_eq!(Cell::kind_of(None), CellKind::Null);
        assert_eq!(Cell::kind_of(Some(&Cell::Null)), CellKind::Null);
        assert_eq!(Cell::from(false).kind(), CellKind::Boolean);
        assert_eq!(Cell::from(1.0).kind(), CellKind::Number);
        assert_eq!(Cell::from("x").kind(), CellKind::String);
    }

    #[test]
    fn test_row_preserves_insertion_order() {
        let mut row = Row::from_pairs([("b", 1.0), ("a", 2.0)]);
        row.insert("b", 3.0);
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(row.get("b"), Some(&Cell::Number(3.0)));
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"b":3.0,"a":2.0}"#);
    }

    #[test]
    fn test_from_json_rejects_non_arrays() {
        assert!(matches!(
            Dataset::from_json(&Value::Null),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            Dataset::from_json(&json!({"a": 1})),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            Dataset::from_json(&json!([1, 2])),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_json_builds_rows() {
        let dataset = Dataset::from_json(&json!([
            {"z": 1, "a": "x", "flag": true, "nested": [1, 2]},
            {"z": null, "a": ""}
        ]))
        .unwrap();

        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.columns(), vec!["z", "a", "flag", "nested"]);
        assert_eq!(dataset.column_count(), 4);

        let first = &dataset.rows()[0];
        assert_eq!(first.get("flag"), Some(&Cell::Bool(true)));
        assert_eq!(first.get("nested"), Some(&Cell::Text("[1,2]".to_string())));
        assert_eq!(dataset.rows()[1].get("flag"), None);
    }

    #[test]
    fn test_numeric_values_skip_unparseable() {
        let dataset = Dataset::from_rows(vec![
            Row::from_pairs([("v", Cell::from("1"))]),
            Row::from_pairs([("v", Cell::from("N/A"))]),
            Row::from_pairs([("v", Cell::Null)]),
            Row::new(),
            Row::from_pairs([("v", Cell::from(4.5))]),
        ]);
        assert_eq!(dataset.numeric_values("v"), vec![1.0, 4.5]);
    }
}
