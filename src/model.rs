use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

pub type Price = f64;

/// Columns every input row has to carry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Timestamp,
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Column {
    pub const REQUIRED: [Column; 6] = [
        Column::Timestamp,
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::Volume,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Timestamp => "timestamp",
            Column::Open => "open",
            Column::High => "high",
            Column::Low => "low",
            Column::Close => "close",
            Column::Volume => "volume",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One untyped input row, column name to raw string value.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based source line, used in diagnostics.
    pub line: usize,
    pub fields: HashMap<String, String>,
}

impl RawRow {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            fields: HashMap::new(),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn get(&self, column: Column) -> Option<&str> {
        self.fields.get(column.name()).map(String::as_str)
    }
}

/// A normalized OHLCV bar. `time` is Unix seconds (UTC).
#[derive(Default, Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: i64,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: u64,
}

#[cfg(test)]
mod tests {
    use super::{Column, RawRow};

    #[test]
    fn unittest_column_display_matches_header_name() {
        for column in Column::REQUIRED {
            assert_eq!(column.to_string(), column.name());
        }
    }

    #[test]
    fn unittest_raw_row_lookup() {
        let row = RawRow::new(2).with("open", "100.5").with("extra", "x");

        assert_eq!(row.get(Column::Open), Some("100.5"));
        assert_eq!(row.get(Column::Close), None);
    }
}
