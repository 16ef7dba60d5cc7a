use std::{
    fs,
    path::{Path, PathBuf},
};

use eyre::WrapErr;
use itertools::Itertools;
use tracing::debug;

use crate::{
    error::LoadError,
    model::{Bar, Column, RawRow},
    normalizer::TimeSeriesNormalizer,
};

/// Where CSV text comes from.
pub trait CsvSource {
    fn name(&self) -> String;
    fn read_text(&self) -> eyre::Result<String>;
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CsvSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn read_text(&self) -> eyre::Result<String> {
        fs::read_to_string(&self.path).wrap_err_with(|| format!("reading {}", self.name()))
    }
}

/// CSV text that has already been retrieved.
pub struct TextSource {
    pub name: String,
    pub text: String,
}

impl CsvSource for TextSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn read_text(&self) -> eyre::Result<String> {
        Ok(self.text.clone())
    }
}

/// Splits CSV text into rows keyed by (lowercased) header name.
///
/// Empty lines are skipped and fields are trimmed. Rows shorter than the
/// header are kept; their absent columns are reported by the normalizer.
pub fn parse_rows(text: &str) -> Result<Vec<RawRow>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()?
        .iter()
        .map(str::to_lowercase)
        .collect_vec();

    if let Some(column) = Column::REQUIRED
        .into_iter()
        .find(|column| !headers.iter().any(|h| h == column.name()))
    {
        return Err(LoadError::MissingHeader(column));
    }

    let mut rows = vec![];

    for record in reader.records() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or_default();

        rows.push(RawRow {
            line,
            fields: headers
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_owned))
                .collect(),
        });
    }

    Ok(rows)
}

pub fn parse_bars(text: &str, normalizer: &TimeSeriesNormalizer) -> Result<Vec<Bar>, LoadError> {
    let rows = parse_rows(text)?;
    Ok(normalizer.normalize(&rows)?)
}

pub fn load_bars(
    source: &impl CsvSource,
    normalizer: &TimeSeriesNormalizer,
) -> eyre::Result<Vec<Bar>> {
    let text = source.read_text()?;
    let bars = parse_bars(&text, normalizer).wrap_err_with(|| source.name())?;

    debug!(source = %source.name(), bars = bars.len(), "loaded bars");

    Ok(bars)
}

/// Loads several sources into one ascending sequence. Bars with equal
/// times keep the order of the sources they came from.
pub fn merge_bars<S: CsvSource>(
    sources: &[S],
    normalizer: &TimeSeriesNormalizer,
) -> eyre::Result<Vec<Bar>> {
    let mut bars = sources
        .iter()
        .map(|source| load_bars(source, normalizer))
        .collect::<eyre::Result<Vec<_>>>()?
        .concat();

    bars.sort_by_key(|bar| bar.time);

    Ok(bars)
}
