use chrono::DateTime;

use crate::{
    config::NormalizerConfig,
    error::ExportError,
    model::{Bar, Column, RawRow},
};

/// Turns bars back into rows that normalize to the same bars under `config`.
///
/// Rows are numbered as if they followed a header on line 1.
pub fn to_raw_rows(bars: &[Bar], config: &NormalizerConfig) -> Result<Vec<RawRow>, ExportError> {
    bars.iter()
        .enumerate()
        .map(|(ix, bar)| -> Result<RawRow, ExportError> {
            Ok(RawRow::new(ix + 2)
                .with(Column::Timestamp.name(), format_time(bar.time, config)?)
                .with(Column::Open.name(), bar.open.to_string())
                .with(Column::High.name(), bar.high.to_string())
                .with(Column::Low.name(), bar.low.to_string())
                .with(Column::Close.name(), bar.close.to_string())
                .with(Column::Volume.name(), bar.volume.to_string()))
        })
        .collect()
}

pub fn write_csv(bars: &[Bar], config: &NormalizerConfig) -> Result<String, ExportError> {
    let mut buffer = Vec::new();

    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer.write_record(Column::REQUIRED.map(Column::name))?;

        for bar in bars {
            writer.write_record([
                format_time(bar.time, config)?,
                bar.open.to_string(),
                bar.high.to_string(),
                bar.low.to_string(),
                bar.close.to_string(),
                bar.volume.to_string(),
            ])?;
        }

        writer.flush().map_err(csv::Error::from)?;
    }

    Ok(String::from_utf8(buffer)?)
}

fn format_time(time: i64, config: &NormalizerConfig) -> Result<String, ExportError> {
    let utc = DateTime::from_timestamp(time, 0).ok_or(ExportError::TimeOutOfRange(time))?;

    Ok(utc
        .with_timezone(&config.offset())
        .format(config.timestamp_format())
        .to_string())
}
