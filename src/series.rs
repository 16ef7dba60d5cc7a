//! Chart-ready series derived from normalized bars.
//!
//! The shapes match what a candlestick series and a histogram series expect:
//! `{time, open, high, low, close}` and `{time, value}`.

use serde::{Deserialize, Serialize};

use crate::{
    indicators::{alma, closes, rsi},
    model::{Bar, Price},
};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandlePoint {
    pub time: i64,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumePoint {
    pub time: i64,
    pub value: u64,
}

/// One point of an indicator line.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub time: i64,
    pub value: Price,
}

impl From<&Bar> for CandlePoint {
    fn from(bar: &Bar) -> Self {
        Self {
            time: bar.time,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
        }
    }
}

impl From<&Bar> for VolumePoint {
    fn from(bar: &Bar) -> Self {
        Self {
            time: bar.time,
            value: bar.volume,
        }
    }
}

pub fn candle_series(bars: &[Bar]) -> Vec<CandlePoint> {
    bars.iter().map(CandlePoint::from).collect()
}

pub fn volume_series(bars: &[Bar]) -> Vec<VolumePoint> {
    bars.iter().map(VolumePoint::from).collect()
}

/// Pairs indicator values with bar times, leaving out warm-up gaps.
pub fn line_series(bars: &[Bar], values: &[Option<Price>]) -> Vec<LinePoint> {
    bars.iter()
        .zip(values)
        .filter_map(|(bar, value)| value.map(|value| LinePoint { time: bar.time, value }))
        .collect()
}

/// Payload for one candlestick chart with a volume pane.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub candles: Vec<CandlePoint>,
    pub volume: Vec<VolumePoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rsi: Vec<LinePoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alma: Vec<LinePoint>,
}

impl ChartData {
    pub fn from_bars(bars: &[Bar]) -> Self {
        Self {
            candles: candle_series(bars),
            volume: volume_series(bars),
            ..Default::default()
        }
    }

    pub fn with_rsi(mut self, bars: &[Bar], interval: usize) -> Self {
        self.rsi = line_series(bars, &rsi(bars, interval));
        self
    }

    pub fn with_alma(mut self, bars: &[Bar], window: usize, offset: f64, sigma: f64) -> Self {
        self.alma = line_series(bars, &alma(&closes(bars), window, offset, sigma));
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{line_series, volume_series, ChartData, LinePoint, VolumePoint};
    use crate::model::Bar;

    fn bars() -> Vec<Bar> {
        vec![
            Bar {
                time: 1704187800,
                open: 100.5,
                high: 101.0,
                low: 100.0,
                close: 100.8,
                volume: 12345,
            },
            Bar {
                time: 1704188100,
                open: 100.8,
                high: 101.5,
                low: 100.5,
                close: 101.2,
                volume: 900,
            },
        ]
    }

    #[test]
    fn unittest_volume_series() {
        assert_eq!(
            volume_series(&bars()),
            vec![
                VolumePoint {
                    time: 1704187800,
                    value: 12345,
                },
                VolumePoint {
                    time: 1704188100,
                    value: 900,
                },
            ]
        );
    }

    #[test]
    fn unittest_chart_json_shape() -> eyre::Result<()> {
        let data = ChartData::from_bars(&bars()[..1]);
        let value = serde_json::to_value(&data)?;
        assert!(data.to_json()?.starts_with("{\"candles\":[{\"time\":1704187800,"));

        assert_eq!(
            value,
            json!({
                "candles": [
                    {"time": 1704187800, "open": 100.5, "high": 101.0, "low": 100.0, "close": 100.8}
                ],
                "volume": [{"time": 1704187800, "value": 12345}]
            })
        );

        Ok(())
    }

    #[test]
    fn unittest_line_series_skips_warm_up() {
        let points = line_series(&bars(), &[None, Some(55.0)]);

        assert_eq!(
            points,
            vec![LinePoint {
                time: 1704188100,
                value: 55.0,
            }]
        );
    }

    #[test]
    fn unittest_chart_with_indicators() -> eyre::Result<()> {
        let bars = bars();
        let data = ChartData::from_bars(&bars)
            .with_rsi(&bars, 1)
            .with_alma(&bars, 1, 0.85, 6.0);

        // one up move: no losses
        assert_eq!(data.rsi, vec![LinePoint { time: 1704188100, value: 100.0 }]);
        assert_eq!(data.alma.len(), 2);
        assert_eq!(data.alma[1].value, 101.2);

        let value = serde_json::to_value(&data)?;
        assert!(value.get("rsi").is_some());
        assert!(value.get("alma").is_some());

        Ok(())
    }

    #[test]
    fn unittest_empty_chart() {
        let data = ChartData::from_bars(&[]);

        assert!(data.candles.is_empty());
        assert!(data.volume.is_empty());
    }
}
