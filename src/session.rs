use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Timelike};
use itertools::Itertools;

use crate::model::{Bar, Price};

/// Bars in the first 15 minutes of a 5 minute session.
pub const OPENING_RANGE_BARS: usize = 3;

/// Local time-of-day window, both ends inclusive, in minutes since midnight.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionHours {
    open: u32,
    last_bar: u32,
}

impl Default for SessionHours {
    /// US equities regular session, 09:30 to the 15:55 bar.
    fn default() -> Self {
        Self {
            open: 9 * 60 + 30,
            last_bar: 15 * 60 + 55,
        }
    }
}

impl SessionHours {
    pub fn new(open: NaiveTime, last_bar: NaiveTime) -> Self {
        Self {
            open: minute_of_day(open),
            last_bar: minute_of_day(last_bar),
        }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        (self.open..=self.last_bar).contains(&minute_of_day(time))
    }
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

fn local(bar: &Bar, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::from_timestamp(bar.time, 0).map(|utc| utc.with_timezone(&offset))
}

pub fn regular_hours(bars: &[Bar], hours: SessionHours, offset: FixedOffset) -> Vec<Bar> {
    bars.iter()
        .filter(|bar| local(bar, offset).is_some_and(|t| hours.contains(t.time())))
        .copied()
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradingDay {
    pub date: NaiveDate,
    pub bars: Vec<Bar>,
}

/// Groups an ascending bar sequence by local calendar date.
pub fn trading_days(bars: &[Bar], offset: FixedOffset) -> Vec<TradingDay> {
    let dated = bars
        .iter()
        .filter_map(|bar| local(bar, offset).map(|t| (t.date_naive(), *bar)));

    dated
        .group_by(|(date, _)| *date)
        .into_iter()
        .map(|(date, group)| TradingDay {
            date,
            bars: group.map(|(_, bar)| bar).collect(),
        })
        .collect()
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OpeningRange {
    pub high: Price,
    pub low: Price,
    pub mid: Price,
}

/// Highest high and lowest low of the first `n` bars of a day.
pub fn opening_range(day: &[Bar], n: usize) -> Option<OpeningRange> {
    let opening = &day[..n.min(day.len())];
    if opening.is_empty() {
        return None;
    }

    let high = opening.iter().map(|b| b.high).fold(Price::MIN, Price::max);
    let low = opening.iter().map(|b| b.low).fold(Price::MAX, Price::min);

    Some(OpeningRange {
        high,
        low,
        mid: (high + low) / 2.0,
    })
}
