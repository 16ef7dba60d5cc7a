use std::collections::HashMap;

use itertools::Itertools;

use crate::model::Bar;

/// Times that occur more than once in an ascending sequence.
pub fn duplicate_times(bars: &[Bar]) -> Vec<i64> {
    bars.iter()
        .tuple_windows()
        .filter(|(prev, next)| prev.time == next.time)
        .map(|(_, next)| next.time)
        .dedup()
        .collect()
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GapReport {
    /// Most common spacing between consecutive bars, in seconds.
    pub interval: i64,
    pub gaps: usize,
    pub missing_bars: i64,
    /// Start time and length of the widest gap.
    pub largest_gap: Option<(i64, i64)>,
}

/// Finds holes in an ascending sequence, measured against its most common
/// interval. Needs at least two bars with distinct times.
pub fn analyze_gaps(bars: &[Bar]) -> Option<GapReport> {
    let diffs = bars
        .iter()
        .tuple_windows()
        .map(|(prev, next)| (prev.time, next.time - prev.time))
        .filter(|(_, diff)| *diff > 0)
        .collect_vec();

    let mut counts: HashMap<i64, usize> = HashMap::new();
    for (_, diff) in &diffs {
        *counts.entry(*diff).or_insert(0) += 1;
    }

    // ties go to the smaller interval
    let interval = counts
        .into_iter()
        .max_by_key(|(diff, count)| (*count, -diff))
        .map(|(diff, _)| diff)?;

    let mut report = GapReport {
        interval,
        gaps: 0,
        missing_bars: 0,
        largest_gap: None,
    };

    for (start, diff) in diffs.into_iter().filter(|(_, diff)| *diff > interval) {
        report.gaps += 1;
        report.missing_bars += diff / interval - 1;

        if report.largest_gap.map_or(true, |(_, widest)| diff > widest) {
            report.largest_gap = Some((start, diff));
        }
    }

    Some(report)
}

#[cfg(test)]
mod tests {
    use super::{analyze_gaps, duplicate_times, GapReport};
    use crate::model::Bar;

    fn at(times: &[i64]) -> Vec<Bar> {
        times
            .iter()
            .map(|&time| Bar {
                time,
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn unittest_duplicate_times() {
        assert_eq!(duplicate_times(&at(&[0, 300, 300, 300, 600, 900, 900])), vec![300, 900]);
        assert!(duplicate_times(&at(&[0, 300, 600])).is_empty());
    }

    #[test]
    fn unittest_analyze_gaps() {
        let report = analyze_gaps(&at(&[0, 300, 600, 1500, 1800, 3000])).unwrap();

        assert_eq!(
            report,
            GapReport {
                interval: 300,
                gaps: 2,
                missing_bars: 5,
                largest_gap: Some((1800, 1200)),
            }
        );
    }

    #[test]
    fn unittest_analyze_gaps_needs_two_distinct_times() {
        assert_eq!(analyze_gaps(&at(&[])), None);
        assert_eq!(analyze_gaps(&at(&[60])), None);
        assert_eq!(analyze_gaps(&at(&[60, 60])), None);
    }
}
