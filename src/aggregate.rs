// Aggregation primitives shared by every view.
use crate::types::{Advice, CategoryCount, Granularity, SeriesPoint, Trend};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap};

/// Count occurrences of each value, most frequent first. Ties keep the order
/// in which values first appear.
pub fn distribution<'a, I>(values: I) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        let count = counts.entry(v).or_insert(0);
        if *count == 0 {
            order.push(v);
        }
        *count += 1;
    }
    let mut out: Vec<CategoryCount> = order
        .into_iter()
        .map(|v| CategoryCount {
            category: v.to_string(),
            count: counts[v],
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

/// Bucket for answers that hold nothing but separators.
pub const OTHER: &str = "Other";

/// Distribution over the individual options of comma-joined answers. Every
/// answer contributes at least one option.
pub fn multi_select_distribution<'a, I>(values: I) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = &'a str>,
{
    distribution(values.into_iter().flat_map(|v| {
        let options: Vec<&str> = v.split(',').map(str::trim).filter(|t| !t.is_empty()).collect();
        if options.is_empty() {
            vec![OTHER]
        } else {
            options
        }
    }))
}

/// Sum with gaps contributing zero.
pub fn total(values: &[Option<f64>]) -> f64 {
    values.iter().flatten().sum()
}

/// `returning / (returning + new) * 100`, or 0 when nobody came in.
pub fn retention_rate(returning: f64, new: f64) -> f64 {
    let denom = returning + new;
    if denom <= 0.0 {
        return 0.0;
    }
    (returning / denom * 100.0).clamp(0.0, 100.0)
}

/// Percentage change from `previous` to `current`, 0 when there is no base.
pub fn growth_rate(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

pub fn bucket_start(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => date,
        Granularity::Week => {
            let back = u64::from(date.weekday().num_days_from_monday());
            date.checked_sub_days(Days::new(back)).unwrap_or(date)
        }
        Granularity::Month => date.with_day(1).unwrap_or(date),
    }
}

pub fn bucket_label(start: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day => start.format("%Y-%m-%d").to_string(),
        Granularity::Week => {
            let week = start.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
        Granularity::Month => start.format("%Y-%m").to_string(),
    }
}

/// Sum `values` per time bucket, ordered by bucket start. Rows without a
/// timestamp cannot be placed and are left out.
pub fn time_series(
    timestamps: &[Option<NaiveDateTime>],
    values: &[Option<f64>],
    granularity: Granularity,
) -> Vec<SeriesPoint> {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (ts, v) in timestamps.iter().zip(values) {
        let Some(ts) = ts else { continue };
        let start = bucket_start(ts.date(), granularity);
        *buckets.entry(start).or_insert(0.0) += v.unwrap_or(0.0);
    }
    buckets
        .into_iter()
        .map(|(start, value)| SeriesPoint {
            bucket: bucket_label(start, granularity),
            start,
            value,
        })
        .collect()
}

/// Totals for the ISO week containing `as_of` and the week before it.
pub fn week_over_week(
    timestamps: &[Option<NaiveDateTime>],
    values: &[Option<f64>],
    as_of: NaiveDate,
) -> (f64, f64) {
    let current = bucket_start(as_of, Granularity::Week);
    let previous = current.checked_sub_days(Days::new(7)).unwrap_or(current);
    let (mut cur, mut prev) = (0.0, 0.0);
    for (ts, v) in timestamps.iter().zip(values) {
        let Some(ts) = ts else { continue };
        let week = bucket_start(ts.date(), Granularity::Week);
        if week == current {
            cur += v.unwrap_or(0.0);
        } else if week == previous {
            prev += v.unwrap_or(0.0);
        }
    }
    (cur, prev)
}

pub fn trend(current: f64, previous: f64) -> Trend {
    if current > previous {
        Trend::Improved
    } else if current < previous {
        Trend::Declined
    } else {
        Trend::FlatOrEqual
    }
}

/// Declines get the recommendation text; anything else is affirmed.
pub fn advise(trend: Trend, recommendation: &str, affirmation: &str) -> Advice {
    match trend {
        Trend::Declined => Advice::Recommendation(recommendation.to_string()),
        Trend::Improved | Trend::FlatOrEqual => Advice::Affirmation(affirmation.to_string()),
    }
}
