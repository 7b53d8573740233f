// 📊 Aggregation Primitives
//
// Reusable shapes every report is built from:
// - grouped count / sum / avg (SQL GROUP BY returning `key, metric`)
// - ranking, top-N and max-tie sets
// - percentage-of-total
// - date windows relative to "today"
// - the anti-join that defines claimable inventory

use chrono::{Days, NaiveDate};
use rusqlite::types::FromSql;
use rusqlite::{Connection, Params};
use serde::Serialize;
use std::cmp::Ordering;

/// Listings with no active claim. Expects the listing table aliased as `f`.
pub(crate) const NO_ACTIVE_CLAIM: &str = "NOT EXISTS (
    SELECT 1 FROM claims c
    WHERE c.food_id = f.id AND c.status IN ('Pending', 'Completed')
)";

/// One group of a grouped aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grouped<M> {
    pub key: String,
    pub metric: M,
}

impl<M> Grouped<M> {
    pub fn new(key: impl Into<String>, metric: M) -> Self {
        Grouped {
            key: key.into(),
            metric,
        }
    }
}

/// Run a grouped aggregate query. The query must select exactly the grouping
/// key followed by the metric.
pub fn grouped_query<M, P>(conn: &Connection, sql: &str, params: P) -> rusqlite::Result<Vec<Grouped<M>>>
where
    M: FromSql,
    P: Params,
{
    let mut stmt = conn.prepare(sql)?;

    let groups = stmt
        .query_map(params, |row| {
            Ok(Grouped {
                key: row.get(0)?,
                metric: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(groups)
}

/// Sort by metric descending; equal metrics fall back to key ascending
pub fn rank_descending<M: PartialOrd>(groups: &mut [Grouped<M>]) {
    groups.sort_by(|a, b| {
        b.metric
            .partial_cmp(&a.metric)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
}

/// Sort by key ascending
pub fn sort_by_key<M>(groups: &mut [Grouped<M>]) {
    groups.sort_by(|a, b| a.key.cmp(&b.key));
}

/// The `n` highest groups. Ties at the cut-off are truncated, not expanded.
pub fn top_n<M: PartialOrd>(mut groups: Vec<Grouped<M>>, n: usize) -> Vec<Grouped<M>> {
    rank_descending(&mut groups);
    groups.truncate(n);
    groups
}

/// The single highest group, if any
pub fn top_one<M: PartialOrd>(groups: Vec<Grouped<M>>) -> Option<Grouped<M>> {
    top_n(groups, 1).into_iter().next()
}

/// Every group whose metric equals the maximum, ordered by key
pub fn max_ties<M: PartialOrd + Copy>(mut groups: Vec<Grouped<M>>) -> Vec<Grouped<M>> {
    let max = groups.iter().map(|g| g.metric).fold(None, |acc: Option<M>, m| match acc {
        Some(best) if best >= m => Some(best),
        _ => Some(m),
    });

    let Some(max) = max else {
        return groups;
    };

    groups.retain(|g| g.metric == max);
    sort_by_key(&mut groups);
    groups
}

/// `100 * part / total` rounded to two decimals, halves away from zero.
/// Computed in hundredths of a percent so exact decimal halves round up.
pub fn percent_of(part: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let (part, total) = (i128::from(part), i128::from(total));
    let doubled = 2 * part * 10_000;
    let hundredths = (doubled.abs() + total.abs()) / (2 * total.abs());
    let sign = if (part < 0) != (total < 0) { -1 } else { 1 };
    (sign * hundredths) as f64 / 100.0
}

/// Turn per-group counts into percentages of their sum
pub fn percentage_of_total(counts: &[Grouped<i64>]) -> Vec<Grouped<f64>> {
    let total: i64 = counts.iter().map(|g| g.metric).sum();
    if total == 0 {
        return Vec::new();
    }

    counts
        .iter()
        .map(|g| Grouped::new(g.key.clone(), percent_of(g.metric, total)))
        .collect()
}

/// Inclusive `[today, today + days]` window
pub fn date_window(today: NaiveDate, days: u64) -> (NaiveDate, NaiveDate) {
    let end = today.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX);
    (today, end)
}
