//! Thread momentum (勢い): replies per day since creation

use chrono::{DateTime, Utc};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Replies per day, rounded to one decimal place.
///
/// Threads younger than a day are measured against a full day, so a
/// fresh thread never shows inflated momentum.
pub fn momentum(created_at: DateTime<Utc>, res_count: i64, now: DateTime<Utc>) -> f64 {
    let elapsed = (now - created_at).num_milliseconds() as f64 / 1000.0;
    let days = (elapsed / SECONDS_PER_DAY).max(1.0);
    ((res_count as f64 / days) * 10.0).round() / 10.0
}
