use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Guesses per second assumed at [`CRACKS_EPOCH_UNIX`].
pub const BASE_CRACKS_PER_SECOND: f64 = 100_000_000_000_000.0;

/// 2016-01-01T00:00:00Z
const CRACKS_EPOCH_UNIX: i64 = 1_451_606_400;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SecurityLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombinationStats {
    pub crack_seconds: f64,
    pub level: SecurityLevel,
    pub entropy_bits: i32,
}

/// Illustrative attacker speed at `at`: the base rate doubled every two years
/// since 2016. Earlier dates use the base rate.
pub fn cracks_per_second(at: OffsetDateTime) -> f64 {
    let elapsed = at.unix_timestamp() - CRACKS_EPOCH_UNIX;
    if elapsed <= 0 {
        return BASE_CRACKS_PER_SECOND;
    }
    let years = elapsed as f64 / SECONDS_PER_DAY / 365.0;
    BASE_CRACKS_PER_SECOND * 2f64.powf(years / 2.0)
}

pub fn combination_stats_at(combinations: f64, at: OffsetDateTime) -> CombinationStats {
    let crack_seconds = combinations / cracks_per_second(at);
    let days = crack_seconds / SECONDS_PER_DAY;
    let level = if days > 365.0 {
        SecurityLevel::High
    } else if days > 1.0 {
        SecurityLevel::Medium
    } else {
        SecurityLevel::Low
    };
    CombinationStats { crack_seconds, level, entropy_bits: entropy_bits(combinations) }
}

pub fn combination_stats(combinations: f64) -> CombinationStats {
    combination_stats_at(combinations, OffsetDateTime::now_utc())
}

pub fn entropy_bits(combinations: f64) -> i32 {
    if combinations < 1.0 {
        return 0;
    }
    combinations.log2().floor() as i32
}

/// Human readable crack time, always rounded down to the largest whole unit.
pub fn crack_duration_text(seconds: f64) -> String {
    let seconds = seconds.floor();
    let minutes = (seconds / 60.0).floor();
    let hours = (minutes / 60.0).floor();
    let days = (hours / 24.0).floor();
    let years = (days / 365.0).floor();
    let centuries = (years / 100.0).floor();
    let millenniums = (years / 1000.0).floor();
    let million_years = (years / 1_000_000.0).floor();

    if million_years >= 1000.0 {
        return "eternity".to_string();
    }
    if million_years >= 1.0 {
        return format!("{} million years", group_thousands(million_years));
    }
    let (n, singular, plural) = if millenniums >= 1.0 {
        (millenniums, "millennium", "millenniums")
    } else if centuries >= 1.0 {
        (centuries, "century", "centuries")
    } else if years >= 1.0 {
        (years, "year", "years")
    } else if days >= 1.0 {
        (days, "day", "days")
    } else if hours >= 1.0 {
        (hours, "hour", "hours")
    } else if minutes >= 1.0 {
        (minutes, "minute", "minutes")
    } else {
        (seconds, "second", "seconds")
    };
    format!("{} {}", group_thousands(n), if n == 1.0 { singular } else { plural })
}

/// `NeX` with X a multiple of 3 and N rounded down, e.g. `3e27`.
pub fn engineering_string(number: f64) -> String {
    let mut number = number;
    let mut exponent = 0;
    while number > 1000.0 {
        exponent += 3;
        number /= 1000.0;
    }
    format!("{}e{exponent}", number.floor())
}

fn group_thousands(n: f64) -> String {
    let digits = (n.max(0.0) as u64).to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
