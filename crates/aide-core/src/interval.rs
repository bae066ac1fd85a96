//! Interval strings ("30 minutes", "2h", "שעתיים") parsed into durations.
//!
//! Months and years are approximated as 30 and 365 days.

use crate::error::ValidationError;
use chrono::Duration;

/// Default nudge interval when a recurrence does not name one.
pub const DEFAULT_NUDGE_INTERVAL: &str = "10 minutes";

/// Default one-time reminder offset applied when only a due date is given.
pub const DEFAULT_REMINDER_OFFSET: &str = "30 minutes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Unit {
    fn seconds(self) -> f64 {
        match self {
            Self::Second => 1.0,
            Self::Minute => 60.0,
            Self::Hour => 3_600.0,
            Self::Day => 86_400.0,
            Self::Week => 7.0 * 86_400.0,
            Self::Month => 30.0 * 86_400.0,
            Self::Year => 365.0 * 86_400.0,
        }
    }
}

/// Map a unit word to its unit and the amount it implies on its own
/// (Hebrew dual forms like "שעתיים" mean two hours).
fn unit_word(word: &str) -> Option<(Unit, f64)> {
    let unit = match word {
        "s" | "sec" | "secs" | "second" | "seconds" | "שניה" | "שנייה" | "שניות" => {
            (Unit::Second, 1.0)
        }
        "m" | "min" | "mins" | "minute" | "minutes" | "דקה" | "דקות" => (Unit::Minute, 1.0),
        "h" | "hr" | "hrs" | "hour" | "hours" | "שעה" | "שעות" => (Unit::Hour, 1.0),
        "שעתיים" => (Unit::Hour, 2.0),
        "d" | "day" | "days" | "יום" | "ימים" => (Unit::Day, 1.0),
        "יומיים" => (Unit::Day, 2.0),
        "w" | "week" | "weeks" | "שבוע" | "שבועות" => (Unit::Week, 1.0),
        "שבועיים" => (Unit::Week, 2.0),
        "mon" | "month" | "months" | "חודש" | "חודשים" => (Unit::Month, 1.0),
        "חודשיים" => (Unit::Month, 2.0),
        "y" | "yr" | "yrs" | "year" | "years" | "שנה" | "שנים" => (Unit::Year, 1.0),
        "שנתיים" => (Unit::Year, 2.0),
        _ => return None,
    };
    Some(unit)
}

enum Parsed {
    /// A lone number with no unit.
    Bare(f64),
    Terms(Vec<(f64, Unit)>),
}

fn parse(raw: &str) -> Result<Parsed, ValidationError> {
    let invalid = || ValidationError::InvalidInterval(raw.to_string());
    let lowered = raw.trim().to_lowercase().replace(',', " ");
    if lowered.is_empty() {
        return Err(invalid());
    }
    if let Ok(n) = lowered.parse::<f64>() {
        return Ok(Parsed::Bare(n));
    }

    let mut terms = Vec::new();
    let mut pending: Option<f64> = None;

    for token in lowered.split_whitespace() {
        match token {
            "and" | "ו" => continue,
            "a" | "an" | "one" => {
                pending.get_or_insert(1.0);
                continue;
            }
            "half" | "חצי" => {
                pending = Some(pending.unwrap_or(1.0) * 0.5);
                continue;
            }
            _ => {}
        }

        if let Ok(n) = token.parse::<f64>() {
            if pending.is_some() {
                return Err(invalid());
            }
            pending = Some(n);
            continue;
        }

        if let Some((unit, implied)) = unit_word(token) {
            terms.push((pending.take().unwrap_or(1.0) * implied, unit));
            continue;
        }

        // Compact forms: "30m", "1h30m".
        if pending.is_some() {
            return Err(invalid());
        }
        terms.extend(parse_compact(token).ok_or_else(invalid)?);
    }

    if pending.is_some() || terms.is_empty() {
        return Err(invalid());
    }
    if terms.iter().any(|(n, _)| !n.is_finite() || *n < 0.0) {
        return Err(invalid());
    }
    Ok(Parsed::Terms(terms))
}

fn parse_compact(token: &str) -> Option<Vec<(f64, Unit)>> {
    let mut out = Vec::new();
    let mut rest = token;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if digits == 0 {
            return None;
        }
        let amount: f64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];
        let letters = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let (unit, implied) = unit_word(&rest[..letters])?;
        out.push((amount * implied, unit));
        rest = &rest[letters..];
    }
    Some(out)
}

/// Seconds to a duration, rejecting values outside `Duration`'s range.
fn seconds_to_duration(secs: f64, raw: &str) -> Result<Duration, ValidationError> {
    let invalid = || ValidationError::InvalidInterval(raw.to_string());
    if !secs.is_finite() || secs < 0.0 || secs >= i64::MAX as f64 {
        return Err(invalid());
    }
    Duration::try_seconds(secs.round() as i64).ok_or_else(invalid)
}

fn to_duration(terms: &[(f64, Unit)], raw: &str) -> Result<Duration, ValidationError> {
    let secs: f64 = terms.iter().map(|(n, u)| n * u.seconds()).sum();
    seconds_to_duration(secs, raw)
}

/// Parse a one-time reminder offset. A bare number is read as minutes.
pub fn parse_interval(raw: &str) -> Result<Duration, ValidationError> {
    match parse(raw)? {
        Parsed::Bare(n) => seconds_to_duration(n * 60.0, raw),
        Parsed::Terms(terms) => to_duration(&terms, raw),
    }
}

/// Parse a nudge interval: a bare number of minutes, or minutes/hours.
/// Anything shorter than one minute is rejected.
pub fn parse_nudge_interval(raw: &str) -> Result<Duration, ValidationError> {
    let duration = match parse(raw)? {
        Parsed::Bare(n) if n < 0.0 => return Err(ValidationError::IntervalTooShort(raw.to_string())),
        Parsed::Bare(n) => seconds_to_duration(n * 60.0, raw)?,
        Parsed::Terms(terms) => {
            if terms
                .iter()
                .any(|(_, u)| !matches!(u, Unit::Second | Unit::Minute | Unit::Hour))
            {
                return Err(ValidationError::InvalidInterval(raw.to_string()));
            }
            to_duration(&terms, raw)?
        }
    };
    if duration < Duration::minutes(1) {
        return Err(ValidationError::IntervalTooShort(raw.to_string()));
    }
    Ok(duration)
}
