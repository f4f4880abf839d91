//! Ordered best-effort literal parsing.
//!
//! A literal is tried against an explicit list of [`ParseAttempt`]s; the first
//! success wins and a literal matching none of them becomes [`Value::Raw`].

use chrono::NaiveDate;

use crate::config::DateFormats;
use crate::core::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseAttempt {
    /// Integer syntax only, e.g. `"42"`.
    Integer,
    /// Any finite float, e.g. `"1234.5"`.
    Float,
    /// Month pattern, `MM/YYYY` by default.
    Month,
    /// Standalone year, `YYYY` by default.
    Year,
    /// Full date; everything from the first `+` on is dropped first.
    FullDate,
}

/// Companion of a `revPerMonth` fact.
pub const REVISION_COUNT: &[ParseAttempt] = &[ParseAttempt::Integer, ParseAttempt::Month];
/// Companion of an `averageSizePerMonth` fact.
pub const AVERAGE_SIZE: &[ParseAttempt] = &[ParseAttempt::Float, ParseAttempt::Month];
/// Birth, death and office dates; bare years are accepted too.
pub const FULL_DATE: &[ParseAttempt] = &[ParseAttempt::FullDate, ParseAttempt::Year];
/// Contributor counts.
pub const INTEGER: &[ParseAttempt] = &[ParseAttempt::Integer];

#[derive(Debug, Clone)]
pub struct ValueParser {
    formats: DateFormats,
}

impl ValueParser {
    pub fn new(formats: DateFormats) -> Self {
        Self { formats }
    }

    pub fn parse(&self, raw: &str, attempts: &[ParseAttempt]) -> Value {
        attempts
            .iter()
            .find_map(|attempt| self.try_parse(raw, *attempt))
            .unwrap_or_else(|| Value::Raw(raw.to_string()))
    }

    fn try_parse(&self, raw: &str, attempt: ParseAttempt) -> Option<Value> {
        let trimmed = raw.trim();
        match attempt {
            ParseAttempt::Integer => trimmed.parse::<i64>().ok().map(|n| Value::Number(n as f64)),
            ParseAttempt::Float => {
                trimmed.parse::<f64>().ok().filter(|n| n.is_finite()).map(Value::Number)
            }
            ParseAttempt::Month => parse_partial(trimmed, &self.formats.month).map(Value::Date),
            ParseAttempt::Year => parse_partial(trimmed, &self.formats.year).map(Value::Date),
            ParseAttempt::FullDate => {
                let head = trimmed.split('+').next().unwrap_or(trimmed);
                self.formats
                    .full
                    .iter()
                    .find_map(|fmt| parse_partial(head, fmt))
                    .map(Value::Date)
            }
        }
    }
}

impl Default for ValueParser {
    fn default() -> Self {
        Self::new(DateFormats::default())
    }
}

/// Parses a date from a pattern that may omit the day or the month; missing
/// fields default to 1.
fn parse_partial(raw: &str, fmt: &str) -> Option<NaiveDate> {
    let mut input = String::new();
    let mut pattern = String::new();
    if !(fmt.contains("%m") || fmt.contains("%b") || fmt.contains("%B")) {
        input.push_str("01 ");
        pattern.push_str("%m ");
    }
    if !(fmt.contains("%d") || fmt.contains("%e")) {
        input.push_str("01 ");
        pattern.push_str("%d ");
    }
    input.push_str(raw);
    pattern.push_str(fmt);
    NaiveDate::parse_from_str(&input, &pattern).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_revision_companion_prefers_integer() {
        let parser = ValueParser::default();
        assert_eq!(parser.parse("17", REVISION_COUNT), Value::Number(17.0));
        assert_eq!(parser.parse("03/2011", REVISION_COUNT), Value::Date(date(2011, 3, 1)));
    }

    #[test]
    fn test_integer_attempt_rejects_decimals() {
        let parser = ValueParser::default();
        assert_eq!(parser.parse("3.5", REVISION_COUNT), Value::Raw("3.5".to_string()));
        assert_eq!(parser.parse("3.5", AVERAGE_SIZE), Value::Number(3.5));
    }

    #[test]
    fn test_year_only() {
        let parser = ValueParser::default();
        assert_eq!(parser.parse("1947", &[ParseAttempt::Year]), Value::Date(date(1947, 1, 1)));
    }

    #[test]
    fn test_full_date_drops_offset() {
        let parser = ValueParser::default();
        assert_eq!(
            parser.parse("1947-10-26T00:00:00+02:00", FULL_DATE),
            Value::Date(date(1947, 10, 26))
        );
        assert_eq!(parser.parse("1947-10-26", FULL_DATE), Value::Date(date(1947, 10, 26)));
    }

    #[test]
    fn test_unparseable_stays_raw() {
        let parser = ValueParser::default();
        assert_eq!(parser.parse("vers 1950", FULL_DATE), Value::Raw("vers 1950".to_string()));
        assert_eq!(parser.parse("NaN", AVERAGE_SIZE), Value::Raw("NaN".to_string()));
    }
}
