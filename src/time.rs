//! UTCTime and GeneralizedTime decoding.
//!
//! Both types decode to seconds since the Unix epoch. Only the canonical
//! DER shapes are accepted: `YYMMDDHHMM[SS]Z` for UTCTime and
//! `YYYYMMDDHHMMSSZ` for GeneralizedTime. Timezone offsets and fractional
//! seconds are rejected, and like Unix time itself the conversion ignores
//! leap seconds.

use nom::{IResult, Parser as _, bytes::complete::take};

use crate::{Error, Token, UniversalTag, map_nom_error};

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_MINUTE: i64 = 60;
// 365 days; leap days are counted separately
const SECONDS_PER_YEAR: i64 = 31_536_000;

// Jan..Dec, February before leap correction
const DAYS_PER_MONTH: [i64; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Seconds since 1970-01-01T00:00:00Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnixTime(pub i64);

impl UnixTime {
    pub const fn as_secs(self) -> i64 {
        self.0
    }

    /// Convert to a chrono timestamp.
    #[cfg(feature = "chrono-conversions")]
    pub fn to_chrono(self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp(self.0, 0)
    }
}

impl From<UnixTime> for i64 {
    fn from(time: UnixTime) -> i64 {
        time.0
    }
}

struct Fields {
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
}

/// Two ASCII digits as a number.
fn pair(input: &[u8]) -> IResult<&[u8], i64, Error> {
    let (input, digits) = take(2usize).parse(input)?;
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(nom::Err::Failure(Error::Invalid));
    }
    Ok((input, i64::from(digits[0] - b'0') * 10 + i64::from(digits[1] - b'0')))
}

fn is_leap(year: i64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn to_epoch(fields: Fields) -> Result<UnixTime, Error> {
    let Fields { year, month, day, hour, minute, second } = fields;

    if !(1..=12).contains(&month) {
        return Err(Error::Invalid);
    }

    let leap = is_leap(year);
    let day_cap = if leap && month == 2 { 29 } else { DAYS_PER_MONTH[(month - 1) as usize] };
    if !(1..=day_cap).contains(&day) {
        return Err(Error::Invalid);
    }
    if hour > 23 || minute > 59 || second > 59 {
        return Err(Error::Invalid);
    }

    // Leap days since the epoch; one less if this year's leap day is
    // still ahead
    let mut leap_days = (year - 1968) / 4 - (year - 1900) / 100 + (year - 1600) / 400;
    if leap && month < 3 {
        leap_days -= 1;
    }

    let mut seconds = (year - 1970) * SECONDS_PER_YEAR;
    for days in &DAYS_PER_MONTH[..(month - 1) as usize] {
        seconds += days * SECONDS_PER_DAY;
    }
    seconds += (day - 1) * SECONDS_PER_DAY;
    seconds += hour * SECONDS_PER_HOUR;
    seconds += minute * SECONDS_PER_MINUTE;
    seconds += second;
    seconds += leap_days * SECONDS_PER_DAY;

    Ok(UnixTime(seconds))
}

/// `YYMMDDHHMM[SS]Z` with the X.509 century rule.
fn decode_utc(value: &[u8]) -> Result<UnixTime, Error> {
    if value.len() != 11 && value.len() != 13 {
        return Err(Error::Invalid);
    }

    let (rest, (year, month, day, hour, minute)) =
        map_nom_error((pair, pair, pair, pair, pair).parse(value))?;
    let (rest, second) = if rest.len() == 3 { map_nom_error(pair(rest))? } else { (rest, 0) };
    if rest != b"Z" {
        return Err(Error::Invalid);
    }

    // 50..=99 are 19xx, 00..=49 are 20xx (RFC 5280 4.1.2.5.1)
    let year = if year > 49 { 1900 + year } else { 2000 + year };

    to_epoch(Fields { year, month, day, hour, minute, second })
}

/// `YYYYMMDDHHMMSSZ`: seconds mandatory, no fractions, no offsets.
fn decode_generalized(value: &[u8]) -> Result<UnixTime, Error> {
    if value.len() != 15 {
        return Err(Error::Invalid);
    }

    let (rest, (century, year, month, day, hour, minute, second)) =
        map_nom_error((pair, pair, pair, pair, pair, pair, pair).parse(value))?;
    if rest != b"Z" {
        return Err(Error::Invalid);
    }

    let year = century * 100 + year;
    if year < 1950 {
        return Err(Error::Invalid);
    }

    to_epoch(Fields { year, month, day, hour, minute, second })
}

impl<'a> Token<'a> {
    /// Decode a UTCTime or GeneralizedTime token to Unix seconds.
    pub fn time(&self) -> Result<UnixTime, Error> {
        if self.is_universal(UniversalTag::UtcTime) {
            decode_utc(self.value())
        } else if self.is_universal(UniversalTag::GeneralizedTime) {
            decode_generalized(self.value())
        } else {
            Err(Error::Invalid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Class;

    fn time_token(tag: UniversalTag, value: &[u8]) -> Token<'_> {
        Token { class: Class::Universal, tag: tag as u32, primitive: true, value, end: value.len() }
    }

    fn utc(value: &[u8]) -> Result<i64, Error> {
        time_token(UniversalTag::UtcTime, value).time().map(UnixTime::as_secs)
    }

    fn generalized(value: &[u8]) -> Result<i64, Error> {
        time_token(UniversalTag::GeneralizedTime, value).time().map(UnixTime::as_secs)
    }

    #[test]
    fn test_utc_with_seconds() {
        assert_eq!(utc(b"910506234540Z"), Ok(673_573_540));
    }

    #[test]
    fn test_utc_without_seconds() {
        assert_eq!(utc(b"9105062345Z"), Ok(673_573_500));
    }

    #[test]
    fn test_century_rule() {
        // 99 -> 1999-12-31T23:59:00, 00 -> 2000-01-01T00:00:00
        assert_eq!(utc(b"9912312359Z"), Ok(946_684_740));
        assert_eq!(utc(b"0001010000Z"), Ok(946_684_800));
        // 49 maps forward, 50 maps back
        assert_eq!(utc(b"490101000000Z"), Ok(2_493_072_000));
        assert!(utc(b"500101000000Z").unwrap() < 0);
    }

    #[test]
    fn test_leap_year_rules() {
        // 2000 is a leap year (divisible by 400)
        assert!(utc(b"000229120000Z").is_ok());
        // 2001 is not
        assert_eq!(utc(b"010229120000Z"), Err(Error::Invalid));
        // 2004 is (divisible by 4)
        assert!(utc(b"040229120000Z").is_ok());
        // 2100 is not (divisible by 100 but not 400)
        assert_eq!(generalized(b"21000229120000Z"), Err(Error::Invalid));
    }

    #[test]
    fn test_leap_day_offset() {
        // Feb 29 and Mar 1 of a leap year are one day apart
        let feb29 = utc(b"200229000000Z").unwrap();
        let mar01 = utc(b"200301000000Z").unwrap();
        assert_eq!(mar01 - feb29, 86_400);
    }

    #[test]
    fn test_calendar_ranges() {
        assert_eq!(utc(b"910013234540Z"), Err(Error::Invalid)); // month 0
        assert_eq!(utc(b"911331234540Z"), Err(Error::Invalid)); // month 13
        assert_eq!(utc(b"910500234540Z"), Err(Error::Invalid)); // day 0
        assert_eq!(utc(b"910532234540Z"), Err(Error::Invalid)); // day 32
        assert_eq!(utc(b"910431234540Z"), Err(Error::Invalid)); // Apr 31
        assert_eq!(utc(b"910506244540Z"), Err(Error::Invalid)); // hour 24
        assert_eq!(utc(b"910506236040Z"), Err(Error::Invalid)); // minute 60
        assert_eq!(utc(b"910506234560Z"), Err(Error::Invalid)); // second 60
    }

    #[test]
    fn test_terminator_required() {
        assert_eq!(utc(b"910506234540+"), Err(Error::Invalid));
        // Timezone offsets are not supported
        assert_eq!(utc(b"910506234540+0100"), Err(Error::Invalid));
        assert_eq!(utc(b"9105062345Z0"), Err(Error::Invalid));
    }

    #[test]
    fn test_length_must_be_exact() {
        assert_eq!(utc(b"910506234Z"), Err(Error::Invalid));
        assert_eq!(utc(b"91050623454Z"), Err(Error::Invalid));
        assert_eq!(utc(b""), Err(Error::Invalid));
    }

    #[test]
    fn test_digits_required() {
        assert_eq!(utc(b"91O506234540Z"), Err(Error::Invalid));
        assert_eq!(utc(b"91 506234540Z"), Err(Error::Invalid));
    }

    #[test]
    fn test_generalized_time() {
        assert_eq!(generalized(b"20500310123456Z"), Ok(2_530_528_496));
        // Same instant through both encodings
        assert_eq!(generalized(b"19910506234540Z"), utc(b"910506234540Z"));
    }

    #[test]
    fn test_generalized_time_strict_shape() {
        // Seconds are mandatory
        assert_eq!(generalized(b"195003101234Z"), Err(Error::Invalid));
        // No fractional seconds
        assert_eq!(generalized(b"19500310123456.5Z"), Err(Error::Invalid));
        // No offsets
        assert_eq!(generalized(b"19500310123456+0100"), Err(Error::Invalid));
        // Pre-1950 is outside the supported range
        assert_eq!(generalized(b"19491231235959Z"), Err(Error::Invalid));
    }

    #[test]
    fn test_calendar_order_is_preserved() {
        let times = [
            utc(b"500101000000Z").unwrap(),
            utc(b"910506234540Z").unwrap(),
            utc(b"9912312359Z").unwrap(),
            utc(b"0001010000Z").unwrap(),
            utc(b"490101000000Z").unwrap(),
            generalized(b"20500310123456Z").unwrap(),
        ];
        assert!(times.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_wrong_tag_rejected() {
        let token = time_token(UniversalTag::Ia5String, b"910506234540Z");
        assert_eq!(token.time(), Err(Error::Invalid));
    }

    #[test]
    #[cfg(feature = "chrono-conversions")]
    fn test_to_chrono() {
        use chrono::{Datelike, Timelike};

        let time = time_token(UniversalTag::UtcTime, b"910506234540Z").time().unwrap();
        let stamp = time.to_chrono().unwrap();
        assert_eq!(
            (stamp.year(), stamp.month(), stamp.day()),
            (1991, 5, 6)
        );
        assert_eq!((stamp.hour(), stamp.minute(), stamp.second()), (23, 45, 40));
    }
}
