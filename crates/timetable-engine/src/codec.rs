//! Time-of-day and weekday encodings.
//!
//! Times travel as 12-hour clock strings (`"8:00 AM"`, `"12 PM"`) and are held
//! as minutes since midnight. Weekdays travel as the uppercase codes
//! `SUN`..`SAT` and map onto ordinals 0..=6.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{Duration, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::FormatError;

/// Number of minutes in a day; valid [`TimeOfDay`] values are `0..MINUTES_PER_DAY`.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A wall-clock time within a single day, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Midnight (`12:00 AM`).
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// Build from minutes since midnight.
    ///
    /// # Errors
    /// Returns [`FormatError::MinutesOutOfRange`] when `minutes >= 1440`.
    pub fn from_minutes(minutes: u16) -> Result<Self, FormatError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(FormatError::MinutesOutOfRange(minutes));
        }
        Ok(TimeOfDay(minutes))
    }

    /// Build from a 24-hour clock hour (0-23) and minute (0-59).
    pub fn from_hm(hour: u8, minute: u8) -> Result<Self, FormatError> {
        if hour > 23 {
            return Err(FormatError::HourOutOfRange(u32::from(hour)));
        }
        if minute > 59 {
            return Err(FormatError::MinuteOutOfRange(u32::from(minute)));
        }
        Ok(TimeOfDay(u16::from(hour) * 60 + u16::from(minute)))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Hour on the 24-hour clock.
    pub fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::default() + Duration::minutes(i64::from(self.0))
    }
}

impl From<NaiveTime> for TimeOfDay {
    /// Seconds are truncated.
    fn from(time: NaiveTime) -> Self {
        TimeOfDay((time.hour() * 60 + time.minute()) as u16)
    }
}

impl FromStr for TimeOfDay {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_time_of_day(s)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format_time_of_day(*self))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = FormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_time_of_day(&value)
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        format_time_of_day(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/// Split `"9:30 PM"` into (`"9:30"`, `Pm`). The marker is case-insensitive and
/// may be glued to the numeral (`"9PM"`).
fn split_meridiem(text: &str) -> Option<(&str, Meridiem)> {
    let split_at = text.len().checked_sub(2)?;
    let marker = text.get(split_at..)?;
    let meridiem = if marker.eq_ignore_ascii_case("am") {
        Meridiem::Am
    } else if marker.eq_ignore_ascii_case("pm") {
        Meridiem::Pm
    } else {
        return None;
    };
    let numeral = text[..split_at].trim_end();
    if numeral.is_empty() {
        return None;
    }
    Some((numeral, meridiem))
}

/// Decode a run of `widths` ASCII digits.
fn parse_digits(
    digits: &str,
    widths: RangeInclusive<usize>,
    original: &str,
) -> Result<u32, FormatError> {
    if !widths.contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FormatError::InvalidNumeral(original.to_string()));
    }
    digits
        .parse()
        .map_err(|_| FormatError::InvalidNumeral(original.to_string()))
}

/// Parse a 12-hour clock string (`"H:MM AM"`, `"H AM"`) into a [`TimeOfDay`].
///
/// `12 AM` is midnight, `12 PM` is noon, every other PM hour adds twelve.
///
/// # Errors
/// - [`FormatError::MissingMeridiem`] if no `AM`/`PM` marker follows a numeral
/// - [`FormatError::InvalidNumeral`] if the hour is not one or two digits or the
///   minute is not exactly two
/// - [`FormatError::HourOutOfRange`] for hours outside 1-12
/// - [`FormatError::MinuteOutOfRange`] for minutes outside 0-59
pub fn parse_time_of_day(text: &str) -> Result<TimeOfDay, FormatError> {
    let trimmed = text.trim();
    let (numeral, meridiem) =
        split_meridiem(trimmed).ok_or_else(|| FormatError::MissingMeridiem(text.to_string()))?;

    let (hour, minute) = match numeral.split_once(':') {
        Some((h, m)) => (parse_digits(h, 1..=2, text)?, parse_digits(m, 2..=2, text)?),
        None => (parse_digits(numeral, 1..=2, text)?, 0),
    };

    if !(1..=12).contains(&hour) {
        return Err(FormatError::HourOutOfRange(hour));
    }
    if minute > 59 {
        return Err(FormatError::MinuteOutOfRange(minute));
    }

    let hour24 = match (hour, meridiem) {
        (12, Meridiem::Am) => 0,
        (12, Meridiem::Pm) => 12,
        (h, Meridiem::Am) => h,
        (h, Meridiem::Pm) => h + 12,
    };

    Ok(TimeOfDay((hour24 * 60 + minute) as u16))
}

/// Render a [`TimeOfDay`] as `"H:MM AM"` / `"H:MM PM"` (no leading zero on the hour).
pub fn format_time_of_day(time: TimeOfDay) -> String {
    let hour24 = time.hour();
    let meridiem = if hour24 >= 12 { "PM" } else { "AM" };
    let hour12 = match hour24 {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    format!("{}:{:02} {}", hour12, time.minute(), meridiem)
}

/// Canonical weekday codes, ordered `SUN = 0` through `SAT = 6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Day {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Sun,
        Day::Mon,
        Day::Tue,
        Day::Wed,
        Day::Thu,
        Day::Fri,
        Day::Sat,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Day> {
        Day::ALL.get(usize::from(ordinal)).copied()
    }

    pub fn code(self) -> &'static str {
        match self {
            Day::Sun => "SUN",
            Day::Mon => "MON",
            Day::Tue => "TUE",
            Day::Wed => "WED",
            Day::Thu => "THU",
            Day::Fri => "FRI",
            Day::Sat => "SAT",
        }
    }
}

impl FromStr for Day {
    type Err = FormatError;

    /// Strict: only the exact uppercase codes are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Day::ALL
            .into_iter()
            .find(|day| day.code() == s)
            .ok_or_else(|| FormatError::UnknownDay(s.to_string()))
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}

impl From<Day> for Weekday {
    fn from(day: Day) -> Self {
        match day {
            Day::Sun => Weekday::Sun,
            Day::Mon => Weekday::Mon,
            Day::Tue => Weekday::Tue,
            Day::Wed => Weekday::Wed,
            Day::Thu => Weekday::Thu,
            Day::Fri => Weekday::Fri,
            Day::Sat => Weekday::Sat,
        }
    }
}

impl From<Weekday> for Day {
    fn from(weekday: Weekday) -> Self {
        // chrono numbers Sunday as 0 via num_days_from_sunday, matching our ordinals.
        Day::ALL[weekday.num_days_from_sunday() as usize]
    }
}

/// Lenient code-to-ordinal lookup. Unknown codes fall back to Monday (1).
pub fn day_to_ordinal(code: &str) -> u8 {
    match code.parse::<Day>() {
        Ok(day) => day.ordinal(),
        Err(_) => {
            warn!(code, "unrecognized day code, falling back to MON");
            Day::Mon.ordinal()
        }
    }
}

/// Lenient ordinal-to-day lookup. Out-of-range ordinals fall back to Monday.
pub fn ordinal_to_day(ordinal: u8) -> Day {
    Day::from_ordinal(ordinal).unwrap_or_else(|| {
        warn!(ordinal, "day ordinal out of range, falling back to MON");
        Day::Mon
    })
}

/// How unrecognized day codes are treated when building a schedule entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPolicy {
    /// Unknown codes are a validation error.
    #[default]
    Reject,
    /// Unknown codes are booked on Monday.
    Monday,
}

impl DayPolicy {
    pub fn parse_day(self, code: &str) -> Result<Day, FormatError> {
        match self {
            DayPolicy::Reject => code.parse(),
            DayPolicy::Monday => Ok(ordinal_to_day(day_to_ordinal(code))),
        }
    }
}
