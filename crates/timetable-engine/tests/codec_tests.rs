//! Tests for time-of-day and weekday encoding.

use chrono::{NaiveTime, Weekday};
use timetable_engine::codec::MINUTES_PER_DAY;
use timetable_engine::{
    day_to_ordinal, format_time_of_day, ordinal_to_day, parse_time_of_day, Day, DayPolicy,
    FormatError, TimeOfDay,
};

fn minutes(text: &str) -> u16 {
    parse_time_of_day(text).unwrap().minutes()
}

// ── Parsing ─────────────────────────────────────────────────────────────────

#[test]
fn parses_hour_and_minute() {
    assert_eq!(minutes("8:00 AM"), 8 * 60);
    assert_eq!(minutes("9:30 AM"), 9 * 60 + 30);
    assert_eq!(minutes("1:15 PM"), 13 * 60 + 15);
    assert_eq!(minutes("11:59 PM"), 23 * 60 + 59);
}

#[test]
fn parses_bare_hour() {
    assert_eq!(minutes("7 AM"), 7 * 60);
    assert_eq!(minutes("3 PM"), 15 * 60);
}

#[test]
fn twelve_am_is_midnight_and_twelve_pm_is_noon() {
    assert_eq!(minutes("12:00 AM"), 0);
    assert_eq!(minutes("12:30 AM"), 30);
    assert_eq!(minutes("12:00 PM"), 12 * 60);
    assert_eq!(minutes("12:45 PM"), 12 * 60 + 45);
}

#[test]
fn marker_is_case_insensitive_and_spacing_is_loose() {
    assert_eq!(minutes("9:00 pm"), 21 * 60);
    assert_eq!(minutes("9:00PM"), 21 * 60);
    assert_eq!(minutes("  10:05   Am "), 10 * 60 + 5);
}

#[test]
fn missing_marker_is_rejected() {
    assert!(matches!(
        parse_time_of_day("9:00"),
        Err(FormatError::MissingMeridiem(_))
    ));
    assert!(matches!(
        parse_time_of_day("AM"),
        Err(FormatError::MissingMeridiem(_))
    ));
    assert!(matches!(
        parse_time_of_day(""),
        Err(FormatError::MissingMeridiem(_))
    ));
}

#[test]
fn non_numeric_parts_are_rejected() {
    assert!(matches!(
        parse_time_of_day("nine AM"),
        Err(FormatError::InvalidNumeral(_))
    ));
    assert!(matches!(
        parse_time_of_day("9:x0 AM"),
        Err(FormatError::InvalidNumeral(_))
    ));
    assert!(matches!(
        parse_time_of_day("+9:00 AM"),
        Err(FormatError::InvalidNumeral(_))
    ));
    assert!(matches!(
        parse_time_of_day("9: AM"),
        Err(FormatError::InvalidNumeral(_))
    ));
}

#[test]
fn minutes_need_exactly_two_digits() {
    for text in ["9:5 AM", "9:005 AM", "9:0 PM"] {
        assert_eq!(
            parse_time_of_day(text),
            Err(FormatError::InvalidNumeral(text.to_string())),
            "{text}"
        );
    }
}

#[test]
fn hours_take_at_most_two_digits() {
    assert_eq!(minutes("09:15 AM"), 9 * 60 + 15);
    assert_eq!(
        parse_time_of_day("009:15 AM"),
        Err(FormatError::InvalidNumeral("009:15 AM".to_string()))
    );
    assert!(matches!(
        parse_time_of_day("010 PM"),
        Err(FormatError::InvalidNumeral(_))
    ));
}

#[test]
fn out_of_range_hour_or_minute_is_rejected() {
    assert_eq!(
        parse_time_of_day("0:30 AM"),
        Err(FormatError::HourOutOfRange(0))
    );
    assert_eq!(
        parse_time_of_day("13:00 PM"),
        Err(FormatError::HourOutOfRange(13))
    );
    assert_eq!(
        parse_time_of_day("9:60 AM"),
        Err(FormatError::MinuteOutOfRange(60))
    );
}

// ── Formatting ──────────────────────────────────────────────────────────────

fn fmt(minutes: u16) -> String {
    format_time_of_day(TimeOfDay::from_minutes(minutes).unwrap())
}

#[test]
fn formats_without_leading_zero_on_hour() {
    assert_eq!(fmt(8 * 60), "8:00 AM");
    assert_eq!(fmt(9 * 60 + 5), "9:05 AM");
    assert_eq!(fmt(13 * 60 + 30), "1:30 PM");
}

#[test]
fn formats_midnight_and_noon_as_twelve() {
    assert_eq!(fmt(0), "12:00 AM");
    assert_eq!(fmt(12 * 60), "12:00 PM");
    assert_eq!(fmt(23 * 60 + 59), "11:59 PM");
}

#[test]
fn display_and_serde_use_the_clock_string() {
    let t = parse_time_of_day("2:45 PM").unwrap();
    assert_eq!(t.to_string(), "2:45 PM");
    assert_eq!(serde_json::to_string(&t).unwrap(), "\"2:45 PM\"");
    let back: TimeOfDay = serde_json::from_str("\"2:45 PM\"").unwrap();
    assert_eq!(back, t);
    assert!(serde_json::from_str::<TimeOfDay>("\"14:45\"").is_err());
}

#[test]
fn from_minutes_rejects_end_of_day() {
    assert_eq!(
        TimeOfDay::from_minutes(MINUTES_PER_DAY),
        Err(FormatError::MinutesOutOfRange(MINUTES_PER_DAY))
    );
    assert!(TimeOfDay::from_minutes(MINUTES_PER_DAY - 1).is_ok());
}

#[test]
fn converts_to_and_from_naive_time() {
    let t = TimeOfDay::from_hm(15, 20).unwrap();
    assert_eq!(t.to_naive_time(), NaiveTime::from_hms_opt(15, 20, 0).unwrap());
    let back = TimeOfDay::from(NaiveTime::from_hms_opt(15, 20, 59).unwrap());
    assert_eq!(back, t);
}

// ── Days ────────────────────────────────────────────────────────────────────

#[test]
fn day_codes_map_to_fixed_ordinals() {
    let expected = [
        ("SUN", 0),
        ("MON", 1),
        ("TUE", 2),
        ("WED", 3),
        ("THU", 4),
        ("FRI", 5),
        ("SAT", 6),
    ];
    for (code, ordinal) in expected {
        assert_eq!(day_to_ordinal(code), ordinal, "{code}");
        assert_eq!(ordinal_to_day(ordinal).code(), code);
    }
}

#[test]
fn lenient_lookup_falls_back_to_monday() {
    assert_eq!(day_to_ordinal("FUNDAY"), 1);
    assert_eq!(day_to_ordinal("mon"), 1);
    assert_eq!(ordinal_to_day(9), Day::Mon);
}

#[test]
fn strict_parse_is_case_sensitive() {
    assert_eq!("WED".parse::<Day>(), Ok(Day::Wed));
    assert_eq!(
        "wed".parse::<Day>(),
        Err(FormatError::UnknownDay("wed".to_string()))
    );
    assert!("Wednesday".parse::<Day>().is_err());
}

#[test]
fn day_policy_controls_unknown_codes() {
    assert!(DayPolicy::Reject.parse_day("XYZ").is_err());
    assert_eq!(DayPolicy::Monday.parse_day("XYZ"), Ok(Day::Mon));
    assert_eq!(DayPolicy::Monday.parse_day("FRI"), Ok(Day::Fri));
}

#[test]
fn day_serializes_as_uppercase_code() {
    assert_eq!(serde_json::to_string(&Day::Thu).unwrap(), "\"THU\"");
    let day: Day = serde_json::from_str("\"SAT\"").unwrap();
    assert_eq!(day, Day::Sat);
}

#[test]
fn day_matches_chrono_weekday() {
    for day in Day::ALL {
        let weekday = Weekday::from(day);
        assert_eq!(weekday.num_days_from_sunday() as u8, day.ordinal());
        assert_eq!(Day::from(weekday), day);
    }
}
