//! Date format detection and parsing
//!
//! Date-only values are matched against a fixed table of formats. When a value
//! like "31/05/24" is seen, formats where 31 would be the month are eliminated.
//! Values carrying a time component are parsed directly against
//! [`DATETIME_FORMATS`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Common date formats to try (ordered by popularity)
pub const DATE_FORMATS: &[DateFormatSpec] = &[
    // ISO formats
    DateFormatSpec {
        pattern: "%Y-%m-%d",
        position: DateComponentPosition { year: 0, month: 1, day: 2 },
        separator: "-",
        year_digits: 4,
    },
    DateFormatSpec {
        pattern: "%Y/%m/%d",
        position: DateComponentPosition { year: 0, month: 1, day: 2 },
        separator: "/",
        year_digits: 4,
    },
    // US formats (MM/DD/YYYY)
    DateFormatSpec {
        pattern: "%m/%d/%Y",
        position: DateComponentPosition { year: 2, month: 0, day: 1 },
        separator: "/",
        year_digits: 4,
    },
    DateFormatSpec {
        pattern: "%m-%d-%Y",
        position: DateComponentPosition { year: 2, month: 0, day: 1 },
        separator: "-",
        year_digits: 4,
    },
    // European formats (DD/MM/YYYY)
    DateFormatSpec {
        pattern: "%d/%m/%Y",
        position: DateComponentPosition { year: 2, month: 1, day: 0 },
        separator: "/",
        year_digits: 4,
    },
    DateFormatSpec {
        pattern: "%d-%m-%Y",
        position: DateComponentPosition { year: 2, month: 1, day: 0 },
        separator: "-",
        year_digits: 4,
    },
    DateFormatSpec {
        pattern: "%d.%m.%Y",
        position: DateComponentPosition { year: 2, month: 1, day: 0 },
        separator: ".",
        year_digits: 4,
    },
    // Short year formats
    DateFormatSpec {
        pattern: "%m/%d/%y",
        position: DateComponentPosition { year: 2, month: 0, day: 1 },
        separator: "/",
        year_digits: 2,
    },
    DateFormatSpec {
        pattern: "%d/%m/%y",
        position: DateComponentPosition { year: 2, month: 1, day: 0 },
        separator: "/",
        year_digits: 2,
    },
    // Compact format (no separator)
    DateFormatSpec {
        pattern: "%Y%m%d",
        position: DateComponentPosition { year: 0, month: 1, day: 2 },
        separator: "",
        year_digits: 4,
    },
];

/// Formats for values that carry a time of day. Tried in order; the first
/// successful parse wins.
pub const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y:%m:%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Date format specification with component positions
#[derive(Debug, Clone)]
pub struct DateFormatSpec {
    /// strftime pattern
    pub pattern: &'static str,
    /// Position of each component (0, 1, or 2)
    pub position: DateComponentPosition,
    /// Separator character
    pub separator: &'static str,
    /// Number of year digits (2 or 4)
    pub year_digits: u8,
}

/// Position of date components in the format
#[derive(Debug, Clone, Copy)]
pub struct DateComponentPosition {
    pub year: u8,
    pub month: u8,
    pub day: u8,
}

/// Try to parse a date value with a specific format
pub fn try_parse_date(value: &str, format: &DateFormatSpec) -> Option<NaiveDate> {
    let trimmed = value.trim();

    if format.separator.is_empty() {
        return try_parse_compact_date(trimmed);
    }

    NaiveDate::parse_from_str(trimmed, format.pattern).ok()
}

/// Parse a value that includes a time component.
///
/// RFC 3339 values with an offset are normalized to their naive UTC time.
pub fn try_parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(trimmed, pattern).ok())
}

/// YYYYMMDD, validated through chrono
fn try_parse_compact_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = value[0..4].parse().ok()?;
    let month: u32 = value[4..6].parse().ok()?;
    let day: u32 = value[6..8].parse().ok()?;
    if !can_be_year(year, 4) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Calculate days in a month (accounting for leap years)
pub fn days_in_month(month: u32, year: i32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Check if a component value can be a month (1-12)
pub fn can_be_month(value: i32) -> bool {
    (1..=12).contains(&value)
}

/// Check if a component value can be a day (1-31)
pub fn can_be_day(value: i32) -> bool {
    (1..=31).contains(&value)
}

/// Check if a component value can be a year
pub fn can_be_year(value: i32, year_digits: u8) -> bool {
    match year_digits {
        2 => (0..=99).contains(&value),
        4 => (1800..=2200).contains(&value),
        _ => false,
    }
}

/// Check if a format must be eliminated for a value.
///
/// Returns the reason when the value rules the format out, `None` when the
/// format remains a candidate.
pub fn check_format_elimination(value: &str, format: &DateFormatSpec) -> Option<&'static str> {
    let trimmed = value.trim();

    if format.separator.is_empty() {
        return match try_parse_compact_date(trimmed) {
            Some(_) => None,
            None => Some("not a compact YYYYMMDD date"),
        };
    }

    if !trimmed.contains(format.separator) {
        return Some("separator mismatch");
    }

    let parts: Vec<&str> = trimmed.split(format.separator).collect();
    if parts.len() != 3 {
        return Some("wrong number of components");
    }

    let components: Vec<i32> = parts.iter().filter_map(|p| p.trim().parse().ok()).collect();
    if components.len() != 3 {
        return Some("non-numeric components");
    }

    let at = |position: u8| components[position as usize];
    let month_val = at(format.position.month);
    let day_val = at(format.position.day);
    let year_val = at(format.position.year);

    let year_len = parts[format.position.year as usize].trim().len();
    if year_len != format.year_digits as usize {
        return Some("year width mismatch");
    }

    if !can_be_month(month_val) {
        return Some("month value out of range");
    }
    if !can_be_day(day_val) {
        return Some("day value out of range");
    }
    if !can_be_year(year_val, format.year_digits) {
        return Some("year value out of range");
    }

    let full_year = expand_year(year_val, format.year_digits);
    if day_val as u32 > days_in_month(month_val as u32, full_year) {
        return Some("day exceeds month maximum");
    }

    None
}

/// Two-digit years pivot at 70: 70..99 → 19xx, 00..69 → 20xx.
fn expand_year(year: i32, year_digits: u8) -> i32 {
    if year_digits != 2 {
        return year;
    }
    if year >= 70 {
        1900 + year
    } else {
        2000 + year
    }
}

/// First format in table order that accepts the value.
pub fn first_matching_format(value: &str) -> Option<&'static DateFormatSpec> {
    DATE_FORMATS
        .iter()
        .find(|format| check_format_elimination(value, format).is_none())
}

/// Convert a parsed date to midnight of that day.
pub fn at_midnight(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(0, 0, 0)
}
