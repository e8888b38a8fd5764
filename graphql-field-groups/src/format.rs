//! Text and date formatting applied to resolved values.

use time::Date;
use time::Month;
use time::PrimitiveDateTime;
use time::Time;
use time::macros::date;
use time::macros::format_description;

/// Wraps blank-line separated blocks of text in paragraphs.
///
/// Single newlines inside a block become `<br />`. Each paragraph is followed by a newline,
/// so `"a\n\nb"` becomes `"<p>a</p>\n<p>b</p>\n"`.
pub fn autop(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut output = String::new();
    for block in split_blocks(&normalized) {
        let lines: Vec<&str> = block.lines().map(str::trim_end).collect();
        output.push_str("<p>");
        output.push_str(&lines.join("<br />\n"));
        output.push_str("</p>\n");
    }
    output
}

fn split_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text.trim_matches('\n');
    while !rest.is_empty() {
        match rest.find("\n\n") {
            Some(end) => {
                let block = rest[..end].trim();
                if !block.is_empty() {
                    blocks.push(block);
                }
                rest = rest[end..].trim_start_matches('\n');
            }
            None => {
                let block = rest.trim();
                if !block.is_empty() {
                    blocks.push(block);
                }
                break;
            }
        }
    }
    blocks
}

/// Inserts `<br />` before every newline.
pub fn nl2br(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                output.push_str("<br />\r\n");
            }
            '\r' | '\n' => {
                output.push_str("<br />");
                output.push(c);
            }
            _ => output.push(c),
        }
    }
    output
}

/// Parses a stored date, time or date-time value.
///
/// Accepts the storage formats of the date pickers (`20240131`, `2024-01-31`,
/// `2024-01-31 13:05:00`, `13:05:00`, `13:05`). Time-only values are placed on 1970-01-01.
pub fn parse_stored_date(raw: &str) -> Option<PrimitiveDateTime> {
    let raw = raw.trim();
    let date = format_description!("[year]-[month]-[day]");
    let date_time = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let time_seconds = format_description!("[hour]:[minute]:[second]");
    let time_minutes = format_description!("[hour]:[minute]");

    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        let dashed = format!("{}-{}-{}", &raw[..4], &raw[4..6], &raw[6..]);
        return Date::parse(&dashed, date).ok().map(Date::midnight);
    }
    if let Ok(parsed) = PrimitiveDateTime::parse(raw, date_time) {
        return Some(parsed);
    }
    if let Ok(parsed) = Date::parse(raw, date) {
        return Some(parsed.midnight());
    }
    Time::parse(raw, time_seconds)
        .or_else(|_| Time::parse(raw, time_minutes))
        .ok()
        .map(|time| PrimitiveDateTime::new(date!(1970 - 01 - 01), time))
}

/// Renders a stored date value through a PHP `date()` style format string.
///
/// Returns `None` when the stored value is not a recognized date.
pub fn render_date(raw: &str, format: &str) -> Option<String> {
    parse_stored_date(raw).map(|value| php_date(&value, format))
}

/// Formats `value` with PHP `date()` format characters.
///
/// Supported: `d D j l N S w z W F m M n t L Y y a A g G h H i s v U`; `\` escapes the next
/// character and anything else is copied through.
pub fn php_date(value: &PrimitiveDateTime, format: &str) -> String {
    let mut output = String::new();
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    output.push(escaped);
                }
            }
            'd' => output.push_str(&format!("{:02}", value.day())),
            'D' => output.push_str(&weekday_name(value)[..3]),
            'j' => output.push_str(&value.day().to_string()),
            'l' => output.push_str(&weekday_name(value)),
            'N' => output.push_str(&value.weekday().number_from_monday().to_string()),
            'S' => output.push_str(ordinal_suffix(value.day())),
            'w' => output.push_str(&value.weekday().number_days_from_sunday().to_string()),
            'z' => output.push_str(&(value.ordinal() - 1).to_string()),
            'W' => output.push_str(&format!("{:02}", value.iso_week())),
            'F' => output.push_str(&value.month().to_string()),
            'm' => output.push_str(&format!("{:02}", u8::from(value.month()))),
            'M' => output.push_str(&value.month().to_string()[..3]),
            'n' => output.push_str(&u8::from(value.month()).to_string()),
            't' => output.push_str(&days_in_month(value.year(), value.month()).to_string()),
            'L' => output.push(if time::util::is_leap_year(value.year()) {
                '1'
            } else {
                '0'
            }),
            'Y' => output.push_str(&value.year().to_string()),
            'y' => output.push_str(&format!("{:02}", value.year().rem_euclid(100))),
            'a' => output.push_str(if value.hour() < 12 { "am" } else { "pm" }),
            'A' => output.push_str(if value.hour() < 12 { "AM" } else { "PM" }),
            'g' => output.push_str(&twelve_hour(value.hour()).to_string()),
            'G' => output.push_str(&value.hour().to_string()),
            'h' => output.push_str(&format!("{:02}", twelve_hour(value.hour()))),
            'H' => output.push_str(&format!("{:02}", value.hour())),
            'i' => output.push_str(&format!("{:02}", value.minute())),
            's' => output.push_str(&format!("{:02}", value.second())),
            'v' => output.push_str(&format!("{:03}", value.millisecond())),
            'U' => output.push_str(&value.assume_utc().unix_timestamp().to_string()),
            other => output.push(other),
        }
    }
    output
}

fn weekday_name(value: &PrimitiveDateTime) -> String {
    value.weekday().to_string()
}

fn ordinal_suffix(day: u8) -> &'static str {
    match day {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

fn twelve_hour(hour: u8) -> u8 {
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

fn days_in_month(year: i32, month: Month) -> u8 {
    time::util::days_in_year_month(year, month)
}
