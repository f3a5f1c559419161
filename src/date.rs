use chrono::{Datelike, Local, NaiveDate, format::{Parsed, StrftimeItems, parse}};

/// Recognised date shapes, most specific first.
const DAY_FORMATS: &[&str] = &["%B %d %Y", "%B %d, %Y"];
const PARTIAL_FORMATS: &[&str] = &["%B %Y", "%Y"];

const MONTH_NAMES: &[&str] = &[
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Guess the publication year of a free-form date string, falling back to the
/// current year when no known shape matches.
pub fn guess_year(date: &str) -> i32 {
    guess_year_or(date, Local::now().year())
}

pub fn guess_year_or(date: &str, fallback: i32) -> i32 {
    parse_year(date).unwrap_or_else(|| {
        tracing::debug!(date, fallback, "unrecognised date, using fallback year");
        fallback
    })
}

fn parse_year(date: &str) -> Option<i32> {
    // chrono is more lenient than strptime: it trims, takes "Mar" for %B and
    // signed or short years for %Y. Shapes are checked before chrono runs.
    if date.is_empty() || date.trim() != date {
        return None;
    }
    let year = trailing_year(date)?;
    if date.split_whitespace().count() > 1 && !starts_with_month(date) {
        return None;
    }

    // Full dates must also be valid calendar days.
    let full = DAY_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(date, fmt)
            .ok()
            .map(|d| d.year())
            .filter(|y| *y == year)
    });
    if full.is_some() {
        return full;
    }

    PARTIAL_FORMATS.iter().find_map(|fmt| {
        let mut parsed = Parsed::new();
        parse(&mut parsed, date, StrftimeItems::new(fmt)).ok()?;
        parsed.year().filter(|y| *y == year)
    })
}

/// The last token, when it is exactly four ASCII digits.
fn trailing_year(date: &str) -> Option<i32> {
    date.split_whitespace()
        .last()
        .filter(|t| t.len() == 4 && t.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|t| t.parse().ok())
}

fn starts_with_month(date: &str) -> bool {
    date.split_whitespace()
        .next()
        .is_some_and(|t| MONTH_NAMES.iter().any(|m| m.eq_ignore_ascii_case(t)))
}
