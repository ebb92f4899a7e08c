/// Period Label Parser
///
/// Resolves free-text column labels ("Q2 2025", "FY25 Q2", "12 Mai 24", "Jun 1, 2025",
/// "2025-06-30") to a calendar date used only for ordering. Quarter and month-only
/// labels resolve to the first day of the quarter/month. `None` marks an unparseable
/// label; callers keep such entries in column order instead of failing.
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

use crate::table::DataPoint;

/// Combined English/German month vocabulary, keys lowercase without trailing period
static MONTHS: &[(&str, u32)] = &[
    // English
    ("jan", 1),
    ("january", 1),
    ("feb", 2),
    ("february", 2),
    ("mar", 3),
    ("march", 3),
    ("apr", 4),
    ("april", 4),
    ("may", 5),
    ("jun", 6),
    ("june", 6),
    ("jul", 7),
    ("july", 7),
    ("aug", 8),
    ("august", 8),
    ("sep", 9),
    ("sept", 9),
    ("september", 9),
    ("oct", 10),
    ("october", 10),
    ("nov", 11),
    ("november", 11),
    ("dec", 12),
    ("december", 12),
    // German
    ("januar", 1),
    ("jän", 1),
    ("jänner", 1),
    ("februar", 2),
    ("mär", 3),
    ("mrz", 3),
    ("märz", 3),
    ("maerz", 3),
    ("mai", 5),
    ("juni", 6),
    ("juli", 7),
    ("okt", 10),
    ("oktober", 10),
    ("dez", 12),
    ("dezember", 12),
];

static QUARTER_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^Q\s*([1-4])\s*['’\-/]?\s*(?:FY\s*)?'?(\d{4}|\d{2})$")
        .expect("valid quarter-first regex")
});

static FY_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^FY\s*'?(\d{4}|\d{2})\s*['’\-/]?\s*Q\s*([1-4])$")
        .expect("valid fiscal-year-first regex")
});

static YEAR_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{4}|\d{2})\s*['’\-/]?\s*Q\s*([1-4])$").expect("valid year-first regex")
});

// "2Q 2025", "2Q25"
static NUMBER_Q_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([1-4])\s*Q\s*['’\-]?\s*(\d{4}|\d{2})$").expect("valid nQ regex")
});

// "2 2025 Q"
static NUMBER_YEAR_Q_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([1-4])\s+(\d{4}|\d{2})\s*Q$").expect("valid n-year-Q regex")
});

static DAY_MONTH_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2})\.?\s+(\p{L}+\.?)\s+'?(\d{4}|\d{2})$")
        .expect("valid day-month-year regex")
});

static MONTH_DAY_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\p{L}+\.?)\s+(\d{1,2}),?\s+'?(\d{4}|\d{2})$")
        .expect("valid month-day-year regex")
});

static MONTH_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\p{L}+\.?)\s*['’\-/]?\s*(\d{4}|\d{2})$").expect("valid month-year regex")
});

/// Anything earlier is a misread two-digit year
const MIN_YEAR: i32 = 100;

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid ISO date regex"));

// "6/30/25", "30-06-25", "30.06.2025"
static NUMERIC_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})([/.\-])(\d{1,2})[/.\-](\d{4}|\d{2})$")
        .expect("valid numeric date regex")
});

const FALLBACK_DATE_FORMATS: &[&str] = &["%Y/%m/%d", "%Y.%m.%d", "%B %d %Y", "%d %B %Y"];

const FALLBACK_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Look up a month name or abbreviation ("Mar", "mär", "Okt.", "Dezember")
pub fn month_number(name: &str) -> Option<u32> {
    let key = name.trim().trim_end_matches('.').to_lowercase();
    MONTHS
        .iter()
        .find(|(month, _)| *month == key)
        .map(|(_, number)| *number)
}

/// Resolve a period label to its canonical date
///
/// Resolution order matters because the patterns overlap:
/// quarter forms, day-month-year, month-day-year, month-year, ISO, numeric
/// dates, then a handful of generic date layouts. Two-digit years are 20YY.
pub fn period_date(label: &str) -> Option<NaiveDate> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }

    quarter_date(label)
        .or_else(|| {
            DAY_MONTH_YEAR_RE
                .captures(label)
                .and_then(|c| named_date(&c[2], &c[1], &c[3]))
        })
        .or_else(|| {
            MONTH_DAY_YEAR_RE
                .captures(label)
                .and_then(|c| named_date(&c[1], &c[2], &c[3]))
        })
        .or_else(|| {
            MONTH_YEAR_RE
                .captures(label)
                .and_then(|c| named_date(&c[1], "1", &c[2]))
        })
        .or_else(|| iso_date(label))
        .or_else(|| numeric_date(label))
        .or_else(|| fallback_date(label))
        .filter(|date| date.year() >= MIN_YEAR)
}

/// Canonical "Q<n> <YYYY>" label for display; unparseable labels come back unchanged
pub fn quarter_label(label: &str) -> String {
    match period_date(label) {
        Some(date) => format!("Q{} {}", date.month0() / 3 + 1, date.year()),
        None => label.to_string(),
    }
}

/// Sort ascending by canonical date
///
/// The sort is stable: points resolving to the same date keep their column order.
/// Points without a date go last, also in column order.
pub fn sort_by_period(points: &mut [DataPoint]) {
    points.sort_by_cached_key(|p| {
        let date = period_date(&p.period);
        (date.is_none(), date)
    });
}

fn quarter_date(label: &str) -> Option<NaiveDate> {
    // (regex, quarter group, year group)
    let forms: [(&Regex, usize, usize); 5] = [
        (&*QUARTER_FIRST_RE, 1, 2),
        (&*FY_FIRST_RE, 2, 1),
        (&*YEAR_FIRST_RE, 2, 1),
        (&*NUMBER_Q_RE, 1, 2),
        (&*NUMBER_YEAR_Q_RE, 1, 2),
    ];

    forms.iter().find_map(|(re, q_group, y_group)| {
        let caps = re.captures(label)?;
        let quarter: u32 = caps[*q_group].parse().ok()?;
        let year = expand_year(&caps[*y_group])?;
        NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1)
    })
}

fn named_date(month: &str, day: &str, year: &str) -> Option<NaiveDate> {
    let month = month_number(month)?;
    let day: u32 = day.parse().ok()?;
    let year = expand_year(year)?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Two-digit years map to 2000 + YY
fn expand_year(year: &str) -> Option<i32> {
    let value: i32 = year.parse().ok()?;
    Some(if value < 100 { 2000 + value } else { value })
}

fn iso_date(label: &str) -> Option<NaiveDate> {
    if !ISO_DATE_RE.is_match(label) {
        return None;
    }
    NaiveDate::parse_from_str(label, "%Y-%m-%d").ok()
}

/// Day/month/year with `/`, `-` or `.` separators
///
/// Dotted dates are day first. Slash and dash dates are month first, falling
/// back to day first when the leading number cannot be a month ("31/12/24").
fn numeric_date(label: &str) -> Option<NaiveDate> {
    let caps = NUMERIC_DATE_RE.captures(label)?;
    let first: u32 = caps[1].parse().ok()?;
    let second: u32 = caps[3].parse().ok()?;
    let year = expand_year(&caps[4])?;

    if &caps[2] == "." {
        return NaiveDate::from_ymd_opt(year, second, first);
    }
    NaiveDate::from_ymd_opt(year, first, second)
        .or_else(|| NaiveDate::from_ymd_opt(year, second, first))
}

fn fallback_date(label: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(label) {
        return Some(dt.date_naive());
    }

    FALLBACK_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(label, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            FALLBACK_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(label, fmt).ok())
        })
}
