/// Locale tolerant number parsing for hand-maintained sheets
///
/// Cells mix US and German conventions ("1,234.56", "1.234,56", "12,5 %").
/// Every function here is total: unparseable input yields `None`, never a panic,
/// and a returned value is always finite.
use crate::table::Cell;

/// Parse free text into a finite number
///
/// Everything except digits, `,`, `.` and `-` is dropped first, so currency
/// symbols, percent signs and spaces are ignored. Separator handling:
/// - both `,` and `.` present: the one occurring last is the decimal separator
/// - only `,`: thousands separator when every group after it has three digits
///   ("95,678", "1,234,567"), otherwise decimal ("12,5")
/// - only `.`: decimal, unless repeated in thousands groups ("1.234.567")
pub fn parse_number(text: &str) -> Option<f64> {
    parse_with(text, LoneComma::Grouping)
}

/// How a single comma without any `.` is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoneComma {
    /// Thousands separator when followed by exactly three digits ("95,678")
    Grouping,
    /// Always decimal ("46,125 %")
    Decimal,
}

fn parse_with(text: &str, lone_comma: LoneComma) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .map(|c| if c == '\u{2212}' { '-' } else { c })
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    normalize_separators(&cleaned, lone_comma)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parse a cell; numeric cells pass through unchanged
pub fn parse_cell(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(v) => Some(*v).filter(|v| v.is_finite()),
        Cell::Text(s) => parse_number(s),
    }
}

/// Parse a cell as a percentage in 0..=100
///
/// A single comma is always the decimal separator here: a percentage never
/// needs thousands grouping, so "46,125 %" is 46.125.
pub fn parse_percent(cell: &Cell) -> Option<f64> {
    let value = match cell {
        Cell::Number(v) => Some(*v).filter(|v| v.is_finite()),
        Cell::Text(s) => parse_with(s, LoneComma::Decimal),
    };
    value.map(to_percent)
}

/// Values up to 1 are read as fractions (0.42 → 42), larger values as percent.
/// The result is clamped to 0..=100.
pub fn to_percent(value: f64) -> f64 {
    let pct = if value <= 1.0 { value * 100.0 } else { value };
    pct.clamp(0.0, 100.0)
}

fn normalize_separators(s: &str, lone_comma: LoneComma) -> String {
    match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(_), None) if lone_comma == LoneComma::Decimal && s.matches(',').count() == 1 => {
            s.replace(',', ".")
        }
        (Some(_), None) if is_thousands_grouping(s, ',') => s.replace(',', ""),
        (Some(_), None) => s.replace(',', "."),
        (None, Some(_)) if s.matches('.').count() > 1 && is_thousands_grouping(s, '.') => {
            s.replace('.', "")
        }
        _ => s.to_string(),
    }
}

/// "1,234,567" style grouping: a 1-3 digit head without leading zero, then groups of three
fn is_thousands_grouping(s: &str, sep: char) -> bool {
    let mut groups = s.split(sep);
    let head = groups.next().unwrap_or_default().trim_start_matches('-');
    if head.is_empty() || head.len() > 3 || head.starts_with('0') {
        return false;
    }
    groups.all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}
