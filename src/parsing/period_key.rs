// Period Key Classifier
//
// Gate that keeps row titles, footnotes and flag columns out of numeric series.
// A column label counts as a period key when it is an explicit "latest" marker or
// has the shape of a quarter, month/day/year, ISO or numeric date label.
use regex::Regex;
use std::sync::LazyLock;

static LATEST_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:lq|last\s+quarter|latest)$").expect("valid latest marker regex")
});

static PERIOD_KEY_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Q2 2025, Q2'25, Q2-2025, Q2 FY25, FY Q2 25
        r"(?i)^(?:FY\s*)?Q\s*[1-4]\s*['’\-/]?\s*(?:FY\s*)?'?\d{2,4}$",
        // FY25 Q2, 2025 Q2, 2025-Q2
        r"(?i)^(?:FY\s*)?'?\d{2,4}\s*['’\-/]?\s*Q\s*[1-4]$",
        // 2Q25, 2Q 2025
        r"(?i)^[1-4]\s*Q\s*['’\-]?\s*\d{2,4}$",
        // 2 2025 Q
        r"(?i)^[1-4]\s+\d{2,4}\s*Q$",
        // Jun 25, mär 2024, Okt.-24
        r"(?i)^\p{L}+\.?\s*['’\-/]?\s*\d{2,4}$",
        // 12 Mai 24, 3. Okt. 2024
        r"(?i)^\d{1,2}\.?\s+\p{L}+\.?\s+'?\d{2,4}$",
        // Jun 1, 2025
        r"(?i)^\p{L}+\.?\s+\d{1,2},?\s+'?\d{2,4}$",
        // 2025-06-30
        r"^\d{4}-\d{2}-\d{2}$",
        // 30/06/2025, 6-30-25, 30.06.2025
        r"^\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4}$",
        // 2025/06/30
        r"^\d{4}/\d{1,2}/\d{1,2}$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid period key regex"))
    .collect()
});

/// The reserved column holding the line item name
pub fn is_metric_key(label: &str) -> bool {
    label.trim().eq_ignore_ascii_case("metric")
}

/// Explicit "most recent period" columns: "LQ", "Last quarter", "Latest"
pub fn is_latest_marker(label: &str) -> bool {
    LATEST_MARKER_RE.is_match(label.trim())
}

/// Is this column label a genuine reporting period?
pub fn is_period_key(label: &str) -> bool {
    let label = label.trim();
    if label.is_empty() || is_metric_key(label) {
        return false;
    }

    is_latest_marker(label) || PERIOD_KEY_RES.iter().any(|re| re.is_match(label))
}
