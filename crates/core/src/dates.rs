use chrono::NaiveDate;

/// Formats tried in order. The statement and ledger domain is day-first;
/// ISO comes from re-exported extracts and is accepted as a fallback.
/// `%d/%m/%y` must precede `%d/%m/%Y`: chrono's `%Y` also consumes a bare
/// two-digit year, which would pin "28/08/25" to year 25. Four-digit input
/// fails `%y` on trailing digits, so the short form is safe to try first.
const DAY_FIRST_FORMATS: &[&str] = &["%d/%m/%y", "%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DAY_FIRST_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// Inclusive, symmetric date-window test. A window of 0 means same-day only.
pub fn within_window(a: NaiveDate, b: NaiveDate, window_days: u32) -> bool {
    (a - b).num_days().unsigned_abs() <= u64::from(window_days)
}
