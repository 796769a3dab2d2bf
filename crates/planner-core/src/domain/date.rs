//! Display date <-> canonical date の変換
//!
//! - **display date**: `MM/DD/YY`（カレンダー UI との境界で使う形式）
//! - **canonical date**: `YYYY-MM-DD`（ストレージに保存する形式）
//!
//! 変換は境界で 1 回だけ行い、内部では `NaiveDate` を持ち回る。

use chrono::NaiveDate;

use super::errors::DateError;

/// Display format used by the calendar widget (`01/15/25`, also accepts `1/15/25`).
pub const DISPLAY_FORMAT: &str = "%m/%d/%y";

/// Canonical storage format.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d";

/// 2 桁年でこの値以下は 20xx、それより大きければ 19xx。
const PIVOT_YEAR: i32 = 68;

/// `MM/DD/YY` を `NaiveDate` に変換する。
///
/// 2 桁の年は POSIX の pivot に従う（`00..=68` -> 20xx, `69..=99` -> 19xx）。
/// パースできない文字列は必ず `DateError::Invalid` になり、部分的な日付は返さない。
/// chrono の `%y` は `69` を 2069 にするため、年は自前で展開する。
pub fn to_canonical(display: &str) -> Result<NaiveDate, DateError> {
    let invalid = || DateError::Invalid(display.to_string());

    let mut parts = display.trim().split('/');
    let (Some(month), Some(day), Some(year), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let month = digits(month, 1..=2).ok_or_else(invalid)?;
    let day = digits(day, 1..=2).ok_or_else(invalid)?;
    let yy = digits(year, 2..=2).ok_or_else(invalid)?;

    NaiveDate::from_ymd_opt(expand_year(yy), month, day).ok_or_else(invalid)
}

/// POSIX pivot: `00..=68` -> 20xx, `69..=99` -> 19xx
fn expand_year(yy: u32) -> i32 {
    let yy = yy as i32;
    if yy <= PIVOT_YEAR { 2000 + yy } else { 1900 + yy }
}

fn digits(s: &str, len: std::ops::RangeInclusive<usize>) -> Option<u32> {
    if !len.contains(&s.len()) || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// `MM/DD/YY` -> `YYYY-MM-DD` 文字列。
pub fn to_canonical_string(display: &str) -> Result<String, DateError> {
    to_canonical(display).map(format_canonical)
}

pub fn format_canonical(date: NaiveDate) -> String {
    date.format(CANONICAL_FORMAT).to_string()
}

/// Parse a stored `YYYY-MM-DD` value.
pub fn parse_canonical(s: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(s, CANONICAL_FORMAT).map_err(|_| DateError::Invalid(s.to_string()))
}

/// `NaiveDate` -> `MM/DD/YY`（zero-padded）。
///
/// 1969-01-01..=2068-12-31 の外は 2 桁年に畳まれるので往復しない。
pub fn to_display(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}
