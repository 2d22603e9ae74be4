//! Helpers for turning raw urlencoded form fields into typed values.
//!
//! Browsers submit every field as text and send empty inputs as `""`,
//! so all form structs keep raw strings and convert through these helpers.

use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Trimmed value, or `None` for a missing/blank field
pub fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Required text field
pub fn required(field: &str, value: &Option<String>) -> Result<String, String> {
    non_empty(value).ok_or_else(|| format!("Field '{}' is required", field))
}

pub fn parse_f64(field: &str, value: &str) -> Result<f64, String> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Field '{}' must be a number, got '{}'", field, value))
}

pub fn parse_i32(field: &str, value: &str) -> Result<i32, String> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("Field '{}' must be an integer, got '{}'", field, value))
}

pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| format!("Field '{}' must be a date (YYYY-MM-DD), got '{}'", field, value))
}

/// Optional number: blank means "not supplied"
pub fn optional_f64(field: &str, value: &Option<String>) -> Result<Option<f64>, String> {
    non_empty(value).map(|v| parse_f64(field, &v)).transpose()
}

pub fn optional_i32(field: &str, value: &Option<String>) -> Result<Option<i32>, String> {
    non_empty(value).map(|v| parse_i32(field, &v)).transpose()
}

pub fn optional_date(field: &str, value: &Option<String>) -> Result<Option<NaiveDate>, String> {
    non_empty(value).map(|v| parse_date(field, &v)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_trims_and_drops_blank() {
        assert_eq!(non_empty(&Some("  Jane ".into())), Some("Jane".to_string()));
        assert_eq!(non_empty(&Some("   ".into())), None);
        assert_eq!(non_empty(&None), None);
    }

    #[test]
    fn test_required_reports_field_name() {
        let err = required("name", &Some("".into())).unwrap_err();
        assert!(err.contains("'name'"));
    }

    #[test]
    fn test_optional_numbers() {
        assert_eq!(optional_f64("amount", &Some("1000.50".into())), Ok(Some(1000.5)));
        assert_eq!(optional_f64("amount", &Some("".into())), Ok(None));
        assert!(optional_f64("amount", &Some("abc".into())).is_err());
        assert_eq!(optional_i32("grace_days", &Some(" 45 ".into())), Ok(Some(45)));
        assert!(optional_i32("grace_days", &Some("4.5".into())).is_err());
    }

    #[test]
    fn test_optional_date() {
        assert_eq!(
            optional_date("dob", &Some("1990-02-28".into())),
            Ok(NaiveDate::from_ymd_opt(1990, 2, 28))
        );
        assert!(optional_date("dob", &Some("28/02/1990".into())).is_err());
    }
}
