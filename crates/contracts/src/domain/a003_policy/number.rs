//! Policy number format: `POL-<year>-<6-digit sequence>`.

/// Sequence key for the policies issued in `year`.
///
/// Each calendar year gets its own counter, so numbering restarts at 1
/// without ever touching the previous year's counter.
pub fn sequence_key(year: i32) -> String {
    format!("policy_{}", year)
}

pub fn format_policy_number(year: i32, sequence: i64) -> String {
    format!("POL-{:04}-{:06}", year, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_third_policy_of_2024() {
        assert_eq!(format_policy_number(2024, 3), "POL-2024-000003");
    }

    #[test]
    fn test_sequence_wider_than_padding() {
        assert_eq!(format_policy_number(2025, 1_234_567), "POL-2025-1234567");
    }

    #[test]
    fn test_sequence_key_per_year() {
        assert_eq!(sequence_key(2024), "policy_2024");
        assert_ne!(sequence_key(2024), sequence_key(2025));
    }
}
