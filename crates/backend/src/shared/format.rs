/// Форматирует число с разделителями тысяч (точками)
///
/// `1234567` becomes `"1.234.567"`.
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Money as shown in documents and reports: two decimals
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(42), "42");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1.000");
        assert_eq!(format_number(1234567), "1.234.567");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1000.0), "1000.00");
        assert_eq!(format_amount(99.999), "100.00");
        assert_eq!(format_amount(-12.5), "-12.50");
    }
}
