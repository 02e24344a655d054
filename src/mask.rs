//! Input masks and format checks for form fields.
//!
//! Masks are applied as the user types: they never reject input, they reshape it.

use once_cell::sync::Lazy;
use regex::Regex;

static TIME_OF_DAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2}):(\d{2})$").expect("valid time regex"));
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{8,15}$").expect("valid phone regex"));
static DAY_MONTH_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("valid date regex"));

const TIME_DIGITS: usize = 4;
const PHONE_DIGITS: usize = 15;
const DATE_DIGITS: usize = 8;

fn digits(input: &str, max: usize) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).take(max).collect()
}

/// `"1430"` becomes `"14:30"`. Non-digits are dropped, extra digits are ignored
pub fn time_of_day(input: &str) -> String {
    let d = digits(input, TIME_DIGITS);
    if d.len() <= 2 {
        return d;
    }
    format!("{}:{}", &d[..2], &d[2..])
}

/// Keep the digits of a phone number
pub fn phone(input: &str) -> String {
    digits(input, PHONE_DIGITS)
}

/// `"01022001"` becomes `"01/02/2001"`
pub fn day_month_year(input: &str) -> String {
    let d = digits(input, DATE_DIGITS);
    let mut out = String::with_capacity(DATE_DIGITS + 2);
    for (i, c) in d.chars().enumerate() {
        if i == 2 || i == 4 {
            out.push('/');
        }
        out.push(c);
    }
    out
}

/// Cut a string after `max` characters (not bytes)
pub fn truncate_chars(input: &str, max: usize) -> String {
    input.chars().take(max).collect()
}

/// `HH:MM`, on a 24-hour clock
pub fn is_time_of_day(value: &str) -> bool {
    match TIME_OF_DAY_RE.captures(value) {
        None => false,
        Some(caps) => {
            let hours: u32 = caps[1].parse().unwrap_or(99);
            let minutes: u32 = caps[2].parse().unwrap_or(99);
            hours < 24 && minutes < 60
        }
    }
}

/// 8 to 15 digits. Spaces are ignored
pub fn is_phone(value: &str) -> bool {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    PHONE_RE.is_match(&compact)
}

/// `dd/mm/yyyy`
pub fn is_day_month_year(value: &str) -> bool {
    DAY_MONTH_YEAR_RE.is_match(value)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_mask() {
        assert_eq!(time_of_day(""), "");
        assert_eq!(time_of_day("1"), "1");
        assert_eq!(time_of_day("14"), "14");
        assert_eq!(time_of_day("143"), "14:3");
        assert_eq!(time_of_day("1430"), "14:30");
        assert_eq!(time_of_day("14301"), "14:30");
        assert_eq!(time_of_day("14:30"), "14:30");
        assert_eq!(time_of_day("ab9x"), "9");
    }

    #[test]
    fn phone_mask() {
        assert_eq!(phone("+595 981 123-456"), "595981123456");
        assert_eq!(phone("1234567890123456789"), "123456789012345");
    }

    #[test]
    fn date_mask() {
        assert_eq!(day_month_year("0"), "0");
        assert_eq!(day_month_year("010"), "01/0");
        assert_eq!(day_month_year("01022001"), "01/02/2001");
        assert_eq!(day_month_year("01/02/20019"), "01/02/2001");
    }

    #[test]
    fn truncation_is_char_based() {
        assert_eq!(truncate_chars("añoñ", 3), "año");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }

    #[test]
    fn validators() {
        assert!(is_time_of_day("00:00"));
        assert!(is_time_of_day("23:59"));
        assert!(!is_time_of_day("24:00"));
        assert!(!is_time_of_day("12:60"));
        assert!(!is_time_of_day("1:30"));

        assert!(is_phone("0981 123 456"));
        assert!(!is_phone("1234567"));
        assert!(!is_phone("12345678a"));

        assert!(is_day_month_year("31/12/1999"));
        assert!(!is_day_month_year("31-12-1999"));
    }
}
