//! Confirmation codes
//!
//! `BK-<epoch millis>-<7 random base36 characters>`, uppercase.

use chrono::{DateTime, Utc};
use rand::Rng;

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SUFFIX_LEN: usize = 7;

/// Generate a confirmation code for a booking created at `now`
pub fn generate_confirmation_code(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("BK-{}-{suffix}", now.timestamp_millis())
}

/// Whether a string has the shape of a confirmation code
pub fn is_confirmation_code(code: &str) -> bool {
    let Some(rest) = code.strip_prefix("BK-") else {
        return false;
    };
    let Some((millis, suffix)) = rest.split_once('-') else {
        return false;
    };
    !millis.is_empty()
        && millis.bytes().all(|b| b.is_ascii_digit())
        && suffix.len() == SUFFIX_LEN
        && suffix
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::collections::HashSet;

    #[test]
    fn test_code_shape() {
        let re = Regex::new(r"^BK-\d+-[A-Z0-9]{7}$").unwrap();
        let now = Utc::now();
        for _ in 0..200 {
            let code = generate_confirmation_code(now);
            assert!(re.is_match(&code), "bad code {code}");
            assert!(is_confirmation_code(&code));
        }
    }

    #[test]
    fn test_code_embeds_timestamp() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert!(generate_confirmation_code(now).starts_with("BK-1700000000123-"));
    }

    #[test]
    fn test_codes_differ_within_same_millisecond() {
        let now = Utc::now();
        let codes: HashSet<_> = (0..100).map(|_| generate_confirmation_code(now)).collect();
        assert!(codes.len() > 95);
    }

    #[test]
    fn test_shape_check_rejects() {
        assert!(!is_confirmation_code("BK-123-abcdefg"));
        assert!(!is_confirmation_code("BK--ABCDEFG"));
        assert!(!is_confirmation_code("XX-123-ABCDEFG"));
        assert!(!is_confirmation_code("BK-123-ABCDEF"));
    }
}
