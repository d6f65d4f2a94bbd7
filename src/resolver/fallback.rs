//! Generated fallback identifiers

use chrono::Utc;
use uuid::Uuid;

/// Prefix of every generated identifier
pub const FALLBACK_PREFIX: &str = "fallback";

/// Maximum length of the random segment
const RANDOM_SEGMENT_LEN: usize = 13;

/// Render a number in lowercase base 36
pub fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if n == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// `fallback-{random}-{timestamp}`, both segments in base 36
pub fn generate_id() -> String {
    let random: String = to_base36(Uuid::new_v4().as_u128())
        .chars()
        .take(RANDOM_SEGMENT_LEN)
        .collect();
    let millis = u128::try_from(Utc::now().timestamp_millis()).unwrap_or(0);

    format!("{}-{}-{}", FALLBACK_PREFIX, random, to_base36(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base36_digits() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }

    #[test]
    fn generated_id_shape() {
        let id = generate_id();
        let parts: Vec<&str> = id.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "fallback");
        assert!(!parts[1].is_empty() && parts[1].len() <= RANDOM_SEGMENT_LEN);
        assert!(!parts[2].is_empty());
        assert!(parts[1..]
            .iter()
            .all(|p| p.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())));
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(generate_id(), generate_id());
    }
}
