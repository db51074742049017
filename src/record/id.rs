//! Unique record id generation.
//!
//! Ids combine a high-resolution timestamp with a random integer, so
//! concurrent processes produce distinct ids without any coordination.

use chrono::Utc;
use rand::Rng;

/// Generate a unique record id in the form `<seconds>-<frac>-<random>`.
///
/// The fractional part carries 4 decimal digits of the current second. The
/// usual decimal point is replaced with `-` so the id stays safe for use in
/// file paths and URLs.
pub fn generate_record_id() -> String {
    let now = Utc::now();
    let frac = now.timestamp_subsec_micros() / 100;
    let random: u32 = rand::thread_rng().gen();
    format!("{}-{:04}-{}", now.timestamp(), frac, random)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_id_format() {
        let id = generate_record_id();
        let pattern = Regex::new(r"^\d+-\d{4}-\d+$").unwrap();
        assert!(pattern.is_match(&id), "unexpected id format: {}", id);
    }

    #[test]
    fn test_ids_are_distinct() {
        let ids: Vec<String> = (0..100).map(|_| generate_record_id()).collect();
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
