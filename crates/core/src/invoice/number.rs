//! Invoice number generation.

use chrono::{DateTime, Utc};
use rand::Rng;

/// Prefix of every invoice number.
pub const INVOICE_PREFIX: &str = "INV";

/// Generates an invoice number such as `INV-1739812345123456-4821`.
///
/// The middle part is the creation time in microseconds, the suffix a random
/// four-digit disambiguator. Uniqueness is enforced by the database; callers
/// retry once with a fresh number on conflict.
#[must_use]
pub fn generate_invoice_number(now: DateTime<Utc>) -> String {
    let suffix: u16 = rand::rng().random_range(0..10_000);
    format!("{INVOICE_PREFIX}-{}-{suffix:04}", now.timestamp_micros())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_number_format() {
        let now = Utc::now();
        let number = generate_invoice_number(now);
        let parts: Vec<&str> = number.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "INV");
        assert_eq!(parts[1], now.timestamp_micros().to_string());
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_numbers_at_same_instant_usually_differ() {
        let now = Utc::now();
        let numbers: HashSet<String> = (0..50).map(|_| generate_invoice_number(now)).collect();
        assert!(numbers.len() > 1);
    }
}
