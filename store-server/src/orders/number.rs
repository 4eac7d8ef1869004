//! Order number generation
//!
//! Human-readable, unique-enough format: `<prefix>-<base36 millis>-<hex>`.
//! The unique index on orderNumber backs the negligible collision window.

use chrono::Utc;
use ring::rand::{SecureRandom, SystemRandom};

/// Render a non-negative number in base 36, uppercase
fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ascii")
}

/// Generate an order number like "TW-MFQ3K2H1-A41B9C2E"
pub fn generate_order_number(prefix: &str) -> String {
    let ts = to_base36(Utc::now().timestamp_millis().max(0) as u64);

    let rng = SystemRandom::new();
    let mut bytes = [0u8; 4];
    // Entropy failure here is unrecoverable enough that falling back to
    // zeros is acceptable; uniqueness is still enforced by the index
    let _ = rng.fill(&mut bytes);
    let rand = hex::encode_upper(bytes);

    format!("{prefix}-{ts}-{rand}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base36_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(46655), "ZZZ");
    }

    #[test]
    fn format_and_uniqueness() {
        let a = generate_order_number("TW");
        let b = generate_order_number("TW");
        assert!(a.starts_with("TW-"));
        assert_eq!(a.split('-').count(), 3);
        assert_eq!(a.split('-').next_back().unwrap().len(), 8);
        assert_ne!(a, b);
    }
}
