//! Namespaced id generation for user-created entities
//!
//! Ids look like `custom_s_1718000000000_k3x9q`: a fixed prefix, the
//! creation time in milliseconds and a short random suffix.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Prefix for custom skill ids
pub const CUSTOM_SKILL: &str = "custom_s";
/// Prefix for custom support card template ids
pub const CUSTOM_CARD: &str = "custom_sc";
/// Prefix for custom factor set template ids
pub const CUSTOM_FACTOR_SET: &str = "custom_inza";
/// Prefix for owned support card ids
pub const OWNED_CARD: &str = "user_sc";
/// Prefix for owned factor set ids
pub const OWNED_FACTOR_SET: &str = "user_inza";

/// Synthesize an id with `prefix` that `taken` does not report as used
pub fn fresh_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let mut rng = rand::thread_rng();
    loop {
        let suffix: String = (0..5)
            .map(|_| char::from(rng.sample(Alphanumeric)).to_ascii_lowercase())
            .collect();
        let id = format!("{prefix}_{millis}_{suffix}");
        if !taken(&id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_fresh_id_shape() {
        let id = fresh_id(CUSTOM_SKILL, |_| false);
        assert!(id.starts_with("custom_s_"));
        assert_eq!(id.rsplit('_').next().unwrap().len(), 5);
    }

    #[test]
    fn test_fresh_id_retries_on_collision() {
        let calls = Cell::new(0);
        let id = fresh_id(OWNED_CARD, |_| {
            calls.set(calls.get() + 1);
            calls.get() < 3
        });
        assert_eq!(calls.get(), 3);
        assert!(id.starts_with("user_sc_"));
    }
}
