//! Utility functions and helpers.

pub mod http;
#[cfg(test)]
pub(crate) mod testing;

use uuid::Uuid;

/// Generate a fresh record id.
///
/// Unique enough for interactive use; not meant to be unguessable.
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id() {
        let a = generate_id();
        let b = generate_id();

        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
