// crates/novyra-config/src/secret.rs
// ============================================================================
// Module: Secret Values
// Description: Redacting wrapper for confidential environment values.
// Purpose: Keep secrets out of logs and compare them in constant time.
// Dependencies: subtle
// ============================================================================

//! ## Overview
//! [`SecretValue`] owns a confidential string such as `SECRET_KEY` or
//! `DEEPSEEK_API_KEY`. Formatting always redacts; callers must go through
//! [`SecretValue::expose`] to read the raw text.

use std::fmt;

use subtle::ConstantTimeEq;

/// Placeholder printed in place of secret material.
pub const REDACTED: &str = "********";
/// Minimum signing-key length in characters.
pub const MIN_SECRET_KEY_CHARS: usize = 50;
/// Minimum number of distinct characters in a signing key.
pub const MIN_SECRET_KEY_UNIQUE_CHARS: usize = 5;
/// Prefix the framework puts on generated development keys.
pub const INSECURE_SECRET_KEY_PREFIX: &str = "django-insecure-";

/// Confidential string value.
///
/// # Invariants
/// - `Debug` and `Display` never print the wrapped value.
/// - Equality is evaluated in constant time over the bytes.
#[derive(Clone)]
pub struct SecretValue(String);

impl SecretValue {
    /// Wraps a raw secret.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw secret text.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns true when the secret is empty or whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Returns the secret length in characters.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

/// Reason a signing key is considered weak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKeyWeakness {
    /// Fewer than [`MIN_SECRET_KEY_CHARS`] characters.
    TooShort,
    /// Fewer than [`MIN_SECRET_KEY_UNIQUE_CHARS`] distinct characters.
    TooFewUnique,
    /// Generated development key.
    InsecurePrefix,
}

impl SecretKeyWeakness {
    /// Returns the stable label used in diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TooShort => "too_short",
            Self::TooFewUnique => "too_few_unique",
            Self::InsecurePrefix => "insecure_prefix",
        }
    }
}

/// Checks a signing key against the framework's deployment heuristics.
///
/// The prefix check wins over length checks so generated keys are named as such.
#[must_use]
pub fn secret_key_weakness(key: &SecretValue) -> Option<SecretKeyWeakness> {
    let raw = key.expose();
    if raw.starts_with(INSECURE_SECRET_KEY_PREFIX) {
        return Some(SecretKeyWeakness::InsecurePrefix);
    }
    if key.char_len() < MIN_SECRET_KEY_CHARS {
        return Some(SecretKeyWeakness::TooShort);
    }
    let mut unique: Vec<char> = raw.chars().collect();
    unique.sort_unstable();
    unique.dedup();
    if unique.len() < MIN_SECRET_KEY_UNIQUE_CHARS {
        return Some(SecretKeyWeakness::TooFewUnique);
    }
    None
}

impl PartialEq for SecretValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl Eq for SecretValue {}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue(")?;
        f.write_str(REDACTED)?;
        f.write_str(")")
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::use_debug, reason = "Debug output is the behavior under test.")]

    use super::REDACTED;
    use super::SecretKeyWeakness;
    use super::SecretValue;
    use super::secret_key_weakness;

    #[test]
    fn debug_and_display_redact() {
        let secret = SecretValue::new("sk-live-123");
        assert_eq!(secret.to_string(), REDACTED);
        assert!(!format!("{secret:?}").contains("sk-live"));
    }

    #[test]
    fn equality_compares_contents() {
        assert_eq!(SecretValue::new("abc"), SecretValue::new("abc"));
        assert_ne!(SecretValue::new("abc"), SecretValue::new("abd"));
        assert_ne!(SecretValue::new("abc"), SecretValue::new("abcd"));
    }

    #[test]
    fn blank_detection_trims() {
        assert!(SecretValue::new("  ").is_blank());
        assert!(!SecretValue::new(" x ").is_blank());
    }

    #[test]
    fn weak_keys_are_classified() {
        let generated = SecretValue::new(format!("django-insecure-{}", "k".repeat(60)));
        assert_eq!(secret_key_weakness(&generated), Some(SecretKeyWeakness::InsecurePrefix));
        let short = SecretValue::new("short");
        assert_eq!(secret_key_weakness(&short), Some(SecretKeyWeakness::TooShort));
        let repetitive = SecretValue::new("ab".repeat(40));
        assert_eq!(secret_key_weakness(&repetitive), Some(SecretKeyWeakness::TooFewUnique));
        let strong = SecretValue::new("q8#Lm2!vZx9@Rt4$Wp7^Ny1&Ks6*Hd3(Jf5)Gb0-Cu8=Ea2+Yo7");
        assert_eq!(secret_key_weakness(&strong), None);
    }
}
