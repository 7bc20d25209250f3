//! Secret-safe logging helpers
//!
//! API keys never reach logs or printed configuration unmasked.

use std::fmt;

/// Masked API key for log fields
///
/// Shows the first 8 characters followed by `***`.
#[derive(Clone, Debug)]
pub struct SensitiveApiKey<'a> {
    inner: &'a str,
}

impl<'a> SensitiveApiKey<'a> {
    /// # Example
    /// ```
    /// use llm_orchestrator::logging::SensitiveApiKey;
    ///
    /// let key = "sk-or-v1-abcdef123456";
    /// assert_eq!(SensitiveApiKey::new(key).to_string(), "sk-or-v1***");
    /// ```
    pub fn new(key: &'a str) -> Self {
        Self { inner: key }
    }
}

impl<'a> fmt::Display for SensitiveApiKey<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible_len = 8.min(self.inner.len());
        if self.inner.len() <= visible_len || !self.inner.is_char_boundary(visible_len) {
            write!(f, "***")
        } else {
            write!(f, "{}***", &self.inner[..visible_len])
        }
    }
}

/// Does this look like a credential?
pub fn is_sensitive_key(value: &str) -> bool {
    const SENSITIVE_PREFIXES: [&str; 6] = ["sk-or-", "sk-ant-", "sk-", "pk-", "Bearer sk-", "Bearer pk-"];

    SENSITIVE_PREFIXES.iter().any(|prefix| value.starts_with(prefix))
}

/// Mask `value` if it looks like a credential, pass it through otherwise
pub fn sanitize_log_value(value: &str) -> String {
    if is_sensitive_key(value) {
        SensitiveApiKey::new(value).to_string()
    } else {
        value.to_string()
    }
}

/// Mask an API key for display
///
/// Shows first 7 and last 4 characters: "sk-or-v1-1234567890abcdef" -> "sk-or-v...cdef"
pub fn mask_api_key(key: &str) -> String {
    if key.len() <= 11 || !key.is_char_boundary(7) || !key.is_char_boundary(key.len() - 4) {
        return "***".to_string();
    }

    format!("{}...{}", &key[..7], &key[key.len() - 4..])
}
