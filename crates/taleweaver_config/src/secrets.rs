//! API key selection.

use rand::seq::SliceRandom;
use taleweaver_error::{GeminiError, GeminiErrorKind, TaleweaverResult};
use tracing::info;

/// Environment variable holding several comma-separated keys.
pub const KEYS_VAR: &str = "GEMINI_API_KEYS";
/// Environment variable holding a single key.
pub const KEY_VAR: &str = "GEMINI_API_KEY";

/// Pool of Gemini API keys, one of which is chosen per run.
///
/// # Examples
///
/// ```
/// use taleweaver_config::ApiKeys;
///
/// let keys = ApiKeys::parse(Some("key-a, key-b,,".to_string()), None);
/// assert_eq!(keys.len(), 2);
/// assert!(["key-a", "key-b"].contains(&keys.choose().unwrap().as_str()));
/// ```
#[derive(Clone, Default)]
pub struct ApiKeys {
    keys: Vec<String>,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeys")
            .field("count", &self.keys.len())
            .finish()
    }
}

impl ApiKeys {
    /// Read keys from `GEMINI_API_KEYS`, falling back to `GEMINI_API_KEY`.
    pub fn from_env() -> Self {
        Self::parse(std::env::var(KEYS_VAR).ok(), std::env::var(KEY_VAR).ok())
    }

    /// Combine a comma-separated list and a single key. Blank entries are dropped.
    pub fn parse(list: Option<String>, single: Option<String>) -> Self {
        let mut keys: Vec<String> = list
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
        if keys.is_empty() {
            keys.extend(
                single
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty()),
            );
        }
        Self { keys }
    }

    /// Number of keys available.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when no key is configured.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Pick one key uniformly at random.
    pub fn choose(&self) -> TaleweaverResult<String> {
        let key = self
            .keys
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| GeminiError::new(GeminiErrorKind::MissingApiKey))?;
        info!(
            available = self.keys.len(),
            key = %redact(&key),
            "Selected Gemini API key"
        );
        Ok(key)
    }
}

/// Last four characters of a secret, for logs.
///
/// # Examples
///
/// ```
/// use taleweaver_config::redact;
///
/// assert_eq!(redact("AIzaSecretValue1234"), "...1234");
/// assert_eq!(redact("abc"), "...");
/// ```
pub fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "...".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("...{tail}")
}
