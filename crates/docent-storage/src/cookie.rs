//! Cookie-jar backend.
//!
//! Keeps decoded name/value pairs and speaks the two wire shapes a host
//! needs: the request `Cookie` header (`a=1; b=2`) for import/export, and
//! one `Set-Cookie` line per key carrying the configured attributes.
//! Names and values are percent-encoded.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::backend::{read, write, StorageBackend};
use crate::error::{Error, Result};

/// Browsers reject cookies whose `name=value` exceeds this many bytes.
pub const MAX_COOKIE_BYTES: usize = 4096;

/// Attributes attached to every `Set-Cookie` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieAttributes {
    /// Cookie path.
    #[serde(default = "default_path")]
    pub path: String,

    /// Lifetime in days.
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,

    /// `SameSite` policy.
    #[serde(default = "default_same_site")]
    pub same_site: String,

    /// Add the `Secure` flag.
    #[serde(default)]
    pub secure: bool,
}

fn default_path() -> String {
    "/".to_string()
}

fn default_max_age_days() -> u32 {
    365
}

fn default_same_site() -> String {
    "Lax".to_string()
}

impl Default for CookieAttributes {
    fn default() -> Self {
        Self {
            path: default_path(),
            max_age_days: default_max_age_days(),
            same_site: default_same_site(),
            secure: false,
        }
    }
}

/// Backend holding values as cookies.
#[derive(Debug, Default)]
pub struct CookieBackend {
    attributes: CookieAttributes,
    jar: RwLock<BTreeMap<String, String>>,
}

impl CookieBackend {
    /// Create an empty jar with default attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty jar with the given attributes.
    pub fn with_attributes(attributes: CookieAttributes) -> Self {
        Self {
            attributes,
            jar: RwLock::default(),
        }
    }

    /// Populate a jar from a `Cookie` request header.
    ///
    /// Pairs that are malformed or not valid percent-encoded UTF-8 are
    /// skipped with a warning.
    pub fn from_header(header: &str, attributes: CookieAttributes) -> Self {
        let mut jar = BTreeMap::new();
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((name, value)) = pair.split_once('=') else {
                log::warn!("Skipping cookie without '=': {pair}");
                continue;
            };
            match (urlencoding::decode(name.trim()), urlencoding::decode(value.trim())) {
                (Ok(name), Ok(value)) => {
                    jar.insert(name.into_owned(), value.into_owned());
                }
                _ => log::warn!("Skipping undecodable cookie: {pair}"),
            }
        }

        Self {
            attributes,
            jar: RwLock::new(jar),
        }
    }

    /// Serialize the jar as a `Cookie` request header.
    pub fn header(&self) -> String {
        read(&self.jar)
            .iter()
            .map(|(name, value)| encode_pair(name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// `Set-Cookie` line for `key`, if it is stored.
    pub fn set_cookie(&self, key: &str) -> Option<String> {
        let jar = read(&self.jar);
        let value = jar.get(key)?;
        let attrs = &self.attributes;

        let mut line = format!(
            "{}; Path={}; Max-Age={}; SameSite={}",
            encode_pair(key, value),
            attrs.path,
            u64::from(attrs.max_age_days) * 86_400,
            attrs.same_site
        );
        if attrs.secure {
            line.push_str("; Secure");
        }
        Some(line)
    }

    /// `Set-Cookie` line that expires `key` immediately.
    pub fn expire_cookie(&self, key: &str) -> String {
        format!(
            "{}=; Path={}; Max-Age=0",
            urlencoding::encode(key),
            self.attributes.path
        )
    }
}

fn encode_pair(name: &str, value: &str) -> String {
    format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
}

impl StorageBackend for CookieBackend {
    fn name(&self) -> &'static str {
        "cookie"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(read(&self.jar).get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        let size = encode_pair(key, &value).len();
        if size > MAX_COOKIE_BYTES {
            return Err(Error::backend(
                "cookie",
                format!("'{key}' is {size} bytes encoded (limit {MAX_COOKIE_BYTES})"),
            ));
        }
        write(&self.jar).insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        write(&self.jar).remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(read(&self.jar).keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip_encodes_separators() {
        let backend = CookieBackend::new();
        backend
            .set("docent:search", "a; b=c, d".to_string())
            .unwrap();

        let header = backend.header();
        assert!(!header.contains(' '));
        assert_eq!(header.matches(';').count(), 0);

        let restored = CookieBackend::from_header(&header, CookieAttributes::default());
        assert_eq!(
            restored.get("docent:search").unwrap().as_deref(),
            Some("a; b=c, d")
        );
    }

    #[test]
    fn test_from_header_skips_garbage() {
        let backend =
            CookieBackend::from_header("a=1; junk; b=%FF; c=3", CookieAttributes::default());
        assert_eq!(backend.keys().unwrap(), vec!["a", "c"]);
    }

    #[test]
    fn test_set_cookie_line() {
        let backend = CookieBackend::with_attributes(CookieAttributes {
            secure: true,
            max_age_days: 1,
            ..Default::default()
        });
        backend.set("theme", "dark".to_string()).unwrap();

        assert_eq!(
            backend.set_cookie("theme").unwrap(),
            "theme=dark; Path=/; Max-Age=86400; SameSite=Lax; Secure"
        );
        assert!(backend.set_cookie("missing").is_none());
        assert_eq!(backend.expire_cookie("theme"), "theme=; Path=/; Max-Age=0");
    }

    #[test]
    fn test_oversized_value_rejected() {
        let backend = CookieBackend::new();
        let err = backend.set("big", "x".repeat(MAX_COOKIE_BYTES)).unwrap_err();
        assert!(err.to_string().contains("limit"));
        assert!(backend.get("big").unwrap().is_none());
    }
}
