//! Runtime-extensible message lookup.
//!
//! A [`Translations`] registry is created by the host and passed to the
//! components that need user-visible strings. Lookups fall back from a
//! regional locale to its language (`fr-CA` → `fr`) and finally to the base
//! locale.
//!
//! ```
//! use docent_core::i18n::Translations;
//!
//! let mut t = Translations::new("en");
//! t.register("en", [("greeting", "Hello")]);
//! t.register("fr", [("greeting", "Bonjour")]);
//!
//! assert_eq!(t.translate("fr-CA", "greeting"), Some("Bonjour"));
//! assert_eq!(t.translate("de", "greeting"), Some("Hello"));
//! ```

use std::collections::HashMap;

/// Locale-keyed message tables with fallback to a base locale.
#[derive(Debug, Clone)]
pub struct Translations {
    base_locale: String,
    tables: HashMap<String, HashMap<String, String>>,
}

impl Translations {
    /// Create an empty registry with the given base locale.
    pub fn new(base_locale: impl Into<String>) -> Self {
        Self {
            base_locale: normalize_locale(&base_locale.into()),
            tables: HashMap::new(),
        }
    }

    /// The fallback locale.
    pub fn base_locale(&self) -> &str {
        &self.base_locale
    }

    /// Add or override messages for a locale.
    pub fn register<I, K, V>(&mut self, locale: &str, messages: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table = self.tables.entry(normalize_locale(locale)).or_default();
        for (key, value) in messages {
            table.insert(key.into(), value.into());
        }
    }

    /// Locales that have at least one registered message.
    pub fn locales(&self) -> Vec<&str> {
        let mut locales: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        locales.sort_unstable();
        locales
    }

    /// Look up `key` for `locale`, falling back to the language and then
    /// the base locale.
    pub fn translate(&self, locale: &str, key: &str) -> Option<&str> {
        self.candidates(locale)
            .into_iter()
            .find_map(|loc| self.tables.get(&loc).and_then(|t| t.get(key)))
            .map(String::as_str)
    }

    /// Like [`translate`](Self::translate), substituting `{name}`
    /// placeholders and falling back to `default` when no table has `key`.
    pub fn format(&self, locale: &str, key: &str, default: &str, args: &[(&str, &str)]) -> String {
        let mut text = self.translate(locale, key).unwrap_or(default).to_string();
        for (name, value) in args {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }

    fn candidates(&self, locale: &str) -> Vec<String> {
        let locale = normalize_locale(locale);
        let mut out = vec![locale.clone()];
        if let Some((language, _)) = locale.split_once('-') {
            out.push(language.to_string());
        }
        if !out.contains(&self.base_locale) {
            out.push(self.base_locale.clone());
        }
        out
    }
}

impl Default for Translations {
    fn default() -> Self {
        Self::new("en")
    }
}

fn normalize_locale(locale: &str) -> String {
    locale.trim().replace('_', "-").to_lowercase()
}
