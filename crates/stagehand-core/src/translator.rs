//! Locale text resources.
//!
//! Loads a phrase table from `<locale_dir>/<language>.json` and serves
//! `%{name}`-interpolated translations. Bundled languages are pinned by a
//! SHA-256 of their canonical JSON encoding: editing a bundled file is
//! rejected so that users keep their changes in the untracked `custom`
//! language and stay updatable.
//!
//! Independent of the deployment pipeline; callers only rely on
//! [`Translator::t`] and [`Translator::reload`].

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::sync::Arc;

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, error};

use crate::config::TranslatorConfig;
use crate::error::TranslationError;

/// Flattened phrase table: nested JSON objects become dot-separated keys.
pub type Phrases = HashMap<String, String>;

/// Callback fired after a successful [`Translator::reload`], e.g. to
/// rebuild schedules that embed translated text.
pub type ReloadHook = Arc<dyn Fn() + Send + Sync>;

/// Bundled languages and the SHA-256 of their canonical JSON encoding.
const PINNED_LOCALES: &[(&str, &str)] = &[
    (
        "en",
        "9390be18413ab52f8396f723417db6e55288c432be2f2015690bc46e0433fb3f",
    ),
    (
        "es",
        "9703ee81efb2ff3716546b3f455db4ad394399cfaad3fc9dd62b5d565712a869",
    ),
    (
        "fr",
        "cd640ae9904eb2f608daf7bbae59d030e429b0d8c8bead58f33fa14d37b7b829",
    ),
];

/// Translation service over a single loaded language.
pub struct Translator {
    config: TranslatorConfig,
    phrases: Phrases,
    reload_hook: Option<ReloadHook>,
}

// Manual impl: the reload hook is an opaque closure.
impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("language", &self.config.language)
            .field("phrases", &self.phrases.len())
            .field("reload_hook", &self.reload_hook.is_some())
            .finish()
    }
}

impl Translator {
    /// Load the configured language.
    pub fn new(config: TranslatorConfig) -> Result<Self, TranslationError> {
        let phrases = load_phrases(&config)?;
        debug!(language = %config.language, keys = phrases.len(), "loaded locale");
        Ok(Self {
            config,
            phrases,
            reload_hook: None,
        })
    }

    /// Register a hook fired after every successful reload.
    pub fn set_reload_hook(&mut self, hook: ReloadHook) {
        self.reload_hook = Some(hook);
    }

    /// The loaded language.
    pub fn language(&self) -> &str {
        &self.config.language
    }

    /// Translate `key`, substituting `%{name}` placeholders from `params`.
    ///
    /// A missing key is logged and returned as-is; translation never
    /// fails at the call site.
    pub fn t(&self, key: &str, params: &[(&str, &str)]) -> String {
        match self.phrases.get(key) {
            Some(template) => interpolate(template, params),
            None => {
                error!(key, language = %self.config.language, "missing translation key");
                key.to_string()
            }
        }
    }

    /// Swap in a new phrase table, then fire the reload hook.
    pub fn reload(&mut self, phrases: Phrases) {
        self.phrases = phrases;
        debug!(keys = self.phrases.len(), "reloaded phrases");
        if let Some(hook) = &self.reload_hook {
            hook();
        }
    }
}

fn load_phrases(config: &TranslatorConfig) -> Result<Phrases, TranslationError> {
    let path = config.locale_file();
    let raw = fs::read_to_string(&path).map_err(|e| TranslationError::Read {
        path: path.clone(),
        message: e.to_string(),
    })?;

    let value: Value = serde_json::from_str(&raw).map_err(|e| TranslationError::Parse {
        path: path.clone(),
        message: e.to_string(),
    })?;

    if let Some(pinned) = pinned_digest(&config.language) {
        let actual = canonical_digest(&value);
        if actual != pinned {
            return Err(TranslationError::Tampered {
                language: config.language.clone(),
            });
        }
    }

    let Value::Object(map) = value else {
        return Err(TranslationError::NotAnObject { path });
    };

    let mut phrases = Phrases::new();
    for (key, value) in &map {
        flatten(key, value, &mut phrases);
    }
    Ok(phrases)
}

fn pinned_digest(language: &str) -> Option<&'static str> {
    PINNED_LOCALES
        .iter()
        .find(|(lang, _)| *lang == language)
        .map(|(_, digest)| *digest)
}

/// SHA-256 over the compact, sorted-key re-encoding of `value`.
/// Re-encoding makes the digest independent of whitespace and line
/// endings in the file on disk.
fn canonical_digest(value: &Value) -> String {
    let canonical = serde_json::to_string(value).unwrap_or_default();
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

fn flatten(prefix: &str, value: &Value, out: &mut Phrases) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten(&format!("{prefix}.{key}"), nested, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in params {
        out = out.replace(&format!("%{{{name}}}"), value);
    }
    out
}
