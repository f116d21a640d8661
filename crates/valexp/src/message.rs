//! Localized error messages
//!
//! Error codes are turned into display strings through a [`MessageResolver`].
//! The crate ships English and Japanese catalogs; callers can layer their own
//! locales on top with [`MessageCatalog::builder`].
//!
//! Resolution order for a code:
//!
//! 1. the requested locale (`ja-JP`)
//! 2. its bare language (`ja`)
//! 3. the default locale (`en`)
//! 4. the raw code string (`ERR_VALUE_ENUM`)
//!
//! Templates contain `{{key}}` placeholders filled from the violation's
//! params. The implicit `name` binding is the error path.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::{Captures, Regex};

use crate::error::{ErrorCode, SchemaError, ValidationError, Violation};

/// Environment variable holding the process-wide locale tag.
pub const LOCALE_ENV_VAR: &str = "OAS_VALEXP_LANG";

const BUNDLED_EN: &str = include_str!("../locales/en.json");
const BUNDLED_JA: &str = include_str!("../locales/ja.json");

static LOCALE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}(-[A-Z]{2})?$").unwrap());

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").unwrap());

static BUNDLED: LazyLock<Arc<MessageCatalog>> =
    LazyLock::new(|| Arc::new(MessageCatalog::builder().with_bundled().build()));

static PROCESS_LOCALE: LazyLock<Locale> = LazyLock::new(|| {
    let locale = std::env::var(LOCALE_ENV_VAR)
        .ok()
        .and_then(|tag| Locale::parse(&tag).ok())
        .unwrap_or_default();
    tracing::debug!(locale = %locale, "resolved process locale");
    locale
});

// ============================================================================
// ERRORS
// ============================================================================

/// Errors raised while building a message catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The locale tag is not `xx` or `xx-YY`.
    #[error("invalid locale tag `{tag}`: expected `xx` or `xx-YY`")]
    InvalidLocale { tag: String },

    /// The catalog source is not a JSON object of strings.
    #[error("catalog for `{locale}` is not a JSON object of strings: {source}")]
    Parse {
        locale: String,
        #[source]
        source: serde_json::Error,
    },

    /// The catalog names a code that does not exist.
    #[error("catalog for `{locale}` has unknown code `{code}`")]
    UnknownCode { locale: String, code: String },
}

// ============================================================================
// LOCALE
// ============================================================================

/// A validated locale tag: a two-letter language, optionally followed by a
/// two-letter region (`en`, `ja`, `pt-BR`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale(String);

impl Locale {
    /// The locale every catalog falls back to.
    pub const DEFAULT_TAG: &'static str = "en";

    pub fn parse(tag: &str) -> Result<Self, CatalogError> {
        if LOCALE_TAG.is_match(tag) {
            Ok(Self(tag.to_owned()))
        } else {
            Err(CatalogError::InvalidLocale {
                tag: tag.to_owned(),
            })
        }
    }

    /// The locale selected once per process from [`LOCALE_ENV_VAR`].
    ///
    /// Missing or malformed values fall back to [`Locale::DEFAULT_TAG`].
    pub fn process() -> &'static Locale {
        &PROCESS_LOCALE
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The language part of the tag (`ja` for `ja-JP`).
    #[must_use]
    pub fn language(&self) -> &str {
        &self.0[..2]
    }

    #[must_use]
    pub fn has_region(&self) -> bool {
        self.0.len() > 2
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self(Self::DEFAULT_TAG.to_owned())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Looks up the message template for a code in exactly one locale.
///
/// Fallback across locales is handled by [`Reporter`]; implementations only
/// answer for the locale they are asked about.
pub trait MessageResolver: Send + Sync + fmt::Debug {
    fn template(&self, locale: &str, code: ErrorCode) -> Option<&str>;
}

/// In-memory message catalog keyed by locale tag and error code.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    locales: HashMap<String, HashMap<ErrorCode, String>>,
}

impl MessageCatalog {
    /// The shared catalog built from the bundled `en` and `ja` files.
    pub fn bundled() -> Arc<MessageCatalog> {
        Arc::clone(&BUNDLED)
    }

    pub fn builder() -> MessageCatalogBuilder {
        MessageCatalogBuilder::default()
    }

    /// Locale tags this catalog has entries for.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }

    /// Whether `locale` has a template for every code.
    #[must_use]
    pub fn is_complete(&self, locale: &str) -> bool {
        self.locales
            .get(locale)
            .is_some_and(|entries| ErrorCode::ALL.iter().all(|c| entries.contains_key(c)))
    }
}

impl MessageResolver for MessageCatalog {
    fn template(&self, locale: &str, code: ErrorCode) -> Option<&str> {
        self.locales.get(locale)?.get(&code).map(String::as_str)
    }
}

/// Builder for [`MessageCatalog`].
#[derive(Debug, Default)]
pub struct MessageCatalogBuilder {
    locales: HashMap<String, HashMap<ErrorCode, String>>,
}

impl MessageCatalogBuilder {
    /// Adds the bundled `en` and `ja` catalogs.
    ///
    /// Bundled entries with unknown codes are skipped; completeness is
    /// enforced by the crate's tests.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_bundled(mut self) -> Self {
        for (tag, source) in [("en", BUNDLED_EN), ("ja", BUNDLED_JA)] {
            let raw: HashMap<String, String> = serde_json::from_str(source).unwrap_or_default();
            let entries = self.locales.entry(tag.to_owned()).or_default();
            for (code, template) in raw {
                if let Ok(code) = code.parse() {
                    entries.insert(code, template);
                }
            }
        }
        self
    }

    /// Adds (or overrides) entries for `locale` from a JSON object mapping
    /// `ERR_*` codes to templates.
    pub fn add_json(mut self, locale: &str, source: &str) -> Result<Self, CatalogError> {
        let locale = Locale::parse(locale)?;
        let raw: HashMap<String, String> =
            serde_json::from_str(source).map_err(|source| CatalogError::Parse {
                locale: locale.to_string(),
                source,
            })?;

        let entries = self.locales.entry(locale.0.clone()).or_default();
        for (code, template) in raw {
            let code = code.parse().map_err(|_| CatalogError::UnknownCode {
                locale: locale.to_string(),
                code,
            })?;
            entries.insert(code, template);
        }
        Ok(self)
    }

    /// Adds (or overrides) a single template.
    pub fn insert(
        mut self,
        locale: &str,
        code: ErrorCode,
        template: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let locale = Locale::parse(locale)?;
        self.locales
            .entry(locale.0)
            .or_default()
            .insert(code, template.into());
        Ok(self)
    }

    pub fn build(self) -> MessageCatalog {
        MessageCatalog {
            locales: self.locales,
        }
    }
}

// ============================================================================
// REPORTER
// ============================================================================

/// Turns [`Violation`]s into localized [`SchemaError`]s and
/// [`ValidationError`]s.
#[derive(Debug, Clone)]
pub struct Reporter {
    resolver: Arc<dyn MessageResolver>,
    locale: Locale,
}

impl Reporter {
    pub fn new(resolver: Arc<dyn MessageResolver>, locale: Locale) -> Self {
        Self { resolver, locale }
    }

    /// Bundled catalogs with an explicit locale.
    pub fn with_locale(locale: Locale) -> Self {
        Self::new(MessageCatalog::bundled(), locale)
    }

    #[must_use]
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// The template for `code`, following the locale fallback chain.
    /// Falls back to the code itself when no catalog has an entry.
    pub fn template(&self, code: ErrorCode) -> &str {
        let mut chain = vec![self.locale.as_str()];
        if self.locale.has_region() {
            chain.push(self.locale.language());
        }
        chain.push(Locale::DEFAULT_TAG);

        chain
            .into_iter()
            .find_map(|tag| self.resolver.template(tag, code))
            .unwrap_or(code.as_str())
    }

    /// Renders the message for a violation.
    pub fn render(&self, violation: &Violation) -> String {
        substitute(
            self.template(violation.code),
            &violation.path,
            &violation.params,
        )
    }

    pub fn schema_error(&self, violation: Violation) -> SchemaError {
        let message = self.render(&violation);
        SchemaError {
            path: violation.path,
            code: violation.code,
            message,
        }
    }

    pub fn validation_error(&self, violation: Violation) -> ValidationError {
        let message = self.render(&violation);
        ValidationError {
            path: violation.path,
            code: violation.code,
            message,
            params: violation.params,
        }
    }
}

impl Default for Reporter {
    /// Bundled catalogs with the process locale.
    fn default() -> Self {
        Self::with_locale(Locale::process().clone())
    }
}

/// Replaces `{{key}}` placeholders; unknown keys are left as written.
fn substitute(template: &str, name: &str, params: &[(Cow<'static, str>, String)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let key = &caps[1];
            params
                .iter()
                .find(|(k, _)| k.as_ref() == key)
                .map(|(_, v)| v.as_str())
                .or_else(|| (key == "name").then_some(name))
                .unwrap_or(&caps[0])
                .to_owned()
        })
        .into_owned()
}

// ============================================================================
// TESTS
// ============================================================================
