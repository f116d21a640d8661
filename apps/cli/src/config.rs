//! Layered settings for the `valexp` binary.
//!
//! Sources, lowest priority first:
//! 1. [`ValExpConfig::default`]
//! 2. the TOML file given with `--config`
//! 3. `VALEXP_*` environment variables (`VALEXP_LOCALE`, `VALEXP_MAX_DEPTH`, ...)
//! 4. command-line flags

use std::path::Path;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use oas_valexp::ValExpConfig;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "VALEXP_";

const KEYS: [&str; 4] = ["locale", "max_depth", "strict_combinators", "strict_required"];

/// Flag values that win over every other source.
#[derive(Debug, Default)]
pub struct Overrides {
    pub locale: Option<String>,
    pub max_depth: Option<usize>,
    pub strict: bool,
}

pub fn figment(file: Option<&Path>, overrides: &Overrides) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(ValExpConfig::default()));

    if let Some(path) = file {
        figment = figment.merge(Toml::file_exact(path));
    }

    // VALEXP_LOG belongs to the log filter, so only config keys are taken.
    figment = figment.merge(Env::prefixed(ENV_PREFIX).only(&KEYS));

    if let Some(locale) = &overrides.locale {
        figment = figment.merge(("locale", locale));
    }
    if let Some(depth) = overrides.max_depth {
        figment = figment.merge(("max_depth", depth));
    }
    if overrides.strict {
        figment = figment
            .merge(("strict_combinators", true))
            .merge(("strict_required", true));
    }

    figment
}

pub fn load(file: Option<&Path>, overrides: &Overrides) -> anyhow::Result<ValExpConfig> {
    let config: ValExpConfig = figment(file, overrides)
        .extract()
        .context("failed to load configuration")?;
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

/// The effective settings rendered as TOML.
pub fn render(config: &ValExpConfig) -> anyhow::Result<String> {
    toml::to_string_pretty(config).context("failed to render configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_without_sources() {
        Jail::expect_with(|_| {
            let config = load(None, &Overrides::default()).unwrap();
            assert_eq!(config, ValExpConfig::default());
            Ok(())
        });
    }

    #[test]
    fn file_then_env_then_flags() {
        Jail::expect_with(|jail| {
            jail.create_file("valexp.toml", "locale = \"ja\"\nmax_depth = 8\n")?;
            let path = Path::new("valexp.toml");

            let config = load(Some(path), &Overrides::default()).unwrap();
            assert_eq!(config.locale.as_deref(), Some("ja"));
            assert_eq!(config.max_depth, 8);

            jail.set_env("VALEXP_MAX_DEPTH", "16");
            jail.set_env("VALEXP_LOG", "debug");
            let config = load(Some(path), &Overrides::default()).unwrap();
            assert_eq!(config.max_depth, 16);

            let overrides = Overrides {
                locale: Some("en".into()),
                max_depth: Some(4),
                strict: true,
            };
            let config = load(Some(path), &overrides).unwrap();
            assert_eq!(config.locale.as_deref(), Some("en"));
            assert_eq!(config.max_depth, 4);
            assert!(config.strict_combinators && config.strict_required);
            Ok(())
        });
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("valexp.toml", "strict = true\n")?;
            assert!(load(Some(Path::new("valexp.toml")), &Overrides::default()).is_err());
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_an_error() {
        Jail::expect_with(|_| {
            assert!(load(Some(Path::new("nope.toml")), &Overrides::default()).is_err());
            Ok(())
        });
    }

    #[test]
    fn renders_toml() {
        let text = render(&ValExpConfig::strict()).unwrap();
        assert!(text.contains("max_depth = 64"));
        assert!(text.contains("strict_required = true"));
        assert!(!text.contains("locale"));
    }
}
