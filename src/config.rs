//! Contains everything related to configuration.
//!
//! All default values for configurable aspects of the engine are defined in this
//! module, including *settings*, highlight *colors*, and external *formatters*.
//!
//! At a minimum, [`Configuration::default()`] is sufficient for initializing an
//! editor. However, the normal process is to apply multiple tiers of configuration,
//! all optional, resulting in a final blended configuration.
//!
//! External configuration files are expected to be formatted according to the
//! [TOML specification](https://toml.io).
//!
//! The default method of loading an external configuration file via
//! [`Configuration::load()`] will try to locate files in the following locations in
//! order of precedence:
//!
//! * `$HOME/.hydrorc`
//! * `$HOME/.hydro/hydrorc`
//! * `$HOME/.config/hydro/hydrorc`

use crate::command::History;
use crate::error::{Error, Result};
use crate::opt::Options;
use crate::search::{SearchOptions, SearchSession};
use crate::syntax::Category;
use crate::sys::{self, AsString};
use crate::theme::Theme;
use crate::wrap::Wrapper;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A configuration representing all aspects of the editing experience.
pub struct Configuration {
    /// A collection of configurable settings that control the behavior of editors.
    pub settings: Settings,

    /// Colors used for syntax highlighting.
    pub theme: Theme,

    /// A map of language names to formatter command lines.
    pub formatters: IndexMap<String, String>,
}

pub struct Settings {
    pub undo_limit: usize,
    pub wrap_cache_size: usize,
    pub search_history_size: usize,
    pub case_sensitive: bool,
    pub whole_word: bool,
    pub regex: bool,
    pub insert_mode: bool,
    pub width: usize,
    pub height: usize,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ExternalConfiguration {
    settings: Option<ExternalSettings>,
    colors: Option<HashMap<String, u8>>,
    formatters: Option<IndexMap<String, String>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ExternalSettings {
    #[serde(rename = "undo-limit")]
    undo_limit: Option<usize>,

    #[serde(rename = "wrap-cache-size")]
    wrap_cache_size: Option<usize>,

    #[serde(rename = "search-history-size")]
    search_history_size: Option<usize>,

    #[serde(rename = "case-sensitive")]
    case_sensitive: Option<bool>,

    #[serde(rename = "whole-word")]
    whole_word: Option<bool>,

    regex: Option<bool>,

    #[serde(rename = "insert-mode")]
    insert_mode: Option<bool>,

    width: Option<usize>,
    height: Option<usize>,
}

impl Settings {
    /// Applies the external settings `ext` on top of `self`.
    fn apply(&mut self, ext: Option<ExternalSettings>) {
        if let Some(ext) = ext {
            self.undo_limit = ext.undo_limit.unwrap_or(self.undo_limit);
            self.wrap_cache_size = ext.wrap_cache_size.unwrap_or(self.wrap_cache_size);
            self.search_history_size = ext
                .search_history_size
                .unwrap_or(self.search_history_size);
            self.case_sensitive = ext.case_sensitive.unwrap_or(self.case_sensitive);
            self.whole_word = ext.whole_word.unwrap_or(self.whole_word);
            self.regex = ext.regex.unwrap_or(self.regex);
            self.insert_mode = ext.insert_mode.unwrap_or(self.insert_mode);
            self.width = ext.width.unwrap_or(self.width);
            self.height = ext.height.unwrap_or(self.height);
        }
    }

    /// Applies the relevant settings from `opts` on top of `self`.
    pub fn apply_opts(&mut self, opts: &Options) {
        self.width = opts.width.unwrap_or(self.width);
        self.height = opts.height.unwrap_or(self.height);
        self.case_sensitive = opts.case_sensitive.unwrap_or(self.case_sensitive);
        self.whole_word = opts.whole_word.unwrap_or(self.whole_word);
        self.regex = opts.regex.unwrap_or(self.regex);
    }

    /// Returns the search options implied by these settings.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            case_strict: self.case_sensitive,
            whole_word: self.whole_word,
            regex: self.regex,
            ..SearchOptions::default()
        }
    }
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            undo_limit: History::DEFAULT_LIMIT,
            wrap_cache_size: Wrapper::DEFAULT_CAPACITY,
            search_history_size: SearchSession::DEFAULT_HISTORY_LIMIT,
            case_sensitive: true,
            whole_word: false,
            regex: false,
            insert_mode: true,
            width: 80,
            height: 24,
        }
    }
}

impl Configuration {
    /// A collection of resource files to try loading in order of precedence.
    const TRY_FILES: [&str; 3] = [".hydrorc", ".hydro/hydrorc", ".config/hydro/hydrorc"];

    /// Returns a configuration that is formed by attempting to load a resource file
    /// from well-known locations.
    pub fn load() -> Result<Configuration> {
        let mut config = Configuration::default();
        let root_path = sys::home_dir();
        for try_path in Self::TRY_FILES {
            let path = root_path.join(try_path);
            if path.exists() {
                let ext = Self::read_file(&path)?;
                config.apply(ext)?;
                break;
            }
        }
        Ok(config)
    }

    /// Returns a configuration loaded from the resource file at `path`.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Configuration> {
        let mut config = Configuration::default();
        let ext = Self::read_file(path.as_ref())?;
        config.apply(ext)?;
        Ok(config)
    }

    /// Returns a configuration parsed from `content`, where `path` is used only for
    /// error reporting.
    pub fn parse(path: &str, content: &str) -> Result<Configuration> {
        let mut config = Configuration::default();
        let ext = toml::from_str::<ExternalConfiguration>(content)
            .map_err(|e| Error::configuration(path, &e))?;
        config.apply(ext)?;
        Ok(config)
    }

    /// Applies the relevant settings from `opts` on top of `self`.
    pub fn apply_opts(&mut self, opts: &Options) {
        self.settings.apply_opts(opts);
    }

    /// Applies the external configuration `ext` on top of `self`.
    fn apply(&mut self, ext: ExternalConfiguration) -> Result<()> {
        self.settings.apply(ext.settings);
        if let Some(colors) = ext.colors {
            for (name, fg) in colors {
                self.theme.set(Category::parse(&name)?, fg);
            }
        }
        if let Some(formatters) = ext.formatters {
            self.formatters.extend(formatters);
        }
        Ok(())
    }

    fn read_file(path: &Path) -> Result<ExternalConfiguration> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(&path.as_string(), e))?;
        toml::from_str::<ExternalConfiguration>(&content)
            .map_err(|e| Error::configuration(&path.as_string(), &e))
    }
}

impl Default for Configuration {
    fn default() -> Configuration {
        Configuration {
            settings: Settings::default(),
            theme: Theme::default(),
            formatters: IndexMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[settings]
undo-limit = 10
wrap-cache-size = 5
case-sensitive = false
width = 40

[colors]
keywords = 208

[formatters]
python = "autopep8 -"
rust = "rustfmt --emit stdout"
"#;

    #[test]
    fn default_settings() {
        let config = Configuration::default();
        assert_eq!(config.settings.undo_limit, 100);
        assert_eq!(config.settings.wrap_cache_size, 1000);
        assert_eq!(config.settings.search_history_size, 50);
        assert!(config.settings.case_sensitive);
        assert!(config.settings.insert_mode);
        assert!(config.formatters.is_empty());
    }

    #[test]
    fn parse_config() {
        let config = Configuration::parse("test", CONFIG).unwrap();
        assert_eq!(config.settings.undo_limit, 10);
        assert_eq!(config.settings.wrap_cache_size, 5);
        assert!(!config.settings.case_sensitive);
        assert_eq!(config.settings.width, 40);
        assert_eq!(config.settings.height, 24);
        assert_eq!(
            config.theme.color_of(Some("rust"), Category::Keyword).fg,
            208
        );
        let langs = config.formatters.keys().collect::<Vec<_>>();
        assert_eq!(langs, vec!["python", "rust"]);
    }

    #[test]
    fn reject_unknown_keys() {
        assert!(matches!(
            Configuration::parse("test", "[settings]\ntab-size = 4\n"),
            Err(Error::Configuration { .. })
        ));
        assert!(matches!(
            Configuration::parse("test", "[colors]\nsparkles = 1\n"),
            Err(Error::InvalidCategory { .. })
        ));
    }

    #[test]
    fn options_override_settings() {
        let mut config = Configuration::parse("test", CONFIG).unwrap();
        let opts = Options {
            width: Some(100),
            case_sensitive: Some(true),
            ..Options::default()
        };
        config.apply_opts(&opts);
        assert_eq!(config.settings.width, 100);
        assert!(config.settings.case_sensitive);
        assert!(!config.settings.search_options().regex);
    }

    #[test]
    fn load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hydrorc");
        fs::write(&path, CONFIG).unwrap();
        let config = Configuration::load_file(&path).unwrap();
        assert_eq!(config.settings.undo_limit, 10);
        assert!(matches!(
            Configuration::load_file(dir.path().join("missing")),
            Err(Error::Io { .. })
        ));
    }
}
