// SPDX-License-Identifier: MIT
//
// Session configuration, read from the environment at `tb_init`.
//
// C callers have no way to pass options through the termbox API, so every
// knob is an environment variable. A bad value never fails `tb_init`: the
// default is kept and the rejection is logged once the subscriber is up.

use std::path::PathBuf;
use std::time::Duration;

use tb_term::screen::ScreenOptions;

use crate::palette::AttributeMode;

pub const ENV_ATTRIBUTES: &str = "TERMBOX_ATTRIBUTES";
pub const ENV_MOUSE: &str = "TERMBOX_MOUSE";
pub const ENV_ESC_TIMEOUT: &str = "TERMBOX_ESC_TIMEOUT_MS";
pub const ENV_LOG_FILE: &str = "TERMBOX_LOG_FILE";
pub const ENV_LOG: &str = "TERMBOX_LOG";

const DEFAULT_ESC_TIMEOUT: Duration = Duration::from_millis(25);
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// How `tb_cell` colour fields map onto backend attributes.
    pub attributes: AttributeMode,
    /// Ask the terminal for SGR mouse reports.
    pub mouse: bool,
    pub escape_timeout: Duration,
    /// Logging is off unless this is set.
    pub log_file: Option<PathBuf>,
    /// An `EnvFilter` directive string.
    pub log_filter: String,
    /// `(variable, value)` pairs that failed to parse.
    pub rejected: Vec<(&'static str, String)>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            attributes: AttributeMode::default(),
            mouse: false,
            escape_timeout: DEFAULT_ESC_TIMEOUT,
            log_file: None,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            rejected: Vec::new(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys keep their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup(ENV_ATTRIBUTES) {
            match val.parse::<AttributeMode>() {
                Ok(mode) => config.attributes = mode,
                Err(_) => config.rejected.push((ENV_ATTRIBUTES, val)),
            }
        }
        if let Some(val) = lookup(ENV_MOUSE) {
            match parse_bool(&val) {
                Some(on) => config.mouse = on,
                None => config.rejected.push((ENV_MOUSE, val)),
            }
        }
        if let Some(val) = lookup(ENV_ESC_TIMEOUT) {
            match val.trim().parse::<u64>() {
                Ok(ms) => config.escape_timeout = Duration::from_millis(ms),
                Err(_) => config.rejected.push((ENV_ESC_TIMEOUT, val)),
            }
        }
        if let Some(val) = lookup(ENV_LOG_FILE)
            && !val.is_empty()
        {
            config.log_file = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup(ENV_LOG)
            && !val.trim().is_empty()
        {
            config.log_filter = val;
        }

        config
    }

    #[must_use]
    pub const fn screen_options(&self) -> ScreenOptions {
        ScreenOptions {
            mouse: self.mouse,
            escape_timeout: self.escape_timeout,
        }
    }

    /// Report every rejected variable. Call after logging is set up.
    pub fn log_rejected(&self) {
        for (key, value) in &self.rejected {
            tracing::warn!(key, value = %value, "ignoring invalid environment value");
        }
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(from_pairs(&[]), Config::default());
        let config = Config::default();
        assert_eq!(config.attributes, AttributeMode::Raw);
        assert!(!config.mouse);
        assert_eq!(config.escape_timeout, Duration::from_millis(25));
        assert_eq!(config.log_file, None);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn every_variable_is_read() {
        let config = from_pairs(&[
            (ENV_ATTRIBUTES, "Palette"),
            (ENV_MOUSE, "on"),
            (ENV_ESC_TIMEOUT, "100"),
            (ENV_LOG_FILE, "/tmp/termbox.log"),
            (ENV_LOG, "termbox=trace"),
        ]);
        assert_eq!(config.attributes, AttributeMode::Palette);
        assert!(config.mouse);
        assert_eq!(config.escape_timeout, Duration::from_millis(100));
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/termbox.log")));
        assert_eq!(config.log_filter, "termbox=trace");
        assert!(config.rejected.is_empty());
    }

    #[test]
    fn invalid_values_keep_defaults_and_are_recorded() {
        let config = from_pairs(&[
            (ENV_ATTRIBUTES, "256"),
            (ENV_MOUSE, "maybe"),
            (ENV_ESC_TIMEOUT, "-5"),
        ]);
        assert_eq!(config.attributes, AttributeMode::Raw);
        assert!(!config.mouse);
        assert_eq!(config.escape_timeout, DEFAULT_ESC_TIMEOUT);

        let keys: Vec<_> = config.rejected.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![ENV_ATTRIBUTES, ENV_MOUSE, ENV_ESC_TIMEOUT]);
        assert_eq!(config.rejected[1].1, "maybe");
    }

    #[test]
    fn empty_log_settings_are_ignored() {
        let config = from_pairs(&[(ENV_LOG_FILE, ""), (ENV_LOG, "  ")]);
        assert_eq!(config.log_file, None);
        assert_eq!(config.log_filter, "info");
        assert!(config.rejected.is_empty());
    }

    #[test]
    fn boolean_spellings() {
        for on in ["1", "true", "TRUE", " yes ", "On"] {
            assert_eq!(parse_bool(on), Some(true), "{on}");
        }
        for off in ["0", "false", "off", "No"] {
            assert_eq!(parse_bool(off), Some(false), "{off}");
        }
        assert_eq!(parse_bool(""), None);
        assert_eq!(parse_bool("2"), None);
    }

    #[test]
    fn screen_options_follow_config() {
        let config = from_pairs(&[(ENV_MOUSE, "1"), (ENV_ESC_TIMEOUT, "0")]);
        let opts = config.screen_options();
        assert!(opts.mouse);
        assert_eq!(opts.escape_timeout, Duration::ZERO);
    }
}
