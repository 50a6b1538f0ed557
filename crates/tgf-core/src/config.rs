use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{errors::Error, Result};

/// Typed configuration, loaded from the environment (with `.env` support)
/// once at startup. Everything here is validated before any network
/// connection is attempted.
#[derive(Clone, Debug)]
pub struct Config {
    /// Bot API credential for the platform client.
    pub telegram_bot_token: String,

    /// Multi-rule routing string (`source:dest[:dest...],...`), if configured.
    pub forwarding_rules: Option<String>,
    /// Legacy single source/target pair, if configured.
    pub legacy_pair: Option<(i64, i64)>,

    /// Log file path; console output is controlled by a CLI flag.
    pub log_file: PathBuf,
    /// Capacity of the in-memory relay journal shown on the dashboard.
    pub history_limit: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let forwarding_rules = env_str("FORWARDING_RULES").and_then(non_empty);
        let legacy_pair = load_legacy_pair()?;

        let log_file = env_path("LOG_FILE")
            .unwrap_or_else(|| PathBuf::from("telegram_forwarder.log"));
        let history_limit = env_usize("RELAY_HISTORY_LIMIT").unwrap_or(200);

        Ok(Self {
            telegram_bot_token,
            forwarding_rules,
            legacy_pair,
            log_file,
            history_limit,
        })
    }
}

/// `SOURCE_ID`/`TARGET_ID` must both be present (and integral) or both absent.
fn load_legacy_pair() -> Result<Option<(i64, i64)>> {
    let source = env_str("SOURCE_ID").and_then(non_empty);
    let target = env_str("TARGET_ID").and_then(non_empty);

    match (source, target) {
        (None, None) => Ok(None),
        (Some(s), Some(t)) => {
            let source = parse_chat_id("SOURCE_ID", &s)?;
            let target = parse_chat_id("TARGET_ID", &t)?;
            Ok(Some((source, target)))
        }
        (Some(_), None) => Err(Error::Config(
            "SOURCE_ID is set but TARGET_ID is missing".to_string(),
        )),
        (None, Some(_)) => Err(Error::Config(
            "TARGET_ID is set but SOURCE_ID is missing".to_string(),
        )),
    }
}

fn parse_chat_id(key: &str, value: &str) -> Result<i64> {
    value.trim().parse::<i64>().map_err(|_| {
        Error::Config(format!(
            "{key} must be an integer chat id, got {value:?}"
        ))
    })
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_id_parsing_is_strict() {
        assert_eq!(parse_chat_id("SOURCE_ID", " -100123 ").unwrap(), -100123);
        assert!(parse_chat_id("SOURCE_ID", "@channel").is_err());
        assert!(parse_chat_id("SOURCE_ID", "t.me/channel").is_err());
    }

    #[test]
    fn non_empty_filters_blank_values() {
        assert_eq!(non_empty("  ".to_string()), None);
        assert_eq!(non_empty("x".to_string()), Some("x".to_string()));
    }
}
