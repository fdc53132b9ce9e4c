use anyhow::{bail, Result};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.kinopoisk.dev";
pub const DEFAULT_DB_PATH: &str = "users.db";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub catalog_base_url: String,
    pub db_path: PathBuf,
    pub fetch_posters: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let Some(api_key) = non_empty("KINOPOISK_API_KEY") else {
            bail!("Missing required environment variable: KINOPOISK_API_KEY");
        };
        let catalog_base_url =
            non_empty("KINOPOISK_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let db_path = non_empty("MOVIES_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
        let fetch_posters = non_empty("MOVIES_FETCH_POSTERS")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        info!(
            "Catalog at {}, credentials in {}, poster fetching {}",
            catalog_base_url,
            db_path.display(),
            if fetch_posters { "on" } else { "off" }
        );
        Ok(Self {
            api_key,
            catalog_base_url,
            db_path,
            fetch_posters,
        })
    }
}

pub fn report_env_file(loaded: &Result<PathBuf, dotenvy::Error>) {
    match loaded {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn captured_logs(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn api_key_is_required() {
        assert!(config(&[]).is_err());
        assert!(config(&[("KINOPOISK_API_KEY", "  ")]).is_err());
    }

    #[test]
    fn defaults_apply_when_optional_keys_missing() {
        let cfg = config(&[("KINOPOISK_API_KEY", "abc")]).unwrap();
        assert_eq!(cfg.api_key, "abc");
        assert_eq!(cfg.catalog_base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert!(!cfg.fetch_posters);
    }

    #[test]
    fn poster_flag_accepts_common_truthy_values() {
        for v in ["1", "true", "YES", "on"] {
            let cfg = config(&[("KINOPOISK_API_KEY", "abc"), ("MOVIES_FETCH_POSTERS", v)]).unwrap();
            assert!(cfg.fetch_posters, "{v} should enable posters");
        }
        let cfg = config(&[("KINOPOISK_API_KEY", "abc"), ("MOVIES_FETCH_POSTERS", "0")]).unwrap();
        assert!(!cfg.fetch_posters);
    }

    #[test]
    fn env_file_outcome_reaches_installed_subscriber() {
        let loaded = Ok(PathBuf::from("/srv/app/.env"));
        let logs = captured_logs(|| report_env_file(&loaded));
        assert!(logs.contains("Loaded environment from \"/srv/app/.env\""), "{logs}");

        let missing = dotenvy::from_path(PathBuf::from("/nonexistent/dir/.env")).map(|_| PathBuf::new());
        let logs = captured_logs(|| report_env_file(&missing));
        assert!(logs.contains("No .env file loaded"), "{logs}");
        assert!(logs.contains("relying on environment"), "{logs}");
    }
}
