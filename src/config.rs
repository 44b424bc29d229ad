use crate::models::LeaderboardMode;
use std::{env, path::PathBuf};

pub const DEFAULT_UPSTREAM_BIN_URL: &str = "https://jsonbin-zeta.vercel.app/api/bins";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Local,
    Remote,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub data_path: PathBuf,
    pub storage: StorageKind,
    pub mode: LeaderboardMode,
    pub categories: Vec<String>,
    pub upstream_bin_url: String,
    pub bin_api_url: String,
    pub public_url: String,
    pub share_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any variable source. Unset, blank or
    /// unrecognised values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = get("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        let storage = match get("APP_STORAGE").as_deref() {
            Some(value) if value.eq_ignore_ascii_case("remote") => StorageKind::Remote,
            _ => StorageKind::Local,
        };

        let mode = match get("APP_MODE").as_deref() {
            Some("all-records") => LeaderboardMode::AllRecords,
            Some("personal-bests") => LeaderboardMode::PersonalBests,
            _ if storage == StorageKind::Remote => LeaderboardMode::PersonalBests,
            _ => LeaderboardMode::AllRecords,
        };

        let mut categories: Vec<String> = get("APP_CATEGORIES")
            .map(|value| {
                value
                    .split(',')
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        if categories.is_empty() {
            categories = vec!["volley".to_string(), "juggle".to_string()];
        }

        let upstream_bin_url = get("APP_UPSTREAM_BIN_URL").unwrap_or_else(|| DEFAULT_UPSTREAM_BIN_URL.to_string());
        let bin_api_url = get("APP_BIN_API_URL").unwrap_or_else(|| upstream_bin_url.clone());

        Self {
            port,
            data_path: get("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/device.json")),
            storage,
            mode,
            categories,
            upstream_bin_url,
            bin_api_url,
            public_url: get("APP_PUBLIC_URL").unwrap_or_else(|| format!("http://localhost:{port}")),
            share_url: get("APP_SHARE_URL"),
        }
    }

    pub fn default_category(&self) -> &str {
        self.categories.first().map(String::as_str).unwrap_or("volley")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_are_local_device_leaderboard() {
        let config = config(&[]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage, StorageKind::Local);
        assert_eq!(config.mode, LeaderboardMode::AllRecords);
        assert_eq!(config.categories, ["volley", "juggle"]);
        assert_eq!(config.bin_api_url, DEFAULT_UPSTREAM_BIN_URL);
        assert_eq!(config.public_url, "http://localhost:8080");
        assert_eq!(config.default_category(), "volley");
        assert!(config.share_url.is_none());
    }

    #[test]
    fn remote_storage_defaults_to_personal_bests() {
        let config = config(&[("APP_STORAGE", "remote"), ("PORT", "9000")]);
        assert_eq!(config.storage, StorageKind::Remote);
        assert_eq!(config.mode, LeaderboardMode::PersonalBests);
        assert_eq!(config.public_url, "http://localhost:9000");
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config(&[
            ("APP_MODE", "all-records"),
            ("APP_STORAGE", "remote"),
            ("APP_CATEGORIES", " keepy-uppy , , header "),
            ("APP_UPSTREAM_BIN_URL", "http://up.example/bins"),
            ("APP_SHARE_URL", "https://juggle.example/#abc"),
            ("PORT", "not-a-port"),
        ]);
        assert_eq!(config.mode, LeaderboardMode::AllRecords);
        assert_eq!(config.categories, ["keepy-uppy", "header"]);
        assert_eq!(config.bin_api_url, "http://up.example/bins");
        assert_eq!(config.share_url.as_deref(), Some("https://juggle.example/#abc"));
        assert_eq!(config.port, 8080);
    }
}
