// ============================================================================
// Module : config
// ============================================================================
// Paramètres de l'application, avec valeurs par défaut et surcharge
// par variables d'environnement :
//
//   FLOATWALLET_API_URL             base de l'API (défaut CoinGecko v3)
//   FLOATWALLET_FIAT                devise fiat de référence (défaut "inr")
//   FLOATWALLET_HTTP_TIMEOUT_SECS   timeout de la requête HTTP (défaut 8)
//   FLOATWALLET_POLL_INTERVAL_SECS  intervalle du poller (défaut 90)
//   FLOATWALLET_LOG_DIR             répertoire des logs
// ============================================================================

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

pub const ENV_API_URL: &str = "FLOATWALLET_API_URL";
pub const ENV_FIAT: &str = "FLOATWALLET_FIAT";
pub const ENV_HTTP_TIMEOUT: &str = "FLOATWALLET_HTTP_TIMEOUT_SECS";
pub const ENV_POLL_INTERVAL: &str = "FLOATWALLET_POLL_INTERVAL_SECS";
pub const ENV_LOG_DIR: &str = "FLOATWALLET_LOG_DIR";

/// Configuration de l'application
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base de l'API de prix (sans slash final)
    pub api_base_url: String,

    /// Code de la devise fiat (minuscules, format CoinGecko)
    pub fiat: String,

    /// Timeout de la requête HTTP
    pub http_timeout: Duration,

    /// Pause entre deux récupérations de taux
    pub poll_interval: Duration,

    /// Répertoire des fichiers de logs
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.coingecko.com/api/v3".to_string(),
            fiat: "inr".to_string(),
            http_timeout: Duration::from_secs(8),
            poll_interval: Duration::from_secs(90),
            log_dir: default_log_dir(),
        }
    }
}

impl Config {
    /// Valeurs par défaut surchargées par l'environnement du processus
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construit la configuration à partir d'une fonction de lecture
    ///
    /// CONCEPT RUST : injection par closure
    /// - from_env() passe env::var
    /// - les tests passent une HashMap, sans toucher à l'environnement global
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = non_empty(lookup(ENV_API_URL)) {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(fiat) = non_empty(lookup(ENV_FIAT)) {
            config.fiat = fiat.to_ascii_lowercase();
        }
        if let Some(raw) = non_empty(lookup(ENV_HTTP_TIMEOUT)) {
            config.http_timeout = parse_seconds(ENV_HTTP_TIMEOUT, &raw)?;
        }
        if let Some(raw) = non_empty(lookup(ENV_POLL_INTERVAL)) {
            config.poll_interval = parse_seconds(ENV_POLL_INTERVAL, &raw)?;
        }
        if let Some(dir) = non_empty(lookup(ENV_LOG_DIR)) {
            config.log_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// URL complète de la cotation BTC/ETH en fiat et en USD
    pub fn quote_url(&self) -> String {
        format!(
            "{}/simple/price?ids=bitcoin,ethereum&vs_currencies={},usd",
            self.api_base_url, self.fiat
        )
    }
}

/// Répertoire des logs : ~/.local/share/floatwallet/logs sur Linux,
/// ./logs si le répertoire de données est introuvable
fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("floatwallet").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_seconds(key: &str, raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .parse()
        .with_context(|| format!("{} doit être un nombre de secondes, reçu '{}'", key, raw))?;
    if secs == 0 {
        bail!("{} doit être strictement positif", key);
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.fiat, "inr");
        assert_eq!(config.http_timeout, Duration::from_secs(8));
        assert_eq!(config.poll_interval, Duration::from_secs(90));
        assert_eq!(
            config.quote_url(),
            "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin,ethereum&vs_currencies=inr,usd"
        );
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            (ENV_API_URL, "http://localhost:8080/api/"),
            (ENV_FIAT, "EUR"),
            (ENV_POLL_INTERVAL, "30"),
            (ENV_LOG_DIR, "/tmp/fw-logs"),
        ])
        .unwrap();

        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.fiat, "eur");
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/fw-logs"));
        assert!(config.quote_url().ends_with("vs_currencies=eur,usd"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[(ENV_HTTP_TIMEOUT, "abc")]).is_err());
        assert!(config_from(&[(ENV_POLL_INTERVAL, "0")]).is_err());
        // Valeur vide : ignorée
        assert!(config_from(&[(ENV_POLL_INTERVAL, "  ")]).is_ok());
    }
}
