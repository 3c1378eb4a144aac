// ============================================================================
// API Client : CoinGecko
// ============================================================================
// Récupère les prix BTC et ETH en fiat et en USD, puis met à jour le cache
//
// Un seul appel :
//   GET {base}/simple/price?ids=bitcoin,ethereum&vs_currencies={fiat},usd
//
// Réponse :
//   { "bitcoin": { "inr": 5000000.0, "usd": 60000.0 },
//     "ethereum": { "inr": 250000.0, "usd": 3000.0 } }
//
// RÉSILIENCE : un échec (réseau, statut HTTP, JSON, champ manquant) n'est
// jamais propagé. Il est loggé, le cache reste tel quel, et l'appelant
// reçoit l'instantané courant (éventuellement périmé).
// ============================================================================

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::models::{PriceQuote, RateCache, RateStore};

/// User-Agent envoyé avec chaque requête
const USER_AGENT: &str = concat!("floatwallet/", env!("CARGO_PKG_VERSION"));

/// Client de récupération des taux, lié à un RateStore
#[derive(Debug, Clone)]
pub struct RateFetcher {
    client: reqwest::Client,
    url: String,
    fiat: String,
    store: RateStore,
}

impl RateFetcher {
    /// Crée le client HTTP (timeout et User-Agent issus de la config)
    pub fn new(config: &Config, store: RateStore) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.http_timeout)
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            client,
            url: config.quote_url(),
            fiat: config.fiat.clone(),
            store,
        })
    }

    /// Récupère les taux et met à jour le cache
    ///
    /// N'échoue jamais : renvoie toujours l'instantané courant.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch_rates(&self) -> RateCache {
        match self.try_fetch().await {
            Ok(snapshot) => {
                info!(btc = ?snapshot.btc, eth = ?snapshot.eth, usd = ?snapshot.usd, "Rates refreshed");
                snapshot
            }
            Err(e) => {
                warn!(error = ?e, "Rate fetch failed, keeping previous rates");
                self.store.snapshot()
            }
        }
    }

    async fn try_fetch(&self) -> Result<RateCache> {
        debug!("Sending HTTP request to price endpoint");
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Échec de la requête HTTP vers CoinGecko")?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");
        if !status.is_success() {
            anyhow::bail!("CoinGecko a retourné une erreur : HTTP {}", status);
        }

        let body = response
            .text()
            .await
            .context("Échec de la lecture du corps de la réponse")?;
        debug!(bytes = body.len(), "Received quote body");
        let quote = parse_quote(&body)?;

        self.store
            .apply_quote(&quote, &self.fiat, Utc::now())
            .context("Cotation inexploitable")
    }
}

/// Décode le corps JSON d'une cotation
///
/// L'erreur embarque le début du corps : CoinGecko renvoie parfois du HTML
/// (page de limitation) avec un statut 200.
fn parse_quote(body: &str) -> Result<PriceQuote> {
    serde_json::from_str(body).with_context(|| {
        let excerpt: String = body.chars().take(80).collect();
        format!("Échec du parsing JSON de la cotation : {:?}", excerpt)
    })
}

// ============================================================================
// Tests unitaires
// ============================================================================
// Aucun accès réseau : le port 9 (discard) en local refuse la connexion,
// ce qui exerce le chemin d'échec de bout en bout.
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn unreachable_fetcher(store: RateStore) -> RateFetcher {
        let config = Config {
            api_base_url: "http://127.0.0.1:9".to_string(),
            http_timeout: Duration::from_secs(2),
            ..Config::default()
        };
        RateFetcher::new(&config, store).unwrap()
    }

    #[test]
    fn test_fetcher_uses_config_url() {
        let fetcher = unreachable_fetcher(RateStore::new());
        assert_eq!(
            fetcher.url,
            "http://127.0.0.1:9/simple/price?ids=bitcoin,ethereum&vs_currencies=inr,usd"
        );
        assert_eq!(fetcher.fiat, "inr");
    }

    #[test]
    fn test_parse_quote() {
        let quote = parse_quote(
            r#"{"bitcoin":{"inr":5000000.0,"usd":60000.0},"ethereum":{"inr":250000.0,"usd":3000.0}}"#,
        )
        .unwrap();
        assert_eq!(quote["bitcoin"]["usd"], 60000.0);
        assert_eq!(quote["ethereum"]["inr"], 250000.0);
    }

    #[test]
    fn test_parse_quote_rejects_html() {
        let err = parse_quote("<html>Too Many Requests</html>").unwrap_err();
        assert!(format!("{:#}", err).contains("Too Many Requests"));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_cache() {
        let store = RateStore::with_cache(RateCache::with_rates(5_000_000.0, 250_000.0, 83.0));
        let before = store.snapshot();
        let fetcher = unreachable_fetcher(store.clone());

        let snapshot = fetcher.fetch_rates().await;

        assert_eq!(snapshot, before);
        assert_eq!(store.snapshot(), before);
        assert_eq!(snapshot.updated, None);
    }

    #[tokio::test]
    async fn test_failed_fetch_on_empty_cache() {
        let fetcher = unreachable_fetcher(RateStore::new());
        let snapshot = fetcher.fetch_rates().await;
        assert!(snapshot.is_empty());
    }
}
