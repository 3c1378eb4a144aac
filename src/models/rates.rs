// ============================================================================
// Structures : RateCache et RateStore
// ============================================================================
// RateCache : dernier instantané connu des taux (fiat par unité)
// RateStore : détenteur partagé du cache, injecté là où on en a besoin
//
// CONCEPT RUST : Arc<Mutex<T>>
// - Arc : plusieurs propriétaires (poller + UI)
// - Mutex : un seul accès à la fois
// - Le cache ne contient que des scalaires : un verrou empoisonné
//   reste utilisable, on récupère simplement la valeur
// ============================================================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Currency;

/// Réponse de l'endpoint de prix : { "bitcoin": { "inr": 1.0, "usd": 2.0 }, ... }
pub type PriceQuote = HashMap<String, HashMap<String, f64>>;

/// Identifiant CoinGecko du bitcoin
pub const BITCOIN_ID: &str = "bitcoin";

/// Identifiant CoinGecko de l'ether
pub const ETHEREUM_ID: &str = "ethereum";

/// Devise de cotation utilisée pour dériver le taux fiat/USD
pub const USD_CODE: &str = "usd";

/// Dernier instantané connu des taux
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateCache {
    /// Fiat par BTC
    pub btc: Option<f64>,

    /// Fiat par ETH
    pub eth: Option<f64>,

    /// Fiat par USD (dérivé : btc_fiat / btc_usd)
    pub usd: Option<f64>,

    /// Date de la dernière récupération réussie
    pub updated: Option<DateTime<Utc>>,
}

impl RateCache {
    /// Cache pré-rempli (fixtures de test, valeurs initiales)
    pub fn with_rates(btc: f64, eth: f64, usd: f64) -> Self {
        Self {
            btc: Some(btc),
            eth: Some(eth),
            usd: Some(usd),
            updated: None,
        }
    }

    /// Taux d'une devise, s'il est connu
    pub fn rate_for(&self, currency: Currency) -> Option<f64> {
        match currency {
            Currency::Btc => self.btc,
            Currency::Eth => self.eth,
            Currency::Usd => self.usd,
        }
    }

    /// Vrai tant qu'aucun taux n'a jamais été récupéré
    pub fn is_empty(&self) -> bool {
        self.btc.is_none() && self.eth.is_none() && self.usd.is_none()
    }

    /// Intègre une cotation dans le cache
    ///
    /// Tout est calculé avant la moindre écriture : en cas d'erreur le cache
    /// reste strictement identique (taux ET horodatage).
    /// Un taux non positif est ignoré, les autres sont quand même appliqués.
    pub fn apply_quote(&mut self, quote: &PriceQuote, fiat: &str, now: DateTime<Utc>) -> Result<()> {
        let btc_fiat = quote_field(quote, BITCOIN_ID, fiat)?;
        let eth_fiat = quote_field(quote, ETHEREUM_ID, fiat)?;
        let btc_usd = quote_field(quote, BITCOIN_ID, USD_CODE)?;

        if !(btc_usd.is_finite() && btc_usd > 0.0) {
            bail!("cotation {}/{} inutilisable pour le taux croisé : {}", BITCOIN_ID, USD_CODE, btc_usd);
        }
        let usd_fiat = btc_fiat / btc_usd;

        if let Some(rate) = positive(btc_fiat) {
            self.btc = Some(rate);
        }
        if let Some(rate) = positive(eth_fiat) {
            self.eth = Some(rate);
        }
        if let Some(rate) = positive(usd_fiat) {
            self.usd = Some(rate);
        }
        self.updated = Some(now);

        debug!(btc = ?self.btc, eth = ?self.eth, usd = ?self.usd, "Rate cache updated");
        Ok(())
    }
}

fn quote_field(quote: &PriceQuote, asset: &str, field: &str) -> Result<f64> {
    quote
        .get(asset)
        .with_context(|| format!("actif '{}' absent de la cotation", asset))?
        .get(field)
        .copied()
        .with_context(|| format!("champ '{}.{}' absent de la cotation", asset, field))
}

fn positive(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Détenteur partagé du cache de taux
///
/// Clonable à volonté : tous les clones pointent vers le même cache.
#[derive(Debug, Clone, Default)]
pub struct RateStore {
    inner: Arc<Mutex<RateCache>>,
}

impl RateStore {
    /// Store vide (aucun taux connu)
    pub fn new() -> Self {
        Self::default()
    }

    /// Store initialisé avec un cache donné
    pub fn with_cache(cache: RateCache) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// Copie de l'état courant du cache
    pub fn snapshot(&self) -> RateCache {
        self.lock().clone()
    }

    /// Taux courant d'une devise
    pub fn rate_for(&self, currency: Currency) -> Option<f64> {
        self.lock().rate_for(currency)
    }

    /// Applique une cotation sous le verrou et renvoie le nouvel instantané
    pub fn apply_quote(&self, quote: &PriceQuote, fiat: &str, now: DateTime<Utc>) -> Result<RateCache> {
        let mut cache = self.lock();
        cache.apply_quote(quote, fiat, now)?;
        Ok(cache.clone())
    }

    fn lock(&self) -> MutexGuard<'_, RateCache> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
