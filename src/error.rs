// ============================================================================
// Module : error
// ============================================================================
// Erreurs du domaine : ALU et portefeuille
//
// CONCEPT RUST : thiserror
// - #[derive(Error)] génère l'implémentation de std::error::Error
// - #[error("...")] génère Display avec interpolation des champs
// - Les erreurs sont des valeurs : on peut les comparer dans les tests
//
// Les échecs de récupération des taux ne passent PAS par ce type :
// ils sont absorbés par le fetcher (voir api::coingecko).
// ============================================================================

use thiserror::Error;

use crate::models::Currency;

/// Erreurs synchrones renvoyées à l'appelant (la couche de présentation)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WalletError {
    /// Opération arithmétique inconnue (ni add/sub/mul/div ni + - * /)
    #[error("opération invalide '{0}' : attendu add/sub/mul/div")]
    InvalidOperation(String),

    /// Expression saisie impossible à analyser
    #[error("expression invalide : {0}")]
    InvalidExpression(String),

    /// Montant négatif, nul (selon l'opération) ou non fini
    #[error("montant invalide : {0}")]
    InvalidAmount(f64),

    /// Taux non strictement positif ou non fini
    #[error("taux invalide : {0}")]
    InvalidRate(f64),

    /// Solde insuffisant pour l'opération demandée
    #[error("solde {currency} insuffisant : demandé {requested}, disponible {available}")]
    InsufficientFunds {
        currency: String,
        requested: f64,
        available: f64,
    },

    /// Symbole de devise non reconnu
    #[error("devise non supportée : {0}")]
    UnsupportedCurrency(String),

    /// Aucun taux en cache pour cette devise (pas encore récupéré)
    #[error("taux {0} indisponible")]
    RateUnavailable(Currency),
}

/// Alias pratique pour les opérations du domaine
pub type WalletResult<T> = std::result::Result<T, WalletError>;
