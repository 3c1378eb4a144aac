// ============================================================================
// Module : models
// ============================================================================
// Structures de données de l'application : devises, portefeuille, taux
// ============================================================================

pub mod currency; // Devises détenues (BTC, ETH, USD) et fiat de référence
pub mod rates;    // Cache de taux partagé
pub mod wallet;   // Portefeuille et ses quatre opérations

// Re-export des structures principales pour simplifier les imports
pub use currency::{Currency, Fiat};
pub use rates::{PriceQuote, RateCache, RateStore};
pub use wallet::{format_thousands, Wallet};
