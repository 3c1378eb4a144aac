// ============================================================================
// FloatWallet - Library
// ============================================================================
// Simulateur d'ALU IEEE-754 et portefeuille multi-devises
// Expose les modules publics pour le binaire TUI et les tests
// ============================================================================

pub mod alu;     // ALU simple précision (bits, opérations, expressions)
pub mod api;     // Taux CoinGecko et poller
pub mod app;     // État de l'application
pub mod config;  // Configuration (défauts + variables d'environnement)
pub mod error;   // Erreurs du domaine
pub mod models;  // Devises, portefeuille, cache de taux
pub mod ui;      // Interface utilisateur

pub use error::{WalletError, WalletResult};
