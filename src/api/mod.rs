// ============================================================================
// Module : api
// ============================================================================
// Récupération des taux de change et poller en arrière-plan
// ============================================================================

pub mod coingecko; // Client API CoinGecko
pub mod poller;    // Rafraîchissement périodique annulable

// Re-export des éléments principaux
pub use coingecko::RateFetcher;
pub use poller::{start_poller, PollerHandle};
