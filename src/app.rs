// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// Deux onglets, comme l'application d'origine :
// - ALU : saisie d'une expression, journal des résultats et de leurs bits
// - Wallet : saisie d'un montant, choix de la devise, opérations
//
// PATTERN : "Application State"
// - L'UI ne fait que lire App pour dessiner
// - Toutes les actions passent par les méthodes de App, qui délèguent
//   au cœur (alu, Wallet) et transforment les erreurs en message de statut
// ============================================================================

use tracing::{debug, info, warn};

use crate::alu::parse_expression;
use crate::error::{WalletError, WalletResult};
use crate::models::{format_thousands, Currency, Fiat, RateCache, Wallet};

/// Nombre maximal de lignes conservées dans le journal de l'ALU
const ALU_LOG_CAPACITY: usize = 200;

/// Onglets de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    /// Simulateur d'ALU IEEE-754
    Alu,

    /// Portefeuille (fiat / BTC / ETH / USD)
    Wallet,
}

impl Tab {
    /// Titres affichés dans la barre d'onglets
    pub const TITLES: [&'static str; 2] = ["ALU Simulator", "Wallet (BTC / ETH / USD)"];

    /// Index de l'onglet dans TITLES
    pub fn index(&self) -> usize {
        match self {
            Tab::Alu => 0,
            Tab::Wallet => 1,
        }
    }
}

/// Opérations déclenchées depuis l'onglet Wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletAction {
    Deposit,
    Withdraw,
    /// Fiat -> devise sélectionnée
    Buy,
    /// Devise sélectionnée -> fiat
    Sell,
}

/// Message de statut affiché sous le portefeuille
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    running: bool,

    /// Onglet actuellement affiché
    pub current_tab: Tab,

    /// Two-step quit : première pression d'ESC arme, la seconde quitte
    pub confirm_quit: bool,

    /// Expression en cours de saisie (onglet ALU)
    pub alu_input: String,

    /// Comptes rendus des opérations (onglet ALU)
    pub alu_log: Vec<String>,

    /// Montant en cours de saisie (onglet Wallet)
    pub amount_input: String,

    /// Devise sélectionnée pour les conversions
    pub selected_currency: Currency,

    /// Le portefeuille lui-même
    pub wallet: Wallet,

    /// Dernier instantané reçu du poller
    pub rates: RateCache,

    /// Résultat de la dernière opération du portefeuille
    pub status: Option<Status>,
}

impl App {
    /// Crée l'application : portefeuille vide, aucun taux connu
    pub fn new() -> Self {
        Self {
            running: true,
            current_tab: Tab::Alu,
            confirm_quit: false,
            alu_input: "10.5 + 20.25".to_string(),
            alu_log: vec!["Saisir une expression puis Entrée.".to_string()],
            amount_input: String::new(),
            selected_currency: Currency::default(),
            wallet: Wallet::new(),
            rates: RateCache::default(),
            status: None,
        }
    }

    /// Crée l'application avec un portefeuille libellé dans `fiat`
    pub fn with_fiat(fiat: Fiat) -> Self {
        Self {
            wallet: Wallet::with_fiat(fiat),
            ..Self::new()
        }
    }

    /// Crée l'application avec un instantané de taux initial
    pub fn with_rates(rates: RateCache) -> Self {
        Self {
            rates,
            ..Self::new()
        }
    }

    // ========================================
    // Cycle de vie
    // ========================================

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================
    // Navigation et saisie
    // ========================================

    /// Bascule entre les deux onglets
    pub fn next_tab(&mut self) {
        self.current_tab = match self.current_tab {
            Tab::Alu => Tab::Wallet,
            Tab::Wallet => Tab::Alu,
        };
        debug!(tab = ?self.current_tab, "Switched tab");
    }

    pub fn is_on_alu(&self) -> bool {
        self.current_tab == Tab::Alu
    }

    pub fn is_on_wallet(&self) -> bool {
        self.current_tab == Tab::Wallet
    }

    /// Ajoute un caractère au buffer de l'onglet courant
    ///
    /// L'onglet Wallet n'accepte que chiffres et point : les lettres y sont
    /// des raccourcis.
    pub fn append_char(&mut self, c: char) {
        match self.current_tab {
            Tab::Alu => self.alu_input.push(c),
            Tab::Wallet if c.is_ascii_digit() || c == '.' => self.amount_input.push(c),
            Tab::Wallet => {}
        }
    }

    /// Supprime le dernier caractère du buffer de l'onglet courant
    pub fn backspace(&mut self) {
        match self.current_tab {
            Tab::Alu => self.alu_input.pop(),
            Tab::Wallet => self.amount_input.pop(),
        };
    }

    /// Passe à la devise suivante
    pub fn cycle_currency(&mut self) {
        self.selected_currency = self.selected_currency.next();
    }

    // ========================================
    // Onglet ALU
    // ========================================

    /// Évalue l'expression saisie et ajoute le compte rendu au journal
    pub fn run_alu(&mut self) {
        let line = match parse_expression(&self.alu_input) {
            Ok(expr) => {
                let report = expr.report();
                info!(expression = %expr, "ALU operation evaluated");
                report
            }
            Err(e) => {
                warn!(input = %self.alu_input, error = %e, "ALU expression rejected");
                format!("Error: {}", e)
            }
        };
        self.push_alu_log(line);
    }

    fn push_alu_log(&mut self, line: String) {
        self.alu_log.push(line);
        if self.alu_log.len() > ALU_LOG_CAPACITY {
            let excess = self.alu_log.len() - ALU_LOG_CAPACITY;
            self.alu_log.drain(..excess);
        }
    }

    // ========================================
    // Onglet Wallet
    // ========================================

    /// Exécute une opération sur le portefeuille et met à jour le statut
    pub fn perform(&mut self, action: WalletAction) {
        let outcome = self.try_perform(action);
        self.status = Some(match outcome {
            Ok(message) => {
                info!(?action, "Wallet operation succeeded");
                Status::Info(message)
            }
            Err(e) => {
                warn!(?action, error = %e, "Wallet operation rejected");
                Status::Error(e.to_string())
            }
        });
    }

    fn try_perform(&mut self, action: WalletAction) -> WalletResult<String> {
        let amount = self.parse_amount()?;
        let currency = self.selected_currency;

        match action {
            WalletAction::Deposit => {
                self.wallet.deposit(amount)?;
                Ok(format!("Dépôt de {}", self.fiat().format_amount(amount)))
            }
            WalletAction::Withdraw => {
                self.wallet.withdraw(amount)?;
                Ok(format!("Retrait de {}", self.fiat().format_amount(amount)))
            }
            WalletAction::Buy => {
                let rate = self.rate_for(currency)?;
                let units = self
                    .wallet
                    .convert_fiat_to_currency(currency.symbol(), amount, rate)?;
                Ok(format!(
                    "{} -> {:.*} {}",
                    self.fiat().format_amount(amount),
                    currency.display_decimals(),
                    units,
                    currency
                ))
            }
            WalletAction::Sell => {
                let rate = self.rate_for(currency)?;
                let fiat = self
                    .wallet
                    .convert_currency_to_fiat(currency.symbol(), amount, rate)?;
                Ok(format!(
                    "{:.*} {} -> {}",
                    currency.display_decimals(),
                    amount,
                    currency,
                    self.fiat().format_amount(fiat)
                ))
            }
        }
    }

    /// Montant saisi ; un champ vide vaut zéro
    fn parse_amount(&self) -> WalletResult<f64> {
        let raw = self.amount_input.trim();
        if raw.is_empty() {
            return Ok(0.0);
        }
        raw.parse::<f64>()
            .map_err(|_| WalletError::InvalidExpression(format!("montant '{}' illisible", raw)))
    }

    fn rate_for(&self, currency: Currency) -> WalletResult<f64> {
        self.rates
            .rate_for(currency)
            .ok_or(WalletError::RateUnavailable(currency))
    }

    // ========================================
    // Taux
    // ========================================

    /// Remplace l'instantané de taux (appelé à chaque tour du poller)
    pub fn update_rates(&mut self, rates: RateCache) {
        debug!(btc = ?rates.btc, eth = ?rates.eth, usd = ?rates.usd, "Rates received by UI");
        self.rates = rates;
    }

    /// Ligne d'information sur les taux affichée en haut de l'onglet Wallet
    pub fn rate_line(&self) -> String {
        if self.rates.is_empty() {
            return "Rate fetch failed (offline).".to_string();
        }

        let fmt_rate = |rate: Option<f64>| {
            rate.map(|r| format_thousands(r, 2))
                .unwrap_or_else(|| "N/A".to_string())
        };
        let mut line = format!(
            "Rates ({} per unit): BTC={} | ETH={} | USD={}",
            self.fiat().label(),
            fmt_rate(self.rates.btc),
            fmt_rate(self.rates.eth),
            fmt_rate(self.rates.usd)
        );
        if let Some(updated) = self.rates.updated {
            line.push_str(&format!("  (maj {})", updated.format("%H:%M:%S UTC")));
        }
        line
    }

    /// Fiat de référence du portefeuille (pour l'UI)
    pub fn fiat(&self) -> &Fiat {
        self.wallet.denomination()
    }
}

// ============================================================================
// Convention Rust : si new() ne prend pas de paramètres, implémenter Default
// ============================================================================

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet_app() -> App {
        let mut app = App::with_rates(RateCache::with_rates(3_000_000.0, 200_000.0, 83.0));
        app.next_tab();
        app
    }

    fn type_amount(app: &mut App, text: &str) {
        app.amount_input.clear();
        for c in text.chars() {
            app.append_char(c);
        }
    }

    #[test]
    fn test_app_creation() {
        let app = App::new();
        assert!(app.is_running());
        assert!(app.is_on_alu());
        assert_eq!(app.selected_currency, Currency::Btc);
        assert!(app.rates.is_empty());
    }

    #[test]
    fn test_app_quit() {
        let mut app = App::new();
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());

        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_run_alu_appends_report() {
        let mut app = App::new();
        app.run_alu();
        let last = app.alu_log.last().unwrap();
        assert!(last.contains("bits=0x41F60000"));

        app.alu_input = "10 ^ 2".to_string();
        app.run_alu();
        assert!(app.alu_log.last().unwrap().starts_with("Error:"));
    }

    #[test]
    fn test_alu_log_is_bounded() {
        let mut app = App::new();
        for _ in 0..(ALU_LOG_CAPACITY + 50) {
            app.run_alu();
        }
        assert_eq!(app.alu_log.len(), ALU_LOG_CAPACITY);
    }

    #[test]
    fn test_wallet_tab_filters_input() {
        let mut app = wallet_app();
        type_amount(&mut app, "12a.5x");
        assert_eq!(app.amount_input, "12.5");
        app.backspace();
        assert_eq!(app.amount_input, "12.");
    }

    #[test]
    fn test_wallet_flow() {
        let mut app = wallet_app();

        type_amount(&mut app, "1000");
        app.perform(WalletAction::Deposit);
        assert!(matches!(app.status, Some(Status::Info(_))));

        type_amount(&mut app, "400");
        app.perform(WalletAction::Withdraw);
        assert_eq!(app.wallet.fiat(), 600.0);

        type_amount(&mut app, "600");
        app.perform(WalletAction::Buy);
        assert_eq!(app.wallet.fiat(), 0.0);
        assert!(app.wallet.balance(Currency::Btc) > 0.0);

        type_amount(&mut app, "1");
        app.perform(WalletAction::Withdraw);
        assert!(matches!(app.status, Some(Status::Error(_))));
        assert_eq!(app.wallet.fiat(), 0.0);
    }

    #[test]
    fn test_conversion_without_rate() {
        let mut app = App::new();
        app.next_tab();
        type_amount(&mut app, "100");
        app.perform(WalletAction::Deposit);

        app.perform(WalletAction::Buy);
        assert_eq!(
            app.status,
            Some(Status::Error(WalletError::RateUnavailable(Currency::Btc).to_string()))
        );
        assert_eq!(app.wallet.fiat(), 100.0);
    }

    #[test]
    fn test_empty_amount_is_zero() {
        let mut app = wallet_app();
        app.perform(WalletAction::Withdraw);
        assert_eq!(
            app.status,
            Some(Status::Error(WalletError::InvalidAmount(0.0).to_string()))
        );
    }

    #[test]
    fn test_rate_line() {
        let app = App::new();
        assert_eq!(app.rate_line(), "Rate fetch failed (offline).");

        let app = wallet_app();
        assert_eq!(
            app.rate_line(),
            "Rates (₹ per unit): BTC=3,000,000.00 | ETH=200,000.00 | USD=83.00"
        );
    }

    #[test]
    fn test_configured_fiat_labels() {
        let mut app = App::with_fiat(Fiat::new("eur"));
        app.update_rates(RateCache::with_rates(60_000.0, 3_000.0, 0.92));
        app.next_tab();

        assert_eq!(
            app.rate_line(),
            "Rates (€ per unit): BTC=60,000.00 | ETH=3,000.00 | USD=0.92"
        );

        type_amount(&mut app, "250");
        app.perform(WalletAction::Deposit);
        assert_eq!(app.status, Some(Status::Info("Dépôt de €250.00".to_string())));
        assert_eq!(app.fiat().code(), "EUR");
    }
}
