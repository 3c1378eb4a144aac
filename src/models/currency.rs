// ============================================================================
// Enum : Currency
// ============================================================================
// Les trois devises que le portefeuille sait détenir.
// Le fiat (INR par défaut) n'en fait pas partie : c'est la devise de référence,
// décrite par `Fiat` (code + signe affiché), choisie par la configuration.
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WalletError;
use crate::models::format_thousands;

/// Devise détenue en unités dans le portefeuille
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    Btc,
    Eth,
    Usd,
}

impl Currency {
    /// Toutes les devises, dans l'ordre du sélecteur de l'UI
    pub const ALL: [Currency; 3] = [Currency::Btc, Currency::Eth, Currency::Usd];

    /// Symbole affiché (ex: "BTC")
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Btc => "BTC",
            Currency::Eth => "ETH",
            Currency::Usd => "USD",
        }
    }

    /// Nombre de décimales à l'affichage
    pub fn display_decimals(&self) -> usize {
        match self {
            Currency::Btc | Currency::Eth => 8,
            Currency::Usd => 2,
        }
    }

    /// Devise suivante (cycle BTC -> ETH -> USD -> BTC)
    pub fn next(&self) -> Currency {
        match self {
            Currency::Btc => Currency::Eth,
            Currency::Eth => Currency::Usd,
            Currency::Usd => Currency::Btc,
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Btc
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Currency {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "BTC" => Ok(Currency::Btc),
            "ETH" => Ok(Currency::Eth),
            "USD" => Ok(Currency::Usd),
            _ => Err(WalletError::UnsupportedCurrency(trimmed.to_string())),
        }
    }
}

// ============================================================================
// Struct : Fiat
// ============================================================================

/// Devise de référence du portefeuille (code ISO en majuscules)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fiat {
    code: String,
}

impl Fiat {
    /// Construit depuis un code quelconque ("inr", " eur ")
    pub fn new(code: &str) -> Self {
        Self {
            code: code.trim().to_ascii_uppercase(),
        }
    }

    /// Code affiché (ex: "INR")
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Signe monétaire, vide si inconnu
    pub fn sign(&self) -> &'static str {
        match self.code.as_str() {
            "INR" => "₹",
            "EUR" => "€",
            "USD" => "$",
            "GBP" => "£",
            "JPY" => "¥",
            _ => "",
        }
    }

    /// Signe si connu, sinon le code
    pub fn label(&self) -> &str {
        match self.sign() {
            "" => &self.code,
            sign => sign,
        }
    }

    /// Formate un montant fiat (ex: "₹1,500.00", ou "1,500.00 CHF")
    pub fn format_amount(&self, amount: f64) -> String {
        let value = format_thousands(amount, 2);
        match self.sign() {
            "" => format!("{} {}", value, self.code),
            sign => format!("{}{}", sign, value),
        }
    }
}

impl Default for Fiat {
    fn default() -> Self {
        Fiat::new("INR")
    }
}

impl fmt::Display for Fiat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_currency() {
        assert_eq!("btc".parse::<Currency>(), Ok(Currency::Btc));
        assert_eq!(" ETH ".parse::<Currency>(), Ok(Currency::Eth));
        assert_eq!(
            "XRP".parse::<Currency>(),
            Err(WalletError::UnsupportedCurrency("XRP".to_string()))
        );
    }

    #[test]
    fn test_cycle() {
        let mut currency = Currency::default();
        for expected in [Currency::Eth, Currency::Usd, Currency::Btc] {
            currency = currency.next();
            assert_eq!(currency, expected);
        }
    }

    #[test]
    fn test_fiat_labels() {
        let inr = Fiat::default();
        assert_eq!(inr.code(), "INR");
        assert_eq!(inr.format_amount(1500.0), "₹1,500.00");

        let eur = Fiat::new(" eur ");
        assert_eq!(eur.to_string(), "EUR");
        assert_eq!(eur.format_amount(2.5), "€2.50");

        assert_eq!(Fiat::new("chf").format_amount(1234.0), "1,234.00 CHF");
        assert_eq!(Fiat::new("chf").label(), "CHF");
        assert_eq!(eur.label(), "€");
    }
}
