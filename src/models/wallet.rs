// ============================================================================
// Structure : Wallet
// ============================================================================
// Portefeuille multi-devises : un solde fiat + trois soldes en unités
//
// INVARIANT : aucun solde n'est jamais négatif
// - Chaque opération valide TOUT avant de modifier quoi que ce soit
// - Une opération qui échoue laisse le portefeuille intact
//
// PRÉCISION : chaque calcul passe par l'ALU simple précision, les soldes
// contiennent donc toujours des valeurs représentables en f32.
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::alu::{alu, to_single, Op};
use crate::error::{WalletError, WalletResult};
use crate::models::{Currency, Fiat};

/// Portefeuille en mémoire (aucune persistance)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    denomination: Fiat,
    fiat: f64,
    btc: f64,
    eth: f64,
    usd: f64,
}

impl Wallet {
    /// Portefeuille vide : tous les soldes à zéro, fiat INR
    pub fn new() -> Self {
        Self::default()
    }

    /// Portefeuille vide libellé dans un autre fiat
    pub fn with_fiat(denomination: Fiat) -> Self {
        Self {
            denomination,
            ..Self::default()
        }
    }

    /// Fiat de référence
    pub fn denomination(&self) -> &Fiat {
        &self.denomination
    }

    /// Solde fiat
    pub fn fiat(&self) -> f64 {
        self.fiat
    }

    /// Solde d'une devise
    pub fn balance(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Btc => self.btc,
            Currency::Eth => self.eth,
            Currency::Usd => self.usd,
        }
    }

    fn balance_mut(&mut self, currency: Currency) -> &mut f64 {
        match currency {
            Currency::Btc => &mut self.btc,
            Currency::Eth => &mut self.eth,
            Currency::Usd => &mut self.usd,
        }
    }

    /// Dépose du fiat
    ///
    /// Refuse les montants négatifs ou non finis, ainsi qu'un solde qui
    /// dépasserait f32::MAX ; zéro est accepté.
    pub fn deposit(&mut self, amount: f64) -> WalletResult<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(WalletError::InvalidAmount(amount));
        }
        let balance = alu(self.fiat, amount, Op::Add).value;
        if !balance.is_finite() {
            return Err(WalletError::InvalidAmount(amount));
        }
        self.fiat = balance;
        info!(amount, balance = self.fiat, "Deposit applied");
        Ok(())
    }

    /// Retire du fiat
    ///
    /// Le montant est arrondi en simple précision avant d'être comparé au
    /// solde : retirer exactement ce qui a été déposé est toujours possible.
    pub fn withdraw(&mut self, amount: f64) -> WalletResult<()> {
        let requested = to_single(amount);
        if !is_positive(requested) {
            return Err(WalletError::InvalidAmount(amount));
        }
        if requested > self.fiat {
            return Err(WalletError::InsufficientFunds {
                currency: self.denomination.code().to_string(),
                requested: amount,
                available: self.fiat,
            });
        }
        self.fiat = alu(self.fiat, requested, Op::Sub).value;
        info!(amount, balance = self.fiat, "Withdrawal applied");
        Ok(())
    }

    /// Convertit du fiat en devise au taux donné (fiat par unité)
    ///
    /// Renvoie le nombre d'unités créditées.
    pub fn convert_fiat_to_currency(
        &mut self,
        currency: &str,
        fiat_amount: f64,
        rate: f64,
    ) -> WalletResult<f64> {
        let requested = to_single(fiat_amount);
        if !is_positive(requested) || requested > self.fiat {
            return Err(WalletError::InvalidAmount(fiat_amount));
        }
        if !is_positive(rate) {
            return Err(WalletError::InvalidRate(rate));
        }
        let currency: Currency = currency.parse()?;

        let per_unit = alu(1.0, rate, Op::Div).value;
        let units = alu(requested, per_unit, Op::Mul).value;
        if !is_positive(units) {
            // Taux hors du domaine simple précision (1/taux nul ou infini)
            return Err(WalletError::InvalidRate(rate));
        }
        let credited = alu(self.balance(currency), units, Op::Add).value;
        if !credited.is_finite() {
            return Err(WalletError::InvalidAmount(fiat_amount));
        }

        self.fiat = alu(self.fiat, requested, Op::Sub).value;
        *self.balance_mut(currency) = credited;

        debug!(%currency, fiat_amount, rate, units, "Fiat converted to currency");
        Ok(units)
    }

    /// Convertit des unités de devise en fiat au taux donné (fiat par unité)
    ///
    /// Renvoie la valeur fiat créditée.
    pub fn convert_currency_to_fiat(
        &mut self,
        currency: &str,
        unit_amount: f64,
        rate: f64,
    ) -> WalletResult<f64> {
        let requested = to_single(unit_amount);
        if !is_positive(requested) {
            return Err(WalletError::InvalidAmount(unit_amount));
        }
        if !is_positive(rate) {
            return Err(WalletError::InvalidRate(rate));
        }
        let currency: Currency = currency.parse()?;

        let available = self.balance(currency);
        if requested > available {
            return Err(WalletError::InsufficientFunds {
                currency: currency.symbol().to_string(),
                requested: unit_amount,
                available,
            });
        }

        let fiat_value = alu(requested, rate, Op::Mul).value;
        let credited = alu(self.fiat, fiat_value, Op::Add).value;
        if !credited.is_finite() {
            return Err(WalletError::InvalidAmount(unit_amount));
        }

        *self.balance_mut(currency) = alu(available, requested, Op::Sub).value;
        self.fiat = credited;

        debug!(%currency, unit_amount, rate, fiat_value, "Currency converted to fiat");
        Ok(fiat_value)
    }
}

/// Strictement positif et fini (NaN est rejeté)
fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Formate un nombre avec séparateur de milliers (ex: 1,234,567.89)
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value.is_sign_negative() && value != 0.0 { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Un solde par ligne, comme le panneau de l'onglet Wallet
impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {}",
            self.denomination,
            self.denomination.format_amount(self.fiat)
        )?;
        for currency in Currency::ALL {
            writeln!(
                f,
                "{}: {:.*}",
                currency,
                currency.display_decimals(),
                self.balance(currency)
            )?;
        }
        Ok(())
    }
}
