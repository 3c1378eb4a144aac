// ============================================================================
// Opérations de l'ALU
// ============================================================================
// Les opérandes arrivent en f64, le calcul se fait en double précision,
// puis le résultat est arrondi en simple précision (f32).
//
// Le résultat exposé est donc toujours représentable en f32 : c'est ce qui
// garantit que le portefeuille et l'affichage des bits restent cohérents.
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::bits::{decompose, f32_bits, FloatFields};
use crate::error::{WalletError, WalletResult};

/// Les quatre opérations de base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    /// Symbole mathématique (pour l'affichage)
    pub fn symbol(&self) -> char {
        match self {
            Op::Add => '+',
            Op::Sub => '-',
            Op::Mul => '*',
            Op::Div => '/',
        }
    }

    /// Opération correspondant à un symbole, si c'en est un
    pub fn from_symbol(c: char) -> Option<Op> {
        match c {
            '+' => Some(Op::Add),
            '-' => Some(Op::Sub),
            '*' => Some(Op::Mul),
            '/' => Some(Op::Div),
            _ => None,
        }
    }

    /// Applique l'opération en double précision (avant arrondi)
    fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            Op::Add => a + b,
            Op::Sub => a - b,
            Op::Mul => a * b,
            // Division par zéro : ±inf ou NaN selon IEEE, pas d'erreur
            Op::Div => a / b,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Accepte "add"/"sub"/"mul"/"div" (casse ignorée) et "+"/"-"/"*"/"/"
///
/// CONCEPT RUST : FromStr
/// - Permet d'écrire "add".parse::<Op>()
/// - L'erreur associée est notre type du domaine
impl FromStr for Op {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "add" | "+" => Ok(Op::Add),
            "sub" | "-" => Ok(Op::Sub),
            "mul" | "*" => Ok(Op::Mul),
            "div" | "/" => Ok(Op::Div),
            _ => Err(WalletError::InvalidOperation(trimmed.to_string())),
        }
    }
}

/// Résultat d'une opération de l'ALU
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AluResult {
    /// Valeur arrondie en f32, ré-élargie en f64
    pub value: f64,

    /// Encodage IEEE-754 simple précision de la valeur
    pub bits: u32,
}

impl AluResult {
    /// Décompose le motif du résultat
    pub fn fields(&self) -> FloatFields {
        decompose(self.bits)
    }
}

/// Exécute une opération et arrondit le résultat en simple précision
pub fn alu(a: f64, b: f64, op: Op) -> AluResult {
    let rounded = op.apply(a, b) as f32;
    AluResult {
        value: rounded as f64,
        bits: f32_bits(rounded as f64),
    }
}

/// Ramène une valeur dans le domaine simple précision (opérande de l'ALU)
pub fn to_single(x: f64) -> f64 {
    x as f32 as f64
}

/// Point d'entrée par nom d'opération (utilisé par la couche de présentation)
pub fn run_arithmetic(a: f64, b: f64, op: &str) -> WalletResult<AluResult> {
    let op: Op = op.parse()?;
    Ok(alu(a, b, op))
}
