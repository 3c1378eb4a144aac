// ============================================================================
// Analyse des expressions saisies
// ============================================================================
// Format accepté : "<a> <op> <b>" avec op parmi + - * /
//
//   "10.5 + 20.25"   -> (10.5, Add, 20.25)
//   "-3 * 4"         -> (-3, Mul, 4)       signe de tête = nombre
//   "1e-3 - -2"      -> (0.001, Sub, -2)   signe d'exposant = nombre
//
// L'opérateur est le premier symbole qui suit un caractère d'opérande
// (chiffre, lettre ou point, espaces ignorés). Un signe qui suit un 'e'
// ou un autre opérateur appartient au nombre suivant.
// ============================================================================

use std::fmt;

use super::bits::hex32;
use super::ops::{alu, AluResult, Op};
use crate::error::{WalletError, WalletResult};

/// Expression binaire analysée
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Expression {
    pub lhs: f64,
    pub op: Op,
    pub rhs: f64,
}

impl Expression {
    /// Évalue l'expression avec l'ALU simple précision
    pub fn evaluate(&self) -> AluResult {
        alu(self.lhs, self.rhs, self.op)
    }

    /// Évalue et formate le compte rendu affiché dans l'onglet ALU
    ///
    /// Deux lignes : le résultat avec son motif, puis sa décomposition.
    pub fn report(&self) -> String {
        let result = self.evaluate();
        format!(
            "{} = {:.8} bits={}\n   {}",
            self,
            result.value,
            hex32(result.bits),
            result.fields()
        )
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op, self.rhs)
    }
}

/// Analyse une expression binaire
pub fn parse_expression(text: &str) -> WalletResult<Expression> {
    let text = text.trim();
    if text.is_empty() {
        return Err(WalletError::InvalidExpression(
            "l'expression est vide".to_string(),
        ));
    }

    let (index, op) = find_operator(text).ok_or_else(|| {
        WalletError::InvalidExpression(
            "l'expression doit contenir +, -, * ou /".to_string(),
        )
    })?;

    let lhs = parse_operand(&text[..index])?;
    let rhs = parse_operand(&text[index + 1..])?;

    Ok(Expression { lhs, op, rhs })
}

/// Position et nature de l'opérateur binaire
fn find_operator(text: &str) -> Option<(usize, Op)> {
    // Dernier caractère significatif vu (hors espaces)
    let mut previous: Option<char> = None;

    for (index, c) in text.char_indices() {
        if let Some(op) = Op::from_symbol(c) {
            let follows_operand = match previous {
                Some(p) => (p.is_ascii_alphanumeric() || p == '.') && !ends_exponent(text, index),
                None => false,
            };
            if follows_operand {
                return Some((index, op));
            }
        }
        if !c.is_whitespace() {
            previous = Some(c);
        }
    }
    None
}

/// Vrai si le signe en `index` suit directement un 'e' d'exposant (ex: 1e-3)
fn ends_exponent(text: &str, index: usize) -> bool {
    let before = &text[..index];
    let mut chars = before.chars().rev();
    match chars.next() {
        Some('e') | Some('E') => chars.next().map_or(false, |c| c.is_ascii_digit() || c == '.'),
        _ => false,
    }
}

fn parse_operand(raw: &str) -> WalletResult<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WalletError::InvalidExpression(
            "seuls deux opérandes sont supportés".to_string(),
        ));
    }
    trimmed.parse::<f64>().map_err(|_| {
        WalletError::InvalidExpression(format!("opérande invalide '{}'", trimmed))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let expr = parse_expression("10.5 + 20.25").unwrap();
        assert_eq!(expr, Expression { lhs: 10.5, op: Op::Add, rhs: 20.25 });

        let expr = parse_expression("50/3").unwrap();
        assert_eq!(expr.op, Op::Div);
        assert_eq!(expr.rhs, 3.0);
    }

    #[test]
    fn test_parse_signed_operands() {
        let expr = parse_expression("-3 * 4").unwrap();
        assert_eq!(expr, Expression { lhs: -3.0, op: Op::Mul, rhs: 4.0 });

        let expr = parse_expression("5 - -2").unwrap();
        assert_eq!(expr, Expression { lhs: 5.0, op: Op::Sub, rhs: -2.0 });
    }

    #[test]
    fn test_parse_exponent() {
        let expr = parse_expression("1e-3 + 2E+2").unwrap();
        assert_eq!(expr.lhs, 0.001);
        assert_eq!(expr.op, Op::Add);
        assert_eq!(expr.rhs, 200.0);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_expression(""),
            Err(WalletError::InvalidExpression(_))
        ));
        assert!(matches!(
            parse_expression("42"),
            Err(WalletError::InvalidExpression(_))
        ));
        assert!(matches!(
            parse_expression("1 + 2 + 3"),
            Err(WalletError::InvalidExpression(_))
        ));
        assert!(matches!(
            parse_expression("abc + 1"),
            Err(WalletError::InvalidExpression(_))
        ));
        assert!(matches!(
            parse_expression("3 +"),
            Err(WalletError::InvalidExpression(_))
        ));
    }

    #[test]
    fn test_report() {
        let report = parse_expression("10.5 + 20.25").unwrap().report();
        assert!(report.starts_with("10.5 + 20.25 = 30.75000000 bits=0x41F60000"));
        assert!(report.contains("Mantissa:11101100000000000000000"));
    }
}
