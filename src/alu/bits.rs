// ============================================================================
// Bits IEEE-754 simple précision
// ============================================================================
// Format d'un f32 :
//
//   31 | 30 ........ 23 | 22 ..................... 0
//   S  |  exposant (8)  |       mantisse (23)
//
// CONCEPT RUST : f32::to_bits / f32::from_bits
// - Réinterprète les 32 bits sans aucune conversion numérique
// - Équivalent sûr d'un transmute
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

/// Biais de l'exposant en simple précision
pub const EXPONENT_BIAS: i32 = 127;

const SIGN_SHIFT: u32 = 31;
const EXPONENT_SHIFT: u32 = 23;
const EXPONENT_MASK: u32 = 0xFF;
const MANTISSA_MASK: u32 = 0x7F_FFFF;

/// Arrondit un f64 en simple précision et renvoie son encodage
///
/// Le `as f32` est le seul arrondi : au plus proche, pair en cas d'égalité.
pub fn f32_bits(x: f64) -> u32 {
    (x as f32).to_bits()
}

/// Reconstruit la valeur représentée par un motif de 32 bits
pub fn bits_to_f32(bits: u32) -> f32 {
    f32::from_bits(bits)
}

/// Formate un motif en hexadécimal sur 8 chiffres (ex: 0x41F80000)
pub fn hex32(bits: u32) -> String {
    format!("0x{:08X}", bits)
}

/// Champs d'un motif IEEE-754 simple précision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatFields {
    /// Bit de signe (0 = positif, 1 = négatif)
    pub sign: u8,

    /// Exposant biaisé, tel que stocké (0..=255)
    pub exponent: u8,

    /// Les 23 bits de mantisse (sans le 1 implicite)
    pub mantissa: u32,
}

impl FloatFields {
    /// Exposant débiaisé (exposant - 127)
    pub fn unbiased_exponent(&self) -> i32 {
        self.exponent as i32 - EXPONENT_BIAS
    }

    /// Recompose le motif de 32 bits
    pub fn to_bits(&self) -> u32 {
        ((self.sign as u32) << SIGN_SHIFT)
            | ((self.exponent as u32) << EXPONENT_SHIFT)
            | (self.mantissa & MANTISSA_MASK)
    }
}

/// Affichage : `Sign:0 Exponent:10000011 (dec 131->bias +4) Mantissa:111...`
impl fmt::Display for FloatFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sign:{} Exponent:{:08b} (dec {}->bias {:+}) Mantissa:{:023b}",
            self.sign,
            self.exponent,
            self.exponent,
            self.unbiased_exponent(),
            self.mantissa
        )
    }
}

/// Extrait signe, exposant biaisé et mantisse d'un motif de 32 bits
///
/// Pure manipulation de bits : aucun arrondi, aucune interprétation
/// (NaN et infinis se décomposent comme les autres motifs).
pub fn decompose(bits: u32) -> FloatFields {
    FloatFields {
        sign: ((bits >> SIGN_SHIFT) & 1) as u8,
        exponent: ((bits >> EXPONENT_SHIFT) & EXPONENT_MASK) as u8,
        mantissa: bits & MANTISSA_MASK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f32_bits_known_values() {
        assert_eq!(f32_bits(1.0), 0x3F80_0000);
        assert_eq!(f32_bits(-2.0), 0xC000_0000);
        assert_eq!(f32_bits(30.75), 0x41F6_0000);
        assert_eq!(f32_bits(0.0), 0);
        assert_eq!(f32_bits(-0.0), 0x8000_0000);
    }

    #[test]
    fn test_f32_bits_rounds_to_single_precision() {
        // 0.1 n'est pas représentable : on doit obtenir l'arrondi f32
        assert_eq!(f32_bits(0.1), 0x3DCC_CCCD);
        assert_eq!(bits_to_f32(f32_bits(0.1)), 0.1_f32);
    }

    #[test]
    fn test_hex32() {
        assert_eq!(hex32(0x41F6_0000), "0x41F60000");
        assert_eq!(hex32(1), "0x00000001");
    }

    #[test]
    fn test_decompose() {
        // 30.75 = 1.921875 * 2^4
        let fields = decompose(0x41F6_0000);
        assert_eq!(fields.sign, 0);
        assert_eq!(fields.exponent, 131);
        assert_eq!(fields.unbiased_exponent(), 4);
        assert_eq!(fields.mantissa, 0x76_0000);
        assert_eq!(fields.to_bits(), 0x41F6_0000);

        let negative = decompose(f32_bits(-1.0));
        assert_eq!(negative.sign, 1);
        assert_eq!(negative.exponent, 127);
        assert_eq!(negative.mantissa, 0);
    }

    #[test]
    fn test_decompose_special_values() {
        let inf = decompose(f32::INFINITY.to_bits());
        assert_eq!(inf.exponent, 255);
        assert_eq!(inf.mantissa, 0);

        let nan = decompose(f32::NAN.to_bits());
        assert_eq!(nan.exponent, 255);
        assert_ne!(nan.mantissa, 0);
    }

    #[test]
    fn test_display() {
        let text = decompose(f32_bits(30.75)).to_string();
        assert_eq!(
            text,
            "Sign:0 Exponent:10000011 (dec 131->bias +4) Mantissa:11101100000000000000000"
        );
    }
}
