// ============================================================================
// Module : alu
// ============================================================================
// Simulateur d'ALU IEEE-754 simple précision (32 bits)
//
// - bits : conversions f32 <-> u32 et décomposition signe/exposant/mantisse
// - ops : les quatre opérations, arrondies en simple précision
// - expression : analyse des saisies "10.5 + 20.25"
// ============================================================================

pub mod bits;
pub mod expression;
pub mod ops;

pub use bits::{bits_to_f32, decompose, f32_bits, hex32, FloatFields};
pub use expression::{parse_expression, Expression};
pub use ops::{alu, run_arithmetic, to_single, AluResult, Op};
