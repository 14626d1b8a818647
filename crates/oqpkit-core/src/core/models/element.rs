use phf::{Map, phf_map};

/// Symbol returned for atomic numbers outside the periodic table.
pub const UNKNOWN_ELEMENT_SYMBOL: &str = "X";

static ELEMENT_SYMBOLS: Map<u32, &'static str> = phf_map! {
    1u32 => "H", 2u32 => "He",
    3u32 => "Li", 4u32 => "Be", 5u32 => "B", 6u32 => "C", 7u32 => "N", 8u32 => "O", 9u32 => "F", 10u32 => "Ne",
    11u32 => "Na", 12u32 => "Mg", 13u32 => "Al", 14u32 => "Si", 15u32 => "P", 16u32 => "S", 17u32 => "Cl", 18u32 => "Ar",
    19u32 => "K", 20u32 => "Ca", 21u32 => "Sc", 22u32 => "Ti", 23u32 => "V", 24u32 => "Cr", 25u32 => "Mn", 26u32 => "Fe",
    27u32 => "Co", 28u32 => "Ni", 29u32 => "Cu", 30u32 => "Zn", 31u32 => "Ga", 32u32 => "Ge", 33u32 => "As", 34u32 => "Se",
    35u32 => "Br", 36u32 => "Kr",
    37u32 => "Rb", 38u32 => "Sr", 39u32 => "Y", 40u32 => "Zr", 41u32 => "Nb", 42u32 => "Mo", 43u32 => "Tc", 44u32 => "Ru",
    45u32 => "Rh", 46u32 => "Pd", 47u32 => "Ag", 48u32 => "Cd", 49u32 => "In", 50u32 => "Sn", 51u32 => "Sb", 52u32 => "Te",
    53u32 => "I", 54u32 => "Xe",
    55u32 => "Cs", 56u32 => "Ba", 57u32 => "La", 58u32 => "Ce", 59u32 => "Pr", 60u32 => "Nd", 61u32 => "Pm", 62u32 => "Sm",
    63u32 => "Eu", 64u32 => "Gd", 65u32 => "Tb", 66u32 => "Dy", 67u32 => "Ho", 68u32 => "Er", 69u32 => "Tm", 70u32 => "Yb",
    71u32 => "Lu", 72u32 => "Hf", 73u32 => "Ta", 74u32 => "W", 75u32 => "Re", 76u32 => "Os", 77u32 => "Ir", 78u32 => "Pt",
    79u32 => "Au", 80u32 => "Hg", 81u32 => "Tl", 82u32 => "Pb", 83u32 => "Bi", 84u32 => "Po", 85u32 => "At", 86u32 => "Rn",
    87u32 => "Fr", 88u32 => "Ra", 89u32 => "Ac", 90u32 => "Th", 91u32 => "Pa", 92u32 => "U", 93u32 => "Np", 94u32 => "Pu",
    95u32 => "Am", 96u32 => "Cm", 97u32 => "Bk", 98u32 => "Cf", 99u32 => "Es", 100u32 => "Fm", 101u32 => "Md", 102u32 => "No",
    103u32 => "Lr", 104u32 => "Rf", 105u32 => "Db", 106u32 => "Sg", 107u32 => "Bh", 108u32 => "Hs", 109u32 => "Mt",
    110u32 => "Ds", 111u32 => "Rg", 112u32 => "Cn", 113u32 => "Nh", 114u32 => "Fl", 115u32 => "Mc", 116u32 => "Lv",
    117u32 => "Ts", 118u32 => "Og",
};

/// Returns the chemical symbol for an atomic number, or [`UNKNOWN_ELEMENT_SYMBOL`].
pub fn element_symbol(atomic_number: u32) -> &'static str {
    ELEMENT_SYMBOLS
        .get(&atomic_number)
        .copied()
        .unwrap_or(UNKNOWN_ELEMENT_SYMBOL)
}

/// Looks up the symbol for an atomic number written as a floating-point field.
///
/// Logs print nuclear charges such as `8.0`; the value is truncated toward zero before
/// the lookup. Negative and non-finite values map to the placeholder.
pub fn element_symbol_for_field(value: f64) -> &'static str {
    if !value.is_finite() || value < 0.0 || value > f64::from(u32::MAX) {
        return UNKNOWN_ELEMENT_SYMBOL;
    }
    element_symbol(value.trunc() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_symbol_maps_known_atomic_numbers() {
        assert_eq!(element_symbol(1), "H");
        assert_eq!(element_symbol(6), "C");
        assert_eq!(element_symbol(8), "O");
        assert_eq!(element_symbol(17), "Cl");
        assert_eq!(element_symbol(64), "Gd");
        assert_eq!(element_symbol(118), "Og");
    }

    #[test]
    fn element_symbol_returns_placeholder_for_unknown_numbers() {
        assert_eq!(element_symbol(0), UNKNOWN_ELEMENT_SYMBOL);
        assert_eq!(element_symbol(119), UNKNOWN_ELEMENT_SYMBOL);
        assert_eq!(element_symbol(999), "X");
    }

    #[test]
    fn element_symbol_for_field_truncates_float_literals() {
        assert_eq!(element_symbol_for_field(8.0), "O");
        assert_eq!(element_symbol_for_field(1.9), "H");
        assert_eq!(element_symbol_for_field(999.0), "X");
    }

    #[test]
    fn element_symbol_for_field_rejects_invalid_values() {
        assert_eq!(element_symbol_for_field(-1.0), "X");
        assert_eq!(element_symbol_for_field(f64::NAN), "X");
        assert_eq!(element_symbol_for_field(f64::INFINITY), "X");
    }
}
