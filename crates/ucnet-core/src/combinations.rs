//! Enumeration of on/off combinations and bit-string conversions.
//!
//! A bit-string identifier lists unit 0 first: `"100"` means unit 0 is online
//! and units 1 and 2 are offline. Read as a binary number the same string is
//! the combination index, so `int_to_bin_str(4, 3) == "100"`.

use crate::{PowerState, UcError, UcResult};

/// Largest unit count whose combinations are enumerated.
///
/// The layered network holds `2^n` candidate states per period before
/// pruning, so anything past this is out of reach regardless of hardware.
pub const MAX_UNITS: usize = 24;

/// Every fixed-width bit-string from `0` to `2^n_units - 1`, ascending.
///
/// ```
/// use ucnet_core::combinations::all_bit_strings;
/// assert_eq!(all_bit_strings(2), vec!["00", "01", "10", "11"]);
/// ```
pub fn all_bit_strings(n_units: usize) -> Vec<String> {
    all_states(n_units).map(|s| s.to_string()).collect()
}

/// Every [`PowerState`] of width `n_units`, in increasing index order.
pub fn all_states(n_units: usize) -> impl Iterator<Item = PowerState> {
    let count = combination_count(n_units);
    (0..count).map(move |index| PowerState::from_index_unchecked(index, n_units))
}

/// Number of combinations, `2^n_units`.
pub fn combination_count(n_units: usize) -> u64 {
    1u64 << n_units
}

/// Zero-padded binary representation of `value` with `width` digits.
pub fn int_to_bin_str(value: u64, width: usize) -> String {
    format!("{value:0width$b}")
}

/// Parse a bit-string into its integer value.
pub fn bin_str_to_int(bits: &str) -> UcResult<u64> {
    if bits.is_empty() {
        return Ok(0);
    }
    if bits.len() > 64 {
        return Err(UcError::Parse(format!(
            "bit-string of length {} does not fit in 64 bits",
            bits.len()
        )));
    }
    u64::from_str_radix(bits, 2)
        .map_err(|_| UcError::Parse(format!("'{bits}' is not a bit-string")))
}

/// Parse a bit-string into one boolean per unit.
pub fn bin_str_to_bools(bits: &str) -> UcResult<Vec<bool>> {
    bits.chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(UcError::Parse(format!(
                "invalid character '{other}' in bit-string '{bits}'"
            ))),
        })
        .collect()
}

/// Inverse of [`bin_str_to_bools`].
pub fn bools_to_bin_str(bits: &[bool]) -> String {
    bits.iter().map(|&on| if on { '1' } else { '0' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_enumerates_all_combinations_in_order() {
        for n in 0..=8 {
            let strings = all_bit_strings(n);
            assert_eq!(strings.len(), 1 << n);

            let distinct: HashSet<&String> = strings.iter().collect();
            assert_eq!(distinct.len(), strings.len());

            for (i, s) in strings.iter().enumerate() {
                assert_eq!(s.len(), n);
                assert_eq!(bin_str_to_int(s).unwrap(), i as u64);
            }
        }
    }

    #[test]
    fn test_three_unit_listing() {
        assert_eq!(
            all_bit_strings(3),
            vec!["000", "001", "010", "011", "100", "101", "110", "111"]
        );
    }

    #[test]
    fn test_zero_units_yields_single_empty_state() {
        assert_eq!(all_bit_strings(0), vec![String::new()]);
    }

    #[test]
    fn test_string_integer_roundtrip() {
        for s in ["0", "1", "0011", "1010101", "0000000000"] {
            let value = bin_str_to_int(s).unwrap();
            assert_eq!(int_to_bin_str(value, s.len()), s);
        }
    }

    #[test]
    fn test_bool_conversion() {
        assert_eq!(bin_str_to_bools("101").unwrap(), vec![true, false, true]);
        assert_eq!(bools_to_bin_str(&[false, true, true]), "011");
        assert!(bin_str_to_bools("1x0").is_err());
    }

    #[test]
    fn test_rejects_non_binary_input() {
        assert!(bin_str_to_int("102").is_err());
    }
}
