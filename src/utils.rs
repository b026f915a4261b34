//! Utility functions for working with PLC bit-table words.
//!
//! Binary, input, and output files arrive as 16-bit words; these helpers
//! pick individual bits and bit ranges out of them. Timer and counter
//! status flags live in the top bits of the element's status word, which is
//! where [`extract_bits`] earns its keep.
//!
//! # Example
//!
//! ```
//! use ab_df1::utils::{extract_bits, get_bit, word_to_bits};
//!
//! // A timer status word: EN (bit 15) and TT (bit 14) on, DN (bit 13) off.
//! let status: u16 = 0b1100_0000_0000_0000;
//!
//! assert!(get_bit(status, 15));
//! assert!(!get_bit(status, 13));
//! assert_eq!(extract_bits(status, 13, 15), 0b110);
//!
//! let bits = word_to_bits(status);
//! assert!(bits[14]);
//! ```

/// Gets a single bit from a 16-bit word.
///
/// # Arguments
///
/// * `value` - The 16-bit word to extract from
/// * `bit` - Bit position (0-15, where 0 is LSB)
///
/// # Example
///
/// ```
/// use ab_df1::utils::get_bit;
///
/// let value: u16 = 0b0000_0000_0000_0101; // bits 0 and 2 are set
/// assert!(get_bit(value, 0));
/// assert!(!get_bit(value, 1));
/// assert!(get_bit(value, 2));
/// ```
#[inline]
pub fn get_bit(value: u16, bit: u8) -> bool {
    (value & (1 << bit)) != 0
}

/// Sets or clears a single bit in a 16-bit word.
///
/// # Arguments
///
/// * `value` - The 16-bit word to modify
/// * `bit` - Bit position (0-15, where 0 is LSB)
/// * `state` - Value to set (true = ON, false = OFF)
///
/// # Example
///
/// ```
/// use ab_df1::utils::set_bit;
///
/// assert_eq!(set_bit(0, 5, true), 0b0000_0000_0010_0000);
/// assert_eq!(set_bit(0xFFFF, 8, false), 0xFEFF);
/// ```
#[inline]
pub fn set_bit(value: u16, bit: u8, state: bool) -> u16 {
    if state {
        value | (1 << bit)
    } else {
        value & !(1 << bit)
    }
}

/// Extracts a range of bits from a 16-bit word.
///
/// # Arguments
///
/// * `value` - The 16-bit word to extract from
/// * `start_bit` - Starting bit position (inclusive)
/// * `end_bit` - Ending bit position (inclusive)
///
/// # Returns
///
/// The extracted bits as a u16, shifted down to bit 0.
///
/// # Example
///
/// ```
/// use ab_df1::utils::extract_bits;
///
/// // Counter status flags occupy bits 10-15.
/// let status: u16 = 0b1010_0100_0000_0000;
/// assert_eq!(extract_bits(status, 10, 15), 0b101001);
/// ```
pub fn extract_bits(value: u16, start_bit: u8, end_bit: u8) -> u16 {
    let mask = ((1u32 << (end_bit - start_bit + 1)) - 1) as u16;
    (value >> start_bit) & mask
}

/// Converts a 16-bit word to an array of 16 boolean values.
///
/// Index 0 of the result is the LSB, matching the PLC's bit addressing
/// within a word.
///
/// # Example
///
/// ```
/// use ab_df1::utils::word_to_bits;
///
/// let value: u16 = 0b0000_0000_0000_0011;
/// let bits = word_to_bits(value);
/// assert!(bits[0]);
/// assert!(bits[1]);
/// assert!(!bits[2]);
/// ```
pub fn word_to_bits(value: u16) -> [bool; 16] {
    let mut bits = [false; 16];
    for (i, slot) in bits.iter_mut().enumerate() {
        *slot = get_bit(value, i as u8);
    }
    bits
}

/// Converts an array of 16 booleans back to a 16-bit word.
///
/// # Example
///
/// ```
/// use ab_df1::utils::bits_to_word;
///
/// let mut bits = [false; 16];
/// bits[0] = true;
/// bits[1] = true;
/// assert_eq!(bits_to_word(&bits), 0b0000_0000_0000_0011);
/// ```
pub fn bits_to_word(bits: &[bool; 16]) -> u16 {
    let mut value: u16 = 0;
    for (i, &bit) in bits.iter().enumerate() {
        if bit {
            value |= 1 << i;
        }
    }
    value
}
