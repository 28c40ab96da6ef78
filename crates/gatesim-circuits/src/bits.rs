//! Conversions between integers, binary strings and bit vectors.
//!
//! Bit vectors are least-significant bit first, matching the port numbering
//! of the library circuits (`A0` is the low bit). Binary strings are written
//! most-significant bit first, the way numbers are read.

use gatesim_core::{LogicBlock, Propagation};

use crate::error::Error;

/// Maximum width of a bit vector converted to or from an integer.
pub const MAX_WIDTH: usize = u64::BITS as usize;

fn check_width(width: usize) -> Result<(), Error> {
    if width > MAX_WIDTH {
        return Err(Error::WidthMismatch {
            expected: MAX_WIDTH,
            found: width,
        });
    }
    Ok(())
}

/// The low `width` bits of `value`, LSB first.
///
/// # Errors
///
/// - [`Error::OutOfRange`] if `value` needs more than `width` bits
/// - [`Error::WidthMismatch`] if `width` exceeds [`MAX_WIDTH`]
pub fn to_bits(value: u64, width: usize) -> Result<Vec<bool>, Error> {
    check_width(width)?;
    if width < MAX_WIDTH && value >> width != 0 {
        return Err(Error::OutOfRange { value, width });
    }
    Ok((0..width).map(|i| (value >> i) & 1 == 1).collect())
}

/// Integer value of an LSB-first bit vector.
///
/// # Errors
///
/// [`Error::WidthMismatch`] if the vector is wider than [`MAX_WIDTH`].
pub fn bits_to_int(bits: &[bool]) -> Result<u64, Error> {
    check_width(bits.len())?;
    Ok(bits
        .iter()
        .enumerate()
        .fold(0, |acc, (i, &bit)| acc | (u64::from(bit) << i)))
}

/// Parse an MSB-first binary string of exactly `width` digits.
///
/// # Errors
///
/// - [`Error::WidthMismatch`] if the string has another length
/// - [`Error::InvalidDigit`] for characters other than `0` and `1`
pub fn parse_bits(text: &str, width: usize) -> Result<Vec<bool>, Error> {
    let found = text.chars().count();
    if found != width {
        return Err(Error::WidthMismatch {
            expected: width,
            found,
        });
    }
    text.chars()
        .rev()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(Error::InvalidDigit(other)),
        })
        .collect()
}

/// Render an LSB-first bit vector as an MSB-first binary string.
pub fn format_bits(bits: &[bool]) -> String {
    bits.iter().rev().map(|&bit| if bit { '1' } else { '0' }).collect()
}

/// Write `bits` to the ports `{prefix}0`, `{prefix}1`, ... of `block`.
pub(crate) fn write_word(block: &mut LogicBlock, prefix: &str, bits: &[bool]) -> Result<Propagation, Error> {
    let mut total = Propagation::default();
    for (i, &bit) in bits.iter().enumerate() {
        total += block.set_input(&format!("{prefix}{i}"), bit)?;
    }
    Ok(total)
}

/// Read the outputs `{prefix}0` .. `{prefix}{width - 1}` of `block`.
pub(crate) fn read_word(block: &LogicBlock, prefix: &str, width: usize) -> Result<Vec<bool>, Error> {
    (0..width)
        .map(|i| block.get_output(&format!("{prefix}{i}")).map_err(Error::from))
        .collect()
}
