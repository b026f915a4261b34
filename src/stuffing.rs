//! Transparent byte stuffing for the link escape byte.
//!
//! DF1 reserves DLE (0x10) to introduce control sequences, so a data byte of
//! the same value is transmitted as a doubled DLE DLE pair. Stuffing applies
//! only to the application-byte region of a frame; delimiters and checksum
//! bytes travel unstuffed.

use crate::error::FramingError;
use crate::frame::DLE;

/// Doubles every DLE byte so the body can travel inside a frame.
///
/// # Example
///
/// ```
/// use ab_df1::stuff;
///
/// assert_eq!(stuff(&[0x01, 0x10, 0x02]), vec![0x01, 0x10, 0x10, 0x02]);
/// ```
pub fn stuff(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 2);
    for &byte in body {
        out.push(byte);
        if byte == DLE {
            out.push(DLE);
        }
    }
    out
}

/// Collapses DLE DLE pairs back into single data bytes.
///
/// A DLE followed by anything other than a second DLE (or by nothing at all)
/// cannot occur inside a properly stuffed region and is rejected.
///
/// # Example
///
/// ```
/// use ab_df1::destuff;
///
/// let body = destuff(&[0x01, 0x10, 0x10, 0x02]).unwrap();
/// assert_eq!(body, vec![0x01, 0x10, 0x02]);
/// ```
pub fn destuff(stuffed: &[u8]) -> Result<Vec<u8>, FramingError> {
    let mut out = Vec::with_capacity(stuffed.len());
    let mut iter = stuffed.iter();
    while let Some(&byte) = iter.next() {
        if byte != DLE {
            out.push(byte);
            continue;
        }
        match iter.next() {
            Some(&next) if next == DLE => out.push(DLE),
            Some(&next) => {
                return Err(FramingError::malformed(format!(
                    "unpaired DLE before 0x{next:02X} in stuffed region"
                )))
            }
            None => {
                return Err(FramingError::malformed(
                    "unpaired DLE at end of stuffed region",
                ))
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stuff_without_dle_is_identity() {
        let body = [0x01, 0x00, 0x4F, 0x00, 0x42, 0x00];
        assert_eq!(stuff(&body), body.to_vec());
    }

    #[test]
    fn test_stuff_doubles_every_dle() {
        assert_eq!(stuff(&[0x10]), vec![0x10, 0x10]);
        assert_eq!(
            stuff(&[0x10, 0x10, 0x03]),
            vec![0x10, 0x10, 0x10, 0x10, 0x03]
        );
    }

    #[test]
    fn test_roundtrip() {
        let bodies: [&[u8]; 5] = [
            &[],
            &[0x10],
            &[0x10, 0x10, 0x10],
            &[0x01, 0x00, 0x0F, 0x00, 0x03, 0x10, 0xAA, 0x10, 0x10],
            &[0x00, 0xFF, 0x10, 0x02, 0x10, 0x03],
        ];
        for body in bodies {
            assert_eq!(destuff(&stuff(body)).unwrap(), body.to_vec());
        }
    }

    #[test]
    fn test_destuff_rejects_unpaired_dle() {
        assert!(matches!(
            destuff(&[0x01, 0x10, 0x02]),
            Err(FramingError::Malformed { .. })
        ));
    }

    #[test]
    fn test_destuff_rejects_trailing_dle() {
        assert!(matches!(
            destuff(&[0x01, 0x10]),
            Err(FramingError::Malformed { .. })
        ));
    }
}
