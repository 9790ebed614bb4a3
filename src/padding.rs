use block_padding::array::Array;
use block_padding::array::typenum::{U16, Unsigned};
use block_padding::{Padding, Pkcs7};

use crate::config::BLOCK_SIZE;
use crate::error::CipherError;

/// PKCS#7 padding to the 16-byte AES block (identical to PKCS#5 at this size).
pub struct Pkcs7Padding;

impl Pkcs7Padding {
    /// Pads `data` to a whole number of blocks. Always appends at least one
    /// byte, so empty input becomes one full block of padding.
    pub fn pad(data: &[u8]) -> Result<Vec<u8>, CipherError> {
        match Pkcs7::pad_detached::<U16>(data) {
            block_padding::PaddedData::Pad { blocks, tail_block } => {
                let total_len = blocks.len() * U16::USIZE + U16::USIZE;
                let mut result = Vec::with_capacity(total_len);
                for block in blocks {
                    result.extend_from_slice(block.as_slice());
                }
                result.extend_from_slice(tail_block.as_slice());
                Ok(result)
            }
            block_padding::PaddedData::NoPad { blocks } => {
                let mut result = Vec::with_capacity(blocks.len() * U16::USIZE);
                for block in blocks {
                    result.extend_from_slice(block.as_slice());
                }
                Ok(result)
            }
            block_padding::PaddedData::Error => Err(CipherError::Padding),
        }
    }

    /// Validates and strips the padding. Any malformed padding, including a
    /// length that is not a multiple of the block size, is reported as
    /// [`CipherError::InvalidPaddingOrKey`].
    pub fn unpad(data: &[u8]) -> Result<Vec<u8>, CipherError> {
        if data.is_empty() || !data.len().is_multiple_of(BLOCK_SIZE) {
            return Err(CipherError::InvalidPaddingOrKey);
        }

        let mut blocks = Vec::with_capacity(data.len() / BLOCK_SIZE);
        for chunk in data.chunks_exact(U16::USIZE) {
            let mut arr: Array<u8, U16> = Array::default();
            arr.copy_from_slice(chunk);
            blocks.push(arr);
        }

        Pkcs7::unpad_blocks::<U16>(&blocks).map(<[u8]>::to_vec).map_err(|_| CipherError::InvalidPaddingOrKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_partial_block() {
        let padded = Pkcs7Padding::pad(b"YELLOW SUBMARINE!").unwrap();
        assert_eq!(padded.len(), 32);
        assert_eq!(&padded[17..], &[15u8; 15]);
    }

    #[test]
    fn test_pad_aligned_adds_full_block() {
        let padded = Pkcs7Padding::pad(&[7u8; 16]).unwrap();
        assert_eq!(padded.len(), 32);
        assert_eq!(&padded[16..], &[16u8; 16]);
    }

    #[test]
    fn test_pad_empty() {
        let padded = Pkcs7Padding::pad(&[]).unwrap();
        assert_eq!(padded, vec![16u8; 16]);
        assert!(Pkcs7Padding::unpad(&padded).unwrap().is_empty());
    }

    #[test]
    fn test_unpad_rejects_bad_padding() {
        let mut padded = Pkcs7Padding::pad(b"abc").unwrap();
        *padded.last_mut().unwrap() = 0;
        assert_eq!(Pkcs7Padding::unpad(&padded), Err(CipherError::InvalidPaddingOrKey));
    }

    #[test]
    fn test_unpad_rejects_unaligned_length() {
        assert_eq!(Pkcs7Padding::unpad(&[1u8; 15]), Err(CipherError::InvalidPaddingOrKey));
        assert_eq!(Pkcs7Padding::unpad(&[]), Err(CipherError::InvalidPaddingOrKey));
    }
}
