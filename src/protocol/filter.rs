/// Frame filter: picks our sensor's advertisements out of ambient BLE traffic
use log::debug;

use crate::models::{CipherBlock, DeviceSignature, BLOCK_LEN, SIGNATURE_LEN};
use crate::protocol::error::Rejection;

/// Bytes of Bluetooth company identifier at the start of the frame
pub const COMPANY_ID_LEN: usize = 2;
/// Offset where the encrypted block begins
pub const CIPHERTEXT_OFFSET: usize = COMPANY_ID_LEN + SIGNATURE_LEN;
/// Frames shorter than this are dropped without inspection.
///
/// Two bytes less than a full frame, so 22 and 23 byte frames from a
/// matching device reach the ciphertext length check.
pub const MIN_FRAME_LEN: usize = 22;

/// Extract the cipher block from a manufacturer data frame
///
/// Frame layout:
/// - Bytes 0-1: Company identifier (any value accepted)
/// - Bytes 2-7: Device signature, must equal `signature`
/// - Bytes 8-23: AES-128 encrypted payload, exactly one block
///
/// Checks run cheapest first so foreign devices are dropped before any
/// cryptographic work happens.
pub fn filter_frame(raw: &[u8], signature: &DeviceSignature) -> Result<CipherBlock, Rejection> {
    if raw.len() < MIN_FRAME_LEN {
        return Err(Rejection::TooShort {
            len: raw.len(),
            min: MIN_FRAME_LEN,
        });
    }

    let device_id = &raw[COMPANY_ID_LEN..CIPHERTEXT_OFFSET];
    if !signature.matches(device_id) {
        return Err(Rejection::SignatureMismatch);
    }

    debug!("Device detected with expected ID: {}", hex::encode(device_id));

    let encrypted = &raw[CIPHERTEXT_OFFSET..];
    let block: [u8; BLOCK_LEN] = encrypted
        .try_into()
        .map_err(|_| Rejection::BadCiphertextLength {
            len: encrypted.len(),
            expected: BLOCK_LEN,
        })?;

    Ok(CipherBlock(block))
}
