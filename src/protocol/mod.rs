pub mod decoder;
pub mod error;
pub mod filter;

pub use decoder::{decode_block, BlockDecryptor};
pub use error::{DecodeError, PipelineError, Rejection};
pub use filter::filter_frame;

use crate::models::{DeviceSignature, TelemetryRecord};

/// Run one manufacturer data frame through filter and decoder
///
/// Pure: the same frame always yields the same outcome, and the decryptor is
/// only consulted for frames carrying our signature and a full block.
pub fn process<D: BlockDecryptor + ?Sized>(
    raw: &[u8],
    signature: &DeviceSignature,
    decryptor: &D,
) -> Result<TelemetryRecord, PipelineError> {
    let block = filter_frame(raw, signature)?;
    Ok(decode_block(&block, decryptor)?)
}
