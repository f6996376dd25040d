/// Structural reasons a manufacturer frame is not handed to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// Shorter than company id + signature + one cipher block.
    #[error("frame too short ({len} bytes, need {min})")]
    TooShort { len: usize, min: usize },

    /// Bytes 2..8 are not our device signature.
    #[error("device signature mismatch")]
    SignatureMismatch,

    /// Signature matched but the trailing ciphertext is not one block.
    #[error("encrypted data size incorrect ({len} bytes, expected {expected})")]
    BadCiphertextLength { len: usize, expected: usize },
}

/// Failures after a frame was accepted by the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("decryption failed")]
    DecryptionFailed,

    #[error("invalid decrypted data ({len} bytes, need {min})")]
    MalformedPlaintext { len: usize, min: usize },
}

/// Outcome of running one frame through the whole pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("rejected: {0}")]
    Rejected(#[from] Rejection),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl PipelineError {
    /// True for the high-frequency "not our device" outcomes that are only
    /// worth logging when verbose.
    pub fn is_expected(&self) -> bool {
        matches!(self, PipelineError::Rejected(_))
    }
}
