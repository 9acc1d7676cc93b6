use thiserror::Error;

/// Errors raised while pulling bits out of a [`BitReader`](crate::BitReader)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// Fewer bits remain in the buffer than were requested
    #[error("Stream overrun at bit {position}: requested {requested} bits but only {remaining} remain")]
    Overrun {
        position: usize,
        requested: usize,
        remaining: usize,
    },

    /// A single read asked for more bits than fit in the result word
    #[error("Cannot read {requested} bits at bit {position} in one call (maximum is 32)")]
    WidthTooLarge { position: usize, requested: u32 },
}

impl SerdeErr {
    /// Bit position of the cursor when the read failed
    pub fn position(&self) -> usize {
        match self {
            Self::Overrun { position, .. } => *position,
            Self::WidthTooLarge { position, .. } => *position,
        }
    }
}
