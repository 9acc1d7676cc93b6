//! # Netprop Serde
//! Bit-level primitives for the netprop replay decoder: an LSB-first
//! [`BitReader`] with the two custom varint encodings used by the replay
//! format, and a matching [`BitWriter`] for assembling bit buffers.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod bit_reader;
mod bit_writer;
mod error;

pub use bit_reader::BitReader;
pub use bit_writer::{BitWrite, BitWriter};
pub use error::SerdeErr;
