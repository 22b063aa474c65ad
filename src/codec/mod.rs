//! # Wire Codecs
//!
//! Encoders and decoders for the serialized blobs stored by the source and
//! target schemas.

pub mod php;

pub use php::{PhpCodecError, PhpKey, PhpValue};
