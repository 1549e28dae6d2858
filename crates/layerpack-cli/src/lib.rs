//! Layerpack CLI library.
//!
//! Input resolution, source discovery, the file codec and the pack command
//! behind the `layerpack` binary.

pub mod codec;
pub mod commands;
pub mod discover;
pub mod input;
pub mod manifest;
