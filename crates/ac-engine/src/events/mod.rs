//! Event payloads published by the engine.

pub mod payloads;

pub use payloads::*;
