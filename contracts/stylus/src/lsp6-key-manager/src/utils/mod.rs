//! Small deterministic helpers that run inside Stylus / WASM.

pub mod bytes;
pub mod crypto;
