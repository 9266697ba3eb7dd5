//! Cross-cutting helpers shared by the client crates and the binary.

pub mod env;
pub mod utils;
