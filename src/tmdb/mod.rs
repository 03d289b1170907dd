pub mod client;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use client::*;
pub use types::*;
