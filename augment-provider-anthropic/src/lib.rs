#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod client;
pub mod config;
pub(crate) mod error;
pub mod mapping;

pub use client::Anthropic;
pub use config::AnthropicConfig;

// Re-export for convenience
pub use augment_core::ProviderError;
