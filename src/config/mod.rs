//! Configuration for the operation poller
//!
//! Settings are merged from four layers, last wins:
//! 1. Built-in defaults
//! 2. Host config (~/.config/lro-waiter/config.toml)
//! 3. Explicit config file (--config)
//! 4. CLI flags
//!
//! The merged result is turned into a [`Config`], the transport
//! configuration every waiter borrows.

mod client;
mod defaults;
mod effective;
mod merge;

pub use client::{ClientSettings, Config};
pub use defaults::BuiltinDefaults;
pub use effective::{ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig};
pub use merge::{deep_merge, merge_layers};
