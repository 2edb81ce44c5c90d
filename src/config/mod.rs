//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + CLI overrides
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → resolved.rs (DispatchConfig: validated, immutable)
//!     → shared via Arc by every send on a dispatcher
//! ```
//!
//! # Design Decisions
//! - Config is immutable once resolved; defaults are applied exactly once
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod resolved;
pub mod schema;
pub mod validation;

pub use resolved::DispatchConfig;
pub use schema::{AppConfig, BatchConfig, DispatchOptions, LogFormat, ObservabilityConfig};
