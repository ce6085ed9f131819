//! # wshell-core - Core Domain Types
//!
//! Foundation crate for Wallet Shell. Provides domain types, error handling,
//! event definitions and the logging bootstrap.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, url, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`origin`)
//! - [`ApiOrigin`] - The discovered base URL of the wallet daemon's HTTP API
//!
//! ### Events (`events`)
//! - [`DaemonEvent`] - Wrapper enum for daemon stdout/stderr/exit events
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use wshell_core::prelude::*;
//! ```

pub mod error;
pub mod events;
pub mod logging;
pub mod origin;

/// Prelude for common imports used throughout all Wallet Shell crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result, ResultExt};
pub use events::DaemonEvent;
pub use origin::ApiOrigin;
