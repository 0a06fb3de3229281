#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_bool)]
#![allow(clippy::missing_errors_doc)]
#![deny(missing_docs)]

//! A reference, in-process ledger for the shielded pool
//!
//! It owns the canonical commitment [`Tree`](smirk::Tree), the set of spent nullifiers, a window
//! of recent roots, and plaintext balances for withdrawals. Records produced by
//! [`shielded_pool`] are checked against their proofs and accepted atomically.
//!
//! ```rust
//! # use std::sync::Arc;
//! # use ledger::*;
//! # use shielded_pool::{DevelopmentBackend, PoseidonKeyDerivation};
//! let backend = Arc::new(DevelopmentBackend::new(PoseidonKeyDerivation, [1; 32]));
//! let ledger = Ledger::<32, _>::new(backend, LedgerConfig::default());
//!
//! assert!(ledger.known_root(ledger.root()));
//! assert!(ledger.tree().is_empty());
//! ```

mod config;
mod error;
mod ledger;

pub use config::LedgerConfig;
pub use error::{Error, Result};
pub use ledger::Ledger;
