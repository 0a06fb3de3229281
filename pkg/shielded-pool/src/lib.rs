#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_bool)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![deny(missing_docs)]

//! The client-side core of a shielded note pool
//!
//! Value lives in private [`Note`]s. The pool only ever sees a note's commitment (a Poseidon
//! hash), and spending a note reveals only its nullifier. The three protocols move value in and
//! around the pool:
//!  - [`Deposit`] creates a note and proves its commitment is well formed
//!  - [`Spend`] consumes a note that is in the accumulator and creates a new one of equal value
//!  - [`Withdraw`] consumes a note and releases its amount to a plaintext recipient
//!
//! Each protocol is a chain of types (`build -> validate -> prove -> record`), so a witness can
//! only reach the [`ProofGateway`] after every local check has passed.
//!
//! ```rust
//! # use shielded_pool::*;
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let keys = PoseidonKeyDerivation;
//! let secret = OwnerSecret::new(Element::new(42)).unwrap();
//! let gateway = ProofGateway::new(DevelopmentBackend::new(keys, [7; 32]), ProverConfig::default());
//!
//! let deposit = Deposit::build(
//!     Element::new(100),       // amount
//!     Element::new(1),         // token
//!     Element::new(100),       // denomination bucket
//!     &secret,
//!     &keys,
//!     rand::thread_rng(),
//! )
//! .unwrap();
//!
//! let proved = deposit.validate().unwrap().prove(&gateway).await.unwrap();
//! let record = proved.record();
//! assert_eq!(record.commitment, proved.note().commitment());
//! # });
//! ```

mod backend;
mod circuits;
mod config;
mod constants;
mod deposit;
mod error;
mod gateway;
mod keys;
mod note;
mod proof;
mod spend;
mod withdraw;

pub use backend::{BackendError, DevelopmentBackend, ProvingBackend};
pub use circuits::{
    CircuitId, CircuitKind, Constraint, DepositWitness, SpendWitness, WithdrawWitness, Witness,
};
pub use config::ProverConfig;
pub use constants::{BLAKE_PERSONALISATION, COMMITMENT_ARITY, KEY_DOMAIN, MERKLE_TREE_DEPTH};
pub use deposit::{Deposit, DepositPublicInputs, ProvedDeposit, ValidatedDeposit};
pub use error::{Error, ErrorClass, Result};
pub use gateway::ProofGateway;
pub use keys::{
    BabyJubjubKeyDerivation, KeyDerivation, OwnerSecret, PoseidonKeyDerivation,
    SquaringKeyDerivation,
};
pub use note::{nullify, Note};
pub use proof::{DepositRecord, Proof, SpendRecord, WithdrawRecord};
pub use spend::{ProvedSpend, Spend, SpendPublicInputs, ValidatedSpend};
pub use withdraw::{ProvedWithdraw, ValidatedWithdraw, Withdraw, WithdrawPublicInputs};

pub use smirk::Element;
