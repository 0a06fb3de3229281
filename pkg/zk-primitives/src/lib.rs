#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_bool)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![deny(missing_docs)]

//! A set of core primitives for the shielded pool: field elements, the Poseidon hasher and the
//! Merkle fold used by the accumulator and the circuits

mod element;
mod hash;
mod path;

#[cfg(feature = "test-api")]
pub use hash::{hash_count, hash_element_count, reset_hash_count, reset_hash_element_count};

pub use element::Element;
pub use hash::{hash_merge, MAX_HASH_ARITY};
pub use path::compute_merkle_root;

/// The base element used by cryptographic operations in the pool
///
/// This is (roughly) an integer modulo `p` where `p` is [`Element::MODULUS`]
pub type Base = ark_bn254::Fr;
