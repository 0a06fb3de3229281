#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_bool)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![deny(missing_docs)]

//! # Smirk (**S**parse **M**e**RK**le tree)
//!
//! An append-only, fixed-depth sparse Merkle [`Tree`] used as the note commitment accumulator of
//! the shielded pool.
//!
//! Conceptually, a [`Tree`] is an ordered list of [`Element`]s (note commitments). The position
//! at which a leaf was appended is its index, and never changes.
//!
//! ```rust
//! # use smirk::*;
//! // the tree is generic over the depth, the pool uses 32
//! let mut tree = Tree::<32>::new();
//!
//! let index = tree.append(Element::new(1)).unwrap();
//! assert_eq!(index, 0);
//!
//! // the witness lets anyone recompute the root from the leaf
//! let witness = tree.witness_for(index).unwrap();
//! assert!(witness.verify(Element::new(1), tree.root()));
//! ```
//! ## Root hash
//!
//! Like all Merkle trees, a [`Tree`] has a [`root hash`][Tree::root]. The hash of a node is
//! [`hash_merge([left, right])`][hash_merge] of its children. A tree of depth `DEPTH` has
//! `2^DEPTH` leaf slots, and slots that have not been appended to hold [`Element::NULL_HASH`].
//!
//! ## Sparse representation
//!
//! Only nodes that differ from the empty tree are stored. Everything else falls back to
//! [`empty_tree_hash`], which is computed once per process and shared by every tree. This keeps
//! memory proportional to `len * DEPTH` instead of `2^DEPTH`.
//!
//! ## Concurrency
//!
//! A [`Tree`] is a plain value that needs `&mut` to append. Use [`SharedTree`] when several tasks
//! read witnesses while a single writer appends: every witness it hands out is taken against the
//! same root it reports.

mod hash;
mod macros;
mod shared;
mod tree;

pub use hash::empty_tree_hash;
pub use shared::{SharedTree, Snapshot, TreeReader};
pub use tree::{verify, Error, MerkleWitness, Result, Tree};
pub use zk_primitives::*;
