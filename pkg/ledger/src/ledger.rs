use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Arc,
};

use parking_lot::Mutex;
use shielded_pool::{
    CircuitId, DepositRecord, Proof, ProvingBackend, SpendRecord, WithdrawRecord,
};
use smirk::{Element, SharedTree, TreeReader};

use crate::{Error, LedgerConfig, Result};

/// An in-process ledger that accepts deposit, spend, and withdraw records
///
/// Every check and mutation for a record happens under one lock, so a record is either accepted
/// whole or rejected with no effect. In particular, a nullifier is accepted at most once.
pub struct Ledger<const D: usize, B> {
    backend: Arc<B>,
    config: LedgerConfig,
    tree: SharedTree<D>,
    reader: TreeReader<D>,
    state: Arc<Mutex<LedgerState>>,
}

impl<const D: usize, B> core::fmt::Debug for Ledger<D, B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ledger")
            .field("config", &self.config)
            .field("leaves", &self.reader.len())
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl<const D: usize, B> Clone for Ledger<D, B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: self.config.clone(),
            tree: self.tree.clone(),
            reader: self.reader.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

struct LedgerState {
    nullifiers: HashSet<Element>,
    commitments: HashSet<Element>,
    /// Most recent last, always contains the current root
    roots: VecDeque<Element>,
    balances: HashMap<(Element, Element), Element>,
}

impl core::fmt::Debug for LedgerState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LedgerState")
            .field("nullifiers", &self.nullifiers.len())
            .field("commitments", &self.commitments.len())
            .field("root", &self.current_root())
            .finish_non_exhaustive()
    }
}

impl<const D: usize, B: ProvingBackend> Ledger<D, B> {
    /// Create an empty ledger that verifies proofs with `backend`
    #[must_use]
    pub fn new(backend: Arc<B>, config: LedgerConfig) -> Self {
        let tree = SharedTree::new();
        let reader = tree.reader();

        let mut roots = VecDeque::with_capacity(config.root_history_size);
        roots.push_back(tree.root());

        Self {
            backend,
            config,
            tree,
            reader,
            state: Arc::new(Mutex::new(LedgerState {
                nullifiers: HashSet::new(),
                commitments: HashSet::new(),
                roots,
                balances: HashMap::new(),
            })),
        }
    }

    /// A read-only handle to the commitment tree, for taking witnesses
    ///
    /// Only the ledger appends to the tree
    #[must_use]
    pub fn tree(&self) -> &TreeReader<D> {
        &self.reader
    }

    /// The current root of the commitment tree
    #[must_use]
    pub fn root(&self) -> Element {
        self.state.lock().current_root()
    }

    /// Whether `root` is within the root history
    #[must_use]
    pub fn known_root(&self, root: Element) -> bool {
        self.state.lock().roots.contains(&root)
    }

    /// Whether `nullifier` was already accepted
    #[must_use]
    pub fn is_spent(&self, nullifier: Element) -> bool {
        self.state.lock().nullifiers.contains(&nullifier)
    }

    /// The plaintext balance of `recipient` in `token`
    #[must_use]
    pub fn balance_of(&self, token: Element, recipient: Element) -> Element {
        self.state
            .lock()
            .balances
            .get(&(token, recipient))
            .copied()
            .unwrap_or(Element::ZERO)
    }

    /// Accept a deposit, returning the index of its commitment in the tree
    #[tracing::instrument(skip_all, fields(commitment = ?record.commitment))]
    pub fn submit_deposit(&self, record: &DepositRecord) -> Result<u64> {
        check_canonical(&[
            ("commitment", record.commitment),
            ("token", record.token),
            ("denomination_bucket", record.denomination_bucket),
        ])?;
        self.verify(record.circuit(), &record.expected_signals(), &record.proof)?;

        let mut state = self.state.lock();

        if state.commitments.contains(&record.commitment) {
            return Err(Error::CommitmentAlreadyPublished);
        }

        let index = self.publish(&mut state, record.commitment)?;

        tracing::info!(index, "deposit accepted");
        Ok(index)
    }

    /// Accept a spend, returning the index of the new commitment in the tree
    #[tracing::instrument(skip_all, fields(nullifier = ?record.nullifier))]
    pub fn submit_spend(&self, record: &SpendRecord) -> Result<u64> {
        check_canonical(&[
            ("root", record.root),
            ("nullifier", record.nullifier),
            ("token", record.token),
            ("denomination_bucket", record.denomination_bucket),
            ("new_commitment", record.new_commitment),
        ])?;
        self.verify(record.circuit(), &record.expected_signals(), &record.proof)?;

        let mut state = self.state.lock();

        state.check_unspent(record.root, record.nullifier)?;

        if state.commitments.contains(&record.new_commitment) {
            return Err(Error::CommitmentAlreadyPublished);
        }

        let index = self.publish(&mut state, record.new_commitment)?;
        state.nullifiers.insert(record.nullifier);

        tracing::info!(index, "spend accepted");
        Ok(index)
    }

    /// Accept a withdrawal, crediting the recipient's plaintext balance
    #[tracing::instrument(skip_all, fields(nullifier = ?record.nullifier, recipient = ?record.recipient))]
    pub fn submit_withdraw(&self, record: &WithdrawRecord) -> Result<()> {
        check_canonical(&[
            ("root", record.root),
            ("nullifier", record.nullifier),
            ("token", record.token),
            ("denomination_bucket", record.denomination_bucket),
            ("amount", record.amount),
            ("recipient", record.recipient),
        ])?;
        self.verify(record.circuit(), &record.expected_signals(), &record.proof)?;

        let mut state = self.state.lock();

        state.check_unspent(record.root, record.nullifier)?;

        let key = (record.token, record.recipient);
        let balance = state.balances.get(&key).copied().unwrap_or(Element::ZERO);
        let balance = balance
            .checked_add(record.amount)
            .ok_or(Error::BalanceOverflow)?;

        state.balances.insert(key, balance);
        state.nullifiers.insert(record.nullifier);

        tracing::info!("withdrawal accepted");
        Ok(())
    }

    fn verify(&self, circuit: CircuitId, expected: &[Element], proof: &Proof) -> Result<()> {
        if !proof.public_signals.iter().all(Element::is_canonical) {
            tracing::warn!(%circuit, "proof carries a non-canonical signal");
            return Err(Error::InputMalformed {
                field: "public_signals",
            });
        }

        if proof.public_signals != expected {
            tracing::warn!(%circuit, "record does not match its proof");
            return Err(Error::SignalMismatch);
        }

        match self.backend.verify(circuit, proof)? {
            true => Ok(()),
            false => {
                tracing::warn!(%circuit, "proof rejected");
                Err(Error::InvalidProof)
            }
        }
    }

    /// Append `commitment` and remember the new root
    fn publish(&self, state: &mut LedgerState, commitment: Element) -> Result<u64> {
        let index = self.tree.append(commitment)?;
        state.commitments.insert(commitment);

        if state.roots.len() == self.config.root_history_size {
            state.roots.pop_front();
        }
        state.roots.push_back(self.tree.root());

        Ok(index)
    }
}

/// Reject elements at or above the field modulus
///
/// A verifier working in the field cannot tell `x` and `x + p` apart, so both must never reach it
fn check_canonical(fields: &[(&'static str, Element)]) -> Result<()> {
    match fields.iter().find(|(_, element)| !element.is_canonical()) {
        Some(&(field, _)) => {
            tracing::warn!(field, "record field is not canonical");
            Err(Error::InputMalformed { field })
        }
        None => Ok(()),
    }
}

impl LedgerState {
    fn current_root(&self) -> Element {
        self.roots.back().copied().unwrap_or(Element::NULL_HASH)
    }

    fn check_unspent(&self, root: Element, nullifier: Element) -> Result<()> {
        if !self.roots.contains(&root) {
            return Err(Error::UnknownRoot);
        }

        if self.nullifiers.contains(&nullifier) {
            return Err(Error::NullifierAlreadySpent);
        }

        Ok(())
    }
}
