use std::{collections::BTreeSet, sync::Arc};

use blake2b_simd::Params as Blake2bParams;
use smirk::Element;

use crate::{CircuitId, KeyDerivation, Proof, Witness, BLAKE_PERSONALISATION};

/// Errors reported by a [`ProvingBackend`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The backend cannot run right now (missing circuit artifacts, misconfiguration)
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend ran but could not produce a proof for this witness
    #[error("proving failed: {0}")]
    Failed(String),
}

/// An external zero-knowledge proving system
///
/// Implementations must be deterministic in the order of the public signals they emit for a given
/// circuit. Proving may block for a long time, the [`ProofGateway`](crate::ProofGateway) runs it
/// on a blocking thread.
pub trait ProvingBackend: Send + Sync + 'static {
    /// Prove `witness`, returning the proof and its public signals
    fn prove(&self, witness: &Witness) -> Result<Proof, BackendError>;

    /// Check that `proof` is a valid proof for `circuit` with its public signals
    fn verify(&self, circuit: CircuitId, proof: &Proof) -> Result<bool, BackendError>;
}

impl<B: ProvingBackend> ProvingBackend for Arc<B> {
    fn prove(&self, witness: &Witness) -> Result<Proof, BackendError> {
        B::prove(self, witness)
    }

    fn verify(&self, circuit: CircuitId, proof: &Proof) -> Result<bool, BackendError> {
        B::verify(self, circuit, proof)
    }
}

/// A backend for tests and local development
///
/// Instead of proving, it checks every circuit relation off-circuit, then issues a keyed blake2b
/// digest of the circuit and public signals as the "proof". This is NOT zero-knowledge and NOT
/// sound against anyone who knows the key.
///
/// ```rust
/// # use shielded_pool::*;
/// let backend = DevelopmentBackend::new(PoseidonKeyDerivation, [0; 32])
///     .with_supported_circuits([CircuitId::DEPOSIT_V1]);
///
/// let proof = Proof { proof_bytes: vec![], public_signals: vec![] };
/// assert!(matches!(
///     backend.verify(CircuitId::SPEND_V1, &proof),
///     Err(BackendError::Unavailable(_)),
/// ));
/// ```
#[derive(Clone)]
pub struct DevelopmentBackend<K> {
    keys: K,
    key: [u8; 32],
    supported: BTreeSet<CircuitId>,
}

impl<K> core::fmt::Debug for DevelopmentBackend<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DevelopmentBackend")
            .field("supported", &self.supported)
            .finish_non_exhaustive()
    }
}

impl<K: KeyDerivation> DevelopmentBackend<K> {
    /// Create a backend that supports every current circuit
    ///
    /// `keys` must be the derivation used to build the notes being proven
    #[must_use]
    pub fn new(keys: K, key: [u8; 32]) -> Self {
        Self {
            keys,
            key,
            supported: [
                CircuitId::DEPOSIT_V1,
                CircuitId::SPEND_V1,
                CircuitId::WITHDRAW_V1,
            ]
            .into(),
        }
    }

    /// Restrict the circuits this backend has "artifacts" for
    #[must_use]
    pub fn with_supported_circuits(mut self, circuits: impl IntoIterator<Item = CircuitId>) -> Self {
        self.supported = circuits.into_iter().collect();
        self
    }

    fn ensure_supported(&self, circuit: CircuitId) -> Result<(), BackendError> {
        match self.supported.contains(&circuit) {
            true => Ok(()),
            false => Err(BackendError::Unavailable(format!(
                "no artifacts for circuit {circuit}"
            ))),
        }
    }

    fn digest(&self, circuit: CircuitId, public_signals: &[Element]) -> Vec<u8> {
        let mut h = Blake2bParams::new()
            .hash_length(64)
            .key(&self.key)
            .personal(BLAKE_PERSONALISATION)
            .to_state();

        h.update(&[circuit.kind as u8]);
        h.update(&circuit.version.to_le_bytes());

        for signal in public_signals {
            h.update(&signal.to_be_bytes());
        }

        h.finalize().as_bytes().to_vec()
    }
}

impl<K: KeyDerivation> ProvingBackend for DevelopmentBackend<K> {
    fn prove(&self, witness: &Witness) -> Result<Proof, BackendError> {
        let circuit = witness.circuit();
        self.ensure_supported(circuit)?;

        witness
            .check(&self.keys)
            .map_err(|constraint| BackendError::Failed(format!("unsatisfied: {constraint}")))?;

        let public_signals = witness.public_signals();

        Ok(Proof {
            proof_bytes: self.digest(circuit, &public_signals),
            public_signals,
        })
    }

    fn verify(&self, circuit: CircuitId, proof: &Proof) -> Result<bool, BackendError> {
        self.ensure_supported(circuit)?;

        Ok(self.digest(circuit, &proof.public_signals) == proof.proof_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DepositWitness, Note, SquaringKeyDerivation};

    fn deposit_witness() -> Witness {
        let note = Note::new(Element::new(10), Element::new(1), Element::new(2), Element::new(3));

        Witness::Deposit(DepositWitness {
            commitment: note.commitment(),
            token: note.token,
            denomination_bucket: Element::new(10),
            amount: note.amount,
            salt: note.salt,
            owner_public_key: note.owner_public_key,
        })
    }

    #[test]
    fn proofs_verify_only_with_their_signals() {
        let backend = DevelopmentBackend::new(SquaringKeyDerivation, [1; 32]);
        let mut proof = backend.prove(&deposit_witness()).unwrap();

        assert!(backend.verify(CircuitId::DEPOSIT_V1, &proof).unwrap());
        assert!(!backend.verify(CircuitId::SPEND_V1, &proof).unwrap());

        proof.public_signals[2] = Element::new(11);
        assert!(!backend.verify(CircuitId::DEPOSIT_V1, &proof).unwrap());
    }

    #[test]
    fn proofs_are_bound_to_the_backend_key() {
        let a = DevelopmentBackend::new(SquaringKeyDerivation, [1; 32]);
        let b = DevelopmentBackend::new(SquaringKeyDerivation, [2; 32]);

        let proof = a.prove(&deposit_witness()).unwrap();
        assert!(!b.verify(CircuitId::DEPOSIT_V1, &proof).unwrap());
    }

    #[test]
    fn unsatisfied_witness_fails() {
        let backend = DevelopmentBackend::new(SquaringKeyDerivation, [1; 32]);

        let Witness::Deposit(mut witness) = deposit_witness() else {
            unreachable!()
        };
        witness.amount = Element::new(11);

        let error = backend.prove(&Witness::Deposit(witness)).unwrap_err();
        assert!(matches!(error, BackendError::Failed(_)));
    }

    #[test]
    fn unsupported_circuit_is_unavailable() {
        let backend = DevelopmentBackend::new(SquaringKeyDerivation, [1; 32])
            .with_supported_circuits([CircuitId::SPEND_V1]);

        let error = backend.prove(&deposit_witness()).unwrap_err();
        assert!(matches!(error, BackendError::Unavailable(_)));
    }

    #[test]
    fn debug_does_not_print_the_key() {
        let backend = DevelopmentBackend::new(SquaringKeyDerivation, [0xab; 32]);
        assert!(!format!("{backend:?}").contains("171"));
    }
}
