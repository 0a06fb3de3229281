use serde::{Deserialize, Serialize};
use smirk::{Element, MerkleWitness, Tree};

use crate::{
    note::check_canonical, Error, KeyDerivation, Note, OwnerSecret, Proof, ProofGateway,
    ProvingBackend, Result, WithdrawRecord, WithdrawWitness,
};

/// The values of a withdrawal that the ledger sees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WithdrawPublicInputs {
    /// Root of the tree the note was proven against
    pub root: Element,
    /// Nullifier of the note
    pub nullifier: Element,
    /// Token of the note
    pub token: Element,
    /// Public grouping of the withdrawal
    pub denomination_bucket: Element,
    /// Full amount of the note, released to `recipient`
    pub amount: Element,
    /// Plaintext account to credit
    pub recipient: Element,
}

/// An exit of a note's full amount to a plaintext account, built but not checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Withdraw<const D: usize> {
    note: Note,
    owner_secret: OwnerSecret,
    merkle_witness: MerkleWitness<D>,
    public_inputs: WithdrawPublicInputs,
}

/// A withdrawal that passed every local check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedWithdraw<const D: usize> {
    inner: Withdraw<D>,
}

/// A withdrawal with a proof, ready to be submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvedWithdraw {
    public_inputs: WithdrawPublicInputs,
    proof: Proof,
}

impl<const D: usize> Withdraw<D> {
    /// Build a withdrawal of `note` to `recipient`, taking the merkle witness from `tree`
    ///
    /// Errors with [`Error::MerkleWitnessInvalid`] if the note's commitment is not in `tree`
    #[tracing::instrument(skip_all, fields(token = ?note.token, ?recipient))]
    pub fn build(
        note: Note,
        owner_secret: OwnerSecret,
        recipient: Element,
        denomination_bucket: Element,
        tree: &Tree<D>,
    ) -> Result<Self> {
        let index = tree
            .index_of(note.commitment())
            .ok_or(Error::MerkleWitnessInvalid)?;
        let merkle_witness = tree.witness_for(index)?;

        let public_inputs = WithdrawPublicInputs {
            root: merkle_witness.root,
            nullifier: note.nullifier(&owner_secret),
            token: note.token,
            denomination_bucket,
            amount: note.amount,
            recipient,
        };

        Ok(Self::new(note, owner_secret, merkle_witness, public_inputs))
    }

    /// A withdrawal from parts supplied by the caller
    #[must_use]
    pub fn new(
        note: Note,
        owner_secret: OwnerSecret,
        merkle_witness: MerkleWitness<D>,
        public_inputs: WithdrawPublicInputs,
    ) -> Self {
        Self {
            note,
            owner_secret,
            merkle_witness,
            public_inputs,
        }
    }

    /// The public inputs of this withdrawal
    #[must_use]
    pub fn public_inputs(&self) -> &WithdrawPublicInputs {
        &self.public_inputs
    }

    /// Check the withdrawal before proving, deriving the owner key with `keys`
    ///
    /// Errors, in the order they are checked:
    ///  - [`Error::InputMalformed`] if any field is not canonical, or the public token or amount
    ///    are not the note's
    ///  - [`Error::NullifierMismatch`]
    ///  - [`Error::OwnerKeyMismatch`]
    ///  - [`Error::MerkleWitnessInvalid`]
    #[tracing::instrument(skip_all, fields(nullifier = ?self.public_inputs.nullifier))]
    pub fn validate(self, keys: &impl KeyDerivation) -> Result<ValidatedWithdraw<D>> {
        self.note.validate_fields()?;

        let public = &self.public_inputs;
        check_canonical("root", public.root)?;
        check_canonical("nullifier", public.nullifier)?;
        check_canonical("token", public.token)?;
        check_canonical("denomination_bucket", public.denomination_bucket)?;
        check_canonical("amount", public.amount)?;
        check_canonical("recipient", public.recipient)?;

        for element in &self.merkle_witness.path_elements {
            check_canonical("path_elements", *element)?;
        }

        if public.token != self.note.token {
            return Err(Error::InputMalformed { field: "token" });
        }

        // no partial withdrawals
        if public.amount != self.note.amount {
            return Err(Error::InputMalformed { field: "amount" });
        }

        if self.note.nullifier(&self.owner_secret) != public.nullifier {
            return Err(Error::NullifierMismatch);
        }

        if keys.public_key(&self.owner_secret)? != self.note.owner_public_key {
            return Err(Error::OwnerKeyMismatch);
        }

        let commitment = self.note.commitment();
        let witness = &self.merkle_witness;
        if witness.leaf != commitment
            || witness.root != public.root
            || !witness.verify(commitment, public.root)
        {
            return Err(Error::MerkleWitnessInvalid);
        }

        Ok(ValidatedWithdraw { inner: self })
    }
}

impl<const D: usize> ValidatedWithdraw<D> {
    /// The witness for the withdraw circuit
    #[must_use]
    pub fn witness(&self) -> WithdrawWitness {
        let Withdraw {
            note,
            owner_secret,
            merkle_witness,
            public_inputs,
        } = &self.inner;

        WithdrawWitness {
            root: public_inputs.root,
            nullifier: public_inputs.nullifier,
            token: public_inputs.token,
            denomination_bucket: public_inputs.denomination_bucket,
            amount: public_inputs.amount,
            recipient: public_inputs.recipient,
            salt: note.salt,
            owner_secret: owner_secret.clone(),
            path_elements: merkle_witness.path_elements.to_vec(),
            path_directions: merkle_witness.path_directions.to_vec(),
        }
    }

    /// Prove the withdrawal with `gateway`
    #[tracing::instrument(skip_all, fields(nullifier = ?self.inner.public_inputs.nullifier))]
    pub async fn prove<B: ProvingBackend>(
        self,
        gateway: &ProofGateway<B>,
    ) -> Result<ProvedWithdraw> {
        let proof = gateway.prove(self.witness().into()).await?;

        Ok(ProvedWithdraw {
            public_inputs: self.inner.public_inputs,
            proof,
        })
    }
}

impl ProvedWithdraw {
    /// The record to submit to the ledger
    #[must_use]
    pub fn record(&self) -> WithdrawRecord {
        let public = &self.public_inputs;

        WithdrawRecord {
            root: public.root,
            nullifier: public.nullifier,
            token: public.token,
            denomination_bucket: public.denomination_bucket,
            amount: public.amount,
            recipient: public.recipient,
            proof: self.proof.clone(),
        }
    }

    /// The proof of this withdrawal
    #[must_use]
    pub fn proof(&self) -> &Proof {
        &self.proof
    }
}

#[cfg(test)]
mod tests {
    use smirk::smirk;

    use super::*;
    use crate::{DevelopmentBackend, PoseidonKeyDerivation, ProverConfig};

    const DEPTH: usize = 8;

    fn setup() -> (OwnerSecret, Note, Tree<DEPTH>) {
        let secret = OwnerSecret::new(Element::new(99)).unwrap();
        let owner_public_key = PoseidonKeyDerivation.public_key(&secret).unwrap();
        let note = Note::new(
            Element::new(250),
            Element::new(2),
            owner_public_key,
            Element::new(31),
        );
        let tree = smirk! { note.commitment(), 10, 20 };

        (secret, note, tree)
    }

    #[tokio::test]
    async fn full_amount_exits_to_recipient() {
        let (secret, note, tree) = setup();
        let config = ProverConfig {
            merkle_depth: DEPTH,
            ..Default::default()
        };
        let gateway = ProofGateway::new(
            DevelopmentBackend::new(PoseidonKeyDerivation, [6; 32]),
            config,
        );

        let withdraw = Withdraw::build(note, secret, Element::new(1234), Element::new(1), &tree)
            .unwrap();
        let proved = withdraw
            .validate(&PoseidonKeyDerivation)
            .unwrap()
            .prove(&gateway)
            .await
            .unwrap();
        let record = proved.record();

        assert_eq!(record.amount, Element::new(250));
        assert_eq!(record.recipient, Element::new(1234));
        assert_eq!(record.root, tree.root());
        assert_eq!(record.expected_signals(), record.proof.public_signals);
    }

    #[test]
    fn partial_withdrawal_is_rejected() {
        let (secret, note, tree) = setup();
        let withdraw =
            Withdraw::build(note.clone(), secret.clone(), Element::new(1), Element::new(1), &tree)
                .unwrap();

        let mut public_inputs = *withdraw.public_inputs();
        public_inputs.amount = Element::new(100);

        let witness = tree.witness_for(0).unwrap();
        let error = Withdraw::new(note, secret, witness, public_inputs)
            .validate(&PoseidonKeyDerivation)
            .unwrap_err();

        assert!(matches!(error, Error::InputMalformed { field: "amount" }));
    }

    #[test]
    fn other_secret_cannot_withdraw() {
        let (_, note, tree) = setup();
        let thief = OwnerSecret::new(Element::new(98)).unwrap();

        let error = Withdraw::build(note, thief, Element::new(1), Element::new(1), &tree)
            .unwrap()
            .validate(&PoseidonKeyDerivation)
            .unwrap_err();

        assert!(matches!(error, Error::OwnerKeyMismatch));
    }

    #[test]
    fn witness_for_other_leaf_is_rejected() {
        let (secret, note, tree) = setup();
        let withdraw =
            Withdraw::build(note.clone(), secret.clone(), Element::new(1), Element::new(1), &tree)
                .unwrap();

        let witness = tree.witness_for(1).unwrap();
        let error = Withdraw::new(note, secret, witness, *withdraw.public_inputs())
            .validate(&PoseidonKeyDerivation)
            .unwrap_err();

        assert!(matches!(error, Error::MerkleWitnessInvalid));
    }
}
