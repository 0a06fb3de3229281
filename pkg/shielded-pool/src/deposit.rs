use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use smirk::Element;

use crate::{
    note::check_canonical, DepositRecord, DepositWitness, Error, KeyDerivation, Note, OwnerSecret,
    Proof, ProofGateway, ProvingBackend, Result,
};

/// The values of a deposit that the ledger sees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepositPublicInputs {
    /// Commitment of the deposited note
    pub commitment: Element,
    /// Token being deposited
    pub token: Element,
    /// Public grouping of the deposit
    pub denomination_bucket: Element,
}

/// A deposit that has been built, but not checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deposit {
    note: Note,
    public_inputs: DepositPublicInputs,
}

/// A deposit whose commitment matches its note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDeposit {
    note: Note,
    public_inputs: DepositPublicInputs,
}

/// A deposit with a proof, ready to be submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvedDeposit {
    note: Note,
    public_inputs: DepositPublicInputs,
    proof: Proof,
}

impl Deposit {
    /// Build a deposit of `amount` of `token` to the holder of `owner_secret`
    ///
    /// The note gets a fresh canonical salt from `rng`
    #[tracing::instrument(skip_all, fields(?token, ?denomination_bucket))]
    pub fn build(
        amount: Element,
        token: Element,
        denomination_bucket: Element,
        owner_secret: &OwnerSecret,
        keys: &impl KeyDerivation,
        rng: impl RngCore + CryptoRng,
    ) -> Result<Self> {
        let owner_public_key = keys.public_key(owner_secret)?;
        let note = Note::with_random_salt(amount, token, owner_public_key, rng);

        let public_inputs = DepositPublicInputs {
            commitment: note.commitment(),
            token,
            denomination_bucket,
        };

        Ok(Self::new(note, public_inputs))
    }

    /// A deposit from a note and public inputs supplied by the caller
    #[must_use]
    pub fn new(note: Note, public_inputs: DepositPublicInputs) -> Self {
        Self {
            note,
            public_inputs,
        }
    }

    /// The note this deposit creates
    #[must_use]
    pub fn note(&self) -> &Note {
        &self.note
    }

    /// The public inputs of this deposit
    #[must_use]
    pub fn public_inputs(&self) -> &DepositPublicInputs {
        &self.public_inputs
    }

    /// Check the deposit before proving
    ///
    /// Errors:
    ///  - [`Error::InputMalformed`] if any field is not a canonical element, or the public token is
    ///    not the note's token
    ///  - [`Error::CommitmentMismatch`] if the declared commitment is not the note's commitment
    ///
    /// ```rust
    /// # use shielded_pool::*;
    /// let note = Note::new(Element::new(1), Element::new(2), Element::new(3), Element::new(4));
    /// let public_inputs = DepositPublicInputs {
    ///     commitment: Element::new(5),
    ///     token: Element::new(2),
    ///     denomination_bucket: Element::new(1),
    /// };
    ///
    /// let error = Deposit::new(note, public_inputs).validate().unwrap_err();
    /// assert!(matches!(error, Error::CommitmentMismatch));
    /// ```
    #[tracing::instrument(skip_all, fields(commitment = ?self.public_inputs.commitment))]
    pub fn validate(self) -> Result<ValidatedDeposit> {
        self.note.validate_fields()?;
        check_canonical("commitment", self.public_inputs.commitment)?;
        check_canonical("token", self.public_inputs.token)?;
        check_canonical("denomination_bucket", self.public_inputs.denomination_bucket)?;

        if self.public_inputs.token != self.note.token {
            return Err(Error::InputMalformed { field: "token" });
        }

        if self.note.commitment() != self.public_inputs.commitment {
            tracing::debug!("deposit commitment does not match the note");
            return Err(Error::CommitmentMismatch);
        }

        Ok(ValidatedDeposit {
            note: self.note,
            public_inputs: self.public_inputs,
        })
    }
}

impl ValidatedDeposit {
    /// The witness for the deposit circuit
    #[must_use]
    pub fn witness(&self) -> DepositWitness {
        DepositWitness {
            commitment: self.public_inputs.commitment,
            token: self.public_inputs.token,
            denomination_bucket: self.public_inputs.denomination_bucket,
            amount: self.note.amount,
            salt: self.note.salt,
            owner_public_key: self.note.owner_public_key,
        }
    }

    /// Prove the deposit with `gateway`
    #[tracing::instrument(skip_all, fields(commitment = ?self.public_inputs.commitment))]
    pub async fn prove<B: ProvingBackend>(self, gateway: &ProofGateway<B>) -> Result<ProvedDeposit> {
        let proof = gateway.prove(self.witness().into()).await?;

        Ok(ProvedDeposit {
            note: self.note,
            public_inputs: self.public_inputs,
            proof,
        })
    }
}

impl ProvedDeposit {
    /// The record to submit to the ledger
    #[must_use]
    pub fn record(&self) -> DepositRecord {
        DepositRecord {
            commitment: self.public_inputs.commitment,
            token: self.public_inputs.token,
            denomination_bucket: self.public_inputs.denomination_bucket,
            proof: self.proof.clone(),
        }
    }

    /// The deposited note, to be kept by the owner
    #[must_use]
    pub fn note(&self) -> &Note {
        &self.note
    }

    /// The proof of this deposit
    #[must_use]
    pub fn proof(&self) -> &Proof {
        &self.proof
    }

    /// Split into the note and the ledger record
    #[must_use]
    pub fn into_parts(self) -> (Note, DepositRecord) {
        let record = self.record();
        (self.note, record)
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::{rand_core::SeedableRng, ChaChaRng};

    use super::*;
    use crate::{DevelopmentBackend, ErrorClass, ProverConfig, SquaringKeyDerivation};

    fn secret() -> OwnerSecret {
        OwnerSecret::new(Element::new(7)).unwrap()
    }

    fn gateway() -> ProofGateway<DevelopmentBackend<SquaringKeyDerivation>> {
        ProofGateway::new(
            DevelopmentBackend::new(SquaringKeyDerivation, [3; 32]),
            ProverConfig::default(),
        )
    }

    fn build() -> Deposit {
        Deposit::build(
            Element::new(1000),
            Element::new(123_456_789),
            Element::new(1),
            &secret(),
            &SquaringKeyDerivation,
            ChaChaRng::seed_from_u64(1),
        )
        .unwrap()
    }

    #[test]
    fn build_derives_owner_key_and_commitment() {
        let deposit = build();

        assert_eq!(deposit.note().owner_public_key, Element::new(49));
        assert_eq!(deposit.public_inputs().commitment, deposit.note().commitment());
        assert!(deposit.note().salt.is_canonical());
    }

    #[test]
    fn tampered_note_fails_validation() {
        let deposit = build();
        let mut note = deposit.note().clone();
        note.amount = Element::new(1001);

        let error = Deposit::new(note, *deposit.public_inputs())
            .validate()
            .unwrap_err();

        assert!(matches!(error, Error::CommitmentMismatch));
        assert_eq!(error.class(), ErrorClass::FixInput);
    }

    #[test]
    fn non_canonical_bucket_is_malformed() {
        let deposit = build();
        let mut public_inputs = *deposit.public_inputs();
        public_inputs.denomination_bucket = Element::MAX;

        let error = Deposit::new(deposit.note().clone(), public_inputs)
            .validate()
            .unwrap_err();

        assert!(matches!(
            error,
            Error::InputMalformed {
                field: "denomination_bucket"
            }
        ));
    }

    #[test]
    fn public_token_must_match_note() {
        let deposit = build();
        let mut public_inputs = *deposit.public_inputs();
        public_inputs.token = Element::new(1);

        let error = Deposit::new(deposit.note().clone(), public_inputs)
            .validate()
            .unwrap_err();

        assert!(matches!(error, Error::InputMalformed { field: "token" }));
    }

    #[tokio::test]
    async fn proved_deposit_echoes_public_inputs() {
        let gateway = gateway();
        let deposit = build();
        let public_inputs = *deposit.public_inputs();

        let proved = deposit.validate().unwrap().prove(&gateway).await.unwrap();
        let record = proved.record();

        assert_eq!(record.commitment, public_inputs.commitment);
        assert_eq!(record.expected_signals(), record.proof.public_signals);
        assert!(gateway.verify_locally(record.circuit(), &record.proof).unwrap());

        let (note, _) = proved.into_parts();
        assert_eq!(note.commitment(), public_inputs.commitment);
    }
}
