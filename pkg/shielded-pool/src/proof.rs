use base64::Engine;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smirk::Element;

use crate::CircuitId;

/// A proof in the canonical shape any verifier consumes
///
/// `proof_bytes` are opaque to the pool. In JSON they are encoded as base64:
/// ```rust
/// # use shielded_pool::*;
/// let proof = Proof {
///     proof_bytes: vec![1, 2, 3],
///     public_signals: vec![Element::new(1)],
/// };
///
/// let json = serde_json::to_value(&proof).unwrap();
/// assert_eq!(json["proof_bytes"], "AQID");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Proof {
    /// The backend-specific proof
    #[serde(
        serialize_with = "serialize_base64",
        deserialize_with = "deserialize_base64"
    )]
    pub proof_bytes: Vec<u8>,
    /// The public signals, in circuit order
    pub public_signals: Vec<Element>,
}

/// A deposit, as submitted to the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct DepositRecord {
    /// Commitment of the new note
    pub commitment: Element,
    /// Token of the new note
    pub token: Element,
    /// Public grouping of the deposit
    pub denomination_bucket: Element,
    /// Proof that `commitment` is well formed
    pub proof: Proof,
}

/// A spend, as submitted to the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct SpendRecord {
    /// Root the input note was proven against
    pub root: Element,
    /// Nullifier of the input note
    pub nullifier: Element,
    /// Token of both notes
    pub token: Element,
    /// Public grouping of the spend
    pub denomination_bucket: Element,
    /// Commitment of the output note
    pub new_commitment: Element,
    /// Proof of the spend
    pub proof: Proof,
}

/// A withdrawal, as submitted to the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct WithdrawRecord {
    /// Root the input note was proven against
    pub root: Element,
    /// Nullifier of the input note
    pub nullifier: Element,
    /// Token of the note
    pub token: Element,
    /// Public grouping of the withdrawal
    pub denomination_bucket: Element,
    /// Amount released to `recipient`
    pub amount: Element,
    /// Plaintext account credited with `amount`
    pub recipient: Element,
    /// Proof of the withdrawal
    pub proof: Proof,
}

impl DepositRecord {
    /// The circuit this record's proof is for
    #[must_use]
    pub fn circuit(&self) -> CircuitId {
        CircuitId::DEPOSIT_V1
    }

    /// The public signals the proof must carry
    #[must_use]
    pub fn expected_signals(&self) -> Vec<Element> {
        vec![self.commitment, self.token, self.denomination_bucket]
    }
}

impl SpendRecord {
    /// The circuit this record's proof is for
    #[must_use]
    pub fn circuit(&self) -> CircuitId {
        CircuitId::SPEND_V1
    }

    /// The public signals the proof must carry
    #[must_use]
    pub fn expected_signals(&self) -> Vec<Element> {
        vec![
            self.root,
            self.nullifier,
            self.token,
            self.denomination_bucket,
            self.new_commitment,
        ]
    }
}

impl WithdrawRecord {
    /// The circuit this record's proof is for
    #[must_use]
    pub fn circuit(&self) -> CircuitId {
        CircuitId::WITHDRAW_V1
    }

    /// The public signals the proof must carry
    #[must_use]
    pub fn expected_signals(&self) -> Vec<Element> {
        vec![
            self.root,
            self.nullifier,
            self.token,
            self.denomination_bucket,
            self.amount,
            self.recipient,
        ]
    }
}

// Custom serializer for Vec<u8> to base64 string
#[allow(clippy::ptr_arg)]
fn serialize_base64<S>(value: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let base64_string = base64::engine::general_purpose::STANDARD.encode(value);
    serializer.serialize_str(&base64_string)
}

// Custom deserializer for base64 string to Vec<u8>
fn deserialize_base64<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = <String as Deserialize>::deserialize(deserializer)?;
    base64::engine::general_purpose::STANDARD
        .decode(s)
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SpendRecord {
        SpendRecord {
            root: Element::new(1),
            nullifier: Element::new(2),
            token: Element::new(3),
            denomination_bucket: Element::new(4),
            new_commitment: Element::new(5),
            proof: Proof {
                proof_bytes: vec![0xde, 0xad],
                public_signals: [1, 2, 3, 4, 5].map(Element::new).to_vec(),
            },
        }
    }

    #[test]
    fn expected_signals_follow_circuit_order() {
        let record = record();
        assert_eq!(record.expected_signals(), record.proof.public_signals);
        assert_eq!(record.circuit(), CircuitId::SPEND_V1);
    }

    #[test]
    fn json_and_borsh_round_trip() {
        let record = record();

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(serde_json::from_str::<SpendRecord>(&json).unwrap(), record);

        let bytes = borsh::to_vec(&record).unwrap();
        assert_eq!(borsh::from_slice::<SpendRecord>(&bytes).unwrap(), record);
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let json = r#"{"proof_bytes": "not base64!", "public_signals": []}"#;
        assert!(serde_json::from_str::<Proof>(json).is_err());
    }
}
