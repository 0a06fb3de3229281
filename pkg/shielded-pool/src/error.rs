use std::time::Duration;

/// Errors produced by the shielded pool protocols and the proof gateway
///
/// Messages only ever name fields and circuits, never the values of a note
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A field was missing, out of range, or not a canonical field element
    #[error("malformed input: {field}")]
    InputMalformed {
        /// The name of the offending field
        field: &'static str,
    },

    /// The commitment does not match the note it claims to commit to
    #[error("commitment does not match the note")]
    CommitmentMismatch,

    /// The nullifier does not match the note and owner secret
    #[error("nullifier does not match the note")]
    NullifierMismatch,

    /// The owner secret does not derive the owner public key of the note
    #[error("owner secret does not match the note's owner")]
    OwnerKeyMismatch,

    /// The Merkle witness does not place the note's commitment under the claimed root
    #[error("merkle witness is invalid for the claimed root")]
    MerkleWitnessInvalid,

    /// The output amount of a spend differs from the input amount
    #[error("output amount does not equal input amount")]
    ConservationViolated,

    /// The proving backend could not run (for example, missing circuit artifacts)
    #[error("proving unavailable: {0}")]
    ProvingUnavailable(String),

    /// The proving backend ran but did not produce a valid proof
    #[error("proving failed: {0}")]
    ProvingFailed(String),

    /// The proving backend did not finish in time
    #[error("proving timed out after {0:?}")]
    ProvingTimeout(Duration),

    /// The public signals of a proof are not the ones that were requested
    #[error("public signals of the proof do not match the request")]
    PublicSignalsMismatch,

    /// The commitment accumulator is full
    #[error("the accumulator is full (capacity {capacity})")]
    CapacityExceeded {
        /// Number of leaves the accumulator can hold
        capacity: u64,
    },

    /// The configuration could not be loaded
    #[error("config error: {0}")]
    Config(#[from] figment::Error),
}

/// Result alias for shielded pool operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// How a caller should react to an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The input was wrong, fix it and try again
    FixInput,
    /// The system could not prove right now, the same input can be retried later
    RetryLater,
    /// Retrying with the same input will not help
    Fatal,
}

impl Error {
    /// Classify this error for user-facing messaging
    ///
    /// ```rust
    /// # use shielded_pool::*;
    /// assert_eq!(Error::NullifierMismatch.class(), ErrorClass::FixInput);
    /// assert_eq!(Error::ProvingUnavailable("no artifacts".into()).class(), ErrorClass::RetryLater);
    /// assert_eq!(Error::ProvingFailed("unsatisfied".into()).class(), ErrorClass::Fatal);
    /// ```
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InputMalformed { .. }
            | Self::CommitmentMismatch
            | Self::NullifierMismatch
            | Self::OwnerKeyMismatch
            | Self::MerkleWitnessInvalid
            | Self::ConservationViolated => ErrorClass::FixInput,

            Self::ProvingUnavailable(_) | Self::ProvingTimeout(_) => ErrorClass::RetryLater,

            Self::ProvingFailed(_)
            | Self::PublicSignalsMismatch
            | Self::CapacityExceeded { .. }
            | Self::Config(_) => ErrorClass::Fatal,
        }
    }
}

impl From<smirk::Error> for Error {
    fn from(error: smirk::Error) -> Self {
        match error {
            smirk::Error::CapacityExceeded { capacity } => Self::CapacityExceeded { capacity },
            smirk::Error::LeafNotFound { .. } => Self::MerkleWitnessInvalid,
            smirk::Error::NonCanonicalLeaf => Self::InputMalformed { field: "leaf" },
        }
    }
}

impl From<crate::BackendError> for Error {
    fn from(error: crate::BackendError) -> Self {
        match error {
            crate::BackendError::Unavailable(reason) => Self::ProvingUnavailable(reason),
            crate::BackendError::Failed(reason) => Self::ProvingFailed(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_distinct_from_failure() {
        let timeout = Error::ProvingTimeout(Duration::from_secs(1));
        let failed = Error::ProvingFailed("bad witness".into());

        assert_eq!(timeout.class(), ErrorClass::RetryLater);
        assert_eq!(failed.class(), ErrorClass::Fatal);
    }

    #[test]
    fn tree_errors_map_to_pool_errors() {
        let error = Error::from(smirk::Error::LeafNotFound { index: 3, len: 1 });
        assert!(matches!(error, Error::MerkleWitnessInvalid));

        let error = Error::from(smirk::Error::CapacityExceeded { capacity: 4 });
        assert!(matches!(error, Error::CapacityExceeded { capacity: 4 }));
    }
}
