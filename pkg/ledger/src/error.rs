use shielded_pool::BackendError;

/// Reasons the ledger rejects a record
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The record was proven against a root the ledger never had, or has forgotten
    #[error("unknown root")]
    UnknownRoot,

    /// A record field or proof signal is not a canonical field element
    #[error("malformed input: {field}")]
    InputMalformed {
        /// The name of the offending field
        field: &'static str,
    },

    /// The nullifier was already accepted
    #[error("nullifier already spent")]
    NullifierAlreadySpent,

    /// The commitment is already in the tree
    #[error("commitment already published")]
    CommitmentAlreadyPublished,

    /// The proof does not verify
    #[error("invalid proof")]
    InvalidProof,

    /// The proof's public signals are not the record's values
    #[error("proof public signals do not match the record")]
    SignalMismatch,

    /// Crediting a withdrawal would overflow the recipient's balance
    #[error("balance overflow")]
    BalanceOverflow,

    /// The verifier could not run
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// The commitment tree rejected an append
    #[error("tree error: {0}")]
    Tree(#[from] smirk::Error),

    /// The configuration could not be loaded
    #[error("config error: {0}")]
    Config(#[from] figment::Error),

    /// A config value is out of range
    #[error("invalid config value: {field}")]
    InvalidConfig {
        /// The name of the offending field
        field: &'static str,
    },
}

/// Result alias for ledger operations
pub type Result<T, E = Error> = std::result::Result<T, E>;
