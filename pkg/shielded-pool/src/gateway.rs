use std::{sync::Arc, time::Instant};

use tokio::sync::Semaphore;

use crate::{
    note::check_canonical, CircuitId, Error, Proof, ProverConfig, ProvingBackend, Result, Witness,
};

/// The single entrypoint to a [`ProvingBackend`]
///
/// Every witness is checked structurally before it reaches the backend, proving runs on tokio's
/// blocking pool (bounded by [`ProverConfig::max_concurrent_proofs`]), and every proof is checked
/// to carry the public signals that were asked for.
///
/// Dropping the future returned by [`ProofGateway::prove`] cancels the request. Nothing is
/// persisted by the gateway, so cancelling has no side effects.
#[derive(Debug)]
pub struct ProofGateway<B> {
    backend: Arc<B>,
    config: ProverConfig,
    permits: Arc<Semaphore>,
}

impl<B> Clone for ProofGateway<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: self.config.clone(),
            permits: Arc::clone(&self.permits),
        }
    }
}

impl<B: ProvingBackend> ProofGateway<B> {
    /// Create a gateway that owns `backend`
    #[must_use]
    pub fn new(backend: B, config: ProverConfig) -> Self {
        Self::from_arc(Arc::new(backend), config)
    }

    /// Create a gateway for a backend that is shared with something else (e.g. a ledger)
    #[must_use]
    pub fn from_arc(backend: Arc<B>, config: ProverConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_proofs.max(1)));

        Self {
            backend,
            config,
            permits,
        }
    }

    /// The config of this gateway
    #[must_use]
    pub fn config(&self) -> &ProverConfig {
        &self.config
    }

    /// The backend of this gateway
    #[must_use]
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Prove `witness` with the backend
    ///
    /// Errors:
    ///  - [`Error::InputMalformed`] if an element is not canonical, or a merkle path does not have
    ///    [`ProverConfig::merkle_depth`] levels (the backend is not called)
    ///  - [`Error::ProvingTimeout`] if the configured timeout elapses
    ///  - [`Error::ProvingUnavailable`] / [`Error::ProvingFailed`] from the backend
    ///  - [`Error::PublicSignalsMismatch`] if the proof does not echo the witness' public signals
    #[tracing::instrument(skip_all, fields(circuit = %witness.circuit()))]
    pub async fn prove(&self, witness: Witness) -> Result<Proof> {
        witness.check_structure(self.config.merkle_depth)?;

        let expected = witness.public_signals();

        // the permit moves into the blocking task, so work that outlives a cancelled or timed out
        // request still counts against the limit
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| Error::ProvingUnavailable("gateway is closed".to_string()))?;

        let backend = Arc::clone(&self.backend);
        let start = Instant::now();
        tracing::info!("proving started");

        let task = tokio::task::spawn_blocking(move || {
            let result = backend.prove(&witness);
            drop(permit);
            result
        });

        let joined = match self.config.proving_timeout() {
            Some(limit) => tokio::time::timeout(limit, task).await.map_err(|_| {
                tracing::warn!(timeout_ms = limit.as_millis(), "proving timed out");
                Error::ProvingTimeout(limit)
            })?,
            None => task.await,
        };

        let proof = joined
            .map_err(|_| Error::ProvingFailed("proving task panicked".to_string()))?
            .map_err(|error| {
                tracing::warn!(%error, "proving backend returned an error");
                Error::from(error)
            })?;

        if proof.public_signals != expected {
            tracing::error!("proof public signals do not match the witness");
            return Err(Error::PublicSignalsMismatch);
        }

        let elapsed_ms = start.elapsed().as_millis();
        tracing::info!(elapsed_ms, "proving finished");

        Ok(proof)
    }

    /// Check a proof with the backend, without submitting it anywhere
    ///
    /// Non canonical public signals are rejected with [`Error::InputMalformed`]
    #[tracing::instrument(skip_all, fields(%circuit))]
    pub fn verify_locally(&self, circuit: CircuitId, proof: &Proof) -> Result<bool> {
        for signal in &proof.public_signals {
            check_canonical("public_signals", *signal)?;
        }

        Ok(self.backend.verify(circuit, proof)?)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use smirk::Element;

    use super::*;
    use crate::{
        BackendError, DepositWitness, DevelopmentBackend, ErrorClass, Note, SquaringKeyDerivation,
    };

    fn deposit_witness(amount: u64) -> Witness {
        let note = Note::new(Element::new(amount), Element::new(1), Element::new(2), Element::new(3));

        Witness::Deposit(DepositWitness {
            commitment: note.commitment(),
            token: note.token,
            denomination_bucket: Element::new(1),
            amount: note.amount,
            salt: note.salt,
            owner_public_key: note.owner_public_key,
        })
    }

    fn dev_gateway(config: ProverConfig) -> ProofGateway<DevelopmentBackend<SquaringKeyDerivation>> {
        ProofGateway::new(DevelopmentBackend::new(SquaringKeyDerivation, [9; 32]), config)
    }

    /// Wraps the development backend, recording calls and optionally misbehaving
    #[derive(Default)]
    struct TestBackend {
        calls: AtomicUsize,
        active: AtomicUsize,
        max_active: AtomicUsize,
        delay: Duration,
        wrong_signals: bool,
        panics: bool,
    }

    impl ProvingBackend for TestBackend {
        fn prove(&self, witness: &Witness) -> Result<Proof, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(active, Ordering::SeqCst);

            std::thread::sleep(self.delay);
            self.active.fetch_sub(1, Ordering::SeqCst);

            assert!(!self.panics, "backend exploded");

            let mut public_signals = witness.public_signals();
            if self.wrong_signals {
                public_signals.reverse();
            }

            Ok(Proof {
                proof_bytes: vec![1],
                public_signals,
            })
        }

        fn verify(&self, _circuit: CircuitId, _proof: &Proof) -> Result<bool, BackendError> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn proofs_echo_public_signals() {
        let gateway = dev_gateway(ProverConfig::default());
        let witness = deposit_witness(100);
        let expected = witness.public_signals();

        let proof = gateway.prove(witness).await.unwrap();

        assert_eq!(proof.public_signals, expected);
        assert!(gateway.verify_locally(CircuitId::DEPOSIT_V1, &proof).unwrap());
    }

    #[tokio::test]
    async fn malformed_witness_never_reaches_backend() {
        let backend = Arc::new(TestBackend::default());
        let gateway = ProofGateway::from_arc(Arc::clone(&backend), ProverConfig::default());

        let Witness::Deposit(mut witness) = deposit_witness(100) else {
            unreachable!()
        };
        witness.salt = Element::MAX;

        let error = gateway.prove(Witness::Deposit(witness)).await.unwrap_err();

        assert!(matches!(error, Error::InputMalformed { field: "salt" }));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn mismatched_signals_are_fatal() {
        let backend = TestBackend {
            wrong_signals: true,
            ..Default::default()
        };
        let gateway = ProofGateway::new(backend, ProverConfig::default());

        let error = gateway.prove(deposit_witness(100)).await.unwrap_err();

        assert!(matches!(error, Error::PublicSignalsMismatch));
        assert_eq!(error.class(), ErrorClass::Fatal);
    }

    #[tokio::test]
    async fn timeout_is_reported_separately() {
        let backend = TestBackend {
            delay: Duration::from_millis(500),
            ..Default::default()
        };
        let config = ProverConfig {
            proving_timeout_ms: Some(10),
            ..Default::default()
        };
        let gateway = ProofGateway::new(backend, config);

        let error = gateway.prove(deposit_witness(100)).await.unwrap_err();

        assert!(matches!(error, Error::ProvingTimeout(_)));
        assert_eq!(error.class(), ErrorClass::RetryLater);
    }

    #[tokio::test]
    async fn backend_panic_is_a_failure() {
        let backend = TestBackend {
            panics: true,
            ..Default::default()
        };
        let gateway = ProofGateway::new(backend, ProverConfig::default());

        let error = gateway.prove(deposit_witness(100)).await.unwrap_err();
        assert!(matches!(error, Error::ProvingFailed(_)));
    }

    #[tokio::test]
    async fn missing_artifacts_are_unavailable() {
        let backend = DevelopmentBackend::new(SquaringKeyDerivation, [9; 32])
            .with_supported_circuits([CircuitId::SPEND_V1]);
        let gateway = ProofGateway::new(backend, ProverConfig::default());

        let error = gateway.prove(deposit_witness(100)).await.unwrap_err();
        assert!(matches!(error, Error::ProvingUnavailable(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrency_is_bounded() {
        let backend = Arc::new(TestBackend {
            delay: Duration::from_millis(20),
            ..Default::default()
        });
        let config = ProverConfig {
            max_concurrent_proofs: 1,
            ..Default::default()
        };
        let gateway = ProofGateway::from_arc(Arc::clone(&backend), config);

        let (a, b, c) = tokio::join!(
            gateway.prove(deposit_witness(1)),
            gateway.prove(deposit_witness(2)),
            gateway.prove(deposit_witness(3)),
        );

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
        assert_eq!(backend.max_active.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancelled_request_leaves_gateway_usable() {
        let backend = Arc::new(TestBackend {
            delay: Duration::from_millis(50),
            ..Default::default()
        });
        let gateway = ProofGateway::from_arc(Arc::clone(&backend), ProverConfig::default());

        let cancelled =
            tokio::time::timeout(Duration::from_millis(1), gateway.prove(deposit_witness(1))).await;
        assert!(cancelled.is_err());

        let proof = gateway.prove(deposit_witness(2)).await.unwrap();
        assert_eq!(proof.public_signals, deposit_witness(2).public_signals());
    }
}
