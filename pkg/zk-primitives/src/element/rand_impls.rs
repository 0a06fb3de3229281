use ethnum::U256;
use rand::{CryptoRng, RngCore};

use crate::Element;

impl Element {
    /// Generate a uniformly random canonical [`Element`] from a cryptographically secure rng
    ///
    /// 256-bit values are drawn until one is below [`Element::MODULUS`], so the result is never
    /// reduced (and never biased towards small values)
    ///
    /// ```rust
    /// # use zk_primitives::*;
    /// let salt = Element::secure_random(rand::thread_rng());
    /// assert!(salt.is_canonical());
    /// ```
    #[must_use]
    pub fn secure_random(mut rng: impl RngCore + CryptoRng) -> Self {
        loop {
            let mut bytes = [0; 32];
            rng.fill_bytes(&mut bytes);

            let candidate = Self(U256::from_be_bytes(bytes));
            if candidate.is_canonical() {
                return candidate;
            }
        }
    }
}
