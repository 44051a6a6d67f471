//! Oracle boundary: the outbound half of the randomness contract, plus a
//! local VRF-backed oracle for tests and demos.
//!
//! The engine only depends on [`RandomnessSource`]. The inbound half is
//! `Engine::on_randomness`, which the designated oracle identity invokes
//! asynchronously once a random value is available.

use crate::engine::Engine;
use crate::errors::EngineResult;
use crate::types::{PlayerId, RequestId};
use schnorrkel::Keypair;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};

const VRF_SIGNING_CONTEXT: &[u8] = b"wagerpool";

/// Outbound randomness contract: hands out globally unique, strictly
/// increasing request ids without blocking.
pub trait RandomnessSource: Send + Sync {
    /// Identity under which this oracle delivers fulfillments.
    fn identity(&self) -> &PlayerId;

    fn next_request_id(&self) -> RequestId;
}

/// In-process oracle deriving random values from schnorrkel VRF signatures.
///
/// Plays the role the coordinator mock plays in an on-chain deployment's test
/// harness: it assigns request ids and later pushes fulfillments into the
/// engine on its own identity.
pub struct VrfOracle {
    keypair: Keypair,
    identity: PlayerId,
    next_request: AtomicU64,
}

impl VrfOracle {
    pub fn new(keypair: Keypair) -> Self {
        let identity = PlayerId::new(format!(
            "vrf-oracle-{}",
            hex::encode(&keypair.public.to_bytes()[..8])
        ));
        Self {
            keypair,
            identity,
            next_request: AtomicU64::new(1),
        }
    }

    /// Create an oracle with a random keypair (for testing)
    pub fn new_random() -> Self {
        use rand_core::OsRng;
        Self::new(Keypair::generate_with(OsRng))
    }

    /// Draw a random value for `request` by hashing a VRF signature over the
    /// request id. The signature nonce makes repeated draws independent.
    pub fn draw(&self, request: RequestId) -> u64 {
        use schnorrkel::context::SigningContext;

        let message = format!("request:{}", request);
        let ctx = SigningContext::new(VRF_SIGNING_CONTEXT);
        let signature = self.keypair.sign(ctx.bytes(message.as_bytes()));

        let mut hasher = Sha256::new();
        hasher.update(signature.to_bytes());
        let output = hasher.finalize();

        let mut word = [0u8; 8];
        word.copy_from_slice(&output[..8]);
        u64::from_be_bytes(word)
    }

    /// Deliver a fulfillment for `request` into the engine, as the oracle
    /// would do out-of-band.
    pub fn fulfill(&self, engine: &Engine, request: RequestId) -> EngineResult<u64> {
        let value = self.draw(request);
        engine.on_randomness(&self.identity, request, value)?;
        Ok(value)
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.keypair.public.to_bytes())
    }
}

impl RandomnessSource for VrfOracle {
    fn identity(&self) -> &PlayerId {
        &self.identity
    }

    fn next_request_id(&self) -> RequestId {
        RequestId(self.next_request.fetch_add(1, Ordering::SeqCst))
    }
}
