//! Correlates in-flight randomness requests with the games that issued them.
//!
//! A fulfillment arrives out-of-band at an arbitrary later time and may be
//! duplicated; the correlation record is consumed exactly once, so a second
//! delivery finds nothing and is discarded by the caller.

use crate::oracle::RandomnessSource;
use crate::types::{GameId, RequestId};
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe map of outstanding randomness requests.
pub struct Correlator {
    source: Arc<dyn RandomnessSource>,
    pending: DashMap<RequestId, GameId>,
}

impl Correlator {
    pub fn new(source: Arc<dyn RandomnessSource>) -> Self {
        Self {
            source,
            pending: DashMap::new(),
        }
    }

    /// Obtain a fresh request id from the oracle collaborator and remember
    /// which game it belongs to. The registry's status gate guarantees this
    /// is called at most once per game.
    pub fn request_randomness(&self, game: GameId) -> RequestId {
        let request = self.source.next_request_id();
        self.pending.insert(request, game);
        tracing::debug!(game = %game, request = %request, "randomness requested");
        request
    }

    /// Consume the correlation for `request`. Returns `None` when the id was
    /// never issued or was already consumed (duplicate delivery).
    pub fn take(&self, request: RequestId) -> Option<GameId> {
        self.pending.remove(&request).map(|(_, game)| game)
    }

    /// Number of requests still awaiting fulfillment.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, request: RequestId) -> bool {
        self.pending.contains_key(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::VrfOracle;

    fn correlator() -> Correlator {
        Correlator::new(Arc::new(VrfOracle::new_random()))
    }

    #[test]
    fn test_request_ids_are_unique_and_increasing() {
        let correlator = correlator();
        let first = correlator.request_randomness(GameId(1));
        let second = correlator.request_randomness(GameId(2));
        assert!(second > first);
        assert_eq!(correlator.pending_count(), 2);
    }

    #[test]
    fn test_take_consumes_exactly_once() {
        let correlator = correlator();
        let request = correlator.request_randomness(GameId(9));
        assert!(correlator.is_pending(request));

        assert_eq!(correlator.take(request), Some(GameId(9)));
        assert_eq!(correlator.take(request), None);
        assert_eq!(correlator.pending_count(), 0);
    }

    #[test]
    fn test_take_unknown_request() {
        let correlator = correlator();
        assert_eq!(correlator.take(RequestId(404)), None);
    }
}
