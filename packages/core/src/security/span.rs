use super::ctr_drbg::CtrDrbg;
use std::time::Instant;

/// Entropy input / SPAN nonce size on the wire.
pub const SPAN_NONCE_SIZE: usize = 16;

/// A single-cast pre-agreed nonce, once established for a peer.
///
/// `rng` deterministically produces successive 16-byte nonces. `current`
/// optionally remembers the most recently handed-out nonce and its expiry,
/// to support the "previous-SPAN" acceptance rule (spec.md §4.3 step 6).
#[derive(Clone)]
pub struct CurrentSpan {
    rng: CtrDrbg,
    current: Option<(Vec<u8>, Instant)>,
}

impl CurrentSpan {
    pub fn new(entropy: [u8; 32]) -> Self {
        Self {
            rng: CtrDrbg::new(entropy),
            current: None,
        }
    }

    /// Pulls the next 16-byte SPAN nonce from the underlying CTR_DRBG.
    pub fn next_nonce(&mut self) -> Vec<u8> {
        self.rng.generate(SPAN_NONCE_SIZE)
    }

    pub fn record_current(&mut self, nonce: Vec<u8>, expires: Instant) {
        self.current = Some((nonce, expires));
    }

    /// Returns the recorded previous-SPAN nonce if it hasn't expired yet.
    pub fn current_if_valid(&self, now: Instant) -> Option<Vec<u8>> {
        self.current
            .as_ref()
            .filter(|(_, expires)| *expires > now)
            .map(|(nonce, _)| nonce.clone())
    }

    pub fn clear_current(&mut self) {
        self.current = None;
    }
}

/// The per-peer SPAN negotiation state machine (spec.md §3, §4.3-§4.5).
///
/// Singlecast nonce negotiation goes through up to three states before a
/// SPAN is established: we either already sent our EI (`LocalEI`) and are
/// waiting for the peer's, or we already received theirs (`RemoteEI`) and
/// are waiting to send ours. Once both entropy inputs are known, the SPAN
/// itself is derived and the state collapses to `Established`.
#[derive(Clone)]
pub enum SPANState {
    /// No SPAN has been negotiated yet, and neither side has sent an EI.
    None,
    /// We generated a receiver EI and sent it to the peer (in a
    /// NonceReport); waiting for the peer's sender EI to arrive.
    LocalEI { receiver_ei: Vec<u8> },
    /// We received a nonce-request from the peer that included its
    /// receiver EI; we must send ours to establish the SPAN.
    RemoteEI { receiver_ei: Vec<u8> },
    /// Both entropy inputs are known and the SPAN has been established.
    Established(CurrentSpan),
}

impl SPANState {
    pub fn is_established(&self) -> bool {
        matches!(self, SPANState::Established(_))
    }
}

impl Default for SPANState {
    fn default() -> Self {
        SPANState::None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_span_state_default_is_none() {
        assert!(!SPANState::default().is_established());
    }

    #[test]
    fn test_current_span_generates_16_byte_nonces() {
        let mut span = CurrentSpan::new([0u8; 32]);
        let nonce = span.next_nonce();
        assert_eq!(nonce.len(), SPAN_NONCE_SIZE);
        // Successive nonces from the same stream must differ.
        let nonce2 = span.next_nonce();
        assert_ne!(nonce, nonce2);
    }

    #[test]
    fn test_current_span_expiry() {
        let mut span = CurrentSpan::new([0u8; 32]);
        let nonce = span.next_nonce();
        let now = Instant::now();
        span.record_current(nonce.clone(), now + Duration::from_millis(500));
        assert_eq!(span.current_if_valid(now), Some(nonce));
        assert_eq!(span.current_if_valid(now + Duration::from_secs(1)), None);
    }
}
