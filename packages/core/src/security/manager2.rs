use super::crypto::{compute_nonce_prk, derive_mei};
use super::security_class::{NetworkKeySet, SecurityClass, TempKeys};
use super::span::{CurrentSpan, SPANState};
use crate::prelude::*;
use getrandom::getrandom;
use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

/// Entropy input size, per spec.
pub const EI_SIZE: usize = 16;
/// How long a `currentSPAN` remains eligible for the previous-nonce
/// acceptance rule after being produced.
pub const SPAN_GRACE_PERIOD: Duration = Duration::from_millis(500);
/// How many successive `nextNonce` draws the decrypt-retry loop (C5) may
/// attempt before giving up.
pub const DECRYPT_ATTEMPTS: usize = 5;

/// Errors raised by the synchronous `SecurityManager2` operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SecurityManagerError {
    #[error("no security class granted for this peer")]
    NoSecurityClassForPeer,
    #[error("no keys available for the requested security class")]
    NoKeysForSecurityClass,
    #[error("no temporary keys have been established")]
    NoTemporaryKeys,
}

fn random_ei() -> [u8; EI_SIZE] {
    let mut buf = [0u8; EI_SIZE];
    getrandom(&mut buf).unwrap_or_else(|_| panic!("Failed to generate random bytes"));
    buf
}

#[derive(Default)]
struct PeerState {
    span: SPANState,
    temp_span: SPANState,
    security_class: Option<SecurityClass>,
    last_received_seq: Option<u8>,
    seq_counter: Option<u8>,
    pending_seq: Option<u8>,
    /// Security classes known, by trial-decrypt failure or explicit
    /// interview result, NOT to be granted to this peer (spec.md §4.7
    /// step 4 / §4.3 RX LocalEI trial loop).
    known_not_granted: BTreeSet<SecurityClass>,
}

pub struct SecurityManager2Options {
    pub own_node_id: NodeId,
    pub network_keys: BTreeMap<SecurityClass, NetworkKeySet>,
}

/// Per-peer SPAN/sequence-number/key-set bookkeeping for Security 2.
///
/// All operations here are local and synchronous; nothing in this type
/// ever awaits. The driver shares one instance per own-node-id behind
/// `Arc<RwLock<_>>`.
pub struct SecurityManager2 {
    own_node_id: NodeId,
    network_keys: BTreeMap<SecurityClass, NetworkKeySet>,
    temp_keys: Option<TempKeys>,
    peers: BTreeMap<NodeId, PeerState>,
}

impl SecurityManager2 {
    pub fn new(options: SecurityManager2Options) -> Self {
        Self {
            own_node_id: options.own_node_id,
            network_keys: options.network_keys,
            temp_keys: None,
            peers: BTreeMap::new(),
        }
    }

    pub fn own_node_id(&self) -> NodeId {
        self.own_node_id
    }

    fn peer_mut(&mut self, peer: NodeId) -> &mut PeerState {
        self.peers.entry(peer).or_default()
    }

    fn peer(&self, peer: NodeId) -> Option<&PeerState> {
        self.peers.get(&peer)
    }

    /// Sets (or replaces) the active temporary key set, used during KEX
    /// bootstrap before a permanent network key has been confirmed.
    pub fn set_temp_keys(&mut self, temp_keys: TempKeys) {
        self.temp_keys = Some(temp_keys);
    }

    pub fn clear_temp_keys(&mut self) {
        self.temp_keys = None;
    }

    pub fn is_temp_peer(&self, peer: NodeId) -> bool {
        self.temp_keys.is_some()
            && self
                .peer(peer)
                .map(|p| matches!(p.security_class, Some(SecurityClass::Temporary) | None))
                .unwrap_or(true)
    }

    /// Returns an incremented u8 counter. Starts at a random value per
    /// peer on first call.
    pub fn next_sequence_number(&mut self, peer: NodeId) -> u8 {
        let state = self.peer_mut(peer);
        let next = match state.seq_counter {
            Some(current) => current.wrapping_add(1),
            None => random_ei()[0],
        };
        state.seq_counter = Some(next);
        next
    }

    /// Lazily materializes the sequence number for an outgoing
    /// encapsulation: the first call allocates the next counter value,
    /// subsequent calls return the same cached value until committed or
    /// reset.
    pub fn peek_sequence_number(&mut self, peer: NodeId) -> u8 {
        if let Some(pending) = self.peer(peer).and_then(|p| p.pending_seq) {
            return pending;
        }
        let seq = self.next_sequence_number(peer);
        self.peer_mut(peer).pending_seq = Some(seq);
        seq
    }

    /// Clears the cached pending sequence number without having sent
    /// anything, so the next `peekSequenceNumber` call allocates a fresh
    /// one.
    pub fn reset_sequence_number(&mut self, peer: NodeId) {
        self.peer_mut(peer).pending_seq = None;
    }

    /// True iff `seq` equals the last accepted incoming sequence number
    /// for `peer`.
    pub fn is_duplicate_singlecast(&self, peer: NodeId, seq: u8) -> bool {
        self.peer(peer).and_then(|p| p.last_received_seq) == Some(seq)
    }

    /// Sets `last_received[peer]` to `seq`, returning the previous value.
    pub fn store_sequence_number(&mut self, peer: NodeId, seq: u8) -> Option<u8> {
        let state = self.peer_mut(peer);
        state.last_received_seq.replace(seq)
    }

    /// Produces a 16-byte EI from a CSPRNG. If `peer` is given, records it
    /// as `LocalEI { receiverEI }` for that peer.
    pub fn generate_nonce(&mut self, peer: Option<NodeId>) -> [u8; EI_SIZE] {
        let ei = random_ei();
        if let Some(peer) = peer {
            self.peer_mut(peer).span = SPANState::LocalEI {
                receiver_ei: ei.to_vec(),
            };
        }
        ei
    }

    /// Sets state to `RemoteEI { receiverEI: ei }`, resetting any `SPAN`
    /// state.
    pub fn store_remote_ei(&mut self, peer: NodeId, ei: Vec<u8>) {
        self.peer_mut(peer).span = SPANState::RemoteEI { receiver_ei: ei };
    }

    fn span_seed(sender_ei: &[u8], receiver_ei: &[u8], personalization_string: &[u8]) -> [u8; 32] {
        let prk = compute_nonce_prk(sender_ei, receiver_ei);
        let mei = derive_mei(&prk);
        let mut seed = [0u8; 32];
        for i in 0..32 {
            seed[i] = mei[i] ^ personalization_string[i % personalization_string.len()];
        }
        seed
    }

    /// Constructs a CTR_DRBG from `(senderEI, receiverEI, personalizationString(class))`
    /// and transitions state to `SPAN`.
    pub fn initialize_span(
        &mut self,
        peer: NodeId,
        class: SecurityClass,
        sender_ei: &[u8],
        receiver_ei: &[u8],
    ) -> Result<(), SecurityManagerError> {
        let keys = self
            .network_keys
            .get(&class)
            .ok_or(SecurityManagerError::NoKeysForSecurityClass)?;
        let seed = Self::span_seed(sender_ei, receiver_ei, keys.personalization_string());
        self.peer_mut(peer).span = SPANState::Established(CurrentSpan::new(seed));
        self.peer_mut(peer).security_class = Some(class);
        Ok(())
    }

    /// Same as `initializeSpan`, but keyed from the temporary key schedule
    /// used during KEX bootstrap.
    pub fn initialize_temp_span(
        &mut self,
        peer: NodeId,
        sender_ei: &[u8],
        receiver_ei: &[u8],
    ) -> Result<(), SecurityManagerError> {
        let temp_keys = self
            .temp_keys
            .as_ref()
            .ok_or(SecurityManagerError::NoTemporaryKeys)?;
        let seed = Self::span_seed(sender_ei, receiver_ei, temp_keys.personalization_string());
        self.peer_mut(peer).temp_span = SPANState::Established(CurrentSpan::new(seed));
        Ok(())
    }

    /// The `keyCCM` of the currently-active temporary key set, if any.
    pub fn temp_key_ccm(&self) -> Option<&[u8]> {
        self.temp_keys.as_ref().map(|k| k.key_ccm())
    }

    /// Advances the *temporary* SPAN's `rng` by 16 bytes and returns them,
    /// or `None` if no temp SPAN is established for `peer`.
    pub fn next_temp_nonce(&mut self, peer: NodeId) -> Option<Vec<u8>> {
        let state = self.peer_mut(peer);
        let SPANState::Established(span) = &mut state.temp_span else {
            return None;
        };
        Some(span.next_nonce())
    }

    /// Advances `rng` by 16 bytes and returns them. If `persist_previous`,
    /// records `currentSPAN = { nonce, expires: now + GRACE }` before
    /// returning.
    ///
    /// Panics if the peer's SPAN state is not `Established` — per spec this
    /// is a programmer error, the caller must ensure a SPAN exists first.
    pub fn next_nonce(&mut self, peer: NodeId, persist_previous: bool) -> Vec<u8> {
        let state = self.peer_mut(peer);
        let SPANState::Established(span) = &mut state.span else {
            panic!("next_nonce called without an established SPAN for this peer");
        };
        let nonce = span.next_nonce();
        if persist_previous {
            span.record_current(nonce.clone(), Instant::now() + SPAN_GRACE_PERIOD);
        }
        nonce
    }

    /// Returns the currently-recorded previous-SPAN nonce for `peer`, if
    /// it is still within its grace period AND `seq` is exactly one past
    /// the last accepted incoming sequence number. Out-of-order arrivals
    /// beyond `previousSeq + 1` fall back to the fresh-nonce search, even
    /// if a `currentSPAN` is still live.
    pub fn current_span_nonce(&self, peer: NodeId, seq: u8) -> Option<Vec<u8>> {
        let state = self.peer(peer)?;
        let is_immediate_next = state
            .last_received_seq
            .map(|prev| seq == prev.wrapping_add(1))
            .unwrap_or(false);
        if !is_immediate_next {
            return None;
        }
        let SPANState::Established(span) = &state.span else {
            return None;
        };
        span.current_if_valid(Instant::now())
    }

    /// Clears the previous-SPAN nonce for `peer` (consumed or expired).
    pub fn clear_current_span(&mut self, peer: NodeId) {
        if let Some(state) = self.peers.get_mut(&peer) {
            if let SPANState::Established(span) = &mut state.span {
                span.clear_current();
            }
        }
    }

    /// Direct set, used to roll back to a known-good state after a failed
    /// trial-decrypt attempt.
    pub fn set_span_state(&mut self, peer: NodeId, state: SPANState) {
        self.peer_mut(peer).span = state;
    }

    pub fn span_state(&self, peer: NodeId) -> SPANState {
        self.peer(peer).map(|p| p.span.clone()).unwrap_or_default()
    }

    pub fn temp_span_state(&self, peer: NodeId) -> SPANState {
        self.peer(peer)
            .map(|p| p.temp_span.clone())
            .unwrap_or_default()
    }

    /// Resets SPAN and sequence-number memory for `peer` to `None`.
    pub fn delete_nonce(&mut self, peer: NodeId) {
        let state = self.peer_mut(peer);
        state.span = SPANState::None;
        state.temp_span = SPANState::None;
        state.last_received_seq = None;
    }

    /// Records the highest S2 security class known to be granted to
    /// `peer`. Called after a successful trial-decrypt during bootstrap.
    pub fn grant_security_class(&mut self, peer: NodeId, class: SecurityClass) {
        let state = self.peer_mut(peer);
        state.security_class = Some(class);
        state.known_not_granted.remove(&class);
    }

    /// Records that `class` is known NOT to be granted to `peer` (spec.md
    /// §4.7 step 4: interview got no response for a candidate class with
    /// more than one candidate in the set).
    pub fn mark_class_not_granted(&mut self, peer: NodeId, class: SecurityClass) {
        self.peer_mut(peer).known_not_granted.insert(class);
    }

    pub fn is_class_known_not_granted(&self, peer: NodeId, class: SecurityClass) -> bool {
        self.peer(peer)
            .map(|p| p.known_not_granted.contains(&class))
            .unwrap_or(false)
    }

    pub fn security_class_for(&self, peer: NodeId) -> Option<SecurityClass> {
        self.peer(peer).and_then(|p| p.security_class)
    }

    /// Looks up the security class granted to `peer` and returns that
    /// class's key set.
    pub fn get_keys_for_node(&self, peer: NodeId) -> Result<&NetworkKeySet, SecurityManagerError> {
        let class = self
            .security_class_for(peer)
            .ok_or(SecurityManagerError::NoSecurityClassForPeer)?;
        self.get_keys_for_security_class(class)
    }

    pub fn get_keys_for_security_class(
        &self,
        class: SecurityClass,
    ) -> Result<&NetworkKeySet, SecurityManagerError> {
        self.network_keys
            .get(&class)
            .ok_or(SecurityManagerError::NoKeysForSecurityClass)
    }

    pub fn has_keys_for_security_class(&self, class: SecurityClass) -> bool {
        self.network_keys.contains_key(&class)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn mgr() -> SecurityManager2 {
        let own_node_id = NodeId::from(1u16);
        let mut network_keys = BTreeMap::new();
        network_keys.insert(
            SecurityClass::S2AccessControl,
            NetworkKeySet::new(vec![0x42; 16]),
        );
        SecurityManager2::new(SecurityManager2Options {
            own_node_id,
            network_keys,
        })
    }

    #[test]
    fn test_sequence_number_increments_with_wraparound() {
        let mut m = mgr();
        let peer = NodeId::from(2u16);
        let first = m.next_sequence_number(peer);
        for _ in 0..300 {
            m.next_sequence_number(peer);
        }
        // After 301 increments from `first`, we must have wrapped at least once.
        let expected = first.wrapping_add(301);
        assert_eq!(m.peer(peer).unwrap().seq_counter, Some(expected));
    }

    #[test]
    fn test_peek_sequence_number_is_stable_until_reset() {
        let mut m = mgr();
        let peer = NodeId::from(2u16);
        let a = m.peek_sequence_number(peer);
        let b = m.peek_sequence_number(peer);
        assert_eq!(a, b);
        m.reset_sequence_number(peer);
        m.peek_sequence_number(peer);
    }

    #[test]
    fn test_duplicate_detection() {
        let mut m = mgr();
        let peer = NodeId::from(2u16);
        assert!(!m.is_duplicate_singlecast(peer, 5));
        m.store_sequence_number(peer, 5);
        assert!(m.is_duplicate_singlecast(peer, 5));
        assert!(!m.is_duplicate_singlecast(peer, 6));
    }

    #[test]
    fn test_span_lifecycle() {
        let mut m = mgr();
        let peer = NodeId::from(2u16);
        assert!(matches!(m.span_state(peer), SPANState::None));

        m.store_remote_ei(peer, vec![0xAA; 16]);
        assert!(matches!(m.span_state(peer), SPANState::RemoteEI { .. }));

        m.initialize_span(peer, SecurityClass::S2AccessControl, &[0x55; 16], &[0xAA; 16])
            .unwrap();
        assert!(m.span_state(peer).is_established());

        let nonce = m.next_nonce(peer, false);
        assert_eq!(nonce.len(), EI_SIZE);

        m.delete_nonce(peer);
        assert!(matches!(m.span_state(peer), SPANState::None));
    }

    #[test]
    fn test_not_granted_tracking_is_cleared_on_grant() {
        let mut m = mgr();
        let peer = NodeId::from(2u16);
        assert!(!m.is_class_known_not_granted(peer, SecurityClass::S2Authenticated));
        m.mark_class_not_granted(peer, SecurityClass::S2Authenticated);
        assert!(m.is_class_known_not_granted(peer, SecurityClass::S2Authenticated));
        m.grant_security_class(peer, SecurityClass::S2Authenticated);
        assert!(!m.is_class_known_not_granted(peer, SecurityClass::S2Authenticated));
    }

    #[test]
    fn test_get_keys_requires_granted_class() {
        let m = mgr();
        let peer = NodeId::from(2u16);
        assert!(m.get_keys_for_node(peer).is_err());
        assert!(m.has_keys_for_security_class(SecurityClass::S2AccessControl));
        assert!(!m.has_keys_for_security_class(SecurityClass::S2Unauthenticated));
    }
}
