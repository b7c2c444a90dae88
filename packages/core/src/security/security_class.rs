use super::crypto::{derive_network_keys, derive_temp_keys};
use super::manager::NETWORK_KEY_SIZE;
use enum_iterator::Sequence;

/// The security class a node/controller pair can be granted. Ordered from
/// weakest to strongest; `securityClassOrder` in spec.md §3 is simply the
/// derive order of this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Sequence)]
pub enum SecurityClass {
    None,
    S0Legacy,
    S2Unauthenticated,
    S2Authenticated,
    S2AccessControl,
    /// Only valid while a node is being included; never a "granted" class.
    Temporary,
}

impl SecurityClass {
    /// True for the three singlecast S2 security classes.
    pub fn is_s2(&self) -> bool {
        matches!(
            self,
            SecurityClass::S2Unauthenticated
                | SecurityClass::S2Authenticated
                | SecurityClass::S2AccessControl
        )
    }

    /// The S2 security classes in ascending order, as used by the interview
    /// driver (C7) and the LocalEI trial-decrypt loop (C5).
    pub fn s2_classes_ascending() -> [SecurityClass; 3] {
        [
            SecurityClass::S2Unauthenticated,
            SecurityClass::S2Authenticated,
            SecurityClass::S2AccessControl,
        ]
    }

    /// The S2 security classes in descending order of strength, used
    /// whenever "highest known class" is needed.
    pub fn s2_classes_descending() -> [SecurityClass; 3] {
        [
            SecurityClass::S2AccessControl,
            SecurityClass::S2Authenticated,
            SecurityClass::S2Unauthenticated,
        ]
    }
}

/// The network key material for a single security class, derived from a
/// 16-byte permanent network key (PNK) per spec.md §3.
#[derive(Clone)]
pub struct NetworkKeySet {
    pnk: Vec<u8>,
    key_ccm: Vec<u8>,
    key_mpan: Vec<u8>,
    personalization_string: Vec<u8>,
}

impl NetworkKeySet {
    pub fn new(pnk: Vec<u8>) -> Self {
        if pnk.len() != NETWORK_KEY_SIZE {
            panic!("A permanent network key must be 16 bytes long!");
        }
        let derived = derive_network_keys(&pnk);
        Self {
            pnk,
            key_ccm: derived.key_ccm,
            key_mpan: derived.key_mpan,
            personalization_string: derived.personalization_string,
        }
    }

    pub fn pnk(&self) -> &[u8] {
        &self.pnk
    }

    pub fn key_ccm(&self) -> &[u8] {
        &self.key_ccm
    }

    pub fn key_mpan(&self) -> &[u8] {
        &self.key_mpan
    }

    pub fn personalization_string(&self) -> &[u8] {
        &self.personalization_string
    }
}

/// The temporary key set derived from the ECDH shared secret during KEX
/// bootstrap (spec.md §3 "Temporary SPAN").
#[derive(Clone)]
pub struct TempKeys {
    key_ccm: Vec<u8>,
    personalization_string: Vec<u8>,
}

impl TempKeys {
    pub fn from_prk(prk: &[u8]) -> Self {
        let derived = derive_temp_keys(prk);
        Self {
            key_ccm: derived.temp_key_ccm,
            personalization_string: derived.temp_personalization_string,
        }
    }

    pub fn key_ccm(&self) -> &[u8] {
        &self.key_ccm
    }

    pub fn personalization_string(&self) -> &[u8] {
        &self.personalization_string
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_security_class_order() {
        assert!(SecurityClass::S2Unauthenticated < SecurityClass::S2Authenticated);
        assert!(SecurityClass::S2Authenticated < SecurityClass::S2AccessControl);
        assert!(SecurityClass::S0Legacy < SecurityClass::S2Unauthenticated);
    }

    #[test]
    fn test_s2_predicate() {
        assert!(SecurityClass::S2Authenticated.is_s2());
        assert!(!SecurityClass::S0Legacy.is_s2());
        assert!(!SecurityClass::Temporary.is_s2());
        assert!(!SecurityClass::None.is_s2());
    }
}
