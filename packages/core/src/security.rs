pub mod crypto;
pub mod ctr_drbg;
pub mod manager;
pub mod manager2;
pub mod security_class;
pub mod span;

pub use crypto::*;
pub use ctr_drbg::CtrDrbg;
pub use manager::{SecurityManager, SecurityManagerOptions, NetworkKey, S0Nonce, NETWORK_KEY_SIZE, S0_HALF_NONCE_SIZE, S0_NONCE_SIZE};
pub use manager2::{SecurityManager2, SecurityManager2Options, DECRYPT_ATTEMPTS, SPAN_GRACE_PERIOD};
pub use security_class::{NetworkKeySet, SecurityClass, TempKeys};
pub use span::SPANState;
