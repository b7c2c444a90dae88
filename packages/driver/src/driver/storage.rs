use crate::BackgroundLogger;
use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use zwave_core::{cache::CacheValue, prelude::*, security::SecurityManager2, value_id::EndpointValueId};

/// Internal storage for the driver instance and shared API instances.
/// Since the driver is meant be used from external (application) code,
/// in several locations at once, often simultaneously, we need to use
/// interior mutability to allow for concurrent access without requiring
/// a mutable reference.
pub(crate) struct DriverStorage {
    // The shared logger used by all specific logger instances
    logger: Arc<BackgroundLogger>,

    value_cache: RwLock<HashMap<EndpointValueId, CacheValue>>,
    own_node_id: RwLock<NodeId>,
    node_id_type: RwLock<NodeIdType>,
    sdk_version: RwLock<Option<Version>>,

    // Shared behind its own lock (rather than the driver-wide `RwLock` each
    // other field gets) because CC encoding/parsing contexts need to keep
    // mutating SPAN/sequence-number state across calls, not just read a
    // snapshot - see `SecurityManager2`'s doc comment.
    security_manager2: RwLock<Option<Arc<RwLock<SecurityManager2>>>>,
}

impl DriverStorage {
    pub fn new(logger: Arc<BackgroundLogger>, node_id_type: NodeIdType) -> Self {
        Self {
            logger,
            value_cache: RwLock::new(HashMap::new()),
            own_node_id: RwLock::new(NodeId::unspecified()),
            node_id_type: RwLock::new(node_id_type),
            sdk_version: RwLock::new(None),
            security_manager2: RwLock::new(None),
        }
    }

    pub fn value_cache(&self) -> RwLockReadGuard<HashMap<EndpointValueId, CacheValue>> {
        self.value_cache.read().unwrap()
    }

    pub fn value_cache_mut(&self) -> RwLockWriteGuard<HashMap<EndpointValueId, CacheValue>> {
        self.value_cache.write().unwrap()
    }

    pub fn logger(&self) -> &Arc<BackgroundLogger> {
        &self.logger
    }

    pub fn own_node_id(&self) -> NodeId {
        *self.own_node_id.read().unwrap()
    }

    pub fn set_own_node_id(&self, own_node_id: NodeId) {
        *self.own_node_id.write().unwrap() = own_node_id;
    }

    pub fn node_id_type(&self) -> NodeIdType {
        *self.node_id_type.read().unwrap()
    }

    pub fn set_node_id_type(&self, node_id_type: NodeIdType) {
        *self.node_id_type.write().unwrap() = node_id_type;
    }

    pub fn sdk_version(&self) -> Option<Version> {
        *self.sdk_version.read().unwrap()
    }

    pub fn set_sdk_version(&self, version: Version) {
        *self.sdk_version.write().unwrap() = Some(version);
    }

    pub fn security_manager2(&self) -> Option<Arc<RwLock<SecurityManager2>>> {
        self.security_manager2.read().unwrap().clone()
    }

    pub fn set_security_manager2(&self, security_manager2: Option<Arc<RwLock<SecurityManager2>>>) {
        *self.security_manager2.write().unwrap() = security_manager2;
    }
}
