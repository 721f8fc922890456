//! # Device registration boundary.
//!
//! Identity issuance is an external collaborator; the supervisor only needs
//! a stable device identifier from the store. Startup is fatal without one
//! unless unregistered operation is explicitly allowed, in which case the
//! sentinel identity is persisted and identity-dependent processes are
//! excluded from the desired set.

use tracing::warn;

use crate::error::ManagerError;
use crate::store::ParamStore;

/// Sentinel identity for devices running without registration.
pub const UNREGISTERED_DONGLE_ID: &str = "UnregisteredDevice";

/// Returns the device identity, or fails fatally.
///
/// The stored `DongleId` wins when present. Otherwise, with
/// `allow_unregistered`, the sentinel is persisted and returned; without it,
/// startup aborts with [`ManagerError::Registration`].
pub fn register(store: &dyn ParamStore, allow_unregistered: bool) -> Result<String, ManagerError> {
    if let Some(id) = store.get("DongleId").filter(|id| !id.is_empty()) {
        return Ok(id);
    }

    if allow_unregistered {
        warn!("no device identity, continuing unregistered");
        store.put("DongleId", UNREGISTERED_DONGLE_ID);
        return Ok(UNREGISTERED_DONGLE_ID.to_string());
    }

    Err(ManagerError::Registration {
        serial: store.get("HardwareSerial"),
    })
}

/// Whether this device holds a real (non-sentinel) identity.
pub fn is_registered(store: &dyn ParamStore) -> bool {
    store
        .get("DongleId")
        .is_some_and(|id| !id.is_empty() && id != UNREGISTERED_DONGLE_ID)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemParams;

    #[test]
    fn existing_identity_is_returned() {
        let store = MemParams::new();
        store.put("DongleId", "1234567890abcdef");
        assert_eq!(register(&store, false).unwrap(), "1234567890abcdef");
        assert!(is_registered(&store));
    }

    #[test]
    fn missing_identity_is_fatal_by_default() {
        let store = MemParams::new();
        store.put("HardwareSerial", "serial-42");
        let err = register(&store, false).unwrap_err();
        assert_eq!(err.as_label(), "manager_registration_failed");
    }

    #[test]
    fn unregistered_fallback_persists_sentinel() {
        let store = MemParams::new();
        assert_eq!(register(&store, true).unwrap(), UNREGISTERED_DONGLE_ID);
        assert_eq!(store.get("DongleId").as_deref(), Some(UNREGISTERED_DONGLE_ID));
        assert!(!is_registered(&store));
    }
}
