//! Device identity used as the registry key.
//!
//! [`DeviceId`] is a newtype wrapper around the opaque string identity a
//! client declares during identification. Room names share this namespace:
//! sending to a room and sending to a device are the same lookup.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity under which a device's channels are filed in the registry.
///
/// Usually a device UUID, but web clients may identify with free-form
/// strings, so the inner value is kept opaque. Only the action ledger
/// cares whether the identity parses as a UUID (see
/// [`DeviceId::as_uuid`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a `DeviceId` from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Attempts to interpret the identity as a UUID.
    ///
    /// Returns `None` for non-UUID identities (e.g. web clients); such
    /// devices receive commands but are not recorded in the ledger.
    #[must_use]
    pub fn as_uuid(&self) -> Option<uuid::Uuid> {
        self.0.parse().ok()
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn uuid_identity_parses() {
        let uuid = uuid::Uuid::new_v4();
        let id = DeviceId::new(uuid.to_string());
        assert_eq!(id.as_uuid(), Some(uuid));
    }

    #[test]
    fn free_form_identity_has_no_uuid() {
        let id = DeviceId::from("kiosk-web-client");
        assert_eq!(id.as_uuid(), None);
        assert_eq!(id.as_str(), "kiosk-web-client");
    }

    #[test]
    fn hash_works_in_hashmap() {
        use std::collections::HashMap;
        let id = DeviceId::from("d1");
        let mut map = HashMap::new();
        map.insert(id.clone(), "entry");
        assert_eq!(map.get(&id), Some(&"entry"));
    }

    #[test]
    fn serde_is_transparent() {
        let id = DeviceId::from("d1");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"d1\""));
    }
}
