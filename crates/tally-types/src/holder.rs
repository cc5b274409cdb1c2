use serde::{Deserialize, Serialize};

/// Ledger-internal sub-partition used when callers do not specify one.
pub const DEFAULT_KEY: &str = "1";

/// An accountable entity+resource+key triple.
///
/// `entity` identifies who owns the quota (a user or a service), `resource`
/// names what is being accounted (e.g. `pithos.diskspace`), and `key` is a
/// ledger-internal sub-partition of the holding.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Holder {
    pub entity: String,
    pub resource: String,
    pub key: String,
}

impl Holder {
    pub fn new(
        entity: impl Into<String>,
        resource: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            resource: resource.into(),
            key: key.into(),
        }
    }

    /// Construct a holder under the default key partition.
    pub fn with_default_key(entity: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::new(entity, resource, DEFAULT_KEY)
    }
}

impl std::fmt::Display for Holder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.entity, self.resource, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_key_is_one() {
        let h = Holder::with_default_key("alice", "cyclades.vm");
        assert_eq!(h.key, "1");
    }

    #[test]
    fn ordering_is_lexicographic() {
        let a = Holder::with_default_key("alice", "disk");
        let b = Holder::with_default_key("bob", "disk");
        assert!(a < b);
    }

    #[test]
    fn display_joins_fields() {
        let h = Holder::new("svc", "ram", "2");
        assert_eq!(h.to_string(), "svc/ram/2");
    }

    #[test]
    fn serde_round_trip() {
        let h = Holder::with_default_key("alice", "disk");
        let json = serde_json::to_string(&h).unwrap();
        let back: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
