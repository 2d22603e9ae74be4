//! Common types and traits for all aggregates

pub mod aggregate_id;
pub mod aggregate_root;
pub mod base_aggregate;
pub mod entity_metadata;

// Re-exports
pub use aggregate_id::AggregateId;
pub use aggregate_root::AggregateRoot;
pub use base_aggregate::BaseAggregate;
pub use entity_metadata::EntityMetadata;

use uuid::Uuid;

/// Parse a stored identifier into a typed aggregate id
pub fn parse_id<Id: AggregateId>(s: &str) -> Result<Id, String> {
    Id::from_string(s.trim())
}

/// Declares a UUID-backed identifier newtype for an aggregate
#[macro_export]
macro_rules! uuid_aggregate_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            pub fn new(value: uuid::Uuid) -> Self {
                Self(value)
            }

            pub fn new_v4() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            pub fn value(&self) -> uuid::Uuid {
                self.0
            }
        }

        impl $crate::domain::common::AggregateId for $name {
            fn from_string(s: &str) -> Result<Self, String> {
                uuid::Uuid::parse_str(s)
                    .map($name::new)
                    .map_err(|e| format!("Invalid UUID: {}", e))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

/// Short human-readable code derived from a UUID ("AGT-1a2b3c4d")
pub fn short_code(prefix: &str, id: Uuid) -> String {
    let simple = id.simple().to_string();
    format!("{}-{}", prefix, &simple[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::uuid_aggregate_id!(SampleId);

    #[test]
    fn test_parse_id_roundtrips_uuid() {
        let id = SampleId::new_v4();
        let parsed: SampleId = parse_id(&format!(" {} ", id)).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_id_rejects_garbage() {
        let parsed: Result<SampleId, _> = parse_id("not-a-uuid");
        assert!(parsed.unwrap_err().starts_with("Invalid UUID"));
    }

    #[test]
    fn test_short_code() {
        let id = Uuid::parse_str("1a2b3c4d-0000-0000-0000-000000000000").unwrap();
        assert_eq!(short_code("AGT", id), "AGT-1a2b3c4d");
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = SampleId(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }
}
