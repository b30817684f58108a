//! Versioned entity records and their identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Canonical identifier of one entity.
///
/// Identifiers are UUIDs; the string form is the canonical hyphenated
/// lowercase rendering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Parses an identifier from its canonical string form.
    ///
    /// # Errors
    ///
    /// Returns the underlying parse error if `s` is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    /// Generates a fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for EntityId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Category of an entity record.
///
/// Every record in the store belongs to exactly one category; count
/// summaries are tallied per category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A concept record.
    Concept,
    /// A semantic record attached to a concept.
    Semantic,
    /// A pattern record describing semantic structure.
    Pattern,
    /// A stamp record carrying version metadata.
    Stamp,
}

impl EntityKind {
    /// All kinds, in tally order.
    pub const ALL: [Self; 4] = [Self::Concept, Self::Semantic, Self::Pattern, Self::Stamp];

    /// Returns the lowercase name used in artifacts and store rows.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Concept => "concept",
            Self::Semantic => "semantic",
            Self::Pattern => "pattern",
            Self::Stamp => "stamp",
        }
    }

    /// Parses a kind from its lowercase name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "concept" => Some(Self::Concept),
            "semantic" => Some(Self::Semantic),
            "pattern" => Some(Self::Pattern),
            "stamp" => Some(Self::Stamp),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One versioned record unit stored in and migrated by the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Canonical identifier.
    pub id: EntityId,
    /// Record category.
    pub kind: EntityKind,
    /// Version stamp, epoch milliseconds. Temporal export windows are
    /// evaluated against this value.
    pub stamp_ms: i64,
    /// Opaque record content. The store never inspects it.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Entity {
    /// Creates a new entity record.
    #[must_use]
    pub const fn new(
        id: EntityId,
        kind: EntityKind,
        stamp_ms: i64,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id,
            kind,
            stamp_ms,
            payload,
        }
    }

    /// Returns the version stamp as a UTC datetime, for log output.
    ///
    /// Stamps outside the representable range collapse to the Unix
    /// epoch.
    #[must_use]
    pub fn stamp_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.stamp_ms).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_id_parse_roundtrip() {
        let id = EntityId::random();
        let parsed = EntityId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_entity_id_parse_rejects_garbage() {
        assert!(EntityId::parse("not-a-uuid").is_err());
        assert!(EntityId::parse("").is_err());
    }

    #[test]
    fn test_kind_parse() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(EntityKind::parse("unknown"), None);
        assert_eq!(EntityKind::parse("Concept"), None);
    }

    #[test]
    fn test_entity_serde_roundtrip() {
        let entity = Entity::new(
            EntityId::random(),
            EntityKind::Semantic,
            1_700_000_000_000,
            json!({"description": "membership"}),
        );
        let encoded = serde_json::to_string(&entity).unwrap();
        let decoded: Entity = serde_json::from_str(&encoded).unwrap();
        assert_eq!(entity, decoded);
    }

    #[test]
    fn test_stamp_utc() {
        let entity = Entity::new(EntityId::random(), EntityKind::Stamp, 0, json!(null));
        assert_eq!(entity.stamp_utc(), DateTime::UNIX_EPOCH);
    }
}
