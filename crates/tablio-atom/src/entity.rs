//! Entities and composite keys

use crate::error::WireError;
use crate::value::PropertyValue;

/// Element name of the partition component; always emitted first
pub const PARTITION_KEY: &str = "PartitionKey";
/// Element name of the row component; always emitted second
pub const ROW_KEY: &str = "RowKey";

/// Composite primary key of an entity
///
/// Key components are always string-typed on the wire; order is
/// significant (partition first, row second).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityKey {
    pub partition_key: String,
    pub row_key: String,
}

impl EntityKey {
    /// Create a key from its two components
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
        }
    }

    /// Build a key from an ordered component list, as handed over by a
    /// generic key-value-store caller
    ///
    /// Any arity other than exactly two is rejected before a request is
    /// ever built.
    pub fn from_components(components: &[String]) -> Result<Self, WireError> {
        match components {
            [partition_key, row_key] => Ok(Self::new(partition_key, row_key)),
            _ => Err(WireError::InvalidKeyArity {
                count: components.len(),
            }),
        }
    }
}

/// Ordered name/value property mapping
///
/// Insertion order is preserved and determines XML child order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    properties: Vec<(String, PropertyValue)>,
}

impl Entity {
    /// Create an empty entity
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing an existing one in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.properties.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.properties.push((name, value));
        }
    }

    /// Builder-style [`insert`](Self::insert)
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up a property by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterate properties in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(n, v)| (n.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl FromIterator<(String, PropertyValue)> for Entity {
    fn from_iter<I: IntoIterator<Item = (String, PropertyValue)>>(iter: I) -> Self {
        let mut entity = Self::new();
        for (name, value) in iter {
            entity.insert(name, value);
        }
        entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_key_arity() {
        assert!(EntityKey::from_components(&components(&[])).is_err());
        assert!(EntityKey::from_components(&components(&["p"])).is_err());
        assert!(EntityKey::from_components(&components(&["p", "r", "x"])).is_err());

        let key = EntityKey::from_components(&components(&["p1", "r1"])).unwrap();
        assert_eq!(key, EntityKey::new("p1", "r1"));
    }

    #[test]
    fn test_key_arity_error_reports_count() {
        let err = EntityKey::from_components(&components(&["a", "b", "c"])).unwrap_err();
        assert!(matches!(err, WireError::InvalidKeyArity { count: 3 }));
    }

    #[test]
    fn test_key_component_order() {
        let key = EntityKey::from_components(&components(&["part", "row"])).unwrap();
        assert_eq!(key.partition_key, "part");
        assert_eq!(key.row_key, "row");
    }

    #[test]
    fn test_entity_preserves_insertion_order() {
        let entity = Entity::new()
            .with("Zeta", 1)
            .with("Alpha", 2)
            .with("Mid", 3);
        let names: Vec<&str> = entity.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_entity_insert_replaces_in_place() {
        let entity = Entity::new().with("A", 1).with("B", 2).with("A", 9);
        assert_eq!(entity.len(), 2);
        assert_eq!(entity.get("A"), Some(&PropertyValue::Int32(9)));
        let names: Vec<&str> = entity.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
