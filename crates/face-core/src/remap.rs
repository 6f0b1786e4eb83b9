// src/remap.rs
use std::collections::HashMap;

use crate::keyword::FaceRef;

/// Per-surface overrides: face name to replacement reference.
///
/// A replacement may mention the face it replaces; that mention means the
/// face's own, un-remapped definition.
#[derive(Clone, Debug, Default)]
pub struct RemapTable {
    entries: HashMap<String, FaceRef>,
}

impl RemapTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a remapping, returning the one it replaces.
    pub fn set(&mut self, name: &str, replacement: FaceRef) -> Option<FaceRef> {
        tracing::debug!("Remapping face {} to {}", name, replacement.describe());
        self.entries.insert(name.to_string(), replacement)
    }

    pub fn remove(&mut self, name: &str) -> Option<FaceRef> {
        self.entries.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FaceRef> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut table = RemapTable::new();
        assert!(table.is_empty());
        assert_eq!(table.set("default", FaceRef::named("fixed-pitch")), None);
        assert!(table.contains("default"));
        assert_eq!(
            table.set("default", FaceRef::named("variable-pitch")),
            Some(FaceRef::named("fixed-pitch"))
        );
        assert_eq!(table.get("default"), Some(&FaceRef::named("variable-pitch")));
        assert!(table.remove("default").is_some());
        assert!(table.get("default").is_none());
    }
}
