//! In-memory code-to-identity bindings.
//!
//! Bindings are volatile: they live only as long as the gate and are never
//! written to the ledger store. The assignment loop is the only writer.

use std::collections::HashMap;

use passgate_core::{Code, Identity};

/// Map from code to the identity bound to it.
#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    entries: HashMap<Code, Identity>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `identity` to `code`, replacing any earlier binding.
    ///
    /// Returns the identity previously bound to the code.
    pub fn assign(&mut self, code: Code, identity: Identity) -> Option<Identity> {
        self.entries.insert(code, identity)
    }

    /// Identity bound to `code`, if any.
    pub fn lookup(&self, code: &Code) -> Option<&Identity> {
        self.entries.get(code)
    }

    /// Drop every binding, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all bindings in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&Code, &Identity)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(first: &str, last: &str) -> Identity {
        Identity::new(first, last).unwrap()
    }

    #[test]
    fn test_assign_and_lookup() {
        let mut map = IdentityMap::new();
        assert!(map.lookup(&Code::from("XYZ")).is_none());

        map.assign(Code::from("XYZ"), identity("Jane", "Doe"));

        assert_eq!(
            map.lookup(&Code::from("XYZ")).map(Identity::display_name),
            Some("Jane Doe".to_string())
        );
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let mut map = IdentityMap::new();
        map.assign(Code::from("XYZ"), identity("Jane", "Doe"));
        let previous = map.assign(Code::from("XYZ"), identity("John", "Roe"));

        assert_eq!(previous, Some(identity("Jane", "Doe")));
        assert_eq!(map.lookup(&Code::from("XYZ")), Some(&identity("John", "Roe")));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_lookup_is_exact() {
        let mut map = IdentityMap::new();
        map.assign(Code::from("XYZ"), identity("Jane", "Doe"));

        assert!(map.lookup(&Code::from("xyz")).is_none());
        assert!(map.lookup(&Code::from("XYZ ")).is_none());
    }

    #[test]
    fn test_clear_is_total_and_idempotent() {
        let mut map = IdentityMap::new();
        map.assign(Code::from("A"), identity("Ann", "Lee"));
        map.assign(Code::from("B"), identity("Bo", "Kim"));

        assert_eq!(map.clear(), 2);
        assert_eq!(map.clear(), 0);
        assert!(map.is_empty());
        assert_eq!(map.iter().count(), 0);
    }
}
