//! Registry for operations.

use crate::descriptor::Descriptor;
use crate::operation::Operation;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

/// Registry of available operations.
///
/// Built once at startup and shared read-only afterwards (wrap it in an
/// `Arc`). Mutation needs `&mut self`, so concurrent readers never observe a
/// half-applied write. Iteration follows registration order.
#[derive(Clone, Default)]
pub struct Registry {
    /// Operations indexed by ID, in registration order.
    operations: IndexMap<String, Arc<Operation>>,
}

/// Aggregate counts over the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total: usize,
    /// Number of distinct categories.
    pub categories: usize,
    /// Operation count per category, in first-seen order.
    pub by_category: IndexMap<String, usize>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation, replacing any existing one with the same ID.
    ///
    /// A replaced operation keeps its original position in iteration order.
    pub fn register(&mut self, operation: Operation) {
        let id = operation.id().to_string();
        if self
            .operations
            .insert(id.clone(), Arc::new(operation))
            .is_some()
        {
            tracing::debug!(operation = %id, "replaced existing operation");
        } else {
            tracing::debug!(operation = %id, "registered operation");
        }
    }

    /// Get an operation by ID.
    pub fn get(&self, id: &str) -> Option<Arc<Operation>> {
        self.operations.get(id).cloned()
    }

    /// Get an operation's descriptor by ID.
    pub fn get_descriptor(&self, id: &str) -> Option<&Descriptor> {
        self.operations.get(id).map(|op| op.descriptor())
    }

    pub fn exists(&self, id: &str) -> bool {
        self.operations.contains_key(id)
    }

    /// Remove an operation. Returns whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        self.operations.shift_remove(id).is_some()
    }

    /// Remove every operation.
    pub fn clear(&mut self) {
        self.operations.clear();
    }

    /// Iterate over all operations in registration order.
    pub fn all(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values().map(AsRef::as_ref)
    }

    /// Iterate over all descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> {
        self.all().map(Operation::descriptor)
    }

    /// Operations in `category`, in registration order.
    ///
    /// Unknown categories yield an empty list.
    pub fn by_category(&self, category: &str) -> Vec<&Operation> {
        self.all().filter(|op| op.category() == category).collect()
    }

    /// Case-insensitive substring search over name, description and tags.
    ///
    /// An operation matches if any one field matches. Results keep
    /// registration order; there is no ranking.
    pub fn search(&self, query: &str) -> Vec<&Operation> {
        let needle = query.to_lowercase();
        self.all()
            .filter(|op| op.descriptor().matches_lowercase(&needle))
            .collect()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for op in self.all() {
            if !seen.contains(&op.category()) {
                seen.push(op.category());
            }
        }
        seen
    }

    /// Totals per category.
    pub fn stats(&self) -> RegistryStats {
        let mut by_category: IndexMap<String, usize> = IndexMap::new();
        for op in self.all() {
            *by_category.entry(op.category().to_string()).or_default() += 1;
        }
        RegistryStats {
            total: self.operations.len(),
            categories: by_category.len(),
            by_category,
        }
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::InputKind;
    use crate::envelope::ConversionRequest;
    use std::collections::HashSet;

    fn op(id: &str, name: &str, category: &str, tags: &[&str]) -> Operation {
        Operation::text(
            Descriptor::new(id, name, category)
                .description(format!("{name} operation"))
                .tags(tags.iter().copied()),
            |s, _| Ok(s.to_string()),
        )
    }

    fn make_test_registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(op("base64-encode", "Base64 Encode", "text-encoding", &["base64", "encode"]));
        registry.register(op("hash-md5", "MD5 Hash", "cryptography", &["hash", "md5"]));
        registry.register(op("base64-decode", "Base64 Decode", "text-encoding", &["base64", "decode"]));
        registry.register(op("hash-sha256", "SHA256 Hash", "cryptography", &["hash", "sha256"]));
        registry.register(Operation::new(
            Descriptor::new("uuid-generate", "UUID Generator", "generators")
                .input_kind(InputKind::Generator)
                .tags(["uuid", "unique"]),
            |_, _| Ok("00000000-0000-4000-8000-000000000000".into()),
        ));
        registry
    }

    fn ids<'a>(ops: impl IntoIterator<Item = &'a Operation>) -> Vec<&'a str> {
        ops.into_iter().map(Operation::id).collect()
    }

    #[test]
    fn test_get() {
        let registry = make_test_registry();

        assert!(registry.get("hash-md5").is_some());
        assert!(registry.get("does-not-exist").is_none());
        assert!(registry.get_descriptor("nope").is_none());
        assert!(registry.exists("uuid-generate"));
    }

    #[test]
    fn test_all_keeps_registration_order() {
        let registry = make_test_registry();
        assert_eq!(
            ids(registry.all()),
            vec!["base64-encode", "hash-md5", "base64-decode", "hash-sha256", "uuid-generate"]
        );
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = make_test_registry();
        registry.register(op("hash-md5", "MD5 Digest", "cryptography", &[]));

        assert_eq!(registry.len(), 5);
        assert_eq!(registry.get("hash-md5").unwrap().descriptor().name, "MD5 Digest");
        assert_eq!(ids(registry.all())[1], "hash-md5");
    }

    #[test]
    fn test_by_category() {
        let registry = make_test_registry();

        assert_eq!(
            ids(registry.by_category("text-encoding")),
            vec!["base64-encode", "base64-decode"]
        );
        assert!(registry.by_category("unknown").is_empty());
    }

    #[test]
    fn test_categories_partition_all() {
        let registry = make_test_registry();
        let categories = registry.categories();
        assert_eq!(categories, vec!["text-encoding", "cryptography", "generators"]);

        let mut union = HashSet::new();
        for category in &categories {
            for op in registry.by_category(category) {
                assert_eq!(op.category(), *category);
                union.insert(op.id());
            }
        }
        let all: HashSet<_> = registry.all().map(Operation::id).collect();
        assert_eq!(union, all);
    }

    #[test]
    fn test_search_case_insensitive() {
        let registry = make_test_registry();

        let upper = ids(registry.search("BASE64"));
        let lower = ids(registry.search("base64"));
        assert_eq!(upper, lower);
        assert_eq!(lower, vec!["base64-encode", "base64-decode"]);
    }

    #[test]
    fn test_search_fields() {
        let registry = make_test_registry();

        // tag only
        assert_eq!(ids(registry.search("unique")), vec!["uuid-generate"]);
        // description only
        assert_eq!(ids(registry.search("digest operation")), Vec::<&str>::new());
        assert_eq!(ids(registry.search("hash operation")), vec!["hash-md5", "hash-sha256"]);
        assert!(registry.search("zzz").is_empty());
    }

    #[test]
    fn test_stats() {
        let mut registry = Registry::new();
        registry.register(op("a", "A", "one", &[]));
        registry.register(op("b", "B", "two", &[]));
        registry.register(op("c", "C", "one", &[]));

        let stats = registry.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.categories, 2);
        assert_eq!(stats.by_category.get("one"), Some(&2));
        assert_eq!(stats.by_category.get("two"), Some(&1));
        assert_eq!(stats.by_category.values().sum::<usize>(), 3);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut registry = make_test_registry();

        assert!(registry.remove("hash-md5"));
        assert!(!registry.remove("hash-md5"));
        assert_eq!(
            ids(registry.all()),
            vec!["base64-encode", "base64-decode", "hash-sha256", "uuid-generate"]
        );

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.get("base64-encode").is_none());
    }

    #[test]
    fn test_registered_operations_process() {
        let registry = make_test_registry();

        for op in registry.all() {
            let resp = op.process(&ConversionRequest::new(op.id()).input(""));
            if op.descriptor().is_generator() {
                assert!(resp.success, "{} should not need input", op.id());
            } else {
                assert!(!resp.success, "{} accepted empty input", op.id());
            }
        }
    }

    #[test]
    fn test_shared_across_threads() {
        let registry = Arc::new(make_test_registry());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let op = registry.get("base64-encode").unwrap();
                    op.process(&ConversionRequest::new("base64-encode").input("x"))
                        .success
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
