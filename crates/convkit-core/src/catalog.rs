//! Discovery projections over the registry.
//!
//! Pure read views for listing, grouping and searching operations. Nothing
//! here adds business logic beyond shaping what the [`Registry`] returns.

use crate::descriptor::{Descriptor, FieldSpec, InputKind, OutputKind};
use crate::registry::{Registry, RegistryStats};
use serde::Serialize;

/// Public summary of one operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub featured: bool,
    pub input_kind: InputKind,
    pub output_kind: OutputKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSpec>,
}

impl From<&Descriptor> for OperationInfo {
    fn from(desc: &Descriptor) -> Self {
        Self {
            id: desc.id.clone(),
            name: desc.name.clone(),
            description: desc.description.clone(),
            category: desc.category.clone(),
            tags: desc.tags.clone(),
            featured: desc.featured,
            input_kind: desc.input_kind,
            output_kind: desc.output_kind,
            fields: desc.fields.clone(),
        }
    }
}

/// Every operation plus registry statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub stats: RegistryStats,
    pub operations: Vec<OperationInfo>,
}

/// Operations of one category with a display label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub id: String,
    pub name: String,
    pub operations: Vec<OperationInfo>,
    pub count: usize,
}

/// Result of a free-text search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub query: String,
    pub result_count: usize,
    pub operations: Vec<OperationInfo>,
}

/// Errors from discovery queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Search query is required")]
    EmptyQuery,
}

/// Display label for a category key.
///
/// `text-encoding` becomes `Text & Encoding`.
pub fn category_label(key: &str) -> String {
    key.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" & ")
}

/// All operations in registration order, with stats.
pub fn listing(registry: &Registry) -> Listing {
    Listing {
        stats: registry.stats(),
        operations: registry.descriptors().map(OperationInfo::from).collect(),
    }
}

/// One operation's summary, or `None` for an unknown ID.
pub fn describe(registry: &Registry, id: &str) -> Option<OperationInfo> {
    registry.get_descriptor(id).map(OperationInfo::from)
}

/// Operations grouped by category, categories in first-seen order.
pub fn category_groups(registry: &Registry) -> Vec<CategoryGroup> {
    registry
        .categories()
        .into_iter()
        .map(|category| {
            let operations: Vec<OperationInfo> = registry
                .by_category(category)
                .into_iter()
                .map(|op| OperationInfo::from(op.descriptor()))
                .collect();
            CategoryGroup {
                id: category.to_string(),
                name: category_label(category),
                count: operations.len(),
                operations,
            }
        })
        .collect()
}

/// Search by trimmed query. A blank query is an error.
pub fn search(registry: &Registry, query: &str) -> Result<SearchResults, CatalogError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CatalogError::EmptyQuery);
    }
    let operations: Vec<OperationInfo> = registry
        .search(query)
        .into_iter()
        .map(|op| OperationInfo::from(op.descriptor()))
        .collect();
    Ok(SearchResults {
        query: query.to_string(),
        result_count: operations.len(),
        operations,
    })
}
