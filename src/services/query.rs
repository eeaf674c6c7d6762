//! Filter/search/sort engine over one gallery's image collection.
//!
//! A pure function of its explicit inputs: the caller owns whatever state
//! drives it (UI or query string) and re-invokes it on every change. No
//! pagination, no indexing, no memoization; the input slice is never
//! mutated.

use std::collections::HashMap;

use serde::Deserialize;
use utoipa::ToSchema;

use crate::entities::images;
use crate::models::AttributeBag;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct SortSpec {
    /// Attribute name to sort by; it need not be a visible attribute.
    pub attribute: String,
    pub direction: SortDirection,
}

/// One query-engine invocation: free-text search, per-attribute substring
/// filters (AND-ed), and an optional sort.
#[derive(Clone, Debug, Default)]
pub struct QuerySpec {
    pub search: String,
    pub filters: HashMap<String, String>,
    pub sort: Option<SortSpec>,
}

/// Run the three stages — search, filter, sort — over `images` and return a
/// new ordered collection. Sorting is stable: images with equal sort keys
/// keep their relative input order, in both directions.
pub fn query_images(images: &[images::Model], spec: &QuerySpec) -> Vec<images::Model> {
    let search = spec.search.to_lowercase();

    let mut result: Vec<images::Model> = images
        .iter()
        .filter(|image| {
            matches_search(&image.attributes, &search)
                && matches_filters(&image.attributes, &spec.filters)
        })
        .cloned()
        .collect();

    if let Some(sort) = &spec.sort {
        // Decorate with precomputed keys so the comparator stays cheap.
        let mut keyed: Vec<(String, images::Model)> = result
            .into_iter()
            .map(|image| (sort_key(&image.attributes, &sort.attribute), image))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| match sort.direction {
            SortDirection::Asc => a.cmp(b),
            SortDirection::Desc => b.cmp(a),
        });
        result = keyed.into_iter().map(|(_, image)| image).collect();
    }

    result
}

/// Case-insensitive substring match against the space-joined string form of
/// every value in the bag. An empty term matches everything.
fn matches_search(bag: &AttributeBag, lowercased_term: &str) -> bool {
    if lowercased_term.is_empty() {
        return true;
    }
    bag.search_haystack().to_lowercase().contains(lowercased_term)
}

/// Every non-empty filter entry must match (logical AND). A missing
/// attribute compares as the empty string, so it only matches empty filters.
fn matches_filters(bag: &AttributeBag, filters: &HashMap<String, String>) -> bool {
    filters.iter().all(|(name, wanted)| {
        if wanted.is_empty() {
            return true;
        }
        bag.coerced(name).to_lowercase().contains(&wanted.to_lowercase())
    })
}

/// Sort keys compare case-insensitively; values equal under that comparison
/// count as ties and keep input order.
fn sort_key(bag: &AttributeBag, attribute: &str) -> String {
    bag.coerced(attribute).to_lowercase()
}
