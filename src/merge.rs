//! Result Merger - documents and links from one query as a single list

use serde::{Deserialize, Serialize};

use crate::model::{NormalizedDocument, NormalizedLink, ResultKind, SearchResultItem};

/// Unified, kind-tagged results of one search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub items: Vec<SearchResultItem>,
}

impl SearchResults {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count_of(&self, kind: ResultKind) -> usize {
        self.items.iter().filter(|item| item.kind() == kind).count()
    }

    /// `Found 3 results for "roadmap"`
    pub fn summary(&self) -> String {
        let noun = if self.len() == 1 { "result" } else { "results" };
        format!("Found {} {} for \"{}\"", self.len(), noun, self.query)
    }
}

/// Documents first, then links; order within each kind is kept as given
pub fn merge_results(
    query: &str,
    documents: &[NormalizedDocument],
    links: &[NormalizedLink],
) -> SearchResults {
    let mut items = Vec::with_capacity(documents.len() + links.len());
    items.extend(documents.iter().map(SearchResultItem::from));
    items.extend(links.iter().map(SearchResultItem::from));

    SearchResults {
        query: query.to_string(),
        items,
    }
}
