//! Dashboard aggregates over normalized collections

use std::collections::HashMap;

use serde::Serialize;

use crate::format::format_byte_size;
use crate::model::{NormalizedDocument, NormalizedLink, SearchLogView};

/// One row of the "most searched" list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryCount {
    pub query: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryStats {
    pub documents: usize,
    pub links: usize,
    pub total_bytes: f64,
    pub total_size: String,
}

/// The first `limit` documents, in server order
pub fn recently_added(documents: &[NormalizedDocument], limit: usize) -> &[NormalizedDocument] {
    &documents[..limit.min(documents.len())]
}

fn searched_queries(logs: &[SearchLogView]) -> impl Iterator<Item = &str> {
    logs.iter().filter_map(|log| log.searched.as_deref())
}

/// Queries by frequency, grouped case-insensitively; ties keep first appearance.
/// The label is the first spelling seen.
pub fn most_searched(logs: &[SearchLogView], limit: usize) -> Vec<QueryCount> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<QueryCount> = Vec::new();

    for query in searched_queries(logs) {
        let key = query.trim().to_lowercase();
        match index.get(&key) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                index.insert(key, counts.len());
                counts.push(QueryCount {
                    query: query.trim().to_string(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// Distinct queries in log order, at most `limit`
pub fn recent_searches(logs: &[SearchLogView], limit: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    searched_queries(logs)
        .filter(|q| seen.insert(q.trim().to_lowercase()))
        .map(|q| q.trim().to_string())
        .take(limit)
        .collect()
}

pub fn library_stats(documents: &[NormalizedDocument], links: &[NormalizedLink]) -> LibraryStats {
    let total_bytes: f64 = documents.iter().filter_map(|d| d.size_bytes).sum();
    LibraryStats {
        documents: documents.len(),
        links: links.len(),
        total_bytes,
        total_size: format_byte_size(Some(total_bytes)),
    }
}
