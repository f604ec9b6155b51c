use std::future::Future;

use super::{SourceError, VocabularyError};
use crate::models::PaperRecord;

/// Citation database operations used by the search stage.
///
/// `expand_by_network` and `count` are soft: implementations log failures
/// and return an empty list or zero instead of erroring.
pub trait LiteratureSource: Send + Sync {
    /// Relevance-ordered identifiers for `query`, at most `limit`.
    fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<String>, SourceError>> + Send;

    /// Related-article neighbors of `seeds`, first-seen order, seeds excluded.
    fn expand_by_network(
        &self,
        seeds: &[String],
        per_seed_limit: usize,
    ) -> impl Future<Output = Vec<String>> + Send;

    /// Full records for `ids`; articles that cannot be read are skipped.
    fn fetch_details(
        &self,
        ids: &[String],
    ) -> impl Future<Output = Result<Vec<PaperRecord>, SourceError>> + Send;

    /// Total hit count for `query`, 0 when unknown.
    fn count(&self, query: &str) -> impl Future<Output = u64> + Send;
}

/// Controlled-vocabulary check for candidate index terms.
pub trait VocabularyLookup: Send + Sync {
    /// True when `term` is an exact descriptor label.
    fn is_descriptor(
        &self,
        term: &str,
    ) -> impl Future<Output = Result<bool, VocabularyError>> + Send;
}
