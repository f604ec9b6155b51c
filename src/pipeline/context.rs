use std::collections::HashMap;

use uuid::Uuid;

/// Vocabulary lookup outcomes for one run, keyed by cleaned term.
#[derive(Debug, Default)]
pub struct VocabularyCache {
    entries: HashMap<String, bool>,
}

impl VocabularyCache {
    pub fn get(&self, term: &str) -> Option<bool> {
        self.entries.get(term).copied()
    }

    /// Record an outcome. The first writer wins; returns false when the term
    /// was already cached.
    pub fn record(&mut self, term: &str, valid: bool) -> bool {
        if self.entries.contains_key(term) {
            return false;
        }
        self.entries.insert(term.to_string(), valid);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// State scoped to a single analysis run.
#[derive(Debug)]
pub struct RunContext {
    pub run_id: Uuid,
    pub vocabulary: VocabularyCache,
    /// Where the report draft is addressed, when the author gave one.
    pub contact_email: Option<String>,
}

impl RunContext {
    pub fn new(contact_email: Option<&str>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            vocabulary: VocabularyCache::default(),
            contact_email: contact_email.map(str::to_string),
        }
    }
}
