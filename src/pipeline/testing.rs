//! Scripted collaborators for pipeline tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::PaperRecord;
use crate::pipeline::literature::{LiteratureSource, SourceError, VocabularyError, VocabularyLookup};
use crate::pipeline::llm::{LlmError, LlmGenerate, LlmRequest};

/// Replays queued responses in order; errors once the script runs out.
#[derive(Default)]
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new(responses: &[&str]) -> Self {
        let llm = Self::default();
        for r in responses {
            llm.push(Ok(r.to_string()));
        }
        llm
    }

    pub fn push(&self, response: Result<String, LlmError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompt(&self, index: usize) -> String {
        self.prompts.lock().unwrap()[index].clone()
    }
}

impl LlmGenerate for ScriptedLlm {
    async fn generate(&self, request: &LlmRequest) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Connection("script exhausted".into())))
    }
}

/// In-memory citation database.
#[derive(Default)]
pub struct FakeSource {
    counts: HashMap<String, u64>,
    searches: HashMap<String, Vec<String>>,
    neighbors: Vec<String>,
    papers: Vec<PaperRecord>,
    search_fails: bool,
    count_calls: AtomicUsize,
    last_seeds: Mutex<Vec<String>>,
    fetched: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn with_count(mut self, query: &str, count: u64) -> Self {
        self.counts.insert(query.to_string(), count);
        self
    }

    pub fn with_search(mut self, query: &str, ids: Vec<String>) -> Self {
        self.searches.insert(query.to_string(), ids);
        self
    }

    pub fn with_neighbors(mut self, ids: Vec<String>) -> Self {
        self.neighbors = ids;
        self
    }

    /// Records served by `fetch_details` when their PMID is requested.
    pub fn with_papers(mut self, papers: Vec<PaperRecord>) -> Self {
        self.papers = papers;
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.search_fails = true;
        self
    }

    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    pub fn last_seeds(&self) -> Vec<String> {
        self.last_seeds.lock().unwrap().clone()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl LiteratureSource for FakeSource {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, SourceError> {
        if self.search_fails {
            return Err(SourceError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        let mut ids = self.searches.get(query).cloned().unwrap_or_default();
        ids.truncate(limit);
        Ok(ids)
    }

    async fn expand_by_network(&self, seeds: &[String], _per_seed_limit: usize) -> Vec<String> {
        *self.last_seeds.lock().unwrap() = seeds.to_vec();
        self.neighbors
            .iter()
            .filter(|id| !seeds.contains(id))
            .cloned()
            .collect()
    }

    async fn fetch_details(&self, ids: &[String]) -> Result<Vec<PaperRecord>, SourceError> {
        self.fetched.lock().unwrap().extend(ids.iter().cloned());
        Ok(ids
            .iter()
            .filter_map(|id| self.papers.iter().find(|p| &p.pmid == id).cloned())
            .collect())
    }

    async fn count(&self, query: &str) -> u64 {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        self.counts.get(query).copied().unwrap_or(0)
    }
}

/// Vocabulary that knows a fixed set of descriptors, or always fails.
pub struct FakeVocabulary {
    valid: Vec<String>,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeVocabulary {
    pub fn with_valid(terms: &[&str]) -> Self {
        Self {
            valid: terms.iter().map(|t| t.to_string()).collect(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            valid: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl VocabularyLookup for FakeVocabulary {
    async fn is_descriptor(&self, term: &str) -> Result<bool, VocabularyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(VocabularyError::Status(503));
        }
        Ok(self.valid.iter().any(|v| v == term))
    }
}
