pub mod builder;
pub mod escalation;
pub mod types;

pub use builder::{clean_term, validate_blocks};
pub use escalation::{compile_query, gather_candidates};
pub use types::{CandidatePool, CompiledQuery, QueryBlock, TermCheck, ValidatedBlock};
