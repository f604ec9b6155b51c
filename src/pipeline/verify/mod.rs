pub mod evidence;
pub mod references;
pub mod scoring;
pub mod types;

pub use evidence::verify_evaluations;
pub use references::{rewrite_references, RewrittenText};
pub use scoring::{verdict_for_level, NoveltyVerdict};
pub use types::{PaperEvaluation, VerificationNote, VerificationOutcome, VerifiedCitation};
