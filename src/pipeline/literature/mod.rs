pub mod efetch;
pub mod mesh;
pub mod pubmed;
pub mod types;

pub use mesh::MeshClient;
pub use pubmed::PubMedClient;
pub use types::{LiteratureSource, VocabularyLookup};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Citation database request failed: {0}")]
    Http(String),

    #[error("Citation database returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unreadable citation database response: {0}")]
    Parse(String),
}

#[derive(Error, Debug)]
pub enum VocabularyError {
    #[error("Vocabulary lookup failed: {0}")]
    Http(String),

    #[error("Vocabulary service returned {0}")]
    Status(u16),

    #[error("Unreadable vocabulary response: {0}")]
    Parse(String),
}
