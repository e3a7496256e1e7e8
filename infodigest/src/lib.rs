// Library interface for the infodigest pipeline
// Lets the binary and integration tests share every stage

pub mod dates;
pub mod delivery;
pub mod digest;
pub mod document;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod filter;
pub mod llm;
pub mod models;
pub mod pagination;
pub mod pipeline;
pub mod scheduler;
