//! Authoritative drinking-water source retrieval.
//!
//! Given a free-text location and a question, [`fetch_authoritative`] finds,
//! fetches and ranks up to six trusted public documents (utility reports,
//! state and federal notices) about local tap water.

pub mod config;
pub mod dates;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod location;
pub mod parsers;
pub mod ranking;
pub mod results;
pub mod retrieval;
pub mod search;
pub mod seeds;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::RetrievalConfig;
pub use results::{ContentType, RetrievedDocument, Tier};
pub use retrieval::{Retriever, fetch_authoritative};
