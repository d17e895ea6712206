// Core flight-search functionality:
// - API client for Gemini (chat + function calling)
// - Request/response data structures
// - Short-form date normalization
// - Search parameters, outcomes, and the result file
// - Configuration loading
// - Shared error types

// Export client module - API client for Gemini
pub mod client;
pub use client::*;

// Export types module - Request/response data structures
pub mod types;
pub use types::*;

// Export config module - Configuration loading
pub mod config;
pub use config::*;

// Export errors module - Shared error types
pub mod errors;
pub use errors::*;

// Export dates module - MM/DD normalization
pub mod dates;

// Export search module - Search parameters and the browsing agent seam
pub mod search;
pub use search::*;

// Export prompts module - Task, policy, and analysis prompt builders
pub mod prompts;

// Export report module - Result-file records
pub mod report;
pub use report::*;
