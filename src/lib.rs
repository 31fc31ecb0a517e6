//! Smart LLM routing service
//!
//! Routes chat completions across a tiered model catalog with scored
//! selection, response caching and a cost-ordered fallback chain, exposed
//! over a small HTTP API.

#![deny(missing_docs)]

pub mod api;
pub mod config;
pub mod llm;
pub mod router;
