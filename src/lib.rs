//! Client library for prompting managed Bedrock models
//!
//! Builds provider-specific request bodies from text and image parts,
//! invokes models over the Bedrock runtime API, and attaches a lazily
//! created guardrail policy to calls that must be filtered.

pub mod ai;
pub mod app;
pub mod error;
pub mod guardrail;
pub mod image;
pub mod models;
pub mod prompts;

pub use error::{Error, Result};
