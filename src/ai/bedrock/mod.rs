pub mod client;
pub mod embedding;
pub mod invoke;
pub mod types;

pub use client::BedrockHttpClient;
pub use embedding::{TitanEmbeddingClient, TITAN_EMBED_V1_DIMENSIONS};
pub use invoke::BedrockInferenceClient;
