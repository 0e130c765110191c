//! Image handling for multi-modal prompts
//!
//! Stages uploaded images on local disk and optionally shrinks them
//! before they are base64-encoded into a prompt.

pub mod processor;
pub mod store;

pub use processor::resize_image;
pub use store::{ImageUpload, UploadStore};
