// Roadmap core: model, diagram and timeline builders, AI extraction, and resolution.
// All completion calls go through llm_client; nothing here talks HTTP upstream.

pub mod diagram;
pub mod extractor;
pub mod handlers;
pub mod library;
pub mod models;
pub mod prompts;
pub mod service;
pub mod timeline;
