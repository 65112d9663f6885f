pub mod error;
pub mod gemini;
pub mod llm_config;
pub mod openai;
pub mod provider;
pub mod service;
