pub mod emotion;
pub mod gateway;
pub mod history;
pub mod mood;
pub mod prompts;
