pub mod config;
pub mod dispatcher;
pub mod generators;
pub mod inputs;
pub mod llm;
pub mod markdown;
pub mod pipeline;
pub mod prompts;
pub mod repair;
pub mod ui;
