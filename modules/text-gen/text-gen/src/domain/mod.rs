pub mod prompts;
pub mod service;
pub mod structured;
