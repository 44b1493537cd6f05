pub mod client;
pub mod prompts;
pub mod summarizer;
pub mod validation;

pub use client::*;
pub use prompts::*;
pub use summarizer::*;
pub use validation::*;
