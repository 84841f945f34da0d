mod client;
pub mod prompt;
mod types;

pub use client::OpenAiClient;
pub use types::{ChatCompletionRequest, ChatCompletionResponse, Message};
