pub mod extractor;
pub mod openai;
pub mod security;
