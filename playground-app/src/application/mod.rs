mod insights;
mod product_thinking;

pub use insights::{extract_key_themes, validate_output_structure, REQUIRED_SECTIONS};
pub use product_thinking::ProductThinking;
