//! System prompts for the content specialists
//!
//! Each specialist has a system prompt that defines its role and output
//! format.

mod artist;
mod prompt_generator;
mod researcher;
mod writer;

pub use artist::ARTIST_PROMPT;
pub use prompt_generator::PROMPT_GENERATOR_PROMPT;
pub use researcher::RESEARCHER_PROMPT;
pub use writer::WRITER_PROMPT;
