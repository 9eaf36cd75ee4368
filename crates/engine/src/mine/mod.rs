//! Template mining: tokenizer, block matcher, and the template engine.

pub mod blocks;
pub mod template;
pub mod token;

pub use blocks::{match_blocks, Block};
pub use template::Template;
pub use token::{tokenize, Token};
