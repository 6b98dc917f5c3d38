pub mod core;
pub mod text;

pub use core::{Chain, Transform};
pub use text::{EncodeIds, Lowercase, Tokenize, WhitespaceTokenize};
