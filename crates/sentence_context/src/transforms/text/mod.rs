pub mod ops;

pub use ops::{EncodeIds, Lowercase, Tokenize, WhitespaceTokenize};
