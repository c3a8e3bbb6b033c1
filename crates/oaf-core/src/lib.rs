pub mod config;
pub mod error;
pub mod parse;
pub mod refs;
pub mod transform;

pub use parse::spec::{Document, Variant};
pub use transform::{FixOptions, FixResult, Fixer};
