pub mod fixer;
pub mod name_normalizer;
pub mod prune;
pub mod result;

pub use fixer::{FixOptions, Fixer};
pub use name_normalizer::{GenericNaming, GenericNamingStrategy};
pub use result::{AppliedFix, FixKind, FixResult};
