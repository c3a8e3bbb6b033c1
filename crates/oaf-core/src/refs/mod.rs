//! The reference graph: pointer conventions, collection, reachability and
//! rewriting.

pub mod collector;
pub mod pointer;
pub mod reachability;
pub mod rewriter;
pub mod untyped;

pub use collector::{CollectScope, RefCollector, ReferenceIndex};
pub use pointer::ComponentKind;
pub use reachability::reachable_schemas;
pub use rewriter::{GraphRewriter, RenameMap, RewrittenRef, rewrite_document};
