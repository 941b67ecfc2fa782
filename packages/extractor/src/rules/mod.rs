//! The FieldSpec table: which parts of a document feed which field.
//!
//! Rules are written declaratively as [`RuleSpec`]s, either in code (the
//! built-in NewsML table) or in a YAML rules file, and compiled once into a
//! [`FieldSpecTable`]. Compilation validates every rule so that resolving a
//! document never encounters a malformed one.

mod config;
mod path;
mod rule;
mod table;
mod types;

pub use config::create_newsml_table;
pub use path::{Axis, AttributePredicate, LookupPath, PathSyntaxError, Step};
pub use rule::LookupRule;
pub use table::{FieldSpec, FieldSpecTable};
pub use types::{Collect, RuleSpec, TableSpec};
