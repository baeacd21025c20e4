//! Argument filters for call matching.
//!
//! Every registered specification carries one filter per formal parameter.
//! A call matches when each positional filter accepts the corresponding
//! actual argument.
//!
//! # Module Structure
//!
//! - `argument` - The closed set of single-argument filters
//! - `collection` - Ordered, arity-checked filter sequences

mod argument;
mod collection;

pub use argument::{ArgumentFilter, CompareOp, PredicateFn, ANY, NOT_NULL, NULL};
pub use collection::ArgumentFilters;
