//! Call patterns and their compilation into argument filters.
//!
//! A call pattern is the structured form of "this member called with these
//! arguments", produced either by the builder functions here or by the text
//! parser. The extractor compiles it into an `ArgumentFilters` bound to a
//! `MemberKey`.
//!
//! # Module Structure
//!
//! - `expr` - `PatternExpr` and the `arg` builder functions
//! - `table` - Declared members and enums used to resolve names
//! - `parser` - Text syntax for patterns (`add(IsAny<int>(), 3)`)
//! - `extract` - Pattern to filter-collection compilation

mod expr;
mod extract;
mod parser;
mod table;

pub use expr::{arg, matcher_names, PatternExpr};
pub use extract::{extract, ExtractedPattern};
pub use parser::{parse_pattern, ParseError};
pub use table::{DeclaredMember, MemberTable};
