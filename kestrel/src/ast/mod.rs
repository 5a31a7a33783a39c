//! Abstract Syntax Tree definitions
//!
//! Every node owns its children; the tree is built once by the parser and
//! only read afterwards. `Display` renders the canonical source-like string
//! used by `kestrel parse` and by function `inspect()` output.

mod expr;
mod span;
mod stmt;

pub use expr::*;
pub use span::*;
pub use stmt::*;

use serde::Serialize;
use std::fmt;

/// A program is an ordered sequence of top-level statements
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            writeln!(f, "{stmt}")?;
        }
        Ok(())
    }
}

/// Write `items` separated by `", "`
pub(crate) fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
