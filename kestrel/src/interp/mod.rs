//! Tree-walking interpreter for Kestrel
//!
//! Evaluates parsed programs against a chain of lexically scoped
//! environments and produces runtime objects.

mod builtins;
mod env;
mod error;
mod eval;
mod object;

pub use env::{EnvRef, Environment, child_env};
pub use error::{ErrorKind, InterpResult, RuntimeError};
pub use eval::Interpreter;
pub use object::{Builtin, BuiltinFn, Function, HashKey, Heap, HeapOrder, Object, Shared};
