//! Runtime errors for the interpreter

use std::fmt;

/// Runtime error during interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Kinds of runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Name unbound in every scope and not a built-in
    IdentifierNotFound,
    /// Infix operands of different types
    TypeMismatch,
    /// Operator not defined for the operand type(s)
    UnknownOperator,
    DivisionByZero,
    /// Callee is neither a function nor a built-in
    NotAFunction,
    /// Argument count differs from parameter count
    ArityMismatch,
    IndexOutOfRange,
    KeyNotPresent,
    /// Left side of `[]` is not indexable
    IndexNotSupported,
    /// Heap element does not match the declared element type
    HeapElementMismatch,
    /// Built-in called with the wrong number of arguments
    WrongArgumentCount,
    /// Built-in called with an argument type it cannot handle
    UnsupportedArgument,
    /// `pop` and friends on an empty container
    EmptyContainer,
    /// `remove` of a key or member that is not present
    MissingMember,
    /// Stack overflow (deep recursion)
    StackOverflow,
}

impl RuntimeError {
    fn new(kind: ErrorKind, message: String) -> Self {
        RuntimeError { kind, message }
    }

    pub fn identifier_not_found(name: &str) -> Self {
        Self::new(
            ErrorKind::IdentifierNotFound,
            format!("identifier not found: {name}"),
        )
    }

    pub fn type_mismatch(left: &str, op: &str, right: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("type mismatch -> {left} {op} {right}"),
        )
    }

    pub fn unknown_prefix_operator(op: &str, operand: &str) -> Self {
        Self::new(
            ErrorKind::UnknownOperator,
            format!("unknown operator for {operand} -> {op}"),
        )
    }

    pub fn unknown_infix_operator(left: &str, op: &str, right: &str) -> Self {
        Self::new(
            ErrorKind::UnknownOperator,
            format!("unknown operator -> {left} {op} {right}"),
        )
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "division by zero".to_string())
    }

    pub fn not_a_function(type_name: &str) -> Self {
        Self::new(
            ErrorKind::NotAFunction,
            format!("not a function -> {type_name}"),
        )
    }

    pub fn arity_mismatch(expected: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!("argument length ({got}) not equal to parameter length ({expected})"),
        )
    }

    pub fn index_out_of_range(index: i64) -> Self {
        Self::new(
            ErrorKind::IndexOutOfRange,
            format!("index {index} out of range"),
        )
    }

    pub fn key_not_present(key: &str) -> Self {
        Self::new(
            ErrorKind::KeyNotPresent,
            format!("key not present -> {key}"),
        )
    }

    pub fn index_not_supported(type_name: &str) -> Self {
        Self::new(
            ErrorKind::IndexNotSupported,
            format!("index operator [] not supported for -> {type_name}"),
        )
    }

    pub fn heap_element_mismatch(expected: &str, got: &str) -> Self {
        Self::new(
            ErrorKind::HeapElementMismatch,
            format!("heap element type mismatch -> expected {expected}, got {got}"),
        )
    }

    pub fn wrong_argument_count(builtin: &str, expected: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::WrongArgumentCount,
            format!("wrong number of arguments to {builtin}: got {got}, want {expected}"),
        )
    }

    pub fn unsupported_argument(builtin: &str, type_name: &str) -> Self {
        Self::new(
            ErrorKind::UnsupportedArgument,
            format!("argument to {builtin} not supported, got {type_name}"),
        )
    }

    pub fn empty_container(builtin: &str, type_name: &str) -> Self {
        Self::new(
            ErrorKind::EmptyContainer,
            format!("{builtin} on empty {type_name}"),
        )
    }

    pub fn missing_member(builtin: &str, key: &str) -> Self {
        Self::new(
            ErrorKind::MissingMember,
            format!("{builtin}: {key} not present"),
        )
    }

    pub fn stack_overflow() -> Self {
        Self::new(
            ErrorKind::StackOverflow,
            "stack overflow: too deep recursion".to_string(),
        )
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RuntimeError {}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_not_found_message() {
        let err = RuntimeError::identifier_not_found("foo");
        assert_eq!(err.kind, ErrorKind::IdentifierNotFound);
        assert_eq!(err.message, "identifier not found: foo");
    }

    #[test]
    fn test_operator_messages() {
        assert_eq!(
            RuntimeError::type_mismatch("INTEGER", "+", "BOOLEAN").message,
            "type mismatch -> INTEGER + BOOLEAN"
        );
        assert_eq!(
            RuntimeError::unknown_prefix_operator("-", "BOOLEAN").message,
            "unknown operator for BOOLEAN -> -"
        );
        assert_eq!(
            RuntimeError::unknown_infix_operator("STRING", "-", "STRING").message,
            "unknown operator -> STRING - STRING"
        );
    }

    #[test]
    fn test_call_messages() {
        assert_eq!(
            RuntimeError::not_a_function("INTEGER").message,
            "not a function -> INTEGER"
        );
        let err = RuntimeError::arity_mismatch(2, 1);
        assert_eq!(err.kind, ErrorKind::ArityMismatch);
        assert_eq!(
            err.message,
            "argument length (1) not equal to parameter length (2)"
        );
    }

    #[test]
    fn test_index_messages() {
        assert_eq!(
            RuntimeError::index_out_of_range(-1).message,
            "index -1 out of range"
        );
        assert_eq!(
            RuntimeError::key_not_present("c").message,
            "key not present -> c"
        );
        assert_eq!(
            RuntimeError::index_not_supported("INTEGER").message,
            "index operator [] not supported for -> INTEGER"
        );
    }

    #[test]
    fn test_builtin_messages() {
        assert_eq!(
            RuntimeError::wrong_argument_count("len", 1, 2).message,
            "wrong number of arguments to len: got 2, want 1"
        );
        assert_eq!(
            RuntimeError::empty_container("pop", "STACK").message,
            "pop on empty STACK"
        );
        let missing = RuntimeError::missing_member("remove", "k");
        assert_eq!(missing.kind, ErrorKind::MissingMember);
        assert_eq!(missing.message, "remove: k not present");
        assert_eq!(
            RuntimeError::empty_container("pop", "STACK").kind,
            ErrorKind::EmptyContainer
        );
    }

    #[test]
    fn test_stack_overflow_message_exact() {
        let err = RuntimeError::stack_overflow();
        assert_eq!(err.kind, ErrorKind::StackOverflow);
        assert_eq!(err.message, "stack overflow: too deep recursion");
    }

    #[test]
    fn test_display_is_message() {
        let err = RuntimeError::division_by_zero();
        assert_eq!(format!("{err}"), "division by zero");
    }

    #[test]
    fn test_error_is_std_error() {
        let err = RuntimeError::division_by_zero();
        let std_err: &dyn std::error::Error = &err;
        assert!(std_err.source().is_none());
    }

    #[test]
    fn test_interp_result_err() {
        let result: InterpResult<i64> = Err(RuntimeError::division_by_zero());
        assert_eq!(result.unwrap_or(0), 0);
    }
}
