//! Expression AST nodes

use super::{BlockStatement, write_list};
use serde::Serialize;
use std::fmt;

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expression {
    /// Variable reference
    Identifier(String),
    IntegerLiteral(i64),
    StringLiteral(String),
    BooleanLiteral(bool),

    /// Unary operation: `!x`, `-x`
    Prefix {
        op: PrefixOp,
        right: Box<Expression>,
    },

    /// Binary operation
    Infix {
        left: Box<Expression>,
        op: InfixOp,
        right: Box<Expression>,
    },

    /// `if (cond) { ... } else { ... }`
    If {
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },

    /// `while (cond) { ... }`
    While {
        condition: Box<Expression>,
        body: BlockStatement,
    },

    /// `def(a, b) { ... }`
    FunctionLiteral {
        parameters: Vec<String>,
        body: BlockStatement,
    },

    /// `callee(args...)`
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },

    /// `left[index]`
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
    },

    // Container literals
    ArrayLiteral(Vec<Expression>),
    /// `{k: v, ...}`; pairs kept in source order
    HashMapLiteral(Vec<(Expression, Expression)>),
    /// `hashset<>{...}`
    HashSetLiteral(Vec<Expression>),
    /// `stack<>{...}`, last element on top
    StackLiteral(Vec<Expression>),
    /// `queue<>{...}`, first element at the front
    QueueLiteral(Vec<Expression>),
    /// `deque<>{...}`
    DequeLiteral(Vec<Expression>),
    /// `maxheap<int>{...}` / `maxheap<string>{...}`
    MaxHeapLiteral {
        element: HeapElement,
        elements: Vec<Expression>,
    },
    /// `minheap<int>{...}` / `minheap<string>{...}`
    MinHeapLiteral {
        element: HeapElement,
        elements: Vec<Expression>,
    },
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrefixOp {
    /// Truthiness negation (!)
    Not,
    /// Integer negation (-)
    Neg,
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InfixOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
}

/// Element kind a heap literal declares between its angle brackets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HeapElement {
    Int,
    Str,
}

impl HeapElement {
    /// Parse the declared element type name (`int` or `string`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(HeapElement::Int),
            "string" => Some(HeapElement::Str),
            _ => None,
        }
    }
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefixOp::Not => write!(f, "!"),
            PrefixOp::Neg => write!(f, "-"),
        }
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfixOp::Add => write!(f, "+"),
            InfixOp::Sub => write!(f, "-"),
            InfixOp::Mul => write!(f, "*"),
            InfixOp::Div => write!(f, "/"),
            InfixOp::Mod => write!(f, "%"),
            InfixOp::Eq => write!(f, "=="),
            InfixOp::NotEq => write!(f, "!="),
            InfixOp::Lt => write!(f, "<"),
            InfixOp::Gt => write!(f, ">"),
            InfixOp::LtEq => write!(f, "<="),
            InfixOp::GtEq => write!(f, ">="),
        }
    }
}

impl fmt::Display for HeapElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapElement::Int => write!(f, "int"),
            HeapElement::Str => write!(f, "string"),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(name) => f.write_str(name),
            Expression::IntegerLiteral(n) => write!(f, "{n}"),
            Expression::StringLiteral(s) => write!(f, "\"{s}\""),
            Expression::BooleanLiteral(b) => write!(f, "{b}"),
            Expression::Prefix { op, right } => write!(f, "({op}{right})"),
            Expression::Infix { left, op, right } => write!(f, "({left} {op} {right})"),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if {condition} {consequence}")?;
                if let Some(alt) = alternative {
                    write!(f, " else {alt}")?;
                }
                Ok(())
            }
            Expression::While { condition, body } => write!(f, "while {condition} {body}"),
            Expression::FunctionLiteral { parameters, body } => {
                f.write_str("def(")?;
                write_list(f, parameters)?;
                write!(f, ") {body}")
            }
            Expression::Call {
                function,
                arguments,
            } => {
                write!(f, "{function}(")?;
                write_list(f, arguments)?;
                f.write_str(")")
            }
            Expression::Index { left, index } => write!(f, "({left}[{index}])"),
            Expression::ArrayLiteral(elements) => {
                f.write_str("[")?;
                write_list(f, elements)?;
                f.write_str("]")
            }
            Expression::HashMapLiteral(pairs) => {
                f.write_str("{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Expression::HashSetLiteral(elements) => write_container(f, "hashset<>", elements),
            Expression::StackLiteral(elements) => write_container(f, "stack<>", elements),
            Expression::QueueLiteral(elements) => write_container(f, "queue<>", elements),
            Expression::DequeLiteral(elements) => write_container(f, "deque<>", elements),
            Expression::MaxHeapLiteral { element, elements } => {
                write_container(f, &format!("maxheap<{element}>"), elements)
            }
            Expression::MinHeapLiteral { element, elements } => {
                write_container(f, &format!("minheap<{element}>"), elements)
            }
        }
    }
}

fn write_container(f: &mut fmt::Formatter<'_>, opener: &str, elements: &[Expression]) -> fmt::Result {
    write!(f, "{opener}{{")?;
    write_list(f, elements)?;
    f.write_str("}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Statement;

    fn int(n: i64) -> Box<Expression> {
        Box::new(Expression::IntegerLiteral(n))
    }

    #[test]
    fn test_infix_display_is_parenthesized() {
        let expr = Expression::Infix {
            left: int(1),
            op: InfixOp::Add,
            right: Box::new(Expression::Infix {
                left: int(2),
                op: InfixOp::Mul,
                right: int(3),
            }),
        };
        assert_eq!(expr.to_string(), "(1 + (2 * 3))");
    }

    #[test]
    fn test_function_literal_display() {
        let expr = Expression::FunctionLiteral {
            parameters: vec!["x".to_string(), "y".to_string()],
            body: BlockStatement::new(vec![Statement::Expression(Expression::Infix {
                left: Box::new(Expression::Identifier("x".to_string())),
                op: InfixOp::Add,
                right: Box::new(Expression::Identifier("y".to_string())),
            })]),
        };
        assert_eq!(expr.to_string(), "def(x, y) { (x + y); }");
    }

    #[test]
    fn test_container_display() {
        let heap = Expression::MinHeapLiteral {
            element: HeapElement::Str,
            elements: vec![Expression::StringLiteral("b".to_string())],
        };
        assert_eq!(heap.to_string(), "minheap<string>{\"b\"}");
        assert_eq!(Expression::HashSetLiteral(vec![]).to_string(), "hashset<>{}");
    }

    #[test]
    fn test_heap_element_from_name() {
        assert_eq!(HeapElement::from_name("int"), Some(HeapElement::Int));
        assert_eq!(HeapElement::from_name("string"), Some(HeapElement::Str));
        assert_eq!(HeapElement::from_name("float"), None);
    }
}
