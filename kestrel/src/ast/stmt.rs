//! Statement nodes

use super::Expression;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    /// `let NAME = EXPR;` binds in the current scope
    Let { name: String, value: Expression },
    /// `NAME = EXPR;` rebinds a name that must already resolve
    Assign { name: String, value: Expression },
    /// `return EXPR;`, or `return;` for Null
    Return(Option<Expression>),
    Expression(Expression),
    Block(BlockStatement),
}

/// `{ STMT* }` body of an if, while or function
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

impl BlockStatement {
    pub fn new(statements: Vec<Statement>) -> Self {
        BlockStatement { statements }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value } => write!(f, "let {name} = {value};"),
            Statement::Assign { name, value } => write!(f, "{name} = {value};"),
            Statement::Return(Some(value)) => write!(f, "return {value};"),
            Statement::Return(None) => f.write_str("return;"),
            Statement::Expression(expr) => write!(f, "{expr};"),
            Statement::Block(block) => write!(f, "{block}"),
        }
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            return f.write_str("{ }");
        }
        f.write_str("{ ")?;
        for stmt in &self.statements {
            write!(f, "{stmt} ")?;
        }
        f.write_str("}")
    }
}
