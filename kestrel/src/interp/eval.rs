//! Tree-walking evaluator

use super::builtins::*;
use super::env::{EnvRef, Environment, child_env};
use super::error::{InterpResult, RuntimeError};
use super::object::{Builtin, BuiltinFn, Function, Heap, HeapOrder, Object};
use crate::ast::{
    BlockStatement, Expression, HeapElement, InfixOp, PrefixOp, Program, Statement,
};
use crate::config::{DEFAULT_MAX_DEPTH, RunConfig};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;

/// Stack growth parameters for deep recursion
const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// The interpreter
pub struct Interpreter {
    /// Global environment
    global_env: EnvRef,
    /// Builtin functions, consulted after the scope chain misses
    builtins: HashMap<&'static str, Builtin>,
    /// Current nesting of user function calls
    depth: usize,
    max_depth: usize,
}

impl Interpreter {
    /// Create a new interpreter
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    pub fn with_config(config: &RunConfig) -> Self {
        Self::with_max_depth(config.max_depth)
    }

    fn with_max_depth(max_depth: usize) -> Self {
        let mut interp = Interpreter {
            global_env: Environment::new().into_ref(),
            builtins: HashMap::new(),
            depth: 0,
            max_depth,
        };
        interp.register_builtins();
        interp
    }

    /// Register built-in functions
    fn register_builtins(&mut self) {
        self.register_builtin("print", builtin_print);
        self.register_builtin("len", builtin_len);
        self.register_builtin("size", builtin_len);
        self.register_builtin("push", builtin_push);
        self.register_builtin("push_back", builtin_push_back);
        self.register_builtin("push_front", builtin_push_front);
        self.register_builtin("pop", builtin_pop);
        self.register_builtin("pop_back", builtin_pop_back);
        self.register_builtin("pop_front", builtin_pop_front);
        self.register_builtin("insert", builtin_insert);
        self.register_builtin("remove", builtin_remove);
        self.register_builtin("find", builtin_find);
        self.register_builtin("type", builtin_type);
    }

    fn register_builtin(&mut self, name: &'static str, func: BuiltinFn) {
        self.builtins.insert(name, Builtin { name, func });
    }

    /// Get the global environment
    pub fn global_env(&self) -> &EnvRef {
        &self.global_env
    }

    /// Drop every global binding
    pub fn reset(&mut self) {
        self.global_env.borrow_mut().clear();
        self.depth = 0;
    }

    /// Run a program in the global environment.
    ///
    /// A top-level `return` ends the program with its payload. Runtime
    /// errors come back as `Err`.
    pub fn run(&mut self, program: &Program) -> InterpResult<Object> {
        let env = Rc::clone(&self.global_env);
        self.run_in(program, &env)
    }

    /// Run a program in `env`, with the same contract as [`Interpreter::run`]
    pub fn run_in(&mut self, program: &Program, env: &EnvRef) -> InterpResult<Object> {
        let mut result = Object::Null;
        for stmt in &program.statements {
            result = self.eval_statement(stmt, env)?;
            if let Object::ReturnValue(value) = result {
                result = *value;
                break;
            }
        }
        tracing::debug!(result = result.type_name(), "program evaluated");
        Ok(result)
    }

    /// Evaluate a program to a single object, errors included.
    ///
    /// A runtime error becomes an [`Object::Error`] rather than an `Err`.
    pub fn eval_program(&mut self, program: &Program) -> Object {
        self.run(program).unwrap_or_else(|err| {
            tracing::debug!(error = %err, "program failed");
            Object::Error(err.message)
        })
    }

    /// Evaluate a statement.
    ///
    /// A `return` surfaces as [`Object::ReturnValue`] so enclosing blocks
    /// stop and the enclosing call can unwrap it.
    pub fn eval_statement(&mut self, stmt: &Statement, env: &EnvRef) -> InterpResult<Object> {
        match stmt {
            Statement::Let { name, value } => {
                let value = self.eval_expression(value, env)?;
                if matches!(value, Object::ReturnValue(_)) {
                    return Ok(value);
                }
                env.borrow_mut().set(name.as_str(), value);
                Ok(Object::Null)
            }
            Statement::Assign { name, value } => {
                let value = self.eval_expression(value, env)?;
                if matches!(value, Object::ReturnValue(_)) {
                    return Ok(value);
                }
                // Rebinding requires the name to resolve somewhere in the chain
                env.borrow().get(name)?;
                env.borrow_mut().set(name.as_str(), value);
                Ok(Object::Null)
            }
            Statement::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expression(expr, env)?,
                    None => Object::Null,
                };
                match value {
                    Object::ReturnValue(_) => Ok(value),
                    value => Ok(Object::ReturnValue(Box::new(value))),
                }
            }
            Statement::Expression(expr) => self.eval_expression(expr, env),
            Statement::Block(block) => self.eval_block(block, env),
        }
    }

    /// Evaluate a block in `env`, passing a `ReturnValue` through still wrapped
    pub fn eval_block(&mut self, block: &BlockStatement, env: &EnvRef) -> InterpResult<Object> {
        let mut result = Object::Null;
        for stmt in &block.statements {
            result = self.eval_statement(stmt, env)?;
            if matches!(result, Object::ReturnValue(_)) {
                break;
            }
        }
        Ok(result)
    }

    /// Evaluate an expression with automatic stack growth for deep recursion
    pub fn eval_expression(&mut self, expr: &Expression, env: &EnvRef) -> InterpResult<Object> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.eval_expression_inner(expr, env)
        })
    }

    fn eval_expression_inner(&mut self, expr: &Expression, env: &EnvRef) -> InterpResult<Object> {
        match expr {
            Expression::IntegerLiteral(n) => Ok(Object::Integer(*n)),
            Expression::StringLiteral(s) => Ok(Object::string(s.as_str())),
            Expression::BooleanLiteral(b) => Ok(Object::Boolean(*b)),
            Expression::Identifier(name) => self.eval_identifier(name, env),

            Expression::Prefix { op, right } => {
                let right = self.eval_expression(right, env)?;
                eval_prefix(*op, &right)
            }

            Expression::Infix { left, op, right } => {
                let left = self.eval_expression(left, env)?;
                let right = self.eval_expression(right, env)?;
                eval_infix(*op, &left, &right)
            }

            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                let condition = self.eval_expression(condition, env)?;
                if condition.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alt) = alternative {
                    self.eval_block(alt, env)
                } else {
                    Ok(Object::Null)
                }
            }

            Expression::While { condition, body } => {
                while self.eval_expression(condition, env)?.is_truthy() {
                    let result = self.eval_block(body, env)?;
                    if matches!(result, Object::ReturnValue(_)) {
                        return Ok(result);
                    }
                }
                Ok(Object::Null)
            }

            Expression::FunctionLiteral { parameters, body } => {
                Ok(Object::Function(Rc::new(Function {
                    parameters: parameters.clone(),
                    body: body.clone(),
                    env: Rc::clone(env),
                })))
            }

            Expression::Call {
                function,
                arguments,
            } => {
                let function = self.eval_expression(function, env)?;
                let args = self.eval_expressions(arguments, env)?;
                self.apply_function(&function, args)
            }

            Expression::Index { left, index } => {
                let left = self.eval_expression(left, env)?;
                let index = self.eval_expression(index, env)?;
                eval_index(&left, &index)
            }

            Expression::ArrayLiteral(elements) => {
                Ok(Object::array(self.eval_expressions(elements, env)?))
            }

            Expression::HashMapLiteral(pairs) => {
                let mut entries = BTreeMap::new();
                for (key_expr, value_expr) in pairs {
                    let key = self.eval_expression(key_expr, env)?;
                    let value = self.eval_expression(value_expr, env)?;
                    entries.insert(key.hash_key(), (key, value));
                }
                Ok(Object::hashmap(entries))
            }

            Expression::HashSetLiteral(elements) => {
                let mut members = BTreeMap::new();
                for element in elements {
                    let member = self.eval_expression(element, env)?;
                    members.insert(member.hash_key(), member);
                }
                Ok(Object::hashset(members))
            }

            Expression::StackLiteral(elements) => {
                Ok(Object::stack(self.eval_expressions(elements, env)?))
            }
            Expression::QueueLiteral(elements) => Ok(Object::queue(VecDeque::from(
                self.eval_expressions(elements, env)?,
            ))),
            Expression::DequeLiteral(elements) => Ok(Object::deque(VecDeque::from(
                self.eval_expressions(elements, env)?,
            ))),

            Expression::MaxHeapLiteral { element, elements } => {
                self.eval_heap(HeapOrder::Max, *element, elements, env)
            }
            Expression::MinHeapLiteral { element, elements } => {
                self.eval_heap(HeapOrder::Min, *element, elements, env)
            }
        }
    }

    /// Scope chain first, so user bindings shadow built-ins
    fn eval_identifier(&self, name: &str, env: &EnvRef) -> InterpResult<Object> {
        let found = env.borrow().get(name);
        found.or_else(|err| {
            self.builtins
                .get(name)
                .map(|builtin| Object::Builtin(*builtin))
                .ok_or(err)
        })
    }

    /// Evaluate left to right, stopping at the first error
    fn eval_expressions(
        &mut self,
        exprs: &[Expression],
        env: &EnvRef,
    ) -> InterpResult<Vec<Object>> {
        exprs
            .iter()
            .map(|expr| self.eval_expression(expr, env))
            .collect()
    }

    fn eval_heap(
        &mut self,
        order: HeapOrder,
        element: HeapElement,
        elements: &[Expression],
        env: &EnvRef,
    ) -> InterpResult<Object> {
        let mut heap = Heap::new(order, element);
        for expr in elements {
            let value = self.eval_expression(expr, env)?;
            heap.push(&value)?;
        }
        Ok(Object::heap(heap))
    }

    /// Call a function or built-in with already evaluated arguments
    pub fn apply_function(&mut self, function: &Object, args: Vec<Object>) -> InterpResult<Object> {
        match function {
            Object::Function(func) => self.call_function(func, args),
            Object::Builtin(builtin) => {
                tracing::trace!(builtin = builtin.name, args = args.len(), "builtin call");
                (builtin.func)(&args)
            }
            other => Err(RuntimeError::not_a_function(other.type_name())),
        }
    }

    fn call_function(&mut self, func: &Function, args: Vec<Object>) -> InterpResult<Object> {
        if func.parameters.len() != args.len() {
            return Err(RuntimeError::arity_mismatch(
                func.parameters.len(),
                args.len(),
            ));
        }

        // Check recursion depth
        self.depth += 1;
        if self.depth > self.max_depth {
            self.depth -= 1;
            return Err(RuntimeError::stack_overflow());
        }
        tracing::trace!(depth = self.depth, params = func.parameters.len(), "call");

        // Fresh scope enclosed by the defining environment (lexical scoping)
        let call_env = child_env(&func.env);
        for (param, arg) in func.parameters.iter().zip(args) {
            call_env.borrow_mut().set(param.as_str(), arg);
        }

        let result = self.eval_block(&func.body, &call_env);
        self.depth -= 1;
        match result? {
            Object::ReturnValue(value) => Ok(*value),
            value => Ok(value),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn eval_prefix(op: PrefixOp, right: &Object) -> InterpResult<Object> {
    match op {
        PrefixOp::Not => Ok(Object::Boolean(right.bang())),
        PrefixOp::Neg => match right {
            Object::Integer(n) => Ok(Object::Integer(n.wrapping_neg())),
            other => Err(RuntimeError::unknown_prefix_operator(
                "-",
                other.type_name(),
            )),
        },
    }
}

/// Infix dispatch, checked in order: integers, strings, null operands,
/// mismatched types, then identity equality.
fn eval_infix(op: InfixOp, left: &Object, right: &Object) -> InterpResult<Object> {
    match (left, right) {
        (Object::Integer(a), Object::Integer(b)) => eval_integer_infix(op, *a, *b),
        (Object::Str(a), Object::Str(b)) => {
            if op != InfixOp::Add {
                return Err(RuntimeError::unknown_infix_operator(
                    "STRING",
                    &op.to_string(),
                    "STRING",
                ));
            }
            let joined = format!("{}{}", a.borrow(), b.borrow());
            Ok(Object::string(joined))
        }
        _ if left.is_null() || right.is_null() => Ok(Object::Null),
        _ if left.type_name() != right.type_name() => Err(RuntimeError::type_mismatch(
            left.type_name(),
            &op.to_string(),
            right.type_name(),
        )),
        _ => match op {
            InfixOp::Eq => Ok(Object::Boolean(left.same_identity(right))),
            InfixOp::NotEq => Ok(Object::Boolean(!left.same_identity(right))),
            _ => Err(RuntimeError::unknown_infix_operator(
                left.type_name(),
                &op.to_string(),
                right.type_name(),
            )),
        },
    }
}

fn eval_integer_infix(op: InfixOp, a: i64, b: i64) -> InterpResult<Object> {
    let value = match op {
        InfixOp::Add => Object::Integer(a.wrapping_add(b)),
        InfixOp::Sub => Object::Integer(a.wrapping_sub(b)),
        InfixOp::Mul => Object::Integer(a.wrapping_mul(b)),
        InfixOp::Div | InfixOp::Mod if b == 0 => return Err(RuntimeError::division_by_zero()),
        InfixOp::Div => Object::Integer(a.wrapping_div(b)),
        InfixOp::Mod => Object::Integer(a.wrapping_rem(b)),
        InfixOp::Eq => Object::Boolean(a == b),
        InfixOp::NotEq => Object::Boolean(a != b),
        InfixOp::Lt => Object::Boolean(a < b),
        InfixOp::Gt => Object::Boolean(a > b),
        InfixOp::LtEq => Object::Boolean(a <= b),
        InfixOp::GtEq => Object::Boolean(a >= b),
    };
    Ok(value)
}

fn eval_index(left: &Object, index: &Object) -> InterpResult<Object> {
    match (left, index) {
        (Object::Str(s), Object::Integer(i)) => usize::try_from(*i)
            .ok()
            .and_then(|at| s.borrow().chars().nth(at))
            .map(Object::string)
            .ok_or_else(|| RuntimeError::index_out_of_range(*i)),
        (Object::Array(items), Object::Integer(i)) => usize::try_from(*i)
            .ok()
            .and_then(|at| items.borrow().get(at).cloned())
            .ok_or_else(|| RuntimeError::index_out_of_range(*i)),
        (Object::HashMap(entries), key) => entries
            .borrow()
            .get(&key.hash_key())
            .map(|(_, value)| value.clone())
            .ok_or_else(|| RuntimeError::key_not_present(&key.inspect())),
        _ => Err(RuntimeError::index_not_supported(left.type_name())),
    }
}
