use crate::ast::{BinaryOp, Block, Expr, LogicalOp, Program, Stmt, UnaryOp};
use crate::environment::Environment;
use crate::error::{RuntimeError, Span};
use crate::value::Value;
use log::debug;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::{self, Write};
use std::mem;
use std::rc::Rc;

/// A builtin implemented in Rust. Callbacks receive the evaluated arguments
/// and the interpreter's output sink.
pub type NativeCallback = fn(&[Value], &mut dyn Write) -> io::Result<Value>;

/// Nested user calls allowed before a call fails with `CallDepthExceeded`.
pub const MAX_CALL_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Block,
}

/// How a statement finished: fell through with a value, or hit `return`.
enum Flow {
    Next(Value),
    Return(Value),
}

impl Flow {
    fn into_value(self) -> Value {
        match self {
            Flow::Next(value) | Flow::Return(value) => value,
        }
    }
}

/// A session: the function table and the current environment persist
/// across `interpret` calls, so declarations accumulate.
pub struct Interpreter {
    natives: HashMap<&'static str, NativeCallback>,
    functions: HashMap<String, Rc<FunctionDefinition>>,
    environment: Environment,
    output: Box<dyn Write>,
    depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }

    /// Natives write to `output` instead of stdout.
    pub fn with_output<W: Write + 'static>(output: W) -> Self {
        let mut interpreter = Self {
            natives: HashMap::new(),
            functions: HashMap::new(),
            environment: Environment::new(),
            output: Box::new(output),
            depth: 0,
        };

        interpreter.register_native("print", native_print);
        interpreter.register_native("मुद्रण", native_print);
        // `type` is a reserved word, so the builtin is spelled `typeof`.
        interpreter.register_native("typeof", native_type);

        interpreter
    }

    pub fn register_native(&mut self, name: &'static str, callback: NativeCallback) {
        self.natives.insert(name, callback);
    }

    pub fn interpret(&mut self, program: &Program) -> Result<Value, RuntimeError> {
        // A top-level `return` ends the program with its value.
        Ok(self.execute_statements(&program.statements)?.into_value())
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.environment.get(name)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.natives.contains_key(name) || self.functions.contains_key(name)
    }

    fn execute_statements(&mut self, statements: &[Stmt]) -> Result<Flow, RuntimeError> {
        let mut result = Value::Nil;

        for statement in statements {
            match self.execute_statement(statement)? {
                Flow::Next(value) => result = value,
                flow @ Flow::Return(_) => return Ok(flow),
            }
        }

        Ok(Flow::Next(result))
    }

    fn execute_statement(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Function(declaration) => {
                debug!(
                    "registering function '{}' with {} parameter(s)",
                    declaration.name,
                    declaration.parameters.len()
                );
                let definition = FunctionDefinition {
                    name: declaration.name.clone(),
                    parameters: declaration
                        .parameters
                        .iter()
                        .map(|parameter| parameter.name.clone())
                        .collect(),
                    body: declaration.body.clone(),
                };
                self.functions
                    .insert(definition.name.clone(), Rc::new(definition));
                Ok(Flow::Next(Value::Nil))
            }
            Stmt::Variable {
                name, initializer, ..
            } => {
                // Without an initializer there is nothing to bind.
                if let Some(initializer) = initializer {
                    let value = self.evaluate_expression(initializer)?;
                    self.environment.define(name, value);
                }
                Ok(Flow::Next(Value::Nil))
            }
            Stmt::Expression { expr, .. } => Ok(Flow::Next(self.evaluate_expression(expr)?)),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                if self.evaluate_expression(condition)?.is_truthy() {
                    self.execute_statements(&then_branch.statements)
                } else if let Some(else_branch) = else_branch {
                    self.execute_statements(&else_branch.statements)
                } else {
                    Ok(Flow::Next(Value::Nil))
                }
            }
            Stmt::While {
                condition, body, ..
            } => {
                while self.evaluate_expression(condition)?.is_truthy() {
                    if let flow @ Flow::Return(_) = self.execute_statements(&body.statements)? {
                        return Ok(flow);
                    }
                }
                Ok(Flow::Next(Value::Nil))
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate_expression(expr)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
        }
    }

    pub fn evaluate_expression(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::NumericLiteral { value, .. } => Ok(Value::Number(*value)),
            Expr::StringLiteral { value, .. } => Ok(Value::String(value.clone())),
            Expr::Identifier { name, span } => self
                .environment
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeError::undefined_variable(name, *span)),
            Expr::Assignment { name, value, .. } => {
                let value = self.evaluate_expression(value)?;
                self.environment.define(name, value.clone());
                Ok(value)
            }
            Expr::Binary {
                left,
                operator,
                right,
                ..
            } => {
                let left = self.evaluate_expression(left)?;
                let right = self.evaluate_expression(right)?;
                Ok(evaluate_binary_op(*operator, &left, &right))
            }
            Expr::Unary {
                operator, operand, ..
            } => {
                let operand = self.evaluate_expression(operand)?;
                Ok(match operator {
                    UnaryOp::Plus => Value::Number(operand.to_number()),
                    UnaryOp::Negate => Value::Number(-operand.to_number()),
                    UnaryOp::Not => Value::from_bool(!operand.is_truthy()),
                })
            }
            Expr::Logical {
                left,
                operator,
                right,
                ..
            } => {
                let left = self.evaluate_expression(left)?;
                let decided = match operator {
                    LogicalOp::And => !left.is_truthy(),
                    LogicalOp::Or => left.is_truthy(),
                };
                if decided {
                    Ok(left)
                } else {
                    self.evaluate_expression(right)
                }
            }
            Expr::Call {
                callee,
                arguments,
                span,
            } => self.call(callee, arguments, *span),
        }
    }

    fn call(&mut self, callee: &str, arguments: &[Expr], span: Span) -> Result<Value, RuntimeError> {
        if let Some(callback) = self.natives.get(callee).copied() {
            let arguments = self.evaluate_arguments(arguments)?;
            return callback(&arguments, &mut *self.output)
                .map_err(|error| RuntimeError::output_failed(error, span));
        }

        let function = self
            .functions
            .get(callee)
            .cloned()
            .ok_or_else(|| RuntimeError::undefined_function(callee, span))?;

        let arguments = self.evaluate_arguments(arguments)?;

        if self.depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::call_depth_exceeded(callee, MAX_CALL_DEPTH, span));
        }

        // Missing arguments stay unbound, extra ones are dropped.
        let mut scope = self.environment.snapshot();
        for (parameter, argument) in function.parameters.iter().zip(arguments) {
            scope.define(parameter, argument);
        }

        let caller = mem::replace(&mut self.environment, scope);
        self.depth += 1;
        let result = self.execute_statements(&function.body.statements);
        self.depth -= 1;
        self.environment = caller;

        Ok(result?.into_value())
    }

    fn evaluate_arguments(&mut self, arguments: &[Expr]) -> Result<Vec<Value>, RuntimeError> {
        arguments
            .iter()
            .map(|argument| self.evaluate_expression(argument))
            .collect()
    }
}

fn evaluate_binary_op(operator: BinaryOp, left: &Value, right: &Value) -> Value {
    match operator {
        BinaryOp::Add => match (left, right) {
            (Value::String(_), _) | (_, Value::String(_)) => {
                Value::String(format!("{}{}", left, right))
            }
            _ => Value::Number(left.to_number() + right.to_number()),
        },
        BinaryOp::Subtract => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Multiply => Value::Number(left.to_number() * right.to_number()),
        // IEEE-754 throughout: x / 0 is infinite, 0 / 0 is NaN.
        BinaryOp::Divide => Value::Number(left.to_number() / right.to_number()),
        BinaryOp::Remainder => Value::Number(left.to_number() % right.to_number()),
        BinaryOp::Equal => Value::from_bool(left.equals(right)),
        BinaryOp::NotEqual => Value::from_bool(!left.equals(right)),
        BinaryOp::Less => Value::from_bool(left.compare(right) == Some(Ordering::Less)),
        BinaryOp::LessEqual => Value::from_bool(matches!(
            left.compare(right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Greater => Value::from_bool(left.compare(right) == Some(Ordering::Greater)),
        BinaryOp::GreaterEqual => Value::from_bool(matches!(
            left.compare(right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
    }
}

fn native_print(arguments: &[Value], output: &mut dyn Write) -> io::Result<Value> {
    let line = arguments
        .iter()
        .map(|argument| argument.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(output, "{}", line)?;
    output.flush()?;
    Ok(Value::Nil)
}

fn native_type(arguments: &[Value], _output: &mut dyn Write) -> io::Result<Value> {
    let name = arguments.first().map_or("nil", Value::type_name);
    Ok(Value::from(name))
}
