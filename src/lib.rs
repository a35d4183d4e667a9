// Sanskrit Language Interpreter Library
//
// Lexer, parser and tree-walking interpreter for a small language whose
// keywords, identifiers and numerals may be written in Latin or Devanagari.

pub mod ast;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod value;

use log::trace;

pub use ast::{Expr, NodeKind, Program, Stmt};
pub use environment::Environment;
pub use error::{LexError, RuntimeError, RuntimeErrorKind, SanskritError, Span, SyntaxError};
pub use interpreter::Interpreter;
pub use lexer::{Keyword, Lexer, Token, TokenKind};
pub use parser::Parser;
pub use value::Value;

pub use repl::start as start_repl;
pub use runner::run_script;

/// Parses a complete source text.
pub fn parse(source: &str) -> Result<Program, SanskritError> {
    Parser::new(Lexer::new(source))?.parse()
}

/// Runs a parsed program in a fresh interpreter.
pub fn interpret(program: &Program) -> Result<Value, RuntimeError> {
    Interpreter::new().interpret(program)
}

/// Parses one chunk and evaluates it against an existing session, so
/// functions and variables from earlier chunks stay visible.
pub fn run(source: &str, interpreter: &mut Interpreter) -> Result<Value, SanskritError> {
    trace!("parsing {} characters", source.chars().count());
    let program = parse(source)?;

    trace!("interpreting {} statement(s)", program.statements.len());
    let value = interpreter.interpret(&program)?;

    trace!("finished with {} value", value.type_name());
    Ok(value)
}
