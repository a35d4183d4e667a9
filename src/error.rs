use crate::lexer::TokenKind;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;
use thiserror::Error;

/// Character offsets into the source text, which is what `ariadne` indexes by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }

    pub fn to(self, other: Span) -> Self {
        Self::new(self.start, other.end.max(self.end))
    }
}

/// 1-based line and column; columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("unexpected character '{character}' at {position}")]
pub struct LexError {
    pub character: char,
    pub position: Position,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("expected {expected} but found {found} '{lexeme}' at {position}")]
pub struct SyntaxError {
    pub expected: String,
    pub found: TokenKind,
    pub lexeme: String,
    pub position: Position,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    UndefinedVariable { name: String },
    UndefinedFunction { name: String },
    /// User calls nested deeper than the interpreter allows.
    CallDepthExceeded { name: String, limit: usize },
    /// A native function could not write to the interpreter's output sink.
    OutputFailed { message: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub span: Span,
}

impl RuntimeError {
    pub fn undefined_variable(name: &str, span: Span) -> Self {
        Self {
            kind: RuntimeErrorKind::UndefinedVariable {
                name: name.to_string(),
            },
            span,
        }
    }

    pub fn undefined_function(name: &str, span: Span) -> Self {
        Self {
            kind: RuntimeErrorKind::UndefinedFunction {
                name: name.to_string(),
            },
            span,
        }
    }

    pub fn call_depth_exceeded(name: &str, limit: usize, span: Span) -> Self {
        Self {
            kind: RuntimeErrorKind::CallDepthExceeded {
                name: name.to_string(),
                limit,
            },
            span,
        }
    }

    pub fn output_failed(error: std::io::Error, span: Span) -> Self {
        Self {
            kind: RuntimeErrorKind::OutputFailed {
                message: error.to_string(),
            },
            span,
        }
    }

    pub fn message(&self) -> String {
        match &self.kind {
            RuntimeErrorKind::UndefinedVariable { name } => {
                format!("Undefined variable '{}'", name)
            }
            RuntimeErrorKind::UndefinedFunction { name } => {
                format!("Undefined function '{}'", name)
            }
            RuntimeErrorKind::CallDepthExceeded { name, limit } => {
                format!("Call depth limit of {} exceeded calling '{}'", limit, name)
            }
            RuntimeErrorKind::OutputFailed { message } => {
                format!("Failed to write output: {}", message)
            }
        }
    }

    fn help(&self) -> Option<String> {
        match &self.kind {
            RuntimeErrorKind::UndefinedVariable { .. } => Some(
                "Bind the name first with 'let' (or 'चर') or an assignment. \
                 Functions only see variables that existed when they were called."
                    .to_string(),
            ),
            RuntimeErrorKind::UndefinedFunction { .. } => Some(
                "Declare it with 'fn' (or 'कार्य') before calling it.".to_string(),
            ),
            RuntimeErrorKind::CallDepthExceeded { .. } => {
                Some("Check that the recursion has a base case that is reached.".to_string())
            }
            RuntimeErrorKind::OutputFailed { .. } => None,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SanskritError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl SanskritError {
    pub fn span(&self) -> Span {
        match self {
            SanskritError::Lex(error) => error.span,
            SanskritError::Syntax(error) => error.span,
            SanskritError::Runtime(error) => error.span,
        }
    }

    fn label_message(&self) -> String {
        match self {
            SanskritError::Lex(error) => {
                format!("Unexpected character '{}'", error.character)
            }
            SanskritError::Syntax(error) => {
                format!("Expected {}, found {} '{}'", error.expected, error.found, error.lexeme)
            }
            SanskritError::Runtime(error) => error.message(),
        }
    }

    fn help(&self) -> Option<String> {
        match self {
            SanskritError::Lex(_) => Some(
                "Only Latin or Devanagari identifiers, numbers, strings, the operators \
                 + - * / = < > ! & | ^ % and the delimiters ( ) { } [ ] , ; : are recognised."
                    .to_string(),
            ),
            SanskritError::Syntax(error) if error.found == TokenKind::EndOfInput => {
                Some("The input ended before this construct was complete.".to_string())
            }
            SanskritError::Syntax(_) => None,
            SanskritError::Runtime(error) => error.help(),
        }
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<repl>");

        let (color, kind_str) = match self {
            SanskritError::Lex(_) => (Color::Red, "Lexical Error"),
            SanskritError::Syntax(_) => (Color::Yellow, "Syntax Error"),
            SanskritError::Runtime(_) => (Color::Magenta, "Runtime Error"),
        };

        let span = self.span();
        let message = self.label_message();

        let mut report_builder = Report::build(ReportKind::Error, filename, span.start)
            .with_message(format!("{}: {}", kind_str.fg(color), message))
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(&message)
                    .with_color(color),
            );

        if let Some(help_text) = self.help() {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        if let Err(error) = report_builder
            .finish()
            .eprint((filename, Source::from(source)))
        {
            eprintln!("{}: {}", kind_str, self);
            eprintln!("(failed to render diagnostic: {})", error);
        }
    }
}
