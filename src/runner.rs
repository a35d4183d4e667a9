use crate::interpreter::Interpreter;
use crate::lexer::Lexer;

/// Runs a whole script, rendering any error against `source`.
/// Returns whether it ran cleanly.
pub fn run_script(source: &str, filename: Option<&str>) -> bool {
    let mut interpreter = Interpreter::new();

    match crate::run(source, &mut interpreter) {
        Ok(_) => true,
        Err(error) => {
            error.report(source, filename);
            false
        }
    }
}

/// Prints one token per line.
pub fn dump_tokens(source: &str, filename: Option<&str>) -> bool {
    let mut lexer = Lexer::new(source);
    match lexer.scan_tokens() {
        Ok(tokens) => {
            for token in tokens {
                println!("{}", token);
            }
            true
        }
        Err(error) => {
            crate::error::SanskritError::from(error).report(source, filename);
            false
        }
    }
}

/// Prints the syntax tree.
pub fn dump_ast(source: &str, filename: Option<&str>) -> bool {
    match crate::parse(source) {
        Ok(program) => {
            print!("{}", program);
            true
        }
        Err(error) => {
            error.report(source, filename);
            false
        }
    }
}
