use crate::interpreter::Interpreter;
use crate::value::Value;
use std::io::{self, Write};

const PROMPT: &str = "sanskrit> ";

/// Interactive session. One interpreter lives for the whole session, so
/// functions and variables carry over from line to line.
pub fn start() {
    println!("Sanskrit Interpreter v{}", env!("CARGO_PKG_VERSION"));
    println!("Type '.help' for commands, '.exit' or Ctrl+D to quit");
    println!();

    let mut interpreter = Interpreter::new();

    loop {
        print!("{}", PROMPT);
        if let Err(error) = io::stdout().flush() {
            eprintln!("Error writing prompt: {}", error);
            break;
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                // EOF (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim();
                match line {
                    "" => continue,
                    ".exit" | "exit" | "quit" => {
                        println!("Goodbye!");
                        break;
                    }
                    ".help" => print_help(),
                    _ => run_line(line, &mut interpreter),
                }
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  .help          show this message");
    println!("  .exit          leave the session (also 'exit', 'quit', Ctrl+D)");
    println!();
    println!("Statements end with ';'. Functions and variables persist between lines.");
    println!("Example: कार्य द्विगुण(x) {{ प्रतिफल x * २; }} मुद्रण(द्विगुण(२१));");
}

fn run_line(source: &str, interpreter: &mut Interpreter) {
    match crate::run(source, interpreter) {
        Ok(Value::Nil) => {}
        Ok(value) => println!("{}", value),
        Err(error) => error.report(source, None),
    }
}
