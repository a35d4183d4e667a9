use sanskrit::ast::{BinaryOp, Expr, Stmt};
use sanskrit::error::{Position, RuntimeErrorKind, SanskritError};
use sanskrit::interpreter::{Interpreter, MAX_CALL_DEPTH};
use sanskrit::lexer::{Keyword, TokenKind};
use sanskrit::value::Value;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Output sink the test keeps a handle to after giving it away.
#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capturing_interpreter() -> (Interpreter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    (Interpreter::with_output(buffer.clone()), buffer)
}

fn eval(source: &str) -> Value {
    let (mut interpreter, _) = capturing_interpreter();
    sanskrit::run(source, &mut interpreter)
        .unwrap_or_else(|error| panic!("running {:?} failed: {}", source, error))
}

fn runtime_error(source: &str) -> RuntimeErrorKind {
    let (mut interpreter, _) = capturing_interpreter();
    match sanskrit::run(source, &mut interpreter) {
        Err(SanskritError::Runtime(error)) => error.kind,
        other => panic!("expected a runtime error from {:?}, got {:?}", source, other),
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let program = sanskrit::parse("2 + 3 * 4;").unwrap();

    let Stmt::Expression { expr, .. } = &program.statements[0] else {
        panic!("expected an expression statement");
    };
    let Expr::Binary {
        operator, right, ..
    } = expr
    else {
        panic!("expected a binary expression at the root");
    };
    assert_eq!(*operator, BinaryOp::Add);
    assert!(matches!(
        right.as_ref(),
        Expr::Binary {
            operator: BinaryOp::Multiply,
            ..
        }
    ));

    assert_eq!(sanskrit::interpret(&program).unwrap(), Value::Number(14.0));
    assert_eq!(eval("(2 + 3) * 4;"), Value::Number(20.0));
}

#[test]
fn binary_operators_are_left_associative() {
    assert_eq!(eval("10 - 4 - 3;"), Value::Number(3.0));
    assert_eq!(eval("64 / 4 / 2;"), Value::Number(8.0));
    assert_eq!(eval("7 % 4 * 2;"), Value::Number(6.0));
}

#[test]
fn call_isolation_uses_snapshot_scope() {
    let (mut interpreter, _) = capturing_interpreter();
    let source = "fn f(a) { a = a + 1; return a; }\n\
                  x = 5;\n\
                  f(x);";

    let result = sanskrit::run(source, &mut interpreter).unwrap();
    assert_eq!(result, Value::Number(6.0));
    assert_eq!(interpreter.variable("x"), Some(&Value::Number(5.0)));
    assert_eq!(interpreter.variable("a"), None);
}

#[test]
fn callee_writes_do_not_reach_caller() {
    let (mut interpreter, _) = capturing_interpreter();
    let source = "let count = 1;\n\
                  fn bump() { count = count + 10; created = 1; return count; }\n\
                  bump();";

    assert_eq!(
        sanskrit::run(source, &mut interpreter).unwrap(),
        Value::Number(11.0)
    );
    assert_eq!(interpreter.variable("count"), Some(&Value::Number(1.0)));
    assert_eq!(interpreter.variable("created"), None);
}

#[test]
fn callee_sees_caller_variables_at_call_time() {
    let source = "fn show() { return greeting; }\n\
                  let greeting = \"नमस्ते\";\n\
                  show();";
    assert_eq!(eval(source), Value::from("नमस्ते"));
}

#[test]
fn undefined_variable() {
    assert_eq!(
        runtime_error("missing;"),
        RuntimeErrorKind::UndefinedVariable {
            name: "missing".to_string()
        }
    );
}

#[test]
fn undefined_function() {
    assert_eq!(
        runtime_error("nowhere(1);"),
        RuntimeErrorKind::UndefinedFunction {
            name: "nowhere".to_string()
        }
    );
}

#[test]
fn missing_arguments_stay_unbound() {
    let source = "fn second(a, b) { return b; }\nsecond(1);";
    assert_eq!(
        runtime_error(source),
        RuntimeErrorKind::UndefinedVariable {
            name: "b".to_string()
        }
    );

    // Extra arguments are ignored.
    assert_eq!(eval("fn first(a) { return a; }\nfirst(1, 2, 3);"), Value::Number(1.0));
}

#[test]
fn declaration_without_initializer_binds_nothing() {
    assert_eq!(
        runtime_error("let x: number;\nx;"),
        RuntimeErrorKind::UndefinedVariable {
            name: "x".to_string()
        }
    );
}

#[test]
fn caller_environment_restored_after_failed_call() {
    let (mut interpreter, _) = capturing_interpreter();
    sanskrit::run("let x = 1; fn broken() { x = 99; return nope; }", &mut interpreter).unwrap();

    assert!(sanskrit::run("broken();", &mut interpreter).is_err());
    assert_eq!(interpreter.variable("x"), Some(&Value::Number(1.0)));
}

#[test]
fn print_writes_space_separated_line() {
    let (mut interpreter, output) = capturing_interpreter();
    let result = sanskrit::run(
        "print(1, \"two\", 3.5);\nमुद्रण(\"नमस्ते\", ४२);",
        &mut interpreter,
    )
    .unwrap();

    assert_eq!(result, Value::Nil);
    assert_eq!(output.contents(), "1 two 3.5\nनमस्ते 42\n");
}

#[test]
fn session_state_persists_between_runs() {
    let (mut interpreter, output) = capturing_interpreter();

    sanskrit::run("कार्य द्विगुण(x) { प्रतिफल x * २; }", &mut interpreter).unwrap();
    sanskrit::run("चर संख्या = २१;", &mut interpreter).unwrap();
    let value = sanskrit::run("द्विगुण(संख्या);", &mut interpreter).unwrap();

    assert_eq!(value, Value::Number(42.0));
    assert!(interpreter.has_function("द्विगुण"));

    sanskrit::run("मुद्रण(द्विगुण(संख्या));", &mut interpreter).unwrap();
    assert_eq!(output.contents(), "42\n");
}

#[test]
fn errors_leave_session_usable() {
    let (mut interpreter, _) = capturing_interpreter();
    sanskrit::run("let x = 1;", &mut interpreter).unwrap();

    assert!(matches!(
        sanskrit::run("let y = ;", &mut interpreter),
        Err(SanskritError::Syntax(_))
    ));
    assert!(matches!(
        sanskrit::run("x = @;", &mut interpreter),
        Err(SanskritError::Lex(_))
    ));

    assert_eq!(
        sanskrit::run("x + 1;", &mut interpreter).unwrap(),
        Value::Number(2.0)
    );
}

#[test]
fn if_else_chains() {
    let source = "fn sign(n) {\n\
                      if n < 0 { return -1; }\n\
                      else if n == 0 { return 0; }\n\
                      else { return 1; }\n\
                  }\n";
    assert_eq!(eval(&format!("{}sign(-5);", source)), Value::Number(-1.0));
    assert_eq!(eval(&format!("{}sign(0);", source)), Value::Number(0.0));
    assert_eq!(eval(&format!("{}sign(7);", source)), Value::Number(1.0));
}

#[test]
fn while_loop_and_recursion() {
    let loop_sum = "let i = 0; let total = 0;\n\
                    while i < 5 { i = i + 1; total = total + i; }\n\
                    total;";
    assert_eq!(eval(loop_sum), Value::Number(15.0));

    let factorial = "कार्य क्रमगुणित(न) {\n\
                         यदि न <= १ { प्रतिफल १; }\n\
                         प्रतिफल न * क्रमगुणित(न - १);\n\
                     }\n\
                     क्रमगुणित(५);";
    assert_eq!(eval(factorial), Value::Number(120.0));
}

#[test]
fn return_inside_loop_leaves_function() {
    let source = "fn first_over(limit) {\n\
                      let n = 1;\n\
                      while 1 { n = n * 2; if n > limit { return n; } }\n\
                  }\n\
                  first_over(100);";
    assert_eq!(eval(source), Value::Number(128.0));
}

#[test]
fn top_level_return_ends_program() {
    let (mut interpreter, output) = capturing_interpreter();
    let value = sanskrit::run("return 7; print(\"unreachable\");", &mut interpreter).unwrap();

    assert_eq!(value, Value::Number(7.0));
    assert_eq!(output.contents(), "");
}

#[test]
fn program_value_is_last_statement() {
    assert_eq!(eval("1; 2; 3;"), Value::Number(3.0));
    assert_eq!(eval("let x = 3;"), Value::Nil);
    assert_eq!(eval("fn f() { }"), Value::Nil);
    assert_eq!(eval(""), Value::Nil);
}

#[test]
fn string_and_number_semantics() {
    assert_eq!(eval("\"a\" + 1;"), Value::from("a1"));
    assert_eq!(eval("1 + \"a\";"), Value::from("1a"));
    assert_eq!(eval("\"6\" * \"7\";"), Value::Number(42.0));
    assert!(matches!(eval("\"x\" - 1;"), Value::Number(n) if n.is_nan()));
    assert_eq!(eval("\"apple\" < \"banana\";"), Value::Number(1.0));
    assert_eq!(eval("1 == \"1\";"), Value::Number(0.0));
    assert_eq!(eval("\"नमस्ते\" == \"नमस्ते\";"), Value::Number(1.0));
}

#[test]
fn division_follows_ieee() {
    assert_eq!(eval("1 / 0;"), Value::Number(f64::INFINITY));
    assert_eq!(eval("1 / 0;").to_string(), "Infinity");
    assert_eq!(eval("0 / 0;").to_string(), "NaN");
    assert_eq!(eval("7 / 2;"), Value::Number(3.5));
}

#[test]
fn logical_operators_short_circuit() {
    // The right side would fail if it were evaluated.
    assert_eq!(eval("0 && missing;"), Value::Number(0.0));
    assert_eq!(eval("\"yes\" || missing;"), Value::from("yes"));
    assert_eq!(eval("1 && \"right\";"), Value::from("right"));
    assert_eq!(eval("!0;"), Value::Number(1.0));
    assert_eq!(eval("!\"\";"), Value::Number(1.0));
    assert_eq!(eval("-\"3\";"), Value::Number(-3.0));
}

#[test]
fn assignment_is_right_associative_expression() {
    let (mut interpreter, _) = capturing_interpreter();
    let value = sanskrit::run("a = b = 4;", &mut interpreter).unwrap();

    assert_eq!(value, Value::Number(4.0));
    assert_eq!(interpreter.variable("a"), Some(&Value::Number(4.0)));
    assert_eq!(interpreter.variable("b"), Some(&Value::Number(4.0)));
}

#[test]
fn typeof_builtin() {
    assert_eq!(eval("typeof(1);"), Value::from("number"));
    assert_eq!(eval("let t = typeof(\"s\"); t;"), Value::from("string"));
    assert_eq!(eval("typeof(print());"), Value::from("nil"));
}

#[test]
fn reserved_type_word_cannot_be_called() {
    let (mut interpreter, _) = capturing_interpreter();
    match sanskrit::run("let t = type(1);", &mut interpreter) {
        Err(SanskritError::Syntax(error)) => {
            assert_eq!(error.expected, "expression");
            assert_eq!(error.found, TokenKind::Keyword(Keyword::Type));
        }
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[test]
fn syntax_error_carries_position() {
    let (mut interpreter, _) = capturing_interpreter();
    match sanskrit::run("let x = 1;\n  let = 2;", &mut interpreter) {
        Err(SanskritError::Syntax(error)) => {
            assert_eq!(error.expected, "variable name");
            assert_eq!(error.found, TokenKind::Operator);
            assert_eq!(error.lexeme, "=");
            assert_eq!(error.position, Position::new(2, 7));
            assert_eq!(
                error.to_string(),
                "expected variable name but found operator '=' at line 2, column 7"
            );
        }
        other => panic!("expected a syntax error, got {:?}", other),
    }

    // Nothing from the failed chunk ran.
    assert_eq!(interpreter.variable("x"), None);
}

#[test]
fn syntax_error_at_end_of_input() {
    let error = match sanskrit::parse("fn f(a) {\n  return a;\n") {
        Err(SanskritError::Syntax(error)) => error,
        other => panic!("expected a syntax error, got {:?}", other),
    };
    assert_eq!(error.expected, "'}' after block");
    assert_eq!(error.found, TokenKind::EndOfInput);
    assert_eq!(error.position, Position::new(3, 1));
}

#[test]
fn numbers_display_like_the_host() {
    let shown = |n: f64| Value::Number(n).to_string();
    assert_eq!(shown(42.0), "42");
    assert_eq!(shown(-0.0), "0");
    assert_eq!(shown(0.1 + 0.2), "0.30000000000000004");
    assert_eq!(shown(1e20), "100000000000000000000");
    assert_eq!(shown(1e21), "1e+21");
    assert_eq!(shown(-2.5e30), "-2.5e+30");
    assert_eq!(shown(1e-7), "1e-7");
    assert_eq!(shown(1.5e-9), "1.5e-9");
    assert_eq!(shown(0.000001), "0.000001");
    assert_eq!(shown(f64::NEG_INFINITY), "-Infinity");
}

#[test]
fn runaway_recursion_is_a_runtime_error() {
    // Generous stack so the limit, not the host stack, is what stops it.
    let handle = std::thread::Builder::new()
        .stack_size(256 * 1024 * 1024)
        .spawn(|| {
            let (mut interpreter, _) = capturing_interpreter();
            sanskrit::run("let x = 1;\nfn f() { x = 2; return f(); }", &mut interpreter).unwrap();

            let kind = match sanskrit::run("f();", &mut interpreter) {
                Err(SanskritError::Runtime(error)) => error.kind,
                other => panic!("expected a runtime error, got {:?}", other),
            };
            assert_eq!(
                kind,
                RuntimeErrorKind::CallDepthExceeded {
                    name: "f".to_string(),
                    limit: MAX_CALL_DEPTH,
                }
            );

            // The session survives with the caller's bindings intact.
            assert_eq!(interpreter.variable("x"), Some(&Value::Number(1.0)));
            let countdown = "fn down(n) { if n == 0 { return 0; } return down(n - 1); }\ndown(100);";
            assert_eq!(
                sanskrit::run(countdown, &mut interpreter).unwrap(),
                Value::Number(0.0)
            );
        })
        .unwrap();

    handle.join().unwrap();
}

#[test]
fn later_declaration_replaces_earlier() {
    let source = "fn f() { return 1; }\nfn f() { return 2; }\nf();";
    assert_eq!(eval(source), Value::Number(2.0));
}

#[test]
fn interpretation_is_deterministic() {
    let program = sanskrit::parse(
        "fn fib(n) { if n < 2 { return n; } return fib(n - 1) + fib(n - 2); }\n\
         let x = fib(15);\n\
         x * 2;",
    )
    .unwrap();

    let first = sanskrit::interpret(&program).unwrap();
    let second = sanskrit::interpret(&program).unwrap();

    assert_eq!(first, Value::Number(1220.0));
    assert_eq!(first, second);
}

#[test]
fn ast_printer_shows_tree() {
    let program = sanskrit::parse("let x = 1 + 2;").unwrap();
    assert_eq!(
        program.to_string(),
        "Program\n  VariableDeclaration x\n    BinaryExpression +\n      NumericLiteral 1\n      NumericLiteral 2\n"
    );
}
