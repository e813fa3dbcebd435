// Integration tests for the Mini-PL interpreter
//
// These tests run complete Mini-PL programs through the lexer, parser and
// interpreter and check what they print and what they leave in the binding
// store. Tests cover:
// - Declarations, defaults and redeclaration
// - Assignment with conversion to the declared type
// - Inclusive for loops
// - print and read
// - Runtime failures (undeclared names, division by zero, bad conversions)

use minipl::errors::{ErrorKind, MiniPlError};
use minipl::interpreter::{Interpreter, Value};
use minipl::parser::parse_source;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

struct Run {
    interp: Interpreter,
    output: String,
    result: Result<(), Box<MiniPlError>>,
}

fn run_with_input(code: &str, input: &str) -> Run {
    let parsed = parse_source(code);
    assert!(parsed.is_clean(), "unexpected diagnostics: {:?}", parsed.diagnostics);

    let buffer = Arc::new(Mutex::new(Vec::new()));
    let mut interp = Interpreter::new();
    interp.set_output(buffer.clone());
    interp.set_input(Cursor::new(input.to_string()));

    let result = interp.run(&parsed.program);
    let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    Run { interp, output, result }
}

fn run_code(code: &str) -> Run {
    run_with_input(code, "")
}

fn error_kind(run: &Run) -> ErrorKind {
    run.result.as_ref().expect_err("program should fail").kind
}

#[test]
fn test_declaration_with_initializer() {
    let run = run_code("var x : int := 6 * 7;");
    assert!(run.result.is_ok());
    assert_eq!(run.interp.env.get("x"), Some(Value::Int(42)));
}

#[test]
fn test_declaration_defaults() {
    let run = run_code("var n : int; var s : string; var b : bool;");
    assert_eq!(run.interp.env.get("n"), Some(Value::Int(0)));
    assert_eq!(run.interp.env.get("s"), Some(Value::Str(String::new())));
    assert_eq!(run.interp.env.get("b"), Some(Value::Bool(false)));
}

#[test]
fn test_redeclaration_replaces_binding() {
    let run = run_code("var x : int := 1; var x : string := \"one\"; print x;");
    assert_eq!(run.output, "one");
    assert_eq!(run.interp.env.get("x"), Some(Value::Str("one".to_string())));
}

#[test]
fn test_assignment_updates_store() {
    let run = run_code("var x : int := 1; x := x + 10; print x;");
    assert_eq!(run.output, "11");
}

#[test]
fn test_assignment_converts_to_declared_type() {
    let run = run_code("var n : int; n := \"12\"; var b : bool; b := 5;");
    assert_eq!(run.interp.env.get("n"), Some(Value::Int(12)));
    assert_eq!(run.interp.env.get("b"), Some(Value::Bool(true)));
}

#[test]
fn test_assignment_to_undeclared_variable_fails() {
    let run = run_code("y := 1;");
    assert_eq!(error_kind(&run), ErrorKind::UndefinedVariable);
    assert!(run.interp.env.is_empty());
}

#[test]
fn test_undeclared_reference_suggests_close_name() {
    let run = run_code("var count : int := 1; print cuont;");
    let err = run.result.expect_err("lookup should fail");
    assert_eq!(err.kind, ErrorKind::UndefinedVariable);
    assert_eq!(err.suggestion.as_deref(), Some("count"));
    assert_eq!(err.location.line, 1);
}

#[test]
fn test_print_writes_without_newline() {
    let run = run_code("print 1; print \"-\"; print 2 = 2;");
    assert_eq!(run.output, "1-true");
}

#[test]
fn test_string_concatenation() {
    let run = run_code(
        "var greeting : string := \"Hello\";\n\
         var name : string := \"World\";\n\
         print greeting + \", \" + name + \"!\";",
    );
    assert_eq!(run.output, "Hello, World!");
}

#[test]
fn test_for_loop_iterates_inclusive_range() {
    let run = run_code("var i : int; for i in 1..4 do print i; end for;");
    assert_eq!(run.output, "1234");
    assert_eq!(run.interp.env.get("i"), Some(Value::Int(4)));
}

#[test]
fn test_for_loop_with_empty_range_skips_body() {
    let run = run_code("var i : int; for i in 3..1 do print i; end for;");
    assert!(run.result.is_ok());
    assert_eq!(run.output, "");
    assert_eq!(run.interp.env.get("i"), Some(Value::Int(3)));
}

#[test]
fn test_for_loop_bounds_are_evaluated_once() {
    let run = run_code(
        "var n : int := 3;\n\
         var i : int;\n\
         for i in 1..n do\n\
             n := n + 1;\n\
         end for;\n\
         print n;",
    );
    assert_eq!(run.output, "6");
}

#[test]
fn test_nested_loops_accumulate() {
    let run = run_code(
        "var total : int;\n\
         var i : int;\n\
         var j : int;\n\
         for i in 1..3 do\n\
             for j in 1..i do\n\
                 total := total + j;\n\
             end for;\n\
         end for;\n\
         assert(total = 10);",
    );
    assert_eq!(run.output, "Assertion succeeded\n");
}

#[test]
fn test_for_loop_requires_declared_control_variable() {
    let run = run_code("for k in 1..2 do print k; end for;");
    assert_eq!(error_kind(&run), ErrorKind::UndefinedVariable);
    assert_eq!(run.output, "");
}

#[test]
fn test_read_parses_words_into_declared_types() {
    let run = run_with_input(
        "var n : int; var word : string; var flag : bool;\n\
         read n; read word; read flag;\n\
         print n + 1; print word;",
        "41 hello\n  TRUE\n",
    );
    assert!(run.result.is_ok());
    assert_eq!(run.output, "42hello");
    assert_eq!(run.interp.env.get("flag"), Some(Value::Bool(true)));
}

#[test]
fn test_read_past_end_of_input_fails() {
    let run = run_with_input("var n : int; read n; read n;", "7");
    assert_eq!(error_kind(&run), ErrorKind::IoError);
    assert_eq!(run.interp.env.get("n"), Some(Value::Int(7)));
}

#[test]
fn test_read_rejects_unconvertible_word() {
    let run = run_with_input("var n : int; read n;", "seven");
    let err = run.result.expect_err("conversion should fail");
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert_eq!(err.location.line, 1);
}

#[test]
fn test_division_by_zero_stops_the_run() {
    let run = run_code("var x : int := 1;\nprint 1;\nx := x / 0;\nprint 2;");
    let err = run.result.expect_err("division should fail");
    assert_eq!(err.kind, ErrorKind::DivisionByZero);
    assert_eq!(err.location.line, 3);
    assert_eq!(run.output, "1");
}

#[test]
fn test_integer_plus_string_is_not_concatenated() {
    let run = run_code("var s : string := \"a\"; print 1 + s;");
    assert_eq!(error_kind(&run), ErrorKind::TypeError);

    let run = run_code("var s : string := \"4\"; print 1 + s;");
    assert_eq!(run.output, "5");
}

#[test]
fn test_negation_type_error_points_at_operator() {
    let run = run_code("print !\"x\";");
    let err = run.result.expect_err("negating text should fail");
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert_eq!((err.location.line, err.location.column), (1, 7));

    let report = err.in_source(None, "print !\"x\";");
    assert_eq!(report.source_line.as_deref(), Some("print !\"x\";"));
}

#[test]
fn test_for_bound_type_error_points_at_loop_variable() {
    let run = run_code("var i : int;\nfor i in \"a\"..2 do print i; end for;");
    let err = run.result.expect_err("text bound should fail");
    assert_eq!(err.kind, ErrorKind::TypeError);
    assert_eq!((err.location.line, err.location.column), (2, 5));
    assert_eq!(run.output, "");
}

#[test]
fn test_division_overflow_stops_the_run() {
    let run = run_code("var min : int := 0 - 2147483647 - 1;\nprint min / (0 - 1);\nprint 1;");
    let err = run.result.expect_err("overflowing division should fail");
    assert_eq!(err.kind, ErrorKind::Overflow);
    assert_eq!(err.location.line, 2);
    assert_eq!(run.output, "");
}

#[test]
fn test_output_survives_poisoned_buffer() {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let poisoner = buffer.clone();
    let _ = std::thread::spawn(move || {
        let _guard = poisoner.lock().unwrap();
        panic!("writer died while holding the buffer");
    })
    .join();
    assert!(buffer.is_poisoned());

    let mut interp = Interpreter::new();
    interp.set_output(buffer.clone());
    interp.run(&parse_source("print 7; assert(true);").program).unwrap();

    let bytes = buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone();
    assert_eq!(String::from_utf8(bytes).unwrap(), "7Assertion succeeded\n");
}

#[test]
fn test_assertions_report_and_continue() {
    let run = run_code("assert(1 < 2); assert(!true = 1); assert(\"ab\" < \"xyz\");");
    assert_eq!(run.output, "Assertion succeeded\nAssertion failed\nAssertion succeeded\n");
    assert!(run.result.is_ok());
}

#[test]
fn test_program_with_diagnostics_still_runs_remaining_statements() {
    let parsed = parse_source("var x : int := ;\nvar y : int := 2;\nprint y;");
    assert_eq!(parsed.diagnostics.len(), 1);

    let buffer = Arc::new(Mutex::new(Vec::new()));
    let mut interp = Interpreter::new();
    interp.set_output(buffer.clone());
    interp.run(&parsed.program).unwrap();

    assert_eq!(String::from_utf8(buffer.lock().unwrap().clone()).unwrap(), "2");
    assert!(!interp.env.contains("x"));
}

#[test]
fn test_store_persists_across_runs() {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let mut interp = Interpreter::new();
    interp.set_output(buffer.clone());

    interp.run(&parse_source("var total : int := 5;").program).unwrap();
    interp.run(&parse_source("total := total * 2; print total;").program).unwrap();

    assert_eq!(String::from_utf8(buffer.lock().unwrap().clone()).unwrap(), "10");
    assert_eq!(interp.env.names(), vec!["total".to_string()]);
}
