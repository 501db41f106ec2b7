//! Tests for the lexer and parser.

use crate::{parse, ParserOptions, Source};
use adder_ast::{statement::Statement, Script};
use indoc::indoc;

fn parse_ok(source: &str) -> Script {
    parse(Source::from_bytes(source), ParserOptions::default())
        .unwrap_or_else(|err| panic!("expected {source:?} to parse: {err}"))
}

fn parse_err(source: &str) -> crate::Error {
    match parse(Source::from_bytes(source), ParserOptions::default()) {
        Ok(_) => panic!("expected {source:?} to fail"),
        Err(err) => err,
    }
}

#[test]
fn var_declaration_list() {
    let script = parse_ok("var a = 1, b, c = 'x';");
    assert_eq!(script.statements().len(), 1);
    assert!(matches!(script.statements()[0], Statement::Var(_)));
}

#[test]
fn semicolon_insertion_at_newline() {
    let script = parse_ok(indoc! {r#"
        var a = 1
        var b = 2
        a + b
    "#});
    assert_eq!(script.statements().len(), 3);
}

#[test]
fn semicolon_insertion_requires_newline() {
    let err = parse_err("var a = 1 var b = 2");
    assert!(err.message().contains("Unexpected token"), "{err}");
}

#[test]
fn legacy_octal_is_rejected() {
    let err = parse_err("var a = 0011;");
    assert!(err.message().contains("octal"), "{err}");
    parse_ok("var a = 0o11;");
    parse_ok("var b = 0x1f;");
    parse_ok("var c = 0b101;");
}

#[test]
fn number_followed_by_identifier_is_rejected() {
    parse_err("var a = 3in[];");
}

#[test]
fn unterminated_string_reports_line() {
    let err = parse_err("var a = 1;\nvar b = 'abc");
    assert_eq!(err.line(), 2);
}

#[test]
fn raw_newline_in_string_is_rejected() {
    parse_err("var a = 'first\nsecond'");
}

#[test]
fn string_line_continuation() {
    parse_ok("var a = 'first\\\nsecond'");
}

#[test]
fn delete_of_identifier_is_rejected() {
    let err = parse_err("var a = 1; delete a;");
    assert!(err.message().contains("unqualified"), "{err}");
    parse_ok("var o = {}; delete o.a;");
}

#[test]
fn eval_assignment_is_rejected() {
    parse_err("eval = 1;");
    parse_err("var eval = 1;");
}

#[test]
fn arguments_declaration_is_rejected() {
    parse_err("var arguments = 1;");
    parse_err("function f(arguments) {}");
    parse_err("function arguments() {}");
}

#[test]
fn duplicate_parameters_are_rejected() {
    let err = parse_err("function f(a, a) {}");
    assert!(err.message().contains("already been declared"), "{err}");
}

#[test]
fn duplicate_var_and_function_is_rejected() {
    parse_err("function f() { var x; function x() {} }");
    parse_ok("function f() { var x; var x; }");
}

#[test]
fn function_declaration_positions() {
    parse_ok("function f() {}");
    parse_ok("{ function f() {} }");
    parse_ok("if (1) { function f() {} }");
    parse_err("if (1) function f() {}");
    parse_err("while (1) function f() {}");
}

#[test]
fn rest_parameter_must_be_last() {
    parse_ok("function f(a, ...rest) {}");
    parse_err("function f(...rest, a) {}");
}

#[test]
fn arrow_functions() {
    parse_ok("var f = a => a + 1;");
    parse_ok("var f = (a, b) => a + b;");
    parse_ok("var f = () => { return 1; };");
    parse_ok("var f = (a, ...rest) => rest;");
}

#[test]
fn template_literals() {
    parse_ok("var a = `one ${1 + 2} two`;");
    parse_ok("var a = `nested ${`inner ${x}`}`;");
    parse_ok("var a = `escaped \\${not} interpolated`;");
    parse_err("var a = `unterminated");
}

#[test]
fn regexp_literal_positions() {
    parse_ok("var re = /ab+c/g;");
    parse_ok("var x = 1; var y = x / 2 / 3;");
    parse_ok("var re = /[/]/;");
    parse_ok("var re = /\\//;");
}

#[test]
fn new_call_binding() {
    parse_ok("new X()();");
    parse_ok("new new X()();");
    parse_ok("new a.b.C(1).d;");
}

#[test]
fn labels() {
    parse_ok("outer: for (;;) { inner: for (;;) { continue outer; } break; }");
    parse_err("outer: outer: ;");
    parse_err("for (;;) { continue missing; }");
    parse_err("continue;");
    parse_err("break;");
    let err = parse_err("lbl: { continue lbl; }");
    assert!(err.message().contains("continue"), "{err}");
    parse_ok("lbl: { break lbl; }");
}

#[test]
fn return_outside_function_is_rejected() {
    let err = parse_err("return 1;");
    assert!(err.message().contains("return"), "{err}");
}

#[test]
fn destructuring_declarations() {
    parse_ok("var [a, b] = pair;");
    parse_ok("var [a, , b, ...rest] = list;");
    parse_ok("var {a, b: c} = obj;");
    parse_ok("var {a: {b}} = obj;");
    parse_err("var [a];");
}

#[test]
fn destructuring_assignment() {
    parse_ok("[a, b] = pair;");
    parse_ok("({a, b} = obj);");
}

#[test]
fn reserved_words_are_rejected() {
    parse_err("class A {}");
    parse_err("const a = 1;");
    parse_err("let a = 1;");
    parse_err("with (o) {}");
}

#[test]
fn nesting_limit_message() {
    let options = ParserOptions {
        max_nesting: 3,
        ..ParserOptions::default()
    };
    let source = "function a() { function b() { function c() { function d() {} } } }";
    let err = parse(Source::from_bytes(source), options).unwrap_err();
    assert_eq!(
        err.message(),
        "The maximum function nesting level is \"3\""
    );
}

#[test]
fn module_declarations_gated_by_option() {
    parse_err("import fs from 'fs';");
    let options = ParserOptions {
        module: true,
        ..ParserOptions::default()
    };
    parse(Source::from_bytes("import fs from 'fs';"), options).unwrap();
    parse(Source::from_bytes("export default 40 + 2;"), options).unwrap();
}

#[test]
fn restricted_productions() {
    // `return` followed by a newline returns undefined.
    parse_ok(indoc! {r#"
        function f() {
            return
            1;
        }
    "#});
    parse_err("throw\nnew Error('x');");
    // A newline before `++` binds it to the next statement.
    parse_ok("var a = 1; var b = 2;\na\n++b;");
}

#[test]
fn switch_single_default() {
    parse_ok("switch (x) { case 1: break; default: break; }");
    parse_err("switch (x) { default: break; default: break; }");
}
