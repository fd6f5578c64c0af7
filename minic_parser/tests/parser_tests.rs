//! Parser integration tests: one construct per test, plus error cases

use pretty_assertions::assert_eq;

use minic_parser::ast::{BinOp, Expr, RelOp, Stmt, TypeName};
use minic_parser::{parse, ParseError};

fn parse_items(src: &str) -> Vec<Stmt> {
    parse(src).expect("parse failed").items
}

fn parse_one(src: &str) -> Stmt {
    let mut items = parse_items(src);
    assert_eq!(items.len(), 1, "expected exactly one item");
    items.remove(0)
}

#[test]
fn empty_source_parses_to_empty_program() {
    let program = parse("").expect("parse failed");
    assert!(program.is_empty());
}

#[test]
fn scalar_and_array_declarations() {
    let items = parse_items("int x;\nint arr[10];\n");
    assert!(matches!(&items[0], Stmt::Declaration { name, .. } if name == "x"));
    assert!(matches!(
        &items[1],
        Stmt::ArrayDeclaration { name, size: 10, .. } if name == "arr"
    ));
}

#[test]
fn assignment_with_precedence() {
    // 2 + 3 * 4 must parse as 2 + (3 * 4)
    let stmt = parse_one("a = 2 + 3 * 4;");
    let Stmt::Assignment { target, value, .. } = stmt else {
        panic!("expected assignment, got {:?}", stmt);
    };
    assert_eq!(target, "a");
    let Expr::Binary {
        op: BinOp::Add,
        right,
        ..
    } = value
    else {
        panic!("expected addition at the top");
    };
    assert!(matches!(*right, Expr::Binary { op: BinOp::Mul, .. }));
}

#[test]
fn parentheses_override_precedence() {
    let stmt = parse_one("a = (2 + 3) * 4;");
    let Stmt::Assignment { value, .. } = stmt else {
        panic!("expected assignment");
    };
    let Expr::Binary {
        op: BinOp::Mul,
        left,
        ..
    } = value
    else {
        panic!("expected multiplication at the top");
    };
    assert!(matches!(*left, Expr::Binary { op: BinOp::Add, .. }));
}

#[test]
fn relational_operators_parse() {
    for (src, op) in [
        ("a = x < y;", RelOp::Lt),
        ("a = x > y;", RelOp::Gt),
        ("a = x <= y;", RelOp::Le),
        ("a = x >= y;", RelOp::Ge),
        ("a = x == y;", RelOp::Eq),
        ("a = x != y;", RelOp::Ne),
    ] {
        let Stmt::Assignment { value, .. } = parse_one(src) else {
            panic!("expected assignment for {src}");
        };
        assert!(
            matches!(value, Expr::Relational { op: got, .. } if got == op),
            "wrong operator for {src}"
        );
    }
}

#[test]
fn array_store_and_access() {
    let stmt = parse_one("arr[i + 1] = arr[i] + 2;");
    let Stmt::ArrayStore {
        array,
        index,
        value,
        ..
    } = stmt
    else {
        panic!("expected array store");
    };
    assert_eq!(array, "arr");
    assert!(matches!(index, Expr::Binary { op: BinOp::Add, .. }));
    let Expr::Binary { left, .. } = value else {
        panic!("expected addition on the right");
    };
    assert!(matches!(*left, Expr::ArrayAccess { .. }));
}

#[test]
fn while_loop_with_braced_body() {
    let stmt = parse_one("while (i < 3) { print(i); i = i + 1; }");
    let Stmt::While {
        condition, body, ..
    } = stmt
    else {
        panic!("expected while");
    };
    assert!(matches!(condition, Expr::Relational { op: RelOp::Lt, .. }));
    assert_eq!(body.len(), 2);
}

#[test]
fn while_loop_with_single_statement_body() {
    let stmt = parse_one("while (i < 3) i = i + 1;");
    let Stmt::While { body, .. } = stmt else {
        panic!("expected while");
    };
    assert_eq!(body.len(), 1);
}

#[test]
fn if_with_and_without_else() {
    let stmt = parse_one("if (x == 0) { print(x); }");
    assert!(matches!(
        stmt,
        Stmt::If {
            else_branch: None,
            ..
        }
    ));

    let stmt = parse_one("if (x == 0) { print(x); } else { print(y); }");
    let Stmt::If {
        else_branch: Some(else_branch),
        ..
    } = stmt
    else {
        panic!("expected if/else");
    };
    assert_eq!(else_branch.len(), 1);
}

#[test]
fn for_loop_accepts_optional_trailing_semicolon_in_step() {
    for src in [
        "for (i = 0; i < 3; i = i + 1) { print(i); }",
        "for (i = 0; i < 3; i = i + 1;) { print(i); }",
    ] {
        let Stmt::For {
            init,
            condition,
            step,
            body,
            ..
        } = parse_one(src)
        else {
            panic!("expected for in {src}");
        };
        assert!(matches!(*init, Stmt::Assignment { .. }));
        assert!(matches!(condition, Expr::Relational { .. }));
        assert!(matches!(*step, Stmt::Assignment { .. }));
        assert_eq!(body.len(), 1);
    }
}

#[test]
fn do_while_loop() {
    let stmt = parse_one("do { s = s + 1; } while (s < 2);");
    let Stmt::DoWhile {
        body, condition, ..
    } = stmt
    else {
        panic!("expected do-while");
    };
    assert_eq!(body.len(), 1);
    assert!(matches!(condition, Expr::Relational { op: RelOp::Lt, .. }));
}

#[test]
fn function_declaration_and_definition() {
    let items = parse_items("int add(int a, int b);\nint add(int a, int b) { return a + b; }\n");

    let Stmt::FunctionDecl {
        return_type,
        name,
        params,
        ..
    } = &items[0]
    else {
        panic!("expected prototype");
    };
    assert_eq!(*return_type, TypeName::Int);
    assert_eq!(name, "add");
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].name, "a");

    let Stmt::FunctionDef { body, .. } = &items[1] else {
        panic!("expected definition");
    };
    assert!(matches!(body[0], Stmt::Return { value: Some(_), .. }));
}

#[test]
fn void_function_and_empty_parameter_lists() {
    let items = parse_items("void hello() { print(1); }\nvoid other(void) { return; }\n");
    for item in &items {
        let Stmt::FunctionDef {
            return_type,
            params,
            ..
        } = item
        else {
            panic!("expected definition");
        };
        assert_eq!(*return_type, TypeName::Void);
        assert!(params.is_empty());
    }
}

#[test]
fn call_statement_and_nested_call_expression() {
    let items = parse_items("foo(1, 2);\nx = add(multiply(2, 3), 4);\n");
    let Stmt::Call { callee, args, .. } = &items[0] else {
        panic!("expected call statement");
    };
    assert_eq!(callee, "foo");
    assert_eq!(args.len(), 2);

    let Stmt::Assignment { value, .. } = &items[1] else {
        panic!("expected assignment");
    };
    let Expr::Call { args, .. } = value else {
        panic!("expected call expression");
    };
    assert!(matches!(args[0], Expr::Call { .. }));
}

#[test]
fn spans_record_source_lines() {
    let items = parse_items("int x;\n\nx = 1;\nprint(x);\n");
    assert_eq!(items[0].line(), 1);
    assert_eq!(items[1].line(), 3);
    assert_eq!(items[2].line(), 4);
}

#[test]
fn ast_round_trips_through_json() {
    let program = parse("int f(int n) { if (n > 1) { return n; } return 1; }").unwrap();
    let json = serde_json::to_string(&program).expect("serialize");
    let back: minic_parser::Program = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(program, back);
}

#[test]
fn error_on_missing_semicolon() {
    let err = parse("int x").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedEof { .. }));
}

#[test]
fn error_on_unexpected_token() {
    let err = parse("int 5;").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedToken { .. }));
}

#[test]
fn error_on_void_variable() {
    let err = parse("void x;").unwrap_err();
    assert!(matches!(err, ParseError::InvalidSyntax { .. }));
}

#[test]
fn error_on_nested_function_definition() {
    let err = parse("int f() { int g() { return 1; } return 1; }").unwrap_err();
    assert!(matches!(err, ParseError::InvalidSyntax { .. }));
}

#[test]
fn error_reports_line_number() {
    let err = parse("int x;\nx = ;\n").unwrap_err();
    assert_eq!(err.line(), 2);
}

#[test]
fn lexical_error_surfaces_through_parse() {
    let err = parse("int x;\nx = 1 @ 2;\n").unwrap_err();
    assert!(matches!(err, ParseError::LexerError { .. }));
    assert_eq!(err.line(), 2);
}
