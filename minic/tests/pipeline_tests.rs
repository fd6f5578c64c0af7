//! End-to-end pipeline tests: source in, observable behavior out. The TAC is
//! executed by the shared evaluator under the same flat storage model the
//! emitted assembly uses.

mod common;
use common::{compile, run_and_capture};

use minic::pipeline::{compile_source, PipelineError};

#[test]
fn constant_folding_free_arithmetic() {
    // 2 + 3 * 4 respects precedence
    let printed = run_and_capture("int a;\na = 2 + 3 * 4;\nprint(a);\n");
    assert_eq!(printed, vec![14]);
}

#[test]
fn parenthesized_arithmetic() {
    let printed = run_and_capture("int a;\na = (10 - 2) * (3 + 2);\nprint(a);\n");
    assert_eq!(printed, vec![40]);
}

#[test]
fn while_loop_counts_up() {
    let printed =
        run_and_capture("int i;\ni = 0;\nwhile (i < 3) { print(i); i = i + 1; }\n");
    assert_eq!(printed, vec![0, 1, 2]);
}

#[test]
fn array_sum() {
    let printed = run_and_capture(
        "int arr[5];
         int i;
         int s;
         arr[0] = 10; arr[1] = 20; arr[2] = 30; arr[3] = 40; arr[4] = 50;
         s = 0;
         i = 0;
         while (i < 5) { s = s + arr[i]; i = i + 1; }
         print(s);",
    );
    assert_eq!(printed, vec![150]);
}

#[test]
fn function_call_with_arguments() {
    let printed = run_and_capture(
        "int add(int a, int b) { return a + b; }
         int main() { print(add(5, 10)); return 0; }",
    );
    assert_eq!(printed, vec![15]);
}

#[test]
fn semantic_error_halts_before_emission() {
    let err = compile_source("int x;\nx = y + 1;\n").unwrap_err();
    let PipelineError::Semantic(diagnostics) = err else {
        panic!("expected semantic failure");
    };
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("'y'"));
    assert_eq!(diagnostics[0].line, 2);
}

#[test]
fn parse_error_halts_the_pipeline() {
    let err = compile_source("int x\nx = 1;\n").unwrap_err();
    assert!(matches!(err, PipelineError::Parse(_)));
}

#[test]
fn empty_source_compiles_to_an_empty_module() {
    let output = compile("");
    assert!(output.tac.is_empty());
    assert!(output.asm.contains("main:"));
}

#[test]
fn factorial_via_while() {
    let printed = run_and_capture(
        "int factorial(int n) {
             int result;
             int i;
             result = 1;
             i = 1;
             while (i <= n) {
                 result = result * i;
                 i = i + 1;
             }
             return result;
         }
         int main() { print(factorial(5)); return 0; }",
    );
    assert_eq!(printed, vec![120]);
}

#[test]
fn nested_function_calls() {
    let printed = run_and_capture(
        "int add(int a, int b) { return a + b; }
         int multiply(int x, int y) { return x * y; }
         int main() { print(add(multiply(2, 3), multiply(4, 5))); return 0; }",
    );
    assert_eq!(printed, vec![26]);
}

#[test]
fn void_function_called_for_effect() {
    let printed = run_and_capture(
        "void greet() { print(7); }
         int main() { greet(); return 0; }",
    );
    assert_eq!(printed, vec![7]);
}

#[test]
fn nested_loops_with_do_while() {
    let printed = run_and_capture(
        "int main() {
             int i;
             int j;
             int sum;
             sum = 0;
             for (i = 1; i <= 3; i = i + 1;) {
                 for (j = 1; j <= 2; j = j + 1;) {
                     sum = sum + 1;
                 }
             }
             print(sum);
             int k;
             k = 0;
             while (k < 2) {
                 int m;
                 m = 0;
                 do {
                     sum = sum + 1;
                     m = m + 1;
                 } while (m < 2);
                 k = k + 1;
             }
             print(sum);
             return 0;
         }",
    );
    assert_eq!(printed, vec![6, 10]);
}

#[test]
fn do_while_runs_at_least_once() {
    let printed = run_and_capture(
        "int i;
         i = 10;
         do { print(i); i = i + 1; } while (i < 5);",
    );
    assert_eq!(printed, vec![10]);
}

#[test]
fn if_else_branches() {
    let printed = run_and_capture(
        "int x;
         x = 3;
         if (x % 2 == 0) { print(0); } else { print(1); }
         if (x > 0) { print(x); }",
    );
    assert_eq!(printed, vec![1, 3]);
}

#[test]
fn modulo_and_division() {
    let printed = run_and_capture(
        "int a;
         a = 10;
         print(a / 3);
         print(a % 3);
         print(10 + 5 * 2 - 8 / 4);",
    );
    assert_eq!(printed, vec![3, 1, 18]);
}

#[test]
fn globals_initialized_before_user_main_body() {
    let printed = run_and_capture(
        "int base;
         base = 100;
         int bump(int n) { return base + n; }
         int main() { print(bump(5)); return 0; }",
    );
    assert_eq!(printed, vec![105]);
}

#[test]
fn api_entry_points_agree_with_the_pipeline() {
    let src = "int x;\nx = 1;\nprint(x);\n";
    let asm = minic::compile_to_asm_str(src).expect("asm");
    assert!(asm.contains("call printf"));

    let tac = minic::compile_to_tac_str(src).expect("tac listing");
    assert!(tac.contains("LOAD_CONST"));
    assert!(tac.contains("PRINT"));

    let json = minic::compile_to_tac_json_str(src).expect("tac json");
    let parsed: minic::tac::TacProgram = serde_json::from_str(&json).expect("round trip");
    assert_eq!(parsed.len(), 3);

    let diags = minic::analyze_str("int x;\nx = y;\n").expect("analysis");
    assert_eq!(diags.len(), 1);
}
