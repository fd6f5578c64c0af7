//! Compilation pipeline
//!
//! Source text → parse → declaration collection → semantic analysis → TAC →
//! assembly. Each phase halts the pipeline when it reports errors; semantic
//! diagnostics are carried in the error so the driver can print all of them.

use thiserror::Error;

use minic_parser::ast::Program;
use minic_parser::{parse, ParseError};

use crate::codegen;
use crate::semantic::{analyze, populate_symbol_table, Diagnostic};
use crate::symtab::SymbolTable;
use crate::tac::{generate, TacProgram};

/// Error variants produced by the compile pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source code failed to lex or parse
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Semantic analysis reported errors; the payload carries all of them
    #[error("{} semantic error(s)", .0.len())]
    Semantic(Vec<Diagnostic>),

    /// Writing the assembly stream failed
    #[error("emit error: {0}")]
    Emit(#[from] std::io::Error),
}

/// Result of a successful compilation
#[derive(Debug)]
pub struct CompileOutput {
    pub asm: String,
    pub tac: TacProgram,
    pub symtab: SymbolTable,
}

/// Parse and analyze only; returns the tree, the populated table and any
/// diagnostics. Used by the driver for `--dump-symbols` and by tests.
pub fn analyze_source(
    source: &str,
) -> Result<(Program, SymbolTable, Vec<Diagnostic>), ParseError> {
    let program = parse(source)?;
    let mut symtab = SymbolTable::new();
    populate_symbol_table(&program, &mut symtab);
    let diagnostics = analyze(&program, &mut symtab);
    Ok((program, symtab, diagnostics))
}

/// Run the whole pipeline on one source file
pub fn compile_source(source: &str) -> Result<CompileOutput, PipelineError> {
    let (program, symtab, diagnostics) = analyze_source(source)?;
    if !diagnostics.is_empty() {
        return Err(PipelineError::Semantic(diagnostics));
    }

    let tac = generate(&program);
    let asm = codegen::emit_to_string(&symtab, &tac)?;

    Ok(CompileOutput { asm, tac, symtab })
}
