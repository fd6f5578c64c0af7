// Library code reports through return values and diagnostic collections;
// only the CLI binary may print to stderr.
#![deny(clippy::print_stderr)]

// Core back-end phases
pub mod codegen;
pub mod semantic;
pub mod symtab;
pub mod tac;

// Pipeline: parse, analyze and lower MiniC source
pub mod pipeline;
pub use pipeline::{compile_source, CompileOutput, PipelineError};

// Rust API for programmatic use
pub mod api;
pub use api::{analyze_str, compile_to_asm_str, compile_to_tac_json_str, compile_to_tac_str};

// Front end re-export
pub use minic_parser as parser;
