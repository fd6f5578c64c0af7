//! MiniC compiler CLI
//!
//! Usage:
//!   minicc input.src
//!   minicc input.src -o output.asm
//!   minicc input.src --emit-tac
//!   minicc input.src --dump-symbols

use std::env;
use std::fs;
use std::path::Path;
use std::process;

use minic::pipeline::{analyze_source, PipelineError};
use minic::compile_source;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command-line arguments
#[derive(Debug, Default)]
struct Args {
    /// Input file path
    input_file: Option<String>,
    /// Output file path
    output_file: Option<String>,
    /// Print the TAC listing to stdout
    emit_tac: bool,
    /// Print the TAC as JSON to stdout
    emit_tac_json: bool,
    /// Print the symbol table to stdout
    dump_symbols: bool,
    /// Show help
    show_help: bool,
    /// Show version
    show_version: bool,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut parsed = Args::default();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "-h" | "--help" => parsed.show_help = true,
                "-v" | "--version" => parsed.show_version = true,
                "-o" | "--output" => {
                    i += 1;
                    if i < args.len() {
                        parsed.output_file = Some(args[i].clone());
                    }
                }
                "--emit-tac" => parsed.emit_tac = true,
                "--emit-tac-json" => parsed.emit_tac_json = true,
                "--dump-symbols" => parsed.dump_symbols = true,
                arg if !arg.starts_with('-') => {
                    if parsed.input_file.is_none() {
                        parsed.input_file = Some(arg.to_string());
                    }
                }
                _ => {
                    eprintln!("Unknown option: {}", args[i]);
                }
            }
            i += 1;
        }

        parsed
    }
}

fn print_help() {
    println!(
        r#"MiniC Compiler v{}

USAGE:
    minicc [OPTIONS] <input.src>

OPTIONS:
    -h, --help        Show this help message
    -v, --version     Show version information
    -o, --output      Output file path (default: <input>.asm)
    --emit-tac        Print the three-address code listing to stdout
    --emit-tac-json   Print the three-address code as JSON to stdout
    --dump-symbols    Print the symbol table to stdout

EXAMPLES:
    minicc program.src
    minicc program.src -o program.asm
    minicc program.src --emit-tac

GENERATED CODE:
    The output is a NASM-syntax x86-64 module. To assemble and link:

    nasm -f elf64 program.asm -o program.o
    gcc program.o -o program -no-pie
    ./program
"#,
        VERSION
    );
}

fn main() {
    let args = Args::parse();

    if args.show_help {
        print_help();
        return;
    }
    if args.show_version {
        println!("MiniC Compiler v{}", VERSION);
        return;
    }

    let Some(input_file) = args.input_file else {
        eprintln!("Error: No input file provided");
        eprintln!("Use --help for usage information");
        process::exit(1);
    };

    let source = fs::read_to_string(&input_file).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", input_file, e);
        process::exit(1);
    });

    let output_file = args.output_file.unwrap_or_else(|| {
        let stem = Path::new(&input_file)
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy();
        format!("{}.asm", stem)
    });

    if args.dump_symbols {
        match analyze_source(&source) {
            Ok((_, symtab, _)) => println!("{}", symtab),
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
    }

    let output = match compile_source(&source) {
        Ok(output) => output,
        Err(PipelineError::Semantic(diagnostics)) => {
            for diagnostic in &diagnostics {
                eprintln!("{}", diagnostic);
            }
            eprintln!(
                "Compilation failed: {} semantic error(s)",
                diagnostics.len()
            );
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Compilation failed: {}", e);
            process::exit(1);
        }
    };

    if args.emit_tac {
        print!("{}", output.tac);
    }
    if args.emit_tac_json {
        match serde_json::to_string_pretty(&output.tac) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing TAC: {}", e);
                process::exit(1);
            }
        }
    }

    if let Err(e) = fs::write(&output_file, &output.asm) {
        eprintln!("Error writing output file '{}': {}", output_file, e);
        process::exit(1);
    }
    println!("Generated: {}", output_file);
}
