//! String-in, string-out entry points for programmatic use

use crate::pipeline::{compile_source, PipelineError};
use crate::semantic::Diagnostic;

/// Compile source text to the assembly module
pub fn compile_to_asm_str(source: &str) -> Result<String, PipelineError> {
    compile_source(source).map(|output| output.asm)
}

/// Compile source text to the readable TAC listing
pub fn compile_to_tac_str(source: &str) -> Result<String, PipelineError> {
    compile_source(source).map(|output| output.tac.to_string())
}

/// Compile source text to the TAC as JSON
pub fn compile_to_tac_json_str(source: &str) -> Result<String, PipelineError> {
    let output = compile_source(source)?;
    serde_json::to_string_pretty(&output.tac)
        .map_err(|e| PipelineError::Emit(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Analyze source text, returning every semantic diagnostic (empty when the
/// program is well-formed). Parse errors still fail.
pub fn analyze_str(source: &str) -> Result<Vec<Diagnostic>, PipelineError> {
    let (_, _, diagnostics) = crate::pipeline::analyze_source(source)?;
    Ok(diagnostics)
}
