//! x86-64 assembly emission (NASM syntax)
//!
//! Walks the TAC and prints a complete assembly module: read-only data, one
//! uninitialized-data cell per operand name, the `main` entry point and every
//! user function. Every value round-trips through memory; the only registers
//! used are scratch (`rax`, `rbx`) and the divide pair (`rax`/`rdx`), so no
//! state survives between instructions.
//!
//! The TAC stream is partitioned at `FUNCTION_LABEL` boundaries: everything
//! before the first one is the top-level stream, each region runs to the next
//! `FUNCTION_LABEL` or the end. When the user defines `main`, the synthetic
//! entry is suppressed and the top-level stream runs right after the user
//! `main` prologue, keeping exactly one `main` label in the module.

use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::symtab::{SymbolKind, SymbolTable};
use crate::tac::{Instr, Opcode, TacProgram};

/// Size of the reserved temporary pool. The pool is fixed regardless of how
/// many temporaries the generator actually produced; it only grows when a
/// program references a temporary past the end.
pub const TEMP_POOL_SIZE: usize = 100;

/// Bytes of local scratch reserved by every function prologue
const FUNCTION_LOCAL_BYTES: usize = 64;

/// Emit the complete assembly module for `tac` into `out`
pub fn emit<W: Write>(out: W, symtab: &SymbolTable, tac: &TacProgram) -> io::Result<()> {
    Emitter::new(out, symtab).emit(tac)
}

/// Emit into a string; used by the pipeline and tests
pub fn emit_to_string(symtab: &SymbolTable, tac: &TacProgram) -> io::Result<String> {
    let mut buffer = Vec::new();
    emit(&mut buffer, symtab, tac)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// A `FUNCTION_LABEL`-delimited slice of the TAC stream
struct Region<'t> {
    name: &'t str,
    /// Body instructions, the `FUNCTION_LABEL` itself excluded
    body: &'t [Instr],
}

struct Emitter<'a, W: Write> {
    out: W,
    symtab: &'a SymbolTable,
    /// Operands of the PARAM group currently being collected; flushed as
    /// pushes when the matching CALL arrives
    pending_params: Vec<String>,
}

impl<'a, W: Write> Emitter<'a, W> {
    fn new(out: W, symtab: &'a SymbolTable) -> Self {
        Self {
            out,
            symtab,
            pending_params: Vec::new(),
        }
    }

    fn emit(&mut self, tac: &TacProgram) -> io::Result<()> {
        let (top, regions) = partition(tac);
        let user_main = regions.iter().any(|r| r.name == "main");

        self.emit_header()?;
        self.emit_data()?;
        self.emit_bss(tac)?;

        writeln!(self.out, "section .text")?;
        writeln!(self.out, "    global main")?;
        writeln!(self.out, "    extern printf")?;
        writeln!(self.out)?;

        if user_main {
            for region in &regions {
                let inject = if region.name == "main" { top } else { &[] };
                self.emit_region(region, inject)?;
            }
        } else {
            self.emit_entry(top)?;
            for region in &regions {
                self.emit_region(region, &[])?;
            }
        }

        Ok(())
    }

    // ==================== Sections ====================

    fn emit_header(&mut self) -> io::Result<()> {
        writeln!(self.out, "; MiniC generated assembly")?;
        writeln!(self.out, "; Target: x86-64, System V AMD64 ABI")?;
        writeln!(self.out)?;
        writeln!(
            self.out,
            "section .note.GNU-stack noalloc noexec nowrite progbits"
        )?;
        writeln!(self.out)
    }

    fn emit_data(&mut self) -> io::Result<()> {
        writeln!(self.out, "section .data")?;
        writeln!(self.out, "    fmt_int: db \"%ld\", 10, 0")?;
        writeln!(self.out)
    }

    /// One word per scalar, `array_size` words per array, then the temporary
    /// pool. Names are deduplicated across scopes (widest wins) and emitted
    /// in sorted order so output is stable.
    fn emit_bss(&mut self, tac: &TacProgram) -> io::Result<()> {
        let mut cells: BTreeMap<&str, usize> = BTreeMap::new();
        for symbol in self.symtab.iter() {
            if symbol.kind != SymbolKind::Variable {
                continue;
            }
            let words = cells.entry(symbol.name.as_str()).or_insert(0);
            *words = (*words).max(symbol.storage_words());
        }

        writeln!(self.out, "section .bss")?;
        for (name, words) in &cells {
            writeln!(self.out, "    {}: resq {}", name, words)?;
        }

        let pool = temp_pool_size(tac);
        for i in 0..pool {
            let name = format!("t{}", i);
            if !cells.contains_key(name.as_str()) {
                writeln!(self.out, "    {}: resq 1", name)?;
            }
        }
        writeln!(self.out)
    }

    // ==================== Entry point and functions ====================

    /// Synthetic entry: standard prologue, the top-level stream, an epilogue
    /// returning zero
    fn emit_entry(&mut self, top: &[Instr]) -> io::Result<()> {
        writeln!(self.out, "main:")?;
        writeln!(self.out, "    push rbp")?;
        writeln!(self.out, "    mov rbp, rsp")?;
        writeln!(self.out)?;

        for instr in top {
            self.emit_instr(instr)?;
        }

        self.emit_exit_epilogue()
    }

    fn emit_region(&mut self, region: &Region<'_>, inject: &[Instr]) -> io::Result<()> {
        self.pending_params.clear();

        writeln!(self.out, "; function {}", region.name)?;
        writeln!(self.out, "{}:", region.name)?;
        writeln!(self.out, "    push rbp")?;
        writeln!(self.out, "    mov rbp, rsp")?;
        writeln!(self.out, "    sub rsp, {}", FUNCTION_LOCAL_BYTES)?;
        self.emit_param_copies(region.name)?;
        writeln!(self.out)?;

        for instr in inject {
            self.emit_instr(instr)?;
        }
        for instr in region.body {
            self.emit_instr(instr)?;
        }

        // Guard against falling through into the next function when a body
        // does not end in a return
        let falls_through = !matches!(
            region.body.last().map(|i| i.opcode),
            Some(Opcode::Return) | Some(Opcode::ReturnVoid)
        );
        if falls_through {
            if region.name == "main" {
                self.emit_exit_epilogue()?;
            } else {
                writeln!(self.out, "    mov rsp, rbp")?;
                writeln!(self.out, "    pop rbp")?;
                writeln!(self.out, "    ret")?;
                writeln!(self.out)?;
            }
        }
        Ok(())
    }

    /// Copy stack arguments into their named parameter cells. Arguments were
    /// pushed in source order, so parameter i of n sits at
    /// `[rbp + 16 + 8*(n-1-i)]`.
    fn emit_param_copies(&mut self, function: &str) -> io::Result<()> {
        let Some(symbol) = self.symtab.lookup(function) else {
            return Ok(());
        };
        let n = symbol.param_count();
        for (i, name) in symbol.param_names.iter().enumerate() {
            let offset = 16 + 8 * (n - 1 - i);
            writeln!(self.out, "    mov rax, [rbp + {}]", offset)?;
            writeln!(self.out, "    mov [{}], rax", name)?;
        }
        Ok(())
    }

    fn emit_exit_epilogue(&mut self) -> io::Result<()> {
        writeln!(self.out, "    mov rsp, rbp")?;
        writeln!(self.out, "    pop rbp")?;
        writeln!(self.out, "    mov rax, 0")?;
        writeln!(self.out, "    ret")?;
        writeln!(self.out)
    }

    // ==================== Per-instruction emission ====================

    fn emit_instr(&mut self, instr: &Instr) -> io::Result<()> {
        let result = instr.result.as_deref().unwrap_or_default();
        let op1 = instr.op1.as_deref().unwrap_or_default();
        let op2 = instr.op2.as_deref().unwrap_or_default();
        let label = instr.label.as_deref().unwrap_or_default();

        match instr.opcode {
            Opcode::LoadConst => {
                writeln!(self.out, "    ; {} = {}", result, op1)?;
                writeln!(self.out, "    mov rax, {}", op1)?;
                writeln!(self.out, "    mov [{}], rax", result)?;
                writeln!(self.out)
            }

            Opcode::Assign => {
                writeln!(self.out, "    ; {} = {}", result, op1)?;
                writeln!(self.out, "    mov rax, [{}]", op1)?;
                writeln!(self.out, "    mov [{}], rax", result)?;
                writeln!(self.out)
            }

            Opcode::Add | Opcode::Sub | Opcode::Mul => {
                let (mnemonic, text) = match instr.opcode {
                    Opcode::Add => ("add", "+"),
                    Opcode::Sub => ("sub", "-"),
                    _ => ("imul", "*"),
                };
                writeln!(self.out, "    ; {} = {} {} {}", result, op1, text, op2)?;
                writeln!(self.out, "    mov rax, [{}]", op1)?;
                writeln!(self.out, "    {} rax, [{}]", mnemonic, op2)?;
                writeln!(self.out, "    mov [{}], rax", result)?;
                writeln!(self.out)
            }

            Opcode::Div | Opcode::Mod => {
                let text = if instr.opcode == Opcode::Div { "/" } else { "%" };
                writeln!(self.out, "    ; {} = {} {} {}", result, op1, text, op2)?;
                writeln!(self.out, "    mov rax, [{}]", op1)?;
                writeln!(self.out, "    cqo")?;
                writeln!(self.out, "    mov rbx, [{}]", op2)?;
                writeln!(self.out, "    idiv rbx")?;
                let source = if instr.opcode == Opcode::Div {
                    "rax"
                } else {
                    "rdx"
                };
                writeln!(self.out, "    mov [{}], {}", result, source)?;
                writeln!(self.out)
            }

            Opcode::Relop => {
                let set = match label {
                    "<" => "setl",
                    ">" => "setg",
                    "<=" => "setle",
                    ">=" => "setge",
                    "==" => "sete",
                    _ => "setne",
                };
                writeln!(self.out, "    ; {} = {} {} {}", result, op1, label, op2)?;
                writeln!(self.out, "    mov rax, [{}]", op1)?;
                writeln!(self.out, "    cmp rax, [{}]", op2)?;
                writeln!(self.out, "    {} al", set)?;
                writeln!(self.out, "    movzx rax, al")?;
                writeln!(self.out, "    mov [{}], rax", result)?;
                writeln!(self.out)
            }

            Opcode::Print => {
                writeln!(self.out, "    ; print({})", op1)?;
                writeln!(self.out, "    mov rdi, fmt_int")?;
                writeln!(self.out, "    mov rsi, [{}]", op1)?;
                writeln!(self.out, "    xor rax, rax")?;
                writeln!(self.out, "    call printf")?;
                writeln!(self.out)
            }

            Opcode::Label => writeln!(self.out, "{}:", label),

            Opcode::Goto => {
                writeln!(self.out, "    jmp {}", label)?;
                writeln!(self.out)
            }

            Opcode::IfFalse => {
                writeln!(self.out, "    ; if_false {} goto {}", op1, label)?;
                writeln!(self.out, "    mov rax, [{}]", op1)?;
                writeln!(self.out, "    cmp rax, 0")?;
                writeln!(self.out, "    je {}", label)?;
                writeln!(self.out)
            }

            Opcode::ArrayLoad => {
                writeln!(self.out, "    ; {} = {}[{}]", result, op1, op2)?;
                writeln!(self.out, "    mov rax, [{}]", op2)?;
                writeln!(self.out, "    imul rax, 8")?;
                writeln!(self.out, "    lea rbx, [{}]", op1)?;
                writeln!(self.out, "    add rbx, rax")?;
                writeln!(self.out, "    mov rax, [rbx]")?;
                writeln!(self.out, "    mov [{}], rax", result)?;
                writeln!(self.out)
            }

            Opcode::ArrayStore => {
                writeln!(self.out, "    ; {}[{}] = {}", result, op1, op2)?;
                writeln!(self.out, "    mov rax, [{}]", op1)?;
                writeln!(self.out, "    imul rax, 8")?;
                writeln!(self.out, "    lea rbx, [{}]", result)?;
                writeln!(self.out, "    add rbx, rax")?;
                writeln!(self.out, "    mov rax, [{}]", op2)?;
                writeln!(self.out, "    mov [rbx], rax")?;
                writeln!(self.out)
            }

            // Regions handle their own labels and prologues; a stray
            // FUNCTION_LABEL cannot reach here through the partitioning.
            Opcode::FunctionLabel => Ok(()),

            Opcode::Param => {
                self.pending_params.push(op1.to_string());
                Ok(())
            }

            Opcode::Call => {
                let n: usize = op1.parse().unwrap_or(self.pending_params.len());
                writeln!(self.out, "    ; {} = call {}, {} args", result, label, n)?;
                if n % 2 == 1 {
                    // Keep rsp 16-byte aligned at the call site
                    writeln!(self.out, "    sub rsp, 8")?;
                }
                let params = std::mem::take(&mut self.pending_params);
                for param in &params {
                    writeln!(self.out, "    mov rax, [{}]", param)?;
                    writeln!(self.out, "    push rax")?;
                }
                writeln!(self.out, "    and rsp, -16")?;
                writeln!(self.out, "    call {}", label)?;
                let cleanup = (n + n % 2) * 8;
                if cleanup > 0 {
                    writeln!(self.out, "    add rsp, {}", cleanup)?;
                }
                writeln!(self.out, "    mov [{}], rax", result)?;
                writeln!(self.out)
            }

            Opcode::Return => {
                writeln!(self.out, "    ; return {}", op1)?;
                writeln!(self.out, "    mov rax, [{}]", op1)?;
                writeln!(self.out, "    mov rsp, rbp")?;
                writeln!(self.out, "    pop rbp")?;
                writeln!(self.out, "    ret")?;
                writeln!(self.out)
            }

            Opcode::ReturnVoid => {
                writeln!(self.out, "    ; return")?;
                writeln!(self.out, "    mov rsp, rbp")?;
                writeln!(self.out, "    pop rbp")?;
                writeln!(self.out, "    ret")?;
                writeln!(self.out)
            }
        }
    }
}

/// Split the stream into the top-level segment and the function regions
fn partition(tac: &TacProgram) -> (&[Instr], Vec<Region<'_>>) {
    let instrs = &tac.instrs;
    let first = instrs
        .iter()
        .position(|i| i.opcode == Opcode::FunctionLabel)
        .unwrap_or(instrs.len());

    let top = &instrs[..first];
    let mut regions = Vec::new();
    let mut start = first;
    while start < instrs.len() {
        let name = instrs[start].label.as_deref().unwrap_or_default();
        let end = instrs[start + 1..]
            .iter()
            .position(|i| i.opcode == Opcode::FunctionLabel)
            .map(|p| start + 1 + p)
            .unwrap_or(instrs.len());
        regions.push(Region {
            name,
            body: &instrs[start + 1..end],
        });
        start = end;
    }

    (top, regions)
}

/// Pool covers `t0..t99`, extended if the stream references a higher index
fn temp_pool_size(tac: &TacProgram) -> usize {
    let mut pool = TEMP_POOL_SIZE;
    for name in tac.operand_names() {
        if let Some(rest) = name.strip_prefix('t') {
            if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(index) = rest.parse::<usize>() {
                    pool = pool.max(index + 1);
                }
            }
        }
    }
    pool
}
