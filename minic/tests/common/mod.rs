//! Shared helpers for integration tests
// This helper module is consumed selectively by several integration test
// files; keep the utilities available without requiring every test target to
// reference each one.
#![allow(dead_code)]

use std::collections::HashMap;

use minic::pipeline::{compile_source, CompileOutput};
use minic::symtab::SymbolTable;
use minic::tac::{Opcode, TacProgram};

/// Compile source, panicking on any pipeline error
pub fn compile(src: &str) -> CompileOutput {
    compile_source(src).unwrap_or_else(|e| panic!("pipeline error: {}", e))
}

/// Compile source and interpret the TAC, returning the printed values
pub fn run_and_capture(src: &str) -> Vec<i64> {
    let output = compile(src);
    interpret(&output.tac, &output.symtab)
}

/// Execute a TAC program under the same storage model the emitter uses: a
/// flat cell per scalar name, one block per array, parameters bound by name.
/// Returns everything PRINT produced.
pub fn interpret(tac: &TacProgram, symtab: &SymbolTable) -> Vec<i64> {
    TacMachine::new(tac, symtab).run()
}

const STEP_LIMIT: usize = 1_000_000;

struct TacMachine<'t> {
    tac: &'t TacProgram,
    symtab: &'t SymbolTable,
    memory: HashMap<String, i64>,
    arrays: HashMap<String, Vec<i64>>,
    labels: HashMap<&'t str, usize>,
    functions: HashMap<&'t str, usize>,
    params: Vec<i64>,
    output: Vec<i64>,
    steps: usize,
}

impl<'t> TacMachine<'t> {
    fn new(tac: &'t TacProgram, symtab: &'t SymbolTable) -> Self {
        let mut labels = HashMap::new();
        let mut functions = HashMap::new();
        for (i, instr) in tac.instrs.iter().enumerate() {
            let target = instr.label.as_deref().unwrap_or_default();
            match instr.opcode {
                Opcode::Label => {
                    labels.insert(target, i);
                }
                Opcode::FunctionLabel => {
                    functions.insert(target, i);
                }
                _ => {}
            }
        }

        let mut arrays = HashMap::new();
        for symbol in symtab.iter() {
            if symbol.is_array {
                arrays.insert(symbol.name.clone(), vec![0i64; symbol.array_size]);
            }
        }

        Self {
            tac,
            symtab,
            memory: HashMap::new(),
            arrays,
            labels,
            functions,
            params: Vec::new(),
            output: Vec::new(),
            steps: 0,
        }
    }

    fn run(mut self) -> Vec<i64> {
        // Top-level stream first, then the user main region when present;
        // this mirrors the emitter's entry-point layout.
        self.exec(0);
        if let Some(&start) = self.functions.get("main") {
            self.exec(start + 1);
        }
        self.output
    }

    fn load(&self, name: &str) -> i64 {
        self.memory.get(name).copied().unwrap_or(0)
    }

    fn store(&mut self, name: &str, value: i64) {
        self.memory.insert(name.to_string(), value);
    }

    /// Execute from `pc` until a return, a function boundary, or the end of
    /// the stream. Returns the RETURN payload, if any.
    fn exec(&mut self, mut pc: usize) -> Option<i64> {
        while pc < self.tac.instrs.len() {
            self.steps += 1;
            assert!(self.steps < STEP_LIMIT, "TAC interpreter ran away");

            let instr = &self.tac.instrs[pc];
            let result = instr.result.as_deref().unwrap_or_default();
            let op1 = instr.op1.as_deref().unwrap_or_default();
            let op2 = instr.op2.as_deref().unwrap_or_default();
            let label = instr.label.as_deref().unwrap_or_default();

            match instr.opcode {
                Opcode::LoadConst => {
                    let value: i64 = op1.parse().expect("bad LOAD_CONST literal");
                    self.store(result, value);
                }
                Opcode::Assign => {
                    let value = self.load(op1);
                    self.store(result, value);
                }
                Opcode::Add => {
                    let value = self.load(op1) + self.load(op2);
                    self.store(result, value);
                }
                Opcode::Sub => {
                    let value = self.load(op1) - self.load(op2);
                    self.store(result, value);
                }
                Opcode::Mul => {
                    let value = self.load(op1) * self.load(op2);
                    self.store(result, value);
                }
                Opcode::Div => {
                    let value = self.load(op1) / self.load(op2);
                    self.store(result, value);
                }
                Opcode::Mod => {
                    let value = self.load(op1) % self.load(op2);
                    self.store(result, value);
                }
                Opcode::Relop => {
                    let left = self.load(op1);
                    let right = self.load(op2);
                    let holds = match label {
                        "<" => left < right,
                        ">" => left > right,
                        "<=" => left <= right,
                        ">=" => left >= right,
                        "==" => left == right,
                        "!=" => left != right,
                        other => panic!("bad RELOP operator {:?}", other),
                    };
                    self.store(result, i64::from(holds));
                }
                Opcode::Print => {
                    let value = self.load(op1);
                    self.output.push(value);
                }
                Opcode::Label => {}
                Opcode::Goto => {
                    pc = self.labels[label];
                    continue;
                }
                Opcode::IfFalse => {
                    if self.load(op1) == 0 {
                        pc = self.labels[label];
                        continue;
                    }
                }
                Opcode::ArrayLoad => {
                    let index = self.load(op2) as usize;
                    let value = self.arrays[op1][index];
                    self.store(result, value);
                }
                Opcode::ArrayStore => {
                    let index = self.load(op1) as usize;
                    let value = self.load(op2);
                    self.arrays.get_mut(result).expect("unknown array")[index] = value;
                }
                Opcode::FunctionLabel => {
                    // Fell off the preceding region
                    return None;
                }
                Opcode::Param => {
                    let value = self.load(op1);
                    self.params.push(value);
                }
                Opcode::Call => {
                    let argc: usize = op1.parse().expect("bad CALL arg count");
                    let args: Vec<i64> = self.params.split_off(self.params.len() - argc);
                    let names = self
                        .symtab
                        .lookup(label)
                        .map(|s| s.param_names.clone())
                        .unwrap_or_default();
                    for (name, value) in names.iter().zip(&args) {
                        self.store(name, *value);
                    }
                    let entry = self.functions[label];
                    let returned = self.exec(entry + 1).unwrap_or(0);
                    self.store(result, returned);
                }
                Opcode::Return => {
                    return Some(self.load(op1));
                }
                Opcode::ReturnVoid => {
                    return None;
                }
            }

            pc += 1;
        }
        None
    }
}
