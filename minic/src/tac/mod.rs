//! Three-address code
//!
//! Linear intermediate representation between the tree and the target
//! emitter. Each instruction is an opcode plus up to three string operands
//! and an auxiliary label field, which doubles as the relational operator
//! text and the call target. Temporaries (`t0, t1, ...`) and labels
//! (`L0, L1, ...`) come from two counters owned by the generator and reset at
//! the start of every generation, so output is deterministic across runs.

mod generate;

pub use generate::{generate, TacGen};

use serde::{Deserialize, Serialize};
use std::fmt;

/// TAC operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opcode {
    LoadConst,
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Relop,
    Print,
    Label,
    Goto,
    IfFalse,
    ArrayLoad,
    ArrayStore,
    FunctionLabel,
    Param,
    Call,
    Return,
    ReturnVoid,
}

impl Opcode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Opcode::LoadConst => "LOAD_CONST",
            Opcode::Assign => "ASSIGN",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::Relop => "RELOP",
            Opcode::Print => "PRINT",
            Opcode::Label => "LABEL",
            Opcode::Goto => "GOTO",
            Opcode::IfFalse => "IF_FALSE",
            Opcode::ArrayLoad => "ARRAY_LOAD",
            Opcode::ArrayStore => "ARRAY_STORE",
            Opcode::FunctionLabel => "FUNCTION",
            Opcode::Param => "PARAM",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::ReturnVoid => "RETURN_VOID",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One TAC instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instr {
    pub opcode: Opcode,
    pub result: Option<String>,
    pub op1: Option<String>,
    pub op2: Option<String>,
    pub label: Option<String>,
}

impl Instr {
    pub fn new(
        opcode: Opcode,
        result: Option<String>,
        op1: Option<String>,
        op2: Option<String>,
        label: Option<String>,
    ) -> Self {
        Self {
            opcode,
            result,
            op1,
            op2,
            label,
        }
    }

    fn field(slot: &Option<String>) -> &str {
        slot.as_deref().unwrap_or("-")
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = Self::field(&self.result);
        let op1 = Self::field(&self.op1);
        let op2 = Self::field(&self.op2);
        let label = Self::field(&self.label);

        match self.opcode {
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Mod => {
                write!(f, "{:<12} {}, {}, {}", self.opcode.as_str(), result, op1, op2)
            }
            Opcode::Relop => {
                write!(f, "{:<12} {}, {} {} {}", self.opcode.as_str(), result, op1, label, op2)
            }
            Opcode::LoadConst | Opcode::Assign => {
                write!(f, "{:<12} {}, {}", self.opcode.as_str(), result, op1)
            }
            Opcode::Print | Opcode::Param | Opcode::Return => {
                write!(f, "{:<12} {}", self.opcode.as_str(), op1)
            }
            Opcode::Label | Opcode::Goto | Opcode::FunctionLabel => {
                write!(f, "{:<12} {}", self.opcode.as_str(), label)
            }
            Opcode::IfFalse => {
                write!(f, "{:<12} {} goto {}", self.opcode.as_str(), op1, label)
            }
            Opcode::ArrayLoad => {
                write!(f, "{:<12} {}, {}[{}]", self.opcode.as_str(), result, op1, op2)
            }
            Opcode::ArrayStore => {
                write!(f, "{:<12} {}[{}], {}", self.opcode.as_str(), result, op1, op2)
            }
            Opcode::Call => {
                write!(f, "{:<12} {}, {}, {} args", self.opcode.as_str(), result, label, op1)
            }
            Opcode::ReturnVoid => write!(f, "{}", self.opcode),
        }
    }
}

/// The generated instruction sequence, in append order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TacProgram {
    pub instrs: Vec<Instr>,
}

impl TacProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instr> {
        self.instrs.iter()
    }

    /// Names of every storage cell referenced as an operand (result, op1 of
    /// value-carrying instructions, op2, and call results). Labels and call
    /// targets are excluded; literal text in `LOAD_CONST` op1 is excluded.
    pub fn operand_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for instr in &self.instrs {
            match instr.opcode {
                Opcode::Label | Opcode::Goto | Opcode::FunctionLabel | Opcode::ReturnVoid => {}
                Opcode::LoadConst => {
                    names.extend(instr.result.as_deref());
                }
                Opcode::Call => {
                    // op1 is the argument count, not a cell
                    names.extend(instr.result.as_deref());
                }
                Opcode::IfFalse | Opcode::Print | Opcode::Param | Opcode::Return => {
                    names.extend(instr.op1.as_deref());
                }
                _ => {
                    names.extend(instr.result.as_deref());
                    names.extend(instr.op1.as_deref());
                    names.extend(instr.op2.as_deref());
                }
            }
        }
        names
    }
}

impl fmt::Display for TacProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instr) in self.instrs.iter().enumerate() {
            writeln!(f, "{:<5} {}", i, instr)?;
        }
        Ok(())
    }
}
