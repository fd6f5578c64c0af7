//! Tree to TAC lowering
//!
//! Never fails: well-formedness is the analyzer's responsibility. Each
//! expression lowering returns the name of the storage cell (variable,
//! parameter or temporary) holding its value.

use minic_parser::ast::{BinOp, Expr, Program, Stmt, TypeName};

use super::{Instr, Opcode, TacProgram};

/// Lower a whole program to TAC
pub fn generate(program: &Program) -> TacProgram {
    let mut gen = TacGen::new();
    for item in &program.items {
        gen.lower_stmt(item);
    }
    gen.finish()
}

/// Generator context: the instruction list under construction plus the
/// temporary and label counters. Fresh per compilation.
#[derive(Debug, Default)]
pub struct TacGen {
    instrs: Vec<Instr>,
    temp_count: usize,
    label_count: usize,
}

impl TacGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> TacProgram {
        TacProgram {
            instrs: self.instrs,
        }
    }

    fn new_temp(&mut self) -> String {
        let name = format!("t{}", self.temp_count);
        self.temp_count += 1;
        name
    }

    fn new_label(&mut self) -> String {
        let name = format!("L{}", self.label_count);
        self.label_count += 1;
        name
    }

    fn emit(
        &mut self,
        opcode: Opcode,
        result: Option<String>,
        op1: Option<String>,
        op2: Option<String>,
        label: Option<String>,
    ) {
        self.instrs.push(Instr::new(opcode, result, op1, op2, label));
    }

    // ==================== Expressions ====================

    /// Lower an expression; returns the name of the cell holding its value
    fn lower_expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Number { value, .. } => {
                let temp = self.new_temp();
                self.emit(
                    Opcode::LoadConst,
                    Some(temp.clone()),
                    Some(value.to_string()),
                    None,
                    None,
                );
                temp
            }

            Expr::Identifier { name, .. } => name.clone(),

            Expr::Binary {
                op, left, right, ..
            } => {
                let left = self.lower_expr(left);
                let right = self.lower_expr(right);
                let result = self.new_temp();
                let opcode = match op {
                    BinOp::Add => Opcode::Add,
                    BinOp::Sub => Opcode::Sub,
                    BinOp::Mul => Opcode::Mul,
                    BinOp::Div => Opcode::Div,
                    BinOp::Mod => Opcode::Mod,
                };
                self.emit(opcode, Some(result.clone()), Some(left), Some(right), None);
                result
            }

            Expr::Relational {
                op, left, right, ..
            } => {
                let left = self.lower_expr(left);
                let right = self.lower_expr(right);
                let result = self.new_temp();
                // The operator text rides in the label field
                self.emit(
                    Opcode::Relop,
                    Some(result.clone()),
                    Some(left),
                    Some(right),
                    Some(op.as_str().to_string()),
                );
                result
            }

            Expr::ArrayAccess { array, index, .. } => {
                let index = self.lower_expr(index);
                let result = self.new_temp();
                self.emit(
                    Opcode::ArrayLoad,
                    Some(result.clone()),
                    Some(array.clone()),
                    Some(index),
                    None,
                );
                result
            }

            Expr::Call { callee, args, .. } => self.lower_call(callee, args),
        }
    }

    /// Lower a call: arguments first (inner calls complete their own
    /// PARAM/CALL groups), then this call's PARAM group contiguously, then
    /// CALL. The emitter's calling convention depends on both the source
    /// order of the params and the group being unbroken.
    fn lower_call(&mut self, callee: &str, args: &[Expr]) -> String {
        let arg_names: Vec<String> = args.iter().map(|arg| self.lower_expr(arg)).collect();
        for name in arg_names {
            self.emit(Opcode::Param, None, Some(name), None, None);
        }

        let result = self.new_temp();
        self.emit(
            Opcode::Call,
            Some(result.clone()),
            Some(args.len().to_string()),
            None,
            Some(callee.to_string()),
        );
        result
    }

    // ==================== Statements ====================

    fn lower_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            // Declarations carry no code; storage comes from the symbol table
            Stmt::Declaration { .. }
            | Stmt::ArrayDeclaration { .. }
            | Stmt::FunctionDecl { .. } => {}

            Stmt::Assignment { target, value, .. } => {
                let value = self.lower_expr(value);
                self.emit(
                    Opcode::Assign,
                    Some(target.clone()),
                    Some(value),
                    None,
                    None,
                );
            }

            Stmt::ArrayStore {
                array,
                index,
                value,
                ..
            } => {
                let index = self.lower_expr(index);
                let value = self.lower_expr(value);
                self.emit(
                    Opcode::ArrayStore,
                    Some(array.clone()),
                    Some(index),
                    Some(value),
                    None,
                );
            }

            Stmt::Print { value, .. } => {
                let value = self.lower_expr(value);
                self.emit(Opcode::Print, None, Some(value), None, None);
            }

            Stmt::While {
                condition, body, ..
            } => {
                let label_start = self.new_label();
                let label_end = self.new_label();

                self.emit_label(&label_start);
                let cond = self.lower_expr(condition);
                self.emit_if_false(cond, &label_end);
                for stmt in body {
                    self.lower_stmt(stmt);
                }
                self.emit_goto(&label_start);
                self.emit_label(&label_end);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                let label_end = self.new_label();
                let cond = self.lower_expr(condition);

                match else_branch {
                    Some(else_branch) => {
                        let label_else = self.new_label();
                        self.emit_if_false(cond, &label_else);
                        for stmt in then_branch {
                            self.lower_stmt(stmt);
                        }
                        self.emit_goto(&label_end);
                        self.emit_label(&label_else);
                        for stmt in else_branch {
                            self.lower_stmt(stmt);
                        }
                    }
                    None => {
                        self.emit_if_false(cond, &label_end);
                        for stmt in then_branch {
                            self.lower_stmt(stmt);
                        }
                    }
                }

                self.emit_label(&label_end);
            }

            // for (init; C; step) B  ==  init; while (C) { B; step }
            Stmt::For {
                init,
                condition,
                step,
                body,
                ..
            } => {
                self.lower_stmt(init);

                let label_start = self.new_label();
                let label_end = self.new_label();

                self.emit_label(&label_start);
                let cond = self.lower_expr(condition);
                self.emit_if_false(cond, &label_end);
                for stmt in body {
                    self.lower_stmt(stmt);
                }
                self.lower_stmt(step);
                self.emit_goto(&label_start);
                self.emit_label(&label_end);
            }

            // Body runs at least once, repeats while the condition holds
            Stmt::DoWhile {
                body, condition, ..
            } => {
                let label_start = self.new_label();
                let label_end = self.new_label();

                self.emit_label(&label_start);
                for stmt in body {
                    self.lower_stmt(stmt);
                }
                let cond = self.lower_expr(condition);
                self.emit_if_false(cond, &label_end);
                self.emit_goto(&label_start);
                self.emit_label(&label_end);
            }

            Stmt::FunctionDef {
                return_type,
                name,
                body,
                ..
            } => {
                self.emit(
                    Opcode::FunctionLabel,
                    None,
                    None,
                    None,
                    Some(name.clone()),
                );
                for stmt in body {
                    self.lower_stmt(stmt);
                }
                if *return_type == TypeName::Void {
                    self.emit(Opcode::ReturnVoid, None, None, None, None);
                }
            }

            Stmt::Call { callee, args, .. } => {
                // Call in statement position; the stored result is unused
                self.lower_call(callee, args);
            }

            Stmt::Return { value, .. } => match value {
                Some(value) => {
                    let value = self.lower_expr(value);
                    self.emit(Opcode::Return, None, Some(value), None, None);
                }
                None => self.emit(Opcode::ReturnVoid, None, None, None, None),
            },

            Stmt::Block { stmts, .. } => {
                for stmt in stmts {
                    self.lower_stmt(stmt);
                }
            }
        }
    }

    fn emit_label(&mut self, label: &str) {
        self.emit(Opcode::Label, None, None, None, Some(label.to_string()));
    }

    fn emit_goto(&mut self, label: &str) {
        self.emit(Opcode::Goto, None, None, None, Some(label.to_string()));
    }

    fn emit_if_false(&mut self, cond: String, label: &str) {
        self.emit(
            Opcode::IfFalse,
            None,
            Some(cond),
            None,
            Some(label.to_string()),
        );
    }
}
