//! Semantic analysis
//!
//! Walks the tree, enforcing declaration-before-use, initialization-before-
//! read, type agreement, array-ness, function kind and call signatures.
//! Errors are accumulated, never thrown, so one run surfaces as many problems
//! as possible; the error count gates the rest of the pipeline. Once a
//! subexpression types as `unknown`, enclosing operators stay silent to avoid
//! cascading reports.

mod declarations;

pub use declarations::populate_symbol_table;

use std::fmt;

use minic_parser::ast::{Expr, Program, Stmt};

use crate::symtab::{DataType, Scope, SymbolKind, SymbolTable};

/// A single semantic error: source line plus human-readable message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)
    }
}

/// Analyze the tree against the (partially populated) symbol table.
/// Returns the accumulated diagnostics; an empty vector means the program is
/// well-formed and may proceed to code generation.
pub fn analyze(program: &Program, symtab: &mut SymbolTable) -> Vec<Diagnostic> {
    let mut analyzer = Analyzer {
        symtab,
        scope: Scope::Global,
        diagnostics: Vec::new(),
    };
    for item in &program.items {
        analyzer.walk_stmt(item);
    }
    analyzer.diagnostics
}

struct Analyzer<'t> {
    symtab: &'t mut SymbolTable,
    scope: Scope,
    diagnostics: Vec<Diagnostic>,
}

impl Analyzer<'_> {
    fn error(&mut self, line: usize, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            line,
            message: message.into(),
        });
    }

    /// Report a use of an undeclared variable. Returns whether it resolved.
    fn check_declared(&mut self, name: &str, line: usize) -> bool {
        if self.symtab.lookup_in_scope(name, &self.scope).is_some() {
            true
        } else {
            self.error(
                line,
                format!("Variable '{}' used before declaration", name),
            );
            false
        }
    }

    /// Report a read of an uninitialized scalar. Returns whether it is safe.
    fn check_initialized(&mut self, name: &str, line: usize) -> bool {
        let initialized = self
            .symtab
            .lookup_in_scope(name, &self.scope)
            .map_or(true, |symbol| symbol.is_initialized);
        if !initialized {
            self.error(
                line,
                format!("Variable '{}' used before initialization", name),
            );
        }
        initialized
    }

    // ==================== Expressions ====================

    fn type_of_expr(&mut self, expr: &Expr) -> DataType {
        match expr {
            Expr::Number { .. } => DataType::Int,

            Expr::Identifier { name, span } => {
                if !self.check_declared(name, span.line()) {
                    return DataType::Unknown;
                }
                if !self.check_initialized(name, span.line()) {
                    return DataType::Unknown;
                }
                self.symtab
                    .lookup_in_scope(name, &self.scope)
                    .map(|s| s.ty)
                    .unwrap_or(DataType::Unknown)
            }

            Expr::Binary {
                left, right, span, ..
            } => {
                let left_ty = self.type_of_expr(left);
                let right_ty = self.type_of_expr(right);
                if left_ty == DataType::Int && right_ty == DataType::Int {
                    DataType::Int
                } else {
                    if left_ty != DataType::Unknown && right_ty != DataType::Unknown {
                        self.error(span.line(), "Type mismatch in binary operation");
                    }
                    DataType::Unknown
                }
            }

            Expr::Relational {
                left, right, span, ..
            } => {
                let left_ty = self.type_of_expr(left);
                let right_ty = self.type_of_expr(right);
                if left_ty == DataType::Int && right_ty == DataType::Int {
                    // Comparisons evaluate to 0 or 1
                    DataType::Int
                } else {
                    if left_ty != DataType::Unknown && right_ty != DataType::Unknown {
                        self.error(span.line(), "Type mismatch in condition");
                    }
                    DataType::Unknown
                }
            }

            Expr::ArrayAccess { array, index, span } => self.type_of_array_access(array, index, span.line()),

            Expr::Call { callee, args, span } => self.type_of_call(callee, args, span.line()),
        }
    }

    fn type_of_array_access(&mut self, array: &str, index: &Expr, line: usize) -> DataType {
        let (is_array, element_ty) = match self.symtab.lookup_in_scope(array, &self.scope) {
            Some(symbol) => (symbol.is_array, symbol.ty),
            None => {
                self.error(line, format!("Array '{}' used before declaration", array));
                return DataType::Unknown;
            }
        };
        if !is_array {
            self.error(line, format!("'{}' is not an array", array));
            return DataType::Unknown;
        }

        let index_ty = self.type_of_expr(index);
        if index_ty != DataType::Int && index_ty != DataType::Unknown {
            self.error(line, "Array index must be an integer");
            return DataType::Unknown;
        }

        element_ty
    }

    fn type_of_call(&mut self, callee: &str, args: &[Expr], line: usize) -> DataType {
        let (kind, return_type, param_types, param_count) = match self.symtab.lookup(callee) {
            Some(symbol) => (
                symbol.kind,
                symbol.return_type,
                symbol.param_types.clone(),
                symbol.param_count(),
            ),
            None => {
                self.error(
                    line,
                    format!("Function '{}' called before declaration", callee),
                );
                return DataType::Unknown;
            }
        };
        if kind != SymbolKind::Function {
            self.error(line, format!("'{}' is not a function", callee));
            return DataType::Unknown;
        }

        for (i, arg) in args.iter().enumerate() {
            let arg_ty = self.type_of_expr(arg);
            if let Some(&expected) = param_types.get(i) {
                if arg_ty != DataType::Unknown
                    && expected != DataType::Unknown
                    && arg_ty != expected
                {
                    self.error(
                        line,
                        format!("Argument {} type mismatch in call to '{}'", i + 1, callee),
                    );
                }
            }
        }

        if args.len() != param_count {
            self.error(
                line,
                format!(
                    "Function '{}' expects {} arguments, got {}",
                    callee,
                    param_count,
                    args.len()
                ),
            );
        }

        return_type
    }

    /// Loop and branch conditions must type as int
    fn check_condition(&mut self, condition: &Expr) {
        let ty = self.type_of_expr(condition);
        if ty != DataType::Int && ty != DataType::Unknown {
            self.error(condition.line(), "Type mismatch in condition");
        }
    }

    // ==================== Statements ====================

    fn walk_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Declaration { name, span } => {
                // Declarations are pre-populated; re-confirm presence.
                if self.symtab.lookup_in_scope(name, &self.scope).is_none() {
                    self.symtab
                        .add_variable(name, DataType::Int, span.line(), Scope::Global);
                }
            }

            Stmt::ArrayDeclaration { name, size, span } => {
                if self.symtab.lookup_in_scope(name, &self.scope).is_none() {
                    self.symtab.add_array(
                        name,
                        DataType::Int,
                        (*size).max(0) as usize,
                        span.line(),
                        Scope::Global,
                    );
                }
            }

            Stmt::Assignment {
                target,
                value,
                span,
            } => {
                if !self.check_declared(target, span.line()) {
                    return;
                }
                let value_ty = self.type_of_expr(value);

                let target_ty = self
                    .symtab
                    .lookup_in_scope(target, &self.scope)
                    .map(|s| s.ty)
                    .unwrap_or(DataType::Unknown);
                if value_ty != DataType::Unknown
                    && target_ty != DataType::Unknown
                    && target_ty != value_ty
                {
                    self.error(span.line(), "Type mismatch in assignment");
                }

                let scope = self.scope.clone();
                self.symtab.mark_initialized(target, &scope);
            }

            Stmt::ArrayStore {
                array,
                index,
                value,
                span,
            } => {
                let target = self
                    .symtab
                    .lookup_in_scope(array, &self.scope)
                    .map(|s| (s.is_array, s.ty));
                let element_ty = match target {
                    Some((true, ty)) => ty,
                    Some((false, _)) => {
                        self.error(span.line(), format!("'{}' is not an array", array));
                        return;
                    }
                    None => {
                        self.error(
                            span.line(),
                            format!("Array '{}' used before declaration", array),
                        );
                        return;
                    }
                };

                let index_ty = self.type_of_expr(index);
                if index_ty != DataType::Int && index_ty != DataType::Unknown {
                    self.error(span.line(), "Array index must be an integer");
                }

                let value_ty = self.type_of_expr(value);
                if value_ty != DataType::Unknown
                    && element_ty != DataType::Unknown
                    && value_ty != element_ty
                {
                    self.error(span.line(), "Type mismatch in assignment");
                }
            }

            Stmt::Print { value, .. } => {
                self.type_of_expr(value);
            }

            Stmt::While {
                condition, body, ..
            } => {
                self.check_condition(condition);
                for stmt in body {
                    self.walk_stmt(stmt);
                }
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.check_condition(condition);
                for stmt in then_branch {
                    self.walk_stmt(stmt);
                }
                if let Some(else_branch) = else_branch {
                    for stmt in else_branch {
                        self.walk_stmt(stmt);
                    }
                }
            }

            Stmt::For {
                init,
                condition,
                step,
                body,
                ..
            } => {
                self.walk_stmt(init);
                self.check_condition(condition);
                for stmt in body {
                    self.walk_stmt(stmt);
                }
                self.walk_stmt(step);
            }

            Stmt::DoWhile {
                body, condition, ..
            } => {
                for stmt in body {
                    self.walk_stmt(stmt);
                }
                self.check_condition(condition);
            }

            Stmt::FunctionDecl {
                return_type,
                name,
                params,
                span,
            } => {
                if self.symtab.lookup(name).is_none() {
                    self.symtab.add_function(
                        name,
                        declarations::data_type(*return_type),
                        params.iter().map(|p| declarations::data_type(p.ty)).collect(),
                        params.iter().map(|p| p.name.clone()).collect(),
                        span.line(),
                    );
                }
            }

            Stmt::FunctionDef {
                return_type,
                name,
                params,
                body,
                span,
            } => {
                if self.symtab.lookup(name).is_none() {
                    self.symtab.add_function(
                        name,
                        declarations::data_type(*return_type),
                        params.iter().map(|p| declarations::data_type(p.ty)).collect(),
                        params.iter().map(|p| p.name.clone()).collect(),
                        span.line(),
                    );
                }

                // Parameters are initialized by the caller
                for param in params {
                    self.symtab.add_parameter(
                        &param.name,
                        declarations::data_type(param.ty),
                        param.span.line(),
                        name,
                    );
                }

                let saved = std::mem::replace(&mut self.scope, Scope::function(name));
                for stmt in body {
                    self.walk_stmt(stmt);
                }
                self.scope = saved;
            }

            Stmt::Call { callee, args, span } => {
                self.type_of_call(callee, args, span.line());
            }

            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    self.type_of_expr(value);
                }
            }

            Stmt::Block { stmts, .. } => {
                for stmt in stmts {
                    self.walk_stmt(stmt);
                }
            }
        }
    }
}
