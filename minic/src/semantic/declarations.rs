//! Declaration collection
//!
//! Enters variable and array declarations and function prototypes into the
//! symbol table as a pre-pass over the finished tree, so the analyzer
//! receives a partially populated table. Declarations land at global scope
//! wherever they appear; the language has no block-local storage.

use minic_parser::ast::{Program, Stmt, TypeName};

use crate::symtab::{DataType, Scope, SymbolTable};

pub(crate) fn data_type(ty: TypeName) -> DataType {
    match ty {
        TypeName::Int => DataType::Int,
        TypeName::Void => DataType::Void,
    }
}

/// Enter every declaration in the tree into the table. Duplicate inserts are
/// ignored; the analyzer surfaces anything that matters as a diagnostic.
pub fn populate_symbol_table(program: &Program, symtab: &mut SymbolTable) {
    for item in &program.items {
        collect_stmt(item, symtab);
    }
}

fn collect_stmt(stmt: &Stmt, symtab: &mut SymbolTable) {
    match stmt {
        Stmt::Declaration { name, span } => {
            symtab.add_variable(name, DataType::Int, span.line(), Scope::Global);
        }
        Stmt::ArrayDeclaration { name, size, span } => {
            symtab.add_array(
                name,
                DataType::Int,
                (*size).max(0) as usize,
                span.line(),
                Scope::Global,
            );
        }
        Stmt::FunctionDecl {
            return_type,
            name,
            params,
            span,
        } => {
            symtab.add_function(
                name,
                data_type(*return_type),
                params.iter().map(|p| data_type(p.ty)).collect(),
                params.iter().map(|p| p.name.clone()).collect(),
                span.line(),
            );
        }
        Stmt::FunctionDef { body, .. } => {
            // The definition itself is registered by the analyzer; its body
            // can still contain variable declarations.
            for stmt in body {
                collect_stmt(stmt, symtab);
            }
        }
        Stmt::While { body, .. } | Stmt::DoWhile { body, .. } => {
            for stmt in body {
                collect_stmt(stmt, symtab);
            }
        }
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            for stmt in then_branch {
                collect_stmt(stmt, symtab);
            }
            if let Some(else_branch) = else_branch {
                for stmt in else_branch {
                    collect_stmt(stmt, symtab);
                }
            }
        }
        Stmt::For { body, .. } => {
            for stmt in body {
                collect_stmt(stmt, symtab);
            }
        }
        Stmt::Block { stmts, .. } => {
            for stmt in stmts {
                collect_stmt(stmt, symtab);
            }
        }
        Stmt::Assignment { .. }
        | Stmt::ArrayStore { .. }
        | Stmt::Print { .. }
        | Stmt::Call { .. }
        | Stmt::Return { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minic_parser::parse;

    fn populated(src: &str) -> SymbolTable {
        let program = parse(src).expect("parse failed");
        let mut symtab = SymbolTable::new();
        populate_symbol_table(&program, &mut symtab);
        symtab
    }

    #[test]
    fn declarations_land_at_global_scope() {
        let symtab = populated("int x;\nint arr[4];\n");
        assert_eq!(symtab.lookup("x").unwrap().scope, Scope::Global);
        assert_eq!(symtab.lookup("arr").unwrap().array_size, 4);
    }

    #[test]
    fn nested_declarations_are_collected() {
        let symtab = populated("int f() { int local; while (local < 3) { int inner; } return 0; }");
        assert!(symtab.lookup("local").is_some());
        assert!(symtab.lookup("inner").is_some());
    }

    #[test]
    fn prototypes_register_function_signatures() {
        let symtab = populated("int add(int a, int b);");
        let add = symtab.lookup("add").unwrap();
        assert_eq!(add.param_count(), 2);
        assert_eq!(add.param_names, vec!["a", "b"]);
    }

    #[test]
    fn definitions_are_left_to_the_analyzer() {
        let symtab = populated("int add(int a, int b) { return a + b; }");
        assert!(symtab.lookup("add").is_none());
    }
}
