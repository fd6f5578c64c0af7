//! Symbol table with two-level scoping
//!
//! Maps `(name, scope)` pairs to symbol records. A scope is either the global
//! scope or a function's body; lookups take a current scope and fall back to
//! global. The table is populated by declaration collection, extended by the
//! semantic analyzer (functions and parameters) and read by the emitter for
//! storage layout, so records live for the whole compilation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value type of a symbol or expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Int,
    Void,
    Unknown,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int => write!(f, "int"),
            DataType::Void => write!(f, "void"),
            DataType::Unknown => write!(f, "unknown"),
        }
    }
}

/// What a symbol names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Variable,
    Function,
}

/// Scope tag: the global scope or the body of a named function
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Scope {
    Global,
    Function(String),
}

impl Scope {
    pub fn function(name: impl Into<String>) -> Self {
        Scope::Function(name.into())
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Scope::Global)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Function(name) => write!(f, "{}", name),
        }
    }
}

/// A single symbol record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: DataType,
    pub is_array: bool,
    pub array_size: usize,
    pub is_initialized: bool,
    pub return_type: DataType,
    pub param_types: Vec<DataType>,
    pub param_names: Vec<String>,
    pub scope: Scope,
    pub declaration_line: usize,
}

impl Symbol {
    fn variable(name: &str, ty: DataType, line: usize, scope: Scope) -> Self {
        Self {
            name: name.to_string(),
            kind: SymbolKind::Variable,
            ty,
            is_array: false,
            array_size: 0,
            is_initialized: false,
            return_type: DataType::Unknown,
            param_types: Vec::new(),
            param_names: Vec::new(),
            scope,
            declaration_line: line,
        }
    }

    pub fn param_count(&self) -> usize {
        self.param_types.len()
    }

    /// Words of storage this symbol needs in the uninitialized-data section
    pub fn storage_words(&self) -> usize {
        if self.is_array {
            self.array_size
        } else {
            1
        }
    }
}

/// Two-level scoped symbol table
///
/// Keys are `(name, scope)`; two symbols may share a name exactly when their
/// scopes differ. Iteration order is deterministic (sorted by key), which
/// keeps the emitted storage layout stable across runs.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    symbols: BTreeMap<(String, Scope), Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Insert a scalar variable. Returns false if `(name, scope)` is taken.
    pub fn add_variable(&mut self, name: &str, ty: DataType, line: usize, scope: Scope) -> bool {
        let key = (name.to_string(), scope.clone());
        if self.symbols.contains_key(&key) {
            return false;
        }
        self.symbols.insert(key, Symbol::variable(name, ty, line, scope));
        true
    }

    /// Insert an array. Arrays count as initialized from declaration on;
    /// element-level initialization is not tracked.
    pub fn add_array(
        &mut self,
        name: &str,
        ty: DataType,
        size: usize,
        line: usize,
        scope: Scope,
    ) -> bool {
        let key = (name.to_string(), scope.clone());
        if self.symbols.contains_key(&key) {
            return false;
        }
        let mut symbol = Symbol::variable(name, ty, line, scope);
        symbol.is_array = true;
        symbol.array_size = size;
        symbol.is_initialized = true;
        self.symbols.insert(key, symbol);
        true
    }

    /// Insert a function at global scope
    pub fn add_function(
        &mut self,
        name: &str,
        return_type: DataType,
        param_types: Vec<DataType>,
        param_names: Vec<String>,
        line: usize,
    ) -> bool {
        let key = (name.to_string(), Scope::Global);
        if self.symbols.contains_key(&key) {
            return false;
        }
        let symbol = Symbol {
            name: name.to_string(),
            kind: SymbolKind::Function,
            ty: return_type,
            is_array: false,
            array_size: 0,
            is_initialized: true,
            return_type,
            param_types,
            param_names,
            scope: Scope::Global,
            declaration_line: line,
        };
        self.symbols.insert(key, symbol);
        true
    }

    /// Insert a function parameter at the function's scope. Parameters are
    /// initialized by the caller.
    pub fn add_parameter(
        &mut self,
        name: &str,
        ty: DataType,
        line: usize,
        function_scope: &str,
    ) -> bool {
        let scope = Scope::function(function_scope);
        let key = (name.to_string(), scope.clone());
        if self.symbols.contains_key(&key) {
            return false;
        }
        let mut symbol = Symbol::variable(name, ty, line, scope);
        symbol.is_initialized = true;
        self.symbols.insert(key, symbol);
        true
    }

    /// Global-only lookup
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(&(name.to_string(), Scope::Global))
    }

    /// Two-step lookup: the current scope first, then global
    pub fn lookup_in_scope(&self, name: &str, current_scope: &Scope) -> Option<&Symbol> {
        if !current_scope.is_global() {
            if let Some(symbol) = self.symbols.get(&(name.to_string(), current_scope.clone())) {
                return Some(symbol);
            }
        }
        self.lookup(name)
    }

    /// Set the initialized flag on the symbol visible from `scope`.
    /// Monotonic: the flag never goes back to false within a run.
    pub fn mark_initialized(&mut self, name: &str, scope: &Scope) {
        let key = (name.to_string(), scope.clone());
        if let Some(symbol) = self.symbols.get_mut(&key) {
            symbol.is_initialized = true;
            return;
        }
        if let Some(symbol) = self.symbols.get_mut(&(name.to_string(), Scope::Global)) {
            symbol.is_initialized = true;
        }
    }

    /// All symbols in deterministic (sorted) order
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }
}

impl fmt::Display for SymbolTable {
    /// Formatted dump used by the CLI's `--dump-symbols`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<16} {:<10} {:<8} {:<12} {:<10} {:<6}",
            "Name", "Kind", "Type", "Initialized", "Scope", "Line"
        )?;
        for symbol in self.iter() {
            let kind = match symbol.kind {
                SymbolKind::Variable if symbol.is_array => "array",
                SymbolKind::Variable => "variable",
                SymbolKind::Function => "function",
            };
            writeln!(
                f,
                "{:<16} {:<10} {:<8} {:<12} {:<10} {:<6}",
                symbol.name,
                kind,
                symbol.ty.to_string(),
                if symbol.is_initialized { "yes" } else { "no" },
                symbol.scope.to_string(),
                symbol.declaration_line
            )?;
        }
        write!(f, "total symbols: {}", self.len())
    }
}
