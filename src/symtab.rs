//! Per-module symbol table and translation context (spec.md §3).

use crate::dims::Dims;
use crate::ordered_map::OrderedMap;
use crate::stmt::Stmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub name: String,
    pub direction: Direction,
    pub dims: Dims,
}

/// An `Enum`-derived type: an ordered member table and its derived width
/// (`max(1, ceil(log2(|states|)))`, spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    pub states: OrderedMap<String, i64>,
    pub width: u32,
}

impl EnumDef {
    pub fn has_member(&self, name: &str) -> bool {
        self.states.contains_key(&name.to_string())
    }
}

/// A submodule instantiation: the concrete (possibly monomorphized) module
/// it binds to, and its port connections.
#[derive(Debug, Clone)]
pub struct Instance {
    pub module_name: String,
    /// port name -> rendered RHS expression. Populated eagerly for output
    /// ports at instantiation time, and incrementally for input ports as
    /// `inst.port = expr` wiring statements are classified.
    pub port_mapping: OrderedMap<String, String>,
}

/// One hardware module under translation, or already sealed and awaiting
/// emission (spec.md §3 "Module Context").
#[derive(Debug, Clone)]
pub struct ModuleContext {
    pub name: String,
    pub symbols: OrderedMap<String, Dims>,
    pub constants: OrderedMap<String, i64>,
    pub ports: Vec<Port>,
    pub internal_decls: Vec<String>,
    pub comb_buffer: Vec<Stmt>,
    pub seq_buffers: OrderedMap<String, Vec<Stmt>>,
    pub instances: OrderedMap<String, Instance>,
    /// Enums referenced by this module, materialized on first use so each
    /// module emits a typedef only for what it actually needs (DESIGN.md,
    /// "enum scoping").
    pub enums: OrderedMap<String, EnumDef>,
}

impl ModuleContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: OrderedMap::new(),
            constants: OrderedMap::new(),
            ports: Vec::new(),
            internal_decls: Vec::new(),
            comb_buffer: Vec::new(),
            seq_buffers: OrderedMap::new(),
            instances: OrderedMap::new(),
            enums: OrderedMap::new(),
        }
    }
}
