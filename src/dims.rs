//! Canonical dimension representation (spec.md §3, Design Note "Ad-hoc dim
//! list overloading").
//!
//! The source language sniffs `isinstance(dims[0], str)` to tell a
//! `[depth, width]` pair from a one-element `[enum_name]` tag. Here that
//! overload is a closed enum instead, so every width computation goes
//! through one place (`Dims::width`) rather than re-deriving the
//! scalar/vector/memory/enum distinction at each call site.

use crate::ordered_map::OrderedMap;
use crate::symtab::EnumDef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dims {
    /// Bare `bit`, no subscript.
    Scalar,
    /// `bit[W]`.
    Vector(u32),
    /// `bit[D][W]`: outermost subscript is depth, innermost is width.
    Memory(u32, u32),
    /// A bare reference to an `Enum`-derived type.
    Enum(String),
}

impl Dims {
    /// The innermost (word) width, or an enum's derived width. This is the
    /// single accessor every width computation in the engine uses.
    pub fn width(&self, enums: &OrderedMap<String, EnumDef>) -> u32 {
        match self {
            Self::Scalar => 1,
            Self::Vector(w) => *w,
            Self::Memory(_, w) => *w,
            Self::Enum(name) => enums.get(&name.to_string()).map(|e| e.width).unwrap_or(1),
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, Self::Enum(_))
    }

    /// The depth of a 2D signal, or 1 for anything else (used for bounds
    /// checking on a constant subscript; spec.md §4.9).
    pub fn depth(&self) -> Option<u32> {
        match self {
            Self::Memory(d, _) => Some(*d),
            _ => None,
        }
    }
}
