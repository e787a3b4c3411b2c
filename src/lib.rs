//! Translates a restricted, hardware-oriented Python-like language into
//! synthesizable SystemVerilog (spec.md §1).
//!
//! This crate consumes a canonical AST (produced by a host-provided parser,
//! out of scope here) and emits a module hierarchy as SystemVerilog text
//! plus a structured warning report. It does no file I/O, no parsing, and
//! no downstream simulation or synthesis checking.
//!
//! The public entry point is [`translate`]; [`TranslateOptions`] carries the
//! only configuration surface (indentation width, whether to promote
//! warnings to errors).

/// The canonical AST node catalogue (spec.md §6).
pub mod ast;
/// The Statement Classifier (spec.md §4.4).
pub mod classify;
/// The Constant Evaluator (spec.md §4.1).
pub mod consteval;
/// Expression rendering and Control-Flow Lowering (spec.md §4.5).
pub mod control;
/// Canonical dimension representation (spec.md §3).
pub mod dims;
/// The Emitter (spec.md §4.8).
pub mod emit;
/// Fatal errors and recoverable warnings (spec.md §4.9, §7).
pub mod error;
/// A small insertion-ordered map used for deterministic emission order.
mod ordered_map;
/// The parameter stack (spec.md §3, §5).
pub mod paramstack;
/// The Dimension/Type Resolver (spec.md §4.3).
pub mod resolve;
/// The lowered statement tree (Design Note "Buffer-swap for nested if/case
/// capture").
pub mod stmt;
/// Per-module symbol table and translation context (spec.md §3).
pub mod symtab;
/// The Template Monomorphizer and `Enum` class registration (spec.md §4.7).
pub mod template;
/// The translation driver and its public entry point.
pub mod translator;
/// The Width Inferencer (spec.md §4.2).
pub mod width;

pub use self::error::{TranslateError, Warning};
pub use self::translator::{translate, TranslateOptions, TranslationOutput};
