//! Fatal errors and recoverable warnings.
//!
//! Mirrors the split in `llvm_bitcode::read::Error`: a flat, hand-rolled enum
//! with a `Display` impl and `std::error::Error`, no `thiserror`. Unlike the
//! reader, this crate also has a second, non-fatal channel (`Warning`) for
//! conditions that should be visible to the caller without aborting
//! translation.

use std::{error, fmt};

/// Conditions that abort translation outright (spec.md §4.9, §7: "hard
/// semantic errors").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// A `Slice` node with a missing `lower` or `upper` bound.
    MalformedSlice { signal: String },
    /// `Attribute` access naming a member that isn't in the enum's state
    /// table.
    UnknownEnumMember { enum_name: String, member: String },
    /// `TranslateOptions::warnings_as_errors` was set and translation
    /// produced at least one recoverable `Warning`.
    WarningsPromoted { first: String, count: usize },
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedSlice { signal } => {
                write!(f, "malformed slice on `{signal}`: missing bound")
            }
            Self::UnknownEnumMember { enum_name, member } => {
                write!(f, "`{enum_name}` has no member `{member}`")
            }
            Self::WarningsPromoted { first, count } => write!(
                f,
                "{count} warning(s) promoted to errors (warnings_as_errors); first: {first}"
            ),
        }
    }
}

impl error::Error for TranslateError {}

/// Recoverable conditions (spec.md §4.9: "inference limits", "out-of-bounds
/// references", "structural confusion"). Collected in declaration order and
/// surfaced to the caller alongside the emitted text; they never abort
/// translation on their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A `bit[...]` dimension or a `range(...)` bound did not reduce to an
    /// integer via the Constant Evaluator; the declaration or loop was
    /// skipped.
    UnresolvedDimension { name: String },
    /// `for v in range(...)` where the iterator wasn't a literal `range`
    /// call, or its bounds didn't evaluate; the loop was skipped.
    UnevaluableLoop { loop_var: String },
    /// A constant subscript into a known 2D signal fell outside its
    /// declared depth. Emitted anyway, per spec.md §4.9.
    OutOfBoundsIndex { signal: String, index: i64, depth: u32 },
    /// A non-enum logic assignment's inferred RHS width didn't match the
    /// LHS's declared width. Carried over from the original draft's
    /// behavior (see SPEC_FULL.md §4).
    WidthMismatch {
        signal: String,
        declared: u32,
        inferred: u32,
    },
    /// A chained `Compare` (`a < b < c`) was lowered using only its first
    /// comparator (spec.md §9 Open Question #1).
    ChainedComparisonTruncated,
    /// A reference to an instance port that the referenced module never
    /// declared.
    UnknownInstancePort { instance: String, port: String },
    /// A node shape the emitter has no rendering for reached an expression
    /// context (spec.md §4.9: "structural confusion").
    UnsupportedExpression { shape: &'static str },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedDimension { name } => {
                write!(f, "unresolved width for signal `{name}`, skipping declaration")
            }
            Self::UnevaluableLoop { loop_var } => {
                write!(f, "loop variable `{loop_var}` has un-evaluable range, skipping loop")
            }
            Self::OutOfBoundsIndex { signal, index, depth } => write!(
                f,
                "index {index} out of bounds for `{signal}` (depth {depth}), emitting anyway"
            ),
            Self::WidthMismatch {
                signal,
                declared,
                inferred,
            } => write!(
                f,
                "'{signal}' ({declared}-bit) assigned a {inferred}-bit expression"
            ),
            Self::ChainedComparisonTruncated => {
                write!(f, "chained comparison truncated to its first comparator")
            }
            Self::UnknownInstancePort { instance, port } => {
                write!(f, "instance `{instance}` has no port `{port}`, ignoring connection")
            }
            Self::UnsupportedExpression { shape } => {
                write!(f, "unsupported expression shape `{shape}`, emitted as inert")
            }
        }
    }
}
