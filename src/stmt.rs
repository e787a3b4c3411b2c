//! The lowered statement tree (Design Note "Buffer-swap for nested if/case
//! capture").
//!
//! The original draft swaps a mutable "current buffer" field to capture a
//! nested `if`/`match` body, then splices the captured lines back in with a
//! hand-indented string join. That's an easy place to drop or double-indent
//! a statement. Here, lowering a nested body just returns a fresh `Vec<Stmt>`
//! from a recursive call — composite statements own their bodies directly,
//! and the emitter is the only place that knows about indentation.

#[derive(Debug, Clone)]
pub enum Stmt {
    /// A single already-rendered assignment line, e.g. `"q <= d;"`.
    Assign(String),
    If {
        cond: String,
        then_body: Vec<Stmt>,
        else_body: Vec<Stmt>,
    },
    Case {
        subject: String,
        /// `(pattern_or_"default", body)`, in source order; totality (a
        /// trailing `default` arm) is guaranteed by the caller that builds
        /// this (`control::lower_match`).
        arms: Vec<(String, Vec<Stmt>)>,
    },
}
