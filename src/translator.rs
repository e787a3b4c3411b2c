//! The translation driver (spec.md §5, §6; SPEC_FULL.md §2, §5–§7).
//!
//! Owns the per-run mutable state (`Translator` owns `modules`, `templates`,
//! the `ParamStack`, the active clock-spec/module pointers implicitly
//! through `Env` and `Option<String>`) and exposes the single public entry
//! point, `translate`. This is the re-entrant "current module" / "current
//! clock spec" save/restore point spec.md §5 describes: a top-level
//! `ClassDef` and a monomorphized template both funnel through
//! `translate_module_body`, which owns exactly one `ModuleContext` for the
//! duration of its call and hands it to `env.modules` on the way out.

use crate::ast::Node;
use crate::control::{translate_stmts, Env};
use crate::error::{TranslateError, Warning};
use crate::ordered_map::OrderedMap;
use crate::paramstack::ParamStack;
use crate::symtab::{EnumDef, ModuleContext};
use crate::template::{is_enum_base, is_parameterized, register_enum, Template};

/// Caller-supplied knobs (SPEC_FULL.md §2 "Configuration"). No config file,
/// env var, or CLI surface exists (spec.md §6); this struct is the whole of
/// it.
#[derive(Debug, Clone, Copy)]
pub struct TranslateOptions {
    /// Spaces per indentation level in emitted SystemVerilog (spec.md §4.8:
    /// "indented by one level (four spaces)").
    pub indent_width: usize,
    /// Promote any recoverable `Warning` to a fatal `TranslateError` once
    /// translation finishes, instead of returning it in `warnings`.
    pub warnings_as_errors: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            indent_width: 4,
            warnings_as_errors: false,
        }
    }
}

/// The result of a successful `translate` call (SPEC_FULL.md §6).
#[derive(Debug, Clone)]
pub struct TranslationOutput {
    /// All synthesized modules' SystemVerilog, separated by blank lines, in
    /// module-creation order (spec.md §5, §6).
    pub verilog: String,
    pub warnings: Vec<Warning>,
    /// `(module_name, warning_count)` in module-creation order.
    module_warnings: Vec<(String, usize)>,
}

impl TranslationOutput {
    /// The "Transpilation Summary" report named in spec.md §7: per-module
    /// warning counts plus each warning's text. A convenience for callers
    /// that want it; nothing in `translate` consults it.
    pub fn summary(&self) -> String {
        let mut out = String::from("Transpilation Summary\n");
        for (name, count) in &self.module_warnings {
            out.push_str(&format!("  {name}: {count} warning(s)\n"));
        }
        if self.warnings.is_empty() {
            out.push_str("No warnings.\n");
        } else {
            out.push('\n');
            for w in &self.warnings {
                out.push_str(&format!("  - {w}\n"));
            }
        }
        out
    }
}

/// Translates a program's top-level `ClassDef`s into SystemVerilog.
///
/// Non-`Enum`, non-parameterized classes translate immediately, in source
/// order; parameterized classes are deferred as templates and synthesized
/// on first instantiation (spec.md §4.7). Emission order therefore equals
/// module-creation order, as spec.md §5 requires.
pub fn translate(
    program: &[Node],
    options: &TranslateOptions,
) -> Result<TranslationOutput, TranslateError> {
    let mut params = ParamStack::new();
    let mut enum_registry: OrderedMap<String, EnumDef> = OrderedMap::new();
    let mut templates: OrderedMap<String, Template> = OrderedMap::new();
    let mut modules: OrderedMap<String, ModuleContext> = OrderedMap::new();
    let mut warnings: Vec<Warning> = Vec::new();
    let mut module_warnings: Vec<(String, usize)> = Vec::new();

    for node in program {
        let Node::ClassDef { name, bases, body } = node else {
            // A non-`ClassDef` top-level statement has no defined meaning
            // (spec.md §4.9: "structural confusion"); skip it.
            continue;
        };

        if is_enum_base(bases) {
            let mut env = Env {
                params: &mut params,
                enum_registry: &mut enum_registry,
                templates: &mut templates,
                modules: &mut modules,
                warnings: &mut warnings,
                module_warnings: &mut module_warnings,
            };
            register_enum(&mut env, name, body);
            continue;
        }

        templates.insert(name.clone(), Template { body: body.clone() });
        if is_parameterized(&templates, body) {
            tracing::debug!(class = name, "deferring parameterized template");
            continue;
        }

        tracing::debug!(class = name, "translating concrete module");
        let mut env = Env {
            params: &mut params,
            enum_registry: &mut enum_registry,
            templates: &mut templates,
            modules: &mut modules,
            warnings: &mut warnings,
            module_warnings: &mut module_warnings,
        };
        translate_module_body(&mut env, name.clone(), body)?;
    }

    if options.warnings_as_errors {
        if let Some(first) = warnings.first() {
            return Err(TranslateError::WarningsPromoted {
                first: first.to_string(),
                count: warnings.len(),
            });
        }
    }

    let verilog = modules
        .values()
        .map(|m| crate::emit::emit_module(m, &modules, options.indent_width))
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(TranslationOutput {
        verilog,
        warnings,
        module_warnings,
    })
}

/// Translates one class body into a sealed `ModuleContext` and registers it
/// under `name` in `env.modules`. Called both for a top-level concrete class
/// and, re-entrantly, for a template monomorphized by `template::instantiate`
/// — in both cases the parameter stack's depth, and the active clock spec,
/// are restored to what they were on entry (spec.md §5, §8 "Scope
/// discipline"): this function never leaves a clock spec active or a frame
/// pushed on the way out.
pub fn translate_module_body(
    env: &mut Env<'_>,
    name: String,
    body: &[Node],
) -> Result<(), TranslateError> {
    let before = env.warnings.len();
    let mut module = ModuleContext::new(name.clone());
    let mut comb = Vec::new();
    let mut clock = None;
    translate_stmts(env, &mut module, &mut clock, body, &mut comb)?;
    debug_assert!(clock.is_none(), "sequential block left active on module exit");
    module.comb_buffer = comb;
    env.module_warnings
        .push((name.clone(), env.warnings.len() - before));
    env.modules.insert(name, module);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Ctx, Node};

    fn in_bit(width: i64) -> Node {
        Node::Call {
            func: "In".to_string(),
            args: vec![bit(width)],
            keywords: Vec::new(),
        }
    }

    fn out_bit(width: i64) -> Node {
        Node::Call {
            func: "Out".to_string(),
            args: vec![bit(width)],
            keywords: Vec::new(),
        }
    }

    fn bit(width: i64) -> Node {
        Node::Subscript {
            value: Box::new(Node::name("bit", Ctx::Load)),
            slice: Box::new(Node::constant(width)),
        }
    }

    fn assign(target: Node, value: Node) -> Node {
        Node::Assign {
            targets: vec![target],
            value: Box::new(value),
        }
    }

    /// spec.md §8 scenario 1: combinational adder.
    #[test]
    fn simple_adder() {
        let module = Node::ClassDef {
            name: "Adder".to_string(),
            bases: vec!["Module".to_string()],
            body: vec![
                assign(Node::name("a", Ctx::Store), in_bit(8)),
                assign(Node::name("b", Ctx::Store), in_bit(8)),
                assign(Node::name("s", Ctx::Store), out_bit(9)),
                assign(
                    Node::name("s", Ctx::Store),
                    Node::BinOp {
                        left: Box::new(Node::name("a", Ctx::Load)),
                        op: crate::ast::BinOpKind::Add,
                        right: Box::new(Node::name("b", Ctx::Load)),
                    },
                ),
            ],
        };
        let out = translate(&[module], &TranslateOptions::default()).unwrap();
        assert!(out.verilog.contains("module Adder (\n    input logic [7:0] a,\n    input logic [7:0] b,\n    output logic [8:0] s\n);"));
        assert!(out
            .verilog
            .contains("always_comb begin\n        s = (a + b);\n    end"));
        assert!(!out.verilog.contains("always_ff"));
        assert!(out.warnings.is_empty());
    }

    /// spec.md §8 scenario 2: sequential register, `clk.posedge`.
    #[test]
    fn sequential_register() {
        let module = Node::ClassDef {
            name: "Reg".to_string(),
            bases: vec!["Module".to_string()],
            body: vec![
                assign(Node::name("clk", Ctx::Store), in_bit_scalar()),
                assign(Node::name("d", Ctx::Store), in_bit(4)),
                assign(Node::name("q", Ctx::Store), out_bit(4)),
                Node::If {
                    test: Box::new(Node::Attribute {
                        value: Box::new(Node::name("clk", Ctx::Load)),
                        attr: "posedge".to_string(),
                    }),
                    body: vec![assign(Node::name("q", Ctx::Store), Node::name("d", Ctx::Load))],
                    orelse: vec![],
                },
            ],
        };
        let out = translate(&[module], &TranslateOptions::default()).unwrap();
        assert!(out
            .verilog
            .contains("always_ff @(posedge clk) begin\n        q <= d;\n    end"));
        assert!(!out.verilog.contains("always_comb"));
    }

    fn in_bit_scalar() -> Node {
        Node::Call {
            func: "In".to_string(),
            args: vec![Node::name("bit", Ctx::Load)],
            keywords: Vec::new(),
        }
    }

    /// spec.md §8 scenario 3: a statically-bounded loop unrolls into four
    /// discrete combinational statements.
    #[test]
    fn loop_unrolled_memory_init() {
        let module = Node::ClassDef {
            name: "Init".to_string(),
            bases: vec!["Module".to_string()],
            body: vec![
                assign(
                    Node::name("mem", Ctx::Store),
                    Node::Subscript {
                        value: Box::new(Node::Subscript {
                            value: Box::new(Node::name("bit", Ctx::Load)),
                            slice: Box::new(Node::constant(4)),
                        }),
                        slice: Box::new(Node::constant(8)),
                    },
                ),
                Node::For {
                    target: "i".to_string(),
                    iter: Box::new(Node::Call {
                        func: "range".to_string(),
                        args: vec![Node::constant(4)],
                        keywords: Vec::new(),
                    }),
                    body: vec![assign(
                        Node::Subscript {
                            value: Box::new(Node::name("mem", Ctx::Store)),
                            slice: Box::new(Node::name("i", Ctx::Load)),
                        },
                        Node::name("i", Ctx::Load),
                    )],
                },
            ],
        };
        let out = translate(&[module], &TranslateOptions::default()).unwrap();
        assert!(out.verilog.contains("logic [7:0] mem [0:3];"));
        for i in 0..4 {
            assert!(out.verilog.contains(&format!("mem[{i}] = 8'd{i};")));
        }
    }

    /// spec.md §8 scenario 6: concatenation widens to the sum of its parts.
    #[test]
    fn concatenation_synthesizes_implicit_width() {
        let module = Node::ClassDef {
            name: "Cat".to_string(),
            bases: vec!["Module".to_string()],
            body: vec![
                assign(Node::name("a", Ctx::Store), in_bit(2)),
                assign(Node::name("b", Ctx::Store), in_bit(3)),
                assign(
                    Node::name("y", Ctx::Store),
                    Node::Tuple {
                        elts: vec![Node::name("a", Ctx::Load), Node::name("b", Ctx::Load)],
                    },
                ),
            ],
        };
        let out = translate(&[module], &TranslateOptions::default()).unwrap();
        assert!(out.verilog.contains("logic [4:0] y;"));
        assert!(out.verilog.contains("y = {a, b};"));
    }

    #[test]
    fn warnings_as_errors_promotes_first_warning() {
        let module = Node::ClassDef {
            name: "Bad".to_string(),
            bases: vec!["Module".to_string()],
            body: vec![Node::For {
                target: "i".to_string(),
                iter: Box::new(Node::name("unknown_iter", Ctx::Load)),
                body: vec![],
            }],
        };
        let options = TranslateOptions {
            warnings_as_errors: true,
            ..TranslateOptions::default()
        };
        let err = translate(&[module], &options).unwrap_err();
        assert!(matches!(err, TranslateError::WarningsPromoted { .. }));
    }

    /// Module emission order follows module-creation order even when a
    /// port's direction makes it an `Output` (used by the header formatter
    /// directly; exercised here end to end).
    #[test]
    fn port_order_matches_declaration_order() {
        let module = Node::ClassDef {
            name: "Ports".to_string(),
            bases: vec!["Module".to_string()],
            body: vec![
                assign(Node::name("b", Ctx::Store), out_bit(1)),
                assign(Node::name("a", Ctx::Store), in_bit(1)),
            ],
        };
        let out = translate(&[module], &TranslateOptions::default()).unwrap();
        let b_pos = out.verilog.find("output logic [0:0] b").unwrap();
        let a_pos = out.verilog.find("input logic [0:0] a").unwrap();
        assert!(b_pos < a_pos, "ports must emit in declaration order");
    }
}
