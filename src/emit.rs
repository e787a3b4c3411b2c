//! The Emitter (spec.md §4.8): deterministic SystemVerilog text assembly.
//!
//! Indentation lives entirely here rather than in the lowering phase (Design
//! Note "Buffer-swap for nested if/case capture"): `control::lower_if` and
//! `control::lower_match` hand back a plain `Stmt` tree with no embedded
//! whitespace, and `render_stmts` walks it once, indenting by nesting depth.

use crate::dims::Dims;
use crate::ordered_map::OrderedMap;
use crate::stmt::Stmt;
use crate::symtab::{Direction, ModuleContext};

fn indent(level: usize, unit: usize) -> String {
    " ".repeat(level * unit)
}

/// A bare `logic`/enum-typedef declaration line, e.g. `"logic [7:0] mem [0:3];"`.
pub fn format_decl(_prefix: &str, name: &str, dims: &Dims) -> String {
    match dims {
        Dims::Scalar => format!("logic {name};"),
        Dims::Vector(w) => format!("logic [{}:0] {name};", w - 1),
        Dims::Memory(depth, width) => format!("logic [{}:0] {name} [0:{}];", width - 1, depth - 1),
        Dims::Enum(name_ty) => format!("{name_ty}_t {name};"),
    }
}

/// The same shape without a trailing `;`, direction-prefixed, for a module
/// header's port list.
fn format_port(direction: Direction, name: &str, dims: &Dims) -> String {
    let dir = direction.as_str();
    match dims {
        Dims::Scalar => format!("{dir} logic {name}"),
        Dims::Vector(w) => format!("{dir} logic [{}:0] {name}", w - 1),
        Dims::Memory(depth, width) => format!("{dir} logic [{}:0] {name} [0:{}]", width - 1, depth - 1),
        Dims::Enum(name_ty) => format!("{dir} {name_ty}_t {name}"),
    }
}

/// Recursively serializes a lowered statement list at the given indentation
/// level, `unit` spaces per level, appending to `out`.
pub fn render_stmts(stmts: &[Stmt], level: usize, unit: usize, out: &mut String) {
    for stmt in stmts {
        match stmt {
            Stmt::Assign(line) => {
                out.push_str(&indent(level, unit));
                out.push_str(line);
                out.push('\n');
            }
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => render_if(cond, then_body, else_body, level, unit, out, true),
            Stmt::Case { subject, arms } => {
                out.push_str(&indent(level, unit));
                out.push_str(&format!("unique case ({subject})\n"));
                for (pattern, body) in arms {
                    out.push_str(&indent(level + 1, unit));
                    out.push_str(&format!("{pattern}: begin\n"));
                    render_stmts(body, level + 2, unit, out);
                    out.push_str(&indent(level + 1, unit));
                    out.push_str("end\n");
                }
                out.push_str(&indent(level, unit));
                out.push_str("endcase\n");
            }
        }
    }
}

/// `elif` chains collapse to `else if` (spec.md §4.5): an else-branch that is
/// exactly one nested `If` renders inline instead of opening its own `begin`.
fn render_if(
    cond: &str,
    then_body: &[Stmt],
    else_body: &[Stmt],
    level: usize,
    unit: usize,
    out: &mut String,
    leading_indent: bool,
) {
    if leading_indent {
        out.push_str(&indent(level, unit));
    }
    out.push_str(&format!("if ({cond}) begin\n"));
    render_stmts(then_body, level + 1, unit, out);
    match else_body {
        [Stmt::If {
            cond: inner_cond,
            then_body: inner_then,
            else_body: inner_else,
        }] => {
            out.push_str(&indent(level, unit));
            out.push_str("end else ");
            render_if(inner_cond, inner_then, inner_else, level, unit, out, false);
        }
        [] => {
            out.push_str(&indent(level, unit));
            out.push_str("end\n");
        }
        _ => {
            out.push_str(&indent(level, unit));
            out.push_str("end else begin\n");
            render_stmts(else_body, level + 1, unit, out);
            out.push_str(&indent(level, unit));
            out.push_str("end\n");
        }
    }
}

/// Serializes one sealed `ModuleContext`. `all_modules` is consulted only to
/// emit each instance's port mapping in the referenced sub-module's own port
/// order (spec.md §4.8 rule 4), not the order the wiring statements arrived.
/// `unit` is the number of spaces a single indentation level occupies
/// (`TranslateOptions::indent_width`).
pub fn emit_module(module: &ModuleContext, all_modules: &OrderedMap<String, ModuleContext>, unit: usize) -> String {
    let mut sections = Vec::new();
    let pad = indent(1, unit);

    if module.ports.is_empty() {
        sections.push(format!("module {} ();", module.name));
    } else {
        let port_lines: Vec<String> = module
            .ports
            .iter()
            .map(|p| format!("{pad}{}", format_port(p.direction, &p.name, &p.dims)))
            .collect();
        sections.push(format!("module {} (\n{}\n);", module.name, port_lines.join(",\n")));
    }

    if !module.enums.is_empty() {
        let mut block = String::new();
        for def in module.enums.values() {
            let states: Vec<String> = def
                .states
                .iter()
                .map(|(name, value)| format!("{name}={}'d{value}", def.width))
                .collect();
            block.push_str(&format!(
                "{pad}typedef enum logic [{}:0] {{{}}} {}_t;\n",
                def.width - 1,
                states.join(", "),
                def.name
            ));
        }
        sections.push(block.trim_end().to_string());
    }

    if !module.internal_decls.is_empty() {
        let lines: Vec<String> = module.internal_decls.iter().map(|d| format!("{pad}{d}")).collect();
        sections.push(lines.join("\n"));
    }

    if !module.instances.is_empty() {
        let mut lines = Vec::new();
        for (inst_name, inst) in module.instances.iter() {
            let ports = all_modules
                .get(&inst.module_name)
                .map(|sub| sub.ports.as_slice())
                .unwrap_or(&[]);
            let mapping: Vec<String> = ports
                .iter()
                .filter_map(|p| inst.port_mapping.get(&p.name).map(|rhs| format!(".{}({rhs})", p.name)))
                .collect();
            lines.push(format!("{pad}{} {inst_name} ({});", inst.module_name, mapping.join(", ")));
        }
        sections.push(lines.join("\n"));
    }

    if !module.comb_buffer.is_empty() {
        let mut block = format!("{pad}always_comb begin\n");
        render_stmts(&module.comb_buffer, 2, unit, &mut block);
        block.push_str(&pad);
        block.push_str("end");
        sections.push(block);
    }

    for (clock_spec, body) in module.seq_buffers.iter() {
        let mut block = format!("{pad}always_ff @({clock_spec}) begin\n");
        render_stmts(body, 2, unit, &mut block);
        block.push_str(&pad);
        block.push_str("end");
        sections.push(block);
    }

    sections.push("endmodule".to_string());
    sections.join("\n\n")
}
