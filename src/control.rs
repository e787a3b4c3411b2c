//! Expression rendering and Control-Flow Lowering (spec.md §4.5).
//!
//! `render_expr` is the `visit_*` dispatch of the original draft, made
//! total over the closed `Node` enum instead of an open `ast.NodeVisitor`.
//! The `lower_*` functions replace the draft's buffer-swap trick: a nested
//! body is translated into a fresh `Vec<Stmt>` and handed back to the
//! caller, which decides what composite node to wrap it in.

use crate::ast::{BoolOpKind, MatchCase, Node};
use crate::consteval::eval_const;
use crate::dims::Dims;
use crate::error::{TranslateError, Warning};
use crate::ordered_map::OrderedMap;
use crate::paramstack::ParamStack;
use crate::stmt::Stmt;
use crate::symtab::{EnumDef, ModuleContext};

/// Renders an expression node to SystemVerilog text (spec.md §4.1's "visit"
/// rules, generalized over the full expression grammar of spec.md §6).
pub fn render_expr(
    node: &Node,
    params: &ParamStack,
    module: &mut ModuleContext,
    enum_registry: &OrderedMap<String, EnumDef>,
    warnings: &mut Vec<Warning>,
) -> Result<String, TranslateError> {
    Ok(match node {
        // A name bound on the parameter stack (a loop variable or template
        // parameter) has no corresponding wire in the emitted text; render
        // its resolved value instead of the identifier. A name known only
        // through `module.constants` (rule 1 of the statement classifier)
        // still renders as an identifier.
        Node::Name { id, .. } => match params.resolve(id) {
            Some(v) => v.to_string(),
            None => id.clone(),
        },
        Node::Constant { value } => value.to_string(),
        Node::BinOp { left, op, right } => format!(
            "({} {} {})",
            render_expr(left, params, module, enum_registry, warnings)?,
            op.symbol(),
            render_expr(right, params, module, enum_registry, warnings)?
        ),
        Node::Compare {
            left,
            ops,
            comparators,
        } => {
            if ops.len() > 1 {
                warnings.push(Warning::ChainedComparisonTruncated);
            }
            format!(
                "({} {} {})",
                render_expr(left, params, module, enum_registry, warnings)?,
                ops[0].symbol(),
                render_expr(&comparators[0], params, module, enum_registry, warnings)?
            )
        }
        Node::BoolOp { op, values } => {
            let rendered = values
                .iter()
                .map(|v| render_expr(v, params, module, enum_registry, warnings))
                .collect::<Result<Vec<_>, _>>()?;
            format!("({})", rendered.join(&format!(" {} ", op.symbol())))
        }
        Node::UnaryOp { op, operand } => format!(
            "{}{}",
            op.symbol(),
            render_expr(operand, params, module, enum_registry, warnings)?
        ),
        Node::IfExp { body, test, orelse } => format!(
            "({} ? {} : {})",
            render_expr(test, params, module, enum_registry, warnings)?,
            render_expr(body, params, module, enum_registry, warnings)?,
            render_expr(orelse, params, module, enum_registry, warnings)?
        ),
        Node::Tuple { elts } => {
            let rendered = elts
                .iter()
                .map(|e| render_expr(e, params, module, enum_registry, warnings))
                .collect::<Result<Vec<_>, _>>()?;
            format!("{{{}}}", rendered.join(", "))
        }
        Node::Subscript { value, slice } => {
            let name = render_expr(value, params, module, enum_registry, warnings)?;
            match &**slice {
                Node::Slice { lower, upper } => {
                    let (lo, hi) = match (lower, upper) {
                        (Some(l), Some(u)) => (l, u),
                        _ => return Err(TranslateError::MalformedSlice { signal: name }),
                    };
                    format!(
                        "{name}[{}:{}]",
                        render_expr(hi, params, module, enum_registry, warnings)?,
                        render_expr(lo, params, module, enum_registry, warnings)?
                    )
                }
                idx_node => {
                    if let Some(Dims::Memory(depth, _)) = module.symbols.get(&name).cloned() {
                        if let Some(idx) = eval_const(idx_node, params, module) {
                            if idx < 0 || idx >= depth as i64 {
                                warnings.push(Warning::OutOfBoundsIndex {
                                    signal: name.clone(),
                                    index: idx,
                                    depth,
                                });
                            }
                        }
                    }
                    format!("{name}[{}]", render_expr(idx_node, params, module, enum_registry, warnings)?)
                }
            }
        }
        Node::Attribute { value, attr } => {
            let base = render_expr(value, params, module, enum_registry, warnings)?;
            if let Some(def) = module
                .enums
                .get(&base.to_string())
                .cloned()
                .or_else(|| enum_registry.get(&base.to_string()).cloned())
            {
                if def.has_member(attr) {
                    module.enums.get_or_insert_with(base.clone(), || def.clone());
                    return Ok(attr.clone());
                }
                return Err(TranslateError::UnknownEnumMember {
                    enum_name: base,
                    member: attr.clone(),
                });
            }
            let internal_sig = format!("{base}_{attr}");
            if module.symbols.contains_key(&internal_sig) {
                internal_sig
            } else {
                format!("{base}.{attr}")
            }
        }
        Node::Call { .. } | Node::ClassDef { .. } | Node::Assign { .. } | Node::For { .. } | Node::If { .. }
        | Node::Match { .. } | Node::MatchValue { .. } | Node::MatchAs { .. } | Node::Slice { .. } => {
            warnings.push(Warning::UnsupportedExpression { shape: node_shape(node) });
            String::new()
        }
    })
}

fn node_shape(node: &Node) -> &'static str {
    match node {
        Node::Call { .. } => "Call",
        Node::ClassDef { .. } => "ClassDef",
        Node::Assign { .. } => "Assign",
        Node::For { .. } => "For",
        Node::If { .. } => "If",
        Node::Match { .. } => "Match",
        Node::MatchValue { .. } => "MatchValue",
        Node::MatchAs { .. } => "MatchAs",
        Node::Slice { .. } => "Slice",
        _ => "Expr",
    }
}

/// `MatchValue` and a wildcard `MatchAs` (spec.md §4.5: "a wildcard pattern
/// becomes `default:`"). Returns `None` for the wildcard.
pub fn render_pattern(
    pattern: &Node,
    params: &ParamStack,
    module: &mut ModuleContext,
    enum_registry: &OrderedMap<String, EnumDef>,
    warnings: &mut Vec<Warning>,
) -> Result<Option<String>, TranslateError> {
    match pattern {
        Node::MatchAs { pattern: None } => Ok(None),
        Node::MatchAs { pattern: Some(inner) } => {
            render_pattern(inner, params, module, enum_registry, warnings)
        }
        Node::MatchValue { value } => {
            Ok(Some(render_expr(value, params, module, enum_registry, warnings)?))
        }
        other => Ok(Some(render_expr(other, params, module, enum_registry, warnings)?)),
    }
}

/// spec.md §4.5: clock-edge markers, flattened through boolean `or`.
pub fn extract_edges(node: &Node) -> Vec<(String, &'static str)> {
    match node {
        Node::Attribute { value, attr } if attr == "posedge" || attr == "negedge" => {
            if let Node::Name { id, .. } = &**value {
                let edge = if attr == "posedge" { "posedge" } else { "negedge" };
                vec![(id.clone(), edge)]
            } else {
                Vec::new()
            }
        }
        Node::BoolOp {
            op: BoolOpKind::Or,
            values,
        } => values.iter().flat_map(extract_edges).collect(),
        _ => Vec::new(),
    }
}

/// The translator's scratch state, borrowed field-by-field for the
/// duration of a single `translate()` call. Threaded through every lowering
/// and classification function instead of a monolithic `&mut Translator`,
/// so a re-entrant call (template monomorphization) can freely recurse
/// without re-deriving which pieces of state it needs.
pub struct Env<'a> {
    pub params: &'a mut ParamStack,
    pub enum_registry: &'a mut OrderedMap<String, EnumDef>,
    pub templates: &'a mut OrderedMap<String, crate::template::Template>,
    pub modules: &'a mut OrderedMap<String, ModuleContext>,
    pub warnings: &'a mut Vec<Warning>,
    /// `(module_name, warning_count)` in module-creation order, populated by
    /// `translator::translate_module_body` for the "Transpilation Summary"
    /// report (SPEC_FULL.md §6).
    pub module_warnings: &'a mut Vec<(String, usize)>,
}

/// Translates a statement list into `target`, threading the active clock
/// spec (`None` = combinational level) through nested control flow.
pub fn translate_stmts(
    env: &mut Env<'_>,
    module: &mut ModuleContext,
    clock: &mut Option<String>,
    stmts: &[Node],
    target: &mut Vec<Stmt>,
) -> Result<(), TranslateError> {
    for stmt in stmts {
        translate_stmt(env, module, clock, stmt, target)?;
    }
    Ok(())
}

fn translate_stmt(
    env: &mut Env<'_>,
    module: &mut ModuleContext,
    clock: &mut Option<String>,
    stmt: &Node,
    target: &mut Vec<Stmt>,
) -> Result<(), TranslateError> {
    match stmt {
        Node::Assign { targets, value } => {
            if let Some(lhs) = targets.first() {
                crate::classify::classify_assign(env, module, clock, lhs, value, target)?;
            }
        }
        Node::For { target: var, iter, body } => {
            lower_for(env, module, clock, var, iter, body, target)?;
        }
        Node::If { test, body, orelse } => {
            lower_if(env, module, clock, test, body, orelse, target)?;
        }
        Node::Match { subject, cases } => {
            lower_match(env, module, clock, subject, cases, target)?;
        }
        Node::ClassDef { name, bases, body } => {
            if crate::template::is_enum_base(bases) {
                crate::template::register_enum(env, name, body);
            }
            // A nested, non-`Enum` `ClassDef` inside a statement body has no
            // defined meaning in spec.md; skip it (§4.9, "structural
            // confusion").
        }
        _ => { /* unrecognized top-level statement shape: inert, per spec.md §4.9 */ }
    }
    Ok(())
}

fn lower_for(
    env: &mut Env<'_>,
    module: &mut ModuleContext,
    clock: &mut Option<String>,
    loop_var: &str,
    iter: &Node,
    body: &[Node],
    target: &mut Vec<Stmt>,
) -> Result<(), TranslateError> {
    if let Node::Call { func, args, .. } = iter {
        if func == "range" && (1..=3).contains(&args.len()) {
            let bounds: Option<Vec<i64>> = args
                .iter()
                .map(|a| eval_const(a, env.params, module))
                .collect();
            if let Some(bounds) = bounds {
                let (start, stop, step) = match bounds.len() {
                    1 => (0, bounds[0], 1),
                    2 => (bounds[0], bounds[1], 1),
                    _ => (bounds[0], bounds[1], bounds[2]),
                };
                if step != 0 {
                    let mut v = start;
                    while (step > 0 && v < stop) || (step < 0 && v > stop) {
                        env.params.push(vec![(loop_var.to_string(), v)]);
                        tracing::trace!(loop_var, v, "unrolling loop iteration");
                        translate_stmts(env, module, clock, body, target)?;
                        env.params.pop();
                        v += step;
                    }
                    return Ok(());
                }
            }
        }
    }
    tracing::warn!(loop_var, "loop bound did not evaluate; skipping loop");
    env.warnings.push(Warning::UnevaluableLoop {
        loop_var: loop_var.to_string(),
    });
    Ok(())
}

fn lower_if(
    env: &mut Env<'_>,
    module: &mut ModuleContext,
    clock: &mut Option<String>,
    test: &Node,
    body: &[Node],
    orelse: &[Node],
    target: &mut Vec<Stmt>,
) -> Result<(), TranslateError> {
    if clock.is_some() {
        let cond = render_expr(test, env.params, module, env.enum_registry, env.warnings)?;
        let mut then_body = Vec::new();
        translate_stmts(env, module, clock, body, &mut then_body)?;
        let mut else_body = Vec::new();
        translate_stmts(env, module, clock, orelse, &mut else_body)?;
        target.push(Stmt::If {
            cond,
            then_body,
            else_body,
        });
        return Ok(());
    }

    let edges = extract_edges(test);
    if !edges.is_empty() {
        let spec = edges
            .iter()
            .map(|(name, edge)| format!("{edge} {name}"))
            .collect::<Vec<_>>()
            .join(" or ");
        tracing::debug!(clock_spec = %spec, "entering sequential block");
        *clock = Some(spec.clone());
        // Pull this clock's buffer out of the map rather than borrowing it
        // in place: a live sub-borrow of `module.seq_buffers` can't coexist
        // with the `&mut module` this recursive call also needs.
        let mut seq_buf = module.seq_buffers.remove(&spec).unwrap_or_default();
        translate_stmts(env, module, clock, body, &mut seq_buf)?;
        module.seq_buffers.insert(spec, seq_buf);
        *clock = None;
        return Ok(());
    }

    let cond = render_expr(test, env.params, module, env.enum_registry, env.warnings)?;
    let mut then_body = Vec::new();
    translate_stmts(env, module, clock, body, &mut then_body)?;
    let mut else_body = Vec::new();
    translate_stmts(env, module, clock, orelse, &mut else_body)?;
    target.push(Stmt::If {
        cond,
        then_body,
        else_body,
    });
    Ok(())
}

fn lower_match(
    env: &mut Env<'_>,
    module: &mut ModuleContext,
    clock: &mut Option<String>,
    subject: &Node,
    cases: &[MatchCase],
    target: &mut Vec<Stmt>,
) -> Result<(), TranslateError> {
    let subject_code = render_expr(subject, env.params, module, env.enum_registry, env.warnings)?;
    let mut arms = Vec::new();
    let mut has_default = false;
    for case in cases {
        let pattern = render_pattern(&case.pattern, env.params, module, env.enum_registry, env.warnings)?;
        let mut body = Vec::new();
        translate_stmts(env, module, clock, &case.body, &mut body)?;
        match pattern {
            Some(p) => arms.push((p, body)),
            None => {
                arms.push(("default".to_string(), body));
                has_default = true;
            }
        }
    }
    if !has_default {
        // spec.md §8 "Unique case totality": every emitted `unique case`
        // must carry a `default:`, even an empty one.
        arms.push(("default".to_string(), Vec::new()));
    }
    target.push(Stmt::Case {
        subject: subject_code,
        arms,
    });
    Ok(())
}
