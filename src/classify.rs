//! The Statement Classifier (spec.md §4.4): dispatches an `Assign` to one of
//! five roles, committing to the first matching rule in order.

use crate::ast::Node;
use crate::consteval::eval_const;
use crate::control::{render_expr, Env};
use crate::dims::Dims;
use crate::error::{TranslateError, Warning};
use crate::resolve::{resolve_type, TypeResolution};
use crate::stmt::Stmt;
use crate::symtab::{Direction, ModuleContext, Port};
use crate::width::infer_width;

pub fn classify_assign(
    env: &mut Env<'_>,
    module: &mut ModuleContext,
    clock: &mut Option<String>,
    target: &Node,
    value: &Node,
    target_buf: &mut Vec<Stmt>,
) -> Result<(), TranslateError> {
    // Rule 1: constant definition.
    if clock.is_none() {
        if let (Node::Name { id, .. }, Node::Constant { value: v }) = (target, value) {
            if !module.symbols.contains_key(id) {
                module.constants.insert(id.clone(), *v);
                return Ok(());
            }
        }
    }

    // Rule 2: submodule port wiring.
    if clock.is_none() {
        if let Node::Attribute { value: base, attr: port } = target {
            if let Node::Name { id: inst_name, .. } = &**base {
                if let Some(mod_name) = module.instances.get(inst_name).map(|i| i.module_name.clone()) {
                    let port_info = env.modules.get(&mod_name).and_then(|sub| {
                        sub.ports
                            .iter()
                            .find(|p| &p.name == port)
                            .map(|p| (p.dims.clone(), sub.enums.clone()))
                    });
                    match port_info {
                        Some((dims, sub_enums)) => {
                            let width = dims.width(&sub_enums);
                            let rendered = match value {
                                Node::Constant { value: v } => format!("{width}'d{v}"),
                                _ => render_expr(value, env.params, module, env.enum_registry, env.warnings)?,
                            };
                            if let Some(inst) = module.instances.get_mut(inst_name) {
                                inst.port_mapping.insert(port.clone(), rendered);
                            }
                        }
                        None => {
                            tracing::warn!(instance = %inst_name, port, "unknown instance port");
                            env.warnings.push(Warning::UnknownInstancePort {
                                instance: inst_name.clone(),
                                port: port.clone(),
                            });
                        }
                    }
                    return Ok(());
                }
            }
        }
    }

    // Rule 3: template/module instantiation.
    if let (Node::Name { id: lhs, .. }, Node::Call { func, keywords, .. }) = (target, value) {
        if env.templates.contains_key(func) || env.modules.contains_key(func) {
            crate::template::instantiate(env, module, lhs, func, keywords)?;
            return Ok(());
        }
    }

    // Rule 4: declaration.
    if let Node::Name { id, .. } = target {
        match resolve_type(value, env.params, module, env.enum_registry) {
            TypeResolution::Resolved(dims, direction) => {
                module.symbols.insert(id.clone(), dims.clone());
                match direction {
                    Some(dir) => module.ports.push(Port {
                        name: id.clone(),
                        direction: dir,
                        dims,
                    }),
                    None => module.internal_decls.push(crate::emit::format_decl("", id, &dims)),
                }
                return Ok(());
            }
            TypeResolution::Unresolved => {
                env.warnings.push(Warning::UnresolvedDimension { name: id.clone() });
                return Ok(());
            }
            TypeResolution::NotAType => {}
        }
    }

    // A call to an unrecognized callee is structural confusion (spec.md
    // §4.9), not a logic assignment; skip it rather than emit a malformed
    // RHS.
    if matches!(value, Node::Call { .. }) {
        return Ok(());
    }

    // Rule 5: logic assignment.
    let lhs_text = render_expr(target, env.params, module, env.enum_registry, env.warnings)?;
    let base = lhs_base_name(target);
    let known = base.and_then(|b| module.symbols.get(&b.to_string()).cloned());

    let (lhs_width, is_enum) = match &known {
        Some(dims) => (dims.width(&module.enums), dims.is_enum()),
        None => {
            let w = infer_width(value, env.params, module, env.warnings)?;
            if let Some(id) = base {
                let dims = Dims::Vector(w);
                module.symbols.insert(id.to_string(), dims.clone());
                module.internal_decls.push(crate::emit::format_decl("", id, &dims));
            }
            (w, false)
        }
    };

    // Any RHS that reduces to a compile-time integer renders as a sized
    // literal at the LHS's width, not just a bare `Constant` node — a loop
    // variable or template parameter bound on the parameter stack counts
    // too (spec.md §8 scenario 3).
    let rhs_text = match eval_const(value, env.params, module) {
        Some(v) => format!("{lhs_width}'d{v}"),
        None => {
            let rhs_width = infer_width(value, env.params, module, env.warnings)?;
            if !is_enum && rhs_width != lhs_width {
                env.warnings.push(Warning::WidthMismatch {
                    signal: lhs_text.clone(),
                    declared: lhs_width,
                    inferred: rhs_width,
                });
            }
            render_expr(value, env.params, module, env.enum_registry, env.warnings)?
        }
    };

    let line = if clock.is_some() {
        format!("{lhs_text} <= {rhs_text};")
    } else {
        format!("{lhs_text} = {rhs_text};")
    };
    target_buf.push(Stmt::Assign(line));
    Ok(())
}

fn lhs_base_name(node: &Node) -> Option<&str> {
    match node {
        Node::Name { id, .. } => Some(id),
        Node::Subscript { value, .. } => lhs_base_name(value),
        _ => None,
    }
}
