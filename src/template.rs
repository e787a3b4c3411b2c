//! The Template Monomorphizer (spec.md §4.7) and `Enum` class registration.

use std::collections::HashSet;

use crate::ast::{Ctx, Keyword, Node};
use crate::control::Env;
use crate::dims::Dims;
use crate::error::TranslateError;
use crate::symtab::{Direction, EnumDef, Instance};

/// Builtins the free-name check never treats as "free" (spec.md §4.7,
/// extended per SPEC_FULL.md §9 resolution #4 to include `len`).
const BUILTINS: &[&str] = &[
    "bit", "In", "Out", "Module", "Enum", "range", "True", "False", "None", "not", "and", "or", "len",
];

/// An unresolved class body awaiting monomorphization, keyed by its
/// declared (unmangled) name.
#[derive(Debug, Clone)]
pub struct Template {
    pub body: Vec<Node>,
}

pub fn is_enum_base(bases: &[String]) -> bool {
    bases.iter().any(|b| b == "Enum")
}

/// spec.md §4.7: member table + derived width, stored in the global enum
/// registry. Modules that reference the enum materialize their own copy
/// into `ModuleContext::enums` on first use (`resolve::resolve_type`,
/// `control::render_expr`) — see DESIGN.md "enum scoping".
pub fn register_enum(env: &mut Env<'_>, name: &str, body: &[Node]) {
    let mut states = crate::ordered_map::OrderedMap::new();
    for stmt in body {
        if let Node::Assign { targets, value } = stmt {
            if let (Some(Node::Name { id, .. }), Node::Constant { value: v }) = (targets.first(), &**value) {
                states.insert(id.clone(), *v);
            }
        }
    }
    let n = states.len().max(1);
    let width = if n <= 1 {
        1
    } else {
        (64 - ((n - 1) as u64).leading_zeros()).max(1)
    };
    tracing::debug!(enum_name = name, width, "registered enum");
    env.enum_registry.insert(
        name.to_string(),
        EnumDef {
            name: name.to_string(),
            states,
            width,
        },
    );
}

/// spec.md §4.7: a class is parameterized iff its body, after collecting
/// every name it defines itself (assignment targets, loop variables,
/// nested `Enum` names, and the names of templates already known), still
/// loads some name that isn't a builtin.
pub fn is_parameterized(templates: &crate::ordered_map::OrderedMap<String, Template>, body: &[Node]) -> bool {
    let mut defined: HashSet<String> = BUILTINS.iter().map(|s| s.to_string()).collect();
    for name in templates.keys() {
        defined.insert(name.clone());
    }
    let mut loads: HashSet<String> = HashSet::new();
    for stmt in body {
        walk_names(stmt, &mut defined, &mut loads);
    }
    loads.iter().any(|name| !defined.contains(name))
}

fn walk_names(node: &Node, defined: &mut HashSet<String>, loads: &mut HashSet<String>) {
    match node {
        Node::ClassDef { name, bases, body } => {
            if is_enum_base(bases) {
                defined.insert(name.clone());
            }
            for s in body {
                walk_names(s, defined, loads);
            }
        }
        Node::Assign { targets, value } => {
            for t in targets {
                walk_names(t, defined, loads);
            }
            walk_names(value, defined, loads);
        }
        Node::For { target, iter, body } => {
            defined.insert(target.clone());
            walk_names(iter, defined, loads);
            for s in body {
                walk_names(s, defined, loads);
            }
        }
        Node::If { test, body, orelse } => {
            walk_names(test, defined, loads);
            for s in body {
                walk_names(s, defined, loads);
            }
            for s in orelse {
                walk_names(s, defined, loads);
            }
        }
        Node::Match { subject, cases } => {
            walk_names(subject, defined, loads);
            for case in cases {
                walk_names(&case.pattern, defined, loads);
                for s in &case.body {
                    walk_names(s, defined, loads);
                }
            }
        }
        Node::MatchValue { value } => walk_names(value, defined, loads),
        Node::MatchAs { pattern: Some(p) } => walk_names(p, defined, loads),
        Node::MatchAs { pattern: None } => {}
        Node::BinOp { left, right, .. } => {
            walk_names(left, defined, loads);
            walk_names(right, defined, loads);
        }
        Node::BoolOp { values, .. } => {
            for v in values {
                walk_names(v, defined, loads);
            }
        }
        Node::UnaryOp { operand, .. } => walk_names(operand, defined, loads),
        Node::Compare { left, comparators, .. } => {
            walk_names(left, defined, loads);
            for c in comparators {
                walk_names(c, defined, loads);
            }
        }
        Node::IfExp { body, test, orelse } => {
            walk_names(body, defined, loads);
            walk_names(test, defined, loads);
            walk_names(orelse, defined, loads);
        }
        Node::Subscript { value, slice } => {
            walk_names(value, defined, loads);
            walk_names(slice, defined, loads);
        }
        Node::Slice { lower, upper } => {
            if let Some(l) = lower {
                walk_names(l, defined, loads);
            }
            if let Some(u) = upper {
                walk_names(u, defined, loads);
            }
        }
        Node::Attribute { value, .. } => walk_names(value, defined, loads),
        Node::Name { id, ctx } => match ctx {
            Ctx::Load => {
                loads.insert(id.clone());
            }
            Ctx::Store => {
                defined.insert(id.clone());
            }
        },
        Node::Constant { .. } => {}
        Node::Tuple { elts } => {
            for e in elts {
                walk_names(e, defined, loads);
            }
        }
        Node::Call { args, keywords, .. } => {
            for a in args {
                walk_names(a, defined, loads);
            }
            for k in keywords {
                walk_names(&k.value, defined, loads);
            }
        }
    }
}

/// spec.md §4.4 rule 3: instantiate a template or a plain (zero-parameter)
/// module, monomorphizing it on first use and memoizing by mangled name.
pub fn instantiate(
    env: &mut Env<'_>,
    module: &mut crate::symtab::ModuleContext,
    lhs: &str,
    func: &str,
    keywords: &[Keyword],
) -> Result<(), TranslateError> {
    let mut params = Vec::new();
    for kw in keywords {
        if let Node::Constant { value } = &kw.value {
            params.push((kw.arg.clone(), *value));
        }
    }

    let mangled = if params.is_empty() {
        func.to_string()
    } else {
        let mut name = func.to_string();
        for (k, v) in &params {
            name.push('_');
            name.push_str(k);
            name.push_str(&v.to_string());
        }
        name
    };

    if !env.modules.contains_key(&mangled) {
        if let Some(template) = env.templates.get(func).cloned() {
            tracing::debug!(template = func, mangled, "monomorphizing template");
            env.params.push(params);
            let result = crate::translator::translate_module_body(env, mangled.clone(), &template.body);
            env.params.pop();
            result?;
        }
        // If `func` names neither a template nor an already-concrete
        // module, it isn't a known instantiable name; the caller only
        // reaches `instantiate` after confirming one of the two, so this
        // branch is unreachable in practice.
    }

    let Some(sub) = env.modules.get(&mangled) else {
        return Ok(());
    };
    let mut mapping = crate::ordered_map::OrderedMap::new();
    let mut new_decls = Vec::new();
    let mut new_symbols = Vec::new();
    let mut borrowed_enums = Vec::new();
    for port in &sub.ports {
        if port.direction == Direction::Output {
            let sig = format!("{lhs}_{}", port.name);
            mapping.insert(port.name.clone(), sig.clone());
            new_decls.push(crate::emit::format_decl("", &sig, &port.dims));
            new_symbols.push((sig, port.dims.clone()));
            if let Dims::Enum(name) = &port.dims {
                if let Some(def) = sub.enums.get(&name.to_string()) {
                    borrowed_enums.push(def.clone());
                }
            }
        }
    }
    for (name, dims) in new_symbols {
        module.symbols.insert(name, dims);
    }
    module.internal_decls.extend(new_decls);
    for def in borrowed_enums {
        module.enums.get_or_insert_with(def.name.clone(), || def);
    }
    module.instances.insert(
        lhs.to_string(),
        Instance {
            module_name: mangled,
            port_mapping: mapping,
        },
    );
    Ok(())
}
