//! The Dimension/Type Resolver (spec.md §4.3).
//!
//! Recognizes the handful of expression shapes that denote a type
//! annotation — `bit[...]`, `In(T)`/`Out(T)`, or a bare reference to a known
//! `Enum` — and extracts a canonical `Dims` plus an optional port
//! direction. Anything else is "not a type", which tells the statement
//! classifier to fall through to a logic assignment instead.

use crate::ast::Node;
use crate::consteval::eval_const;
use crate::dims::Dims;
use crate::ordered_map::OrderedMap;
use crate::paramstack::ParamStack;
use crate::symtab::{Direction, EnumDef, ModuleContext};

pub enum TypeResolution {
    /// Not a recognized type-annotation shape at all; fall through to rule
    /// 5 (logic assignment).
    NotAType,
    Resolved(Dims, Option<Direction>),
    /// It *is* a `bit[...]` shape, but a subscript didn't reduce to an
    /// integer (spec.md §4.9: "un-evaluable dimension... warning, skip").
    Unresolved,
}

/// spec.md §4.3: `In(T)`/`Out(T)` extract dims from `T` via the raw
/// resolver; a bare enum name is `[enum_name]` with no direction;
/// everything else goes through the raw resolver with no direction.
pub fn resolve_type(
    node: &Node,
    params: &ParamStack,
    module: &mut ModuleContext,
    enum_registry: &OrderedMap<String, EnumDef>,
) -> TypeResolution {
    if let Node::Call { func, args, .. } = node {
        if (func == "In" || func == "Out") && args.len() == 1 {
            let direction = if func == "In" {
                Direction::Input
            } else {
                Direction::Output
            };
            return match resolve_raw(&args[0], params, module) {
                RawResolution::Dims(dims) => TypeResolution::Resolved(dims, Some(direction)),
                RawResolution::NotBit => TypeResolution::NotAType,
                RawResolution::Unresolved => TypeResolution::Unresolved,
            };
        }
    }

    if let Node::Name { id, .. } = node {
        if let Some(def) = module.enums.get(&id.to_string()).or_else(|| enum_registry.get(&id.to_string())) {
            module.enums.get_or_insert_with(id.clone(), || def.clone());
            return TypeResolution::Resolved(Dims::Enum(id.clone()), None);
        }
    }

    match resolve_raw(node, params, module) {
        RawResolution::Dims(dims) => TypeResolution::Resolved(dims, None),
        RawResolution::NotBit => TypeResolution::NotAType,
        RawResolution::Unresolved => TypeResolution::Unresolved,
    }
}

enum RawResolution {
    Dims(Dims),
    NotBit,
    Unresolved,
}

/// Descends nested `Subscript(Subscript(Name("bit"), d), w)` chains,
/// evaluating each slice via the Constant Evaluator, and reverses the
/// collected dims so the innermost subscript (width) is last.
fn resolve_raw(node: &Node, params: &ParamStack, module: &ModuleContext) -> RawResolution {
    let mut raw = Vec::new();
    let mut curr = node;
    loop {
        match curr {
            Node::Subscript { value, slice } => {
                match eval_const(slice, params, module) {
                    Some(v) if v > 0 => raw.push(v as u32),
                    _ => return RawResolution::Unresolved,
                }
                curr = value;
            }
            Node::Name { id, .. } if id == "bit" => {
                raw.reverse();
                let dims = match raw.len() {
                    0 => Dims::Scalar,
                    1 => Dims::Vector(raw[0]),
                    _ => Dims::Memory(raw[0], raw[1]),
                };
                return RawResolution::Dims(dims);
            }
            _ => return RawResolution::NotBit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Ctx;

    fn call(name: &str, arg: Node) -> Node {
        Node::Call {
            func: name.to_string(),
            args: vec![arg],
            keywords: Vec::new(),
        }
    }

    fn bit(dims: &[i64]) -> Node {
        let mut node = Node::name("bit", Ctx::Load);
        for d in dims {
            node = Node::Subscript {
                value: Box::new(node),
                slice: Box::new(Node::constant(*d)),
            };
        }
        node
    }

    #[test]
    fn in_vector() {
        let params = ParamStack::new();
        let mut module = ModuleContext::new("M");
        let registry = OrderedMap::new();
        let node = call("In", bit(&[8]));
        match resolve_type(&node, &params, &mut module, &registry) {
            TypeResolution::Resolved(Dims::Vector(8), Some(Direction::Input)) => {}
            _ => panic!("expected In(bit[8])"),
        }
    }

    #[test]
    fn memory_dims_depth_then_width() {
        let params = ParamStack::new();
        let mut module = ModuleContext::new("M");
        let registry = OrderedMap::new();
        let node = bit(&[4, 8]);
        match resolve_type(&node, &params, &mut module, &registry) {
            TypeResolution::Resolved(Dims::Memory(4, 8), None) => {}
            _ => panic!("expected bit[4][8] -> Memory(4, 8)"),
        }
    }

    #[test]
    fn not_a_type() {
        let params = ParamStack::new();
        let mut module = ModuleContext::new("M");
        let registry = OrderedMap::new();
        let node = Node::name("sw_a", Ctx::Load);
        assert!(matches!(
            resolve_type(&node, &params, &mut module, &registry),
            TypeResolution::NotAType
        ));
    }
}
