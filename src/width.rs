//! The Width Inferencer (spec.md §4.2).
//!
//! Computes the bit-width of an expression structurally, consulting the
//! symbol table and the Constant Evaluator where needed. This never fails
//! outright except for the one case spec.md §4.9 calls fatal: a slice with
//! a missing bound.

use crate::ast::Node;
use crate::consteval::eval_const;
use crate::dims::Dims;
use crate::error::{TranslateError, Warning};
use crate::paramstack::ParamStack;
use crate::symtab::ModuleContext;

pub fn infer_width(
    node: &Node,
    params: &ParamStack,
    module: &ModuleContext,
    warnings: &mut Vec<Warning>,
) -> Result<u32, TranslateError> {
    Ok(match node {
        Node::Tuple { elts } => {
            let mut total = 0;
            for e in elts {
                total += infer_width(e, params, module, warnings)?;
            }
            total.max(1)
        }
        Node::IfExp { body, orelse, .. } => {
            infer_width(body, params, module, warnings)?.max(infer_width(orelse, params, module, warnings)?)
        }
        Node::UnaryOp { operand, .. } => infer_width(operand, params, module, warnings)?,
        Node::Slice { .. } => 1, // a bare slice node is only ever visited as a Subscript's `slice`
        Node::Subscript { value, slice } => match &**slice {
            Node::Slice {
                lower: Some(lo),
                upper: Some(hi),
            } => {
                let lo_v = eval_const(lo, params, module);
                let hi_v = eval_const(hi, params, module);
                match (lo_v, hi_v) {
                    (Some(lo_v), Some(hi_v)) => (hi_v - lo_v).unsigned_abs() as u32 + 1,
                    _ => {
                        warnings.push(Warning::UnresolvedDimension {
                            name: signal_hint(value),
                        });
                        1
                    }
                }
            }
            Node::Slice { .. } => {
                return Err(TranslateError::MalformedSlice {
                    signal: signal_hint(value),
                });
            }
            _ => {
                if let Node::Name { id, .. } = &**value {
                    match module.symbols.get(&id.to_string()) {
                        Some(Dims::Memory(_, w)) => *w,
                        _ => 1,
                    }
                } else {
                    1
                }
            }
        },
        Node::BinOp { left, op, right } => {
            let wl = infer_width(left, params, module, warnings)?;
            let wr = infer_width(right, params, module, warnings)?;
            if op.is_additive() {
                wl.max(wr) + 1
            } else {
                wl.max(wr)
            }
        }
        Node::Compare { .. } | Node::BoolOp { .. } => 1,
        Node::Name { id, .. } => {
            if let Some(v) = eval_const(node, params, module) {
                v.max(1) as u32
            } else if let Some(dims) = module.symbols.get(id) {
                dims.width(&module.enums)
            } else {
                1
            }
        }
        Node::Attribute { value, attr } => {
            let resolved = match &**value {
                Node::Name { id, .. } => Some(format!("{id}_{attr}")),
                _ => None,
            };
            resolved
                .and_then(|name| module.symbols.get(&name).map(|dims| dims.width(&module.enums)))
                .unwrap_or(1)
        }
        Node::Constant { value } => {
            if *value == 0 {
                1
            } else {
                (64 - value.unsigned_abs().leading_zeros()).max(1)
            }
        }
        _ => 1,
    })
}

fn signal_hint(node: &Node) -> String {
    match node {
        Node::Name { id, .. } => id.clone(),
        _ => "<expr>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOpKind, Ctx};

    fn module_with(name: &str, dims: Dims) -> ModuleContext {
        let mut m = ModuleContext::new("M");
        m.symbols.insert(name.to_string(), dims);
        m
    }

    #[test]
    fn additive_binop_widens_by_one() {
        let params = ParamStack::new();
        let module = module_with("a", Dims::Vector(8));
        let mut warnings = Vec::new();
        let expr = Node::BinOp {
            left: Box::new(Node::name("a", Ctx::Load)),
            op: BinOpKind::Add,
            right: Box::new(Node::name("a", Ctx::Load)),
        };
        assert_eq!(infer_width(&expr, &params, &module, &mut warnings).unwrap(), 9);
    }

    #[test]
    fn compare_is_one_bit() {
        let params = ParamStack::new();
        let module = module_with("a", Dims::Vector(8));
        let mut warnings = Vec::new();
        let expr = Node::Compare {
            left: Box::new(Node::name("a", Ctx::Load)),
            ops: vec![crate::ast::CmpOpKind::Lt],
            comparators: vec![Node::constant(4)],
        };
        assert_eq!(infer_width(&expr, &params, &module, &mut warnings).unwrap(), 1);
    }

    #[test]
    fn tuple_sums_widths() {
        let params = ParamStack::new();
        let mut module = module_with("a", Dims::Vector(2));
        module.symbols.insert("b".to_string(), Dims::Vector(3));
        let mut warnings = Vec::new();
        let expr = Node::Tuple {
            elts: vec![Node::name("a", Ctx::Load), Node::name("b", Ctx::Load)],
        };
        assert_eq!(infer_width(&expr, &params, &module, &mut warnings).unwrap(), 5);
    }

    #[test]
    fn literal_width_is_log2_floor_plus_one() {
        let params = ParamStack::new();
        let module = ModuleContext::new("M");
        let mut warnings = Vec::new();
        assert_eq!(
            infer_width(&Node::constant(8), &params, &module, &mut warnings).unwrap(),
            4
        );
        assert_eq!(
            infer_width(&Node::constant(0), &params, &module, &mut warnings).unwrap(),
            1
        );
    }

    #[test]
    fn indexing_a_vector_is_a_single_bit() {
        let params = ParamStack::new();
        let module = module_with("a", Dims::Vector(8));
        let mut warnings = Vec::new();
        let expr = Node::Subscript {
            value: Box::new(Node::name("a", Ctx::Load)),
            slice: Box::new(Node::constant(3)),
        };
        assert_eq!(infer_width(&expr, &params, &module, &mut warnings).unwrap(), 1);
    }

    #[test]
    fn indexing_a_memory_yields_inner_width() {
        let params = ParamStack::new();
        let module = module_with("mem", Dims::Memory(4, 8));
        let mut warnings = Vec::new();
        let expr = Node::Subscript {
            value: Box::new(Node::name("mem", Ctx::Load)),
            slice: Box::new(Node::constant(1)),
        };
        assert_eq!(infer_width(&expr, &params, &module, &mut warnings).unwrap(), 8);
    }

    #[test]
    fn malformed_slice_is_fatal() {
        let params = ParamStack::new();
        let module = module_with("a", Dims::Vector(8));
        let mut warnings = Vec::new();
        let expr = Node::Subscript {
            value: Box::new(Node::name("a", Ctx::Load)),
            slice: Box::new(Node::Slice {
                lower: None,
                upper: Some(Box::new(Node::constant(3))),
            }),
        };
        assert!(infer_width(&expr, &params, &module, &mut warnings).is_err());
    }
}
