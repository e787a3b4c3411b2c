//! The Constant Evaluator (spec.md §4.1).
//!
//! Reduces a narrow expression shape — integer literals, names, and binary
//! arithmetic on already-known operands — to a compile-time integer.
//! Anything else (comparisons, boolean ops, unary ops, calls, subscripts...)
//! is "unknown": this is a deliberately small evaluator for widths, loop
//! bounds, and array dimensions, not a general partial evaluator.

use crate::ast::{BinOpKind, Node};
use crate::paramstack::ParamStack;
use crate::symtab::ModuleContext;

/// Evaluates `node` to an integer, or returns `None` ("unknown") per
/// spec.md §4.1's ordered rule list.
pub fn eval_const(node: &Node, params: &ParamStack, module: &ModuleContext) -> Option<i64> {
    match node {
        Node::Constant { value } => Some(*value),
        Node::Name { id, .. } => params
            .resolve(id)
            .or_else(|| module.constants.get(&id.to_string()).copied()),
        Node::BinOp { left, op, right } => {
            let l = eval_const(left, params, module)?;
            let r = eval_const(right, params, module)?;
            apply(*op, l, r)
        }
        _ => None,
    }
}

fn apply(op: BinOpKind, l: i64, r: i64) -> Option<i64> {
    match op {
        BinOpKind::Add => l.checked_add(r),
        BinOpKind::Sub => l.checked_sub(r),
        BinOpKind::Mul => l.checked_mul(r),
        // Truncating toward zero, matching Rust's native `/` and `%`;
        // spec.md §4.1 calls for the same truncation for width/dimension
        // arithmetic (SPEC_FULL.md §9 resolution #3).
        BinOpKind::Div => l.checked_div(r),
        BinOpKind::Mod => l.checked_rem(r),
        BinOpKind::Pow => {
            let exp = u32::try_from(r).ok()?;
            l.checked_pow(exp)
        }
        // Bitwise/shift operators aren't in the evaluable set (spec.md
        // §4.1 lists only `+ - * / % **`).
        BinOpKind::BitAnd
        | BinOpKind::BitOr
        | BinOpKind::BitXor
        | BinOpKind::Shl
        | BinOpKind::Shr => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Ctx;

    fn module() -> ModuleContext {
        let mut m = ModuleContext::new("M");
        m.constants.insert("N".into(), 4);
        m
    }

    #[test]
    fn literal() {
        let params = ParamStack::new();
        assert_eq!(eval_const(&Node::constant(7), &params, &module()), Some(7));
    }

    #[test]
    fn name_from_constants() {
        let params = ParamStack::new();
        let node = Node::name("N", Ctx::Load);
        assert_eq!(eval_const(&node, &params, &module()), Some(4));
    }

    #[test]
    fn name_from_param_stack_shadows_constants() {
        let mut params = ParamStack::new();
        params.push(vec![("N".to_string(), 9)]);
        let node = Node::name("N", Ctx::Load);
        assert_eq!(eval_const(&node, &params, &module()), Some(9));
    }

    #[test]
    fn binop_add_and_mul() {
        let params = ParamStack::new();
        let expr = Node::BinOp {
            left: Box::new(Node::constant(2)),
            op: BinOpKind::Mul,
            right: Box::new(Node::BinOp {
                left: Box::new(Node::constant(3)),
                op: BinOpKind::Add,
                right: Box::new(Node::constant(1)),
            }),
        };
        assert_eq!(eval_const(&expr, &params, &module()), Some(8));
    }

    #[test]
    fn division_truncates_toward_zero() {
        let params = ParamStack::new();
        let expr = Node::BinOp {
            left: Box::new(Node::constant(-7)),
            op: BinOpKind::Div,
            right: Box::new(Node::constant(2)),
        };
        assert_eq!(eval_const(&expr, &params, &module()), Some(-3));
    }

    #[test]
    fn unknown_name_is_unknown() {
        let params = ParamStack::new();
        let node = Node::name("undeclared", Ctx::Load);
        assert_eq!(eval_const(&node, &params, &module()), None);
    }

    #[test]
    fn shift_is_not_evaluable() {
        let params = ParamStack::new();
        let expr = Node::BinOp {
            left: Box::new(Node::constant(1)),
            op: BinOpKind::Shl,
            right: Box::new(Node::constant(4)),
        };
        assert_eq!(eval_const(&expr, &params, &module()), None);
    }
}
