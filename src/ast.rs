//! The canonical AST handed to this crate by a host parser (out of scope).
//!
//! This is a closed representation rather than a dynamically typed tree:
//! one `Node` variant per node kind the transpiler understands, and operator
//! slots (`BinOp.op`, `Compare.ops`, `BoolOp.op`, `UnaryOp.op`) are small
//! integer-coded enums decoded with `num_enum::TryFromPrimitive`, the same
//! pattern `schema::blocks::BlockId` and `schema::enums::AttrKind` use for
//! the host bitstream's wire codes.

use num_enum::TryFromPrimitive;

/// Whether a `Name` is being read (`Load`) or written (`Store`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ctx {
    Load,
    Store,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum BinOpKind {
    Add = 0,
    Sub = 1,
    Mul = 2,
    Div = 3,
    Mod = 4,
    Pow = 5,
    BitAnd = 6,
    BitOr = 7,
    BitXor = 8,
    Shl = 9,
    Shr = 10,
}

impl BinOpKind {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "**",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
        }
    }

    /// `+`/`-` widen by one bit; every other operator takes `max(wl, wr)`.
    pub fn is_additive(self) -> bool {
        matches!(self, Self::Add | Self::Sub)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum CmpOpKind {
    Eq = 0,
    NotEq = 1,
    Lt = 2,
    LtE = 3,
    Gt = 4,
    GtE = 5,
}

impl CmpOpKind {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtE => "<=",
            Self::Gt => ">",
            Self::GtE => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum BoolOpKind {
    And = 0,
    Or = 1,
}

impl BoolOpKind {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum UnaryOpKind {
    Not = 0,
    Invert = 1,
    USub = 2,
}

impl UnaryOpKind {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Invert => "~",
            Self::USub => "-",
        }
    }
}

/// A single `name=value` argument in a `Call`.
#[derive(Debug, Clone)]
pub struct Keyword {
    pub arg: String,
    pub value: Node,
}

/// One arm of a `match` statement.
#[derive(Debug, Clone)]
pub struct MatchCase {
    /// `MatchValue` for a concrete label, `MatchAs { pattern: None }` for `_`.
    pub pattern: Node,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone)]
pub enum Node {
    ClassDef {
        name: String,
        bases: Vec<String>,
        body: Vec<Node>,
    },
    Assign {
        targets: Vec<Node>,
        value: Box<Node>,
    },
    For {
        target: String,
        iter: Box<Node>,
        body: Vec<Node>,
    },
    If {
        test: Box<Node>,
        body: Vec<Node>,
        orelse: Vec<Node>,
    },
    Match {
        subject: Box<Node>,
        cases: Vec<MatchCase>,
    },
    MatchValue {
        value: Box<Node>,
    },
    MatchAs {
        pattern: Option<Box<Node>>,
    },
    BinOp {
        left: Box<Node>,
        op: BinOpKind,
        right: Box<Node>,
    },
    BoolOp {
        op: BoolOpKind,
        values: Vec<Node>,
    },
    UnaryOp {
        op: UnaryOpKind,
        operand: Box<Node>,
    },
    Compare {
        left: Box<Node>,
        ops: Vec<CmpOpKind>,
        comparators: Vec<Node>,
    },
    IfExp {
        body: Box<Node>,
        test: Box<Node>,
        orelse: Box<Node>,
    },
    Subscript {
        value: Box<Node>,
        slice: Box<Node>,
    },
    Slice {
        lower: Option<Box<Node>>,
        upper: Option<Box<Node>>,
    },
    Attribute {
        value: Box<Node>,
        attr: String,
    },
    Name {
        id: String,
        ctx: Ctx,
    },
    Constant {
        value: i64,
    },
    Tuple {
        elts: Vec<Node>,
    },
    Call {
        func: String,
        args: Vec<Node>,
        keywords: Vec<Keyword>,
    },
}

impl Node {
    pub fn name(id: impl Into<String>, ctx: Ctx) -> Self {
        Self::Name { id: id.into(), ctx }
    }

    pub fn constant(value: i64) -> Self {
        Self::Constant { value }
    }
}
