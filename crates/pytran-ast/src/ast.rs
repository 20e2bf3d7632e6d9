// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

//! Declarations, statements and expressions of the restricted subset.
//!
//! Only constructs with a direct C++ equivalent appear here; the front end
//! rejects everything else before the backend ever sees a tree.

use serde::{Deserialize, Serialize};

use crate::types::Type;

/// A top-level declaration in a module body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Decl {
    Class(ClassDecl),
    Func(FuncDecl),
    /// Module-level statement (constant bindings, `__name__` guard).
    Stmt(Stmt),
}

/// A class declaration. Single inheritance only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,

    /// Direct base class name, if any.
    #[serde(default)]
    pub base: Option<String>,

    /// Instance fields with resolved types. The front end hoists `self.x`
    /// assignments in `__init__` into this list.
    #[serde(default)]
    pub fields: Vec<Field>,

    /// Methods in source order. `__init__` lowers to the C++ constructor.
    #[serde(default)]
    pub methods: Vec<FuncDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

/// A function or method declaration with a fully resolved signature.
/// Methods do not list `self`; the receiver is implicit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: Type,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

/// Statements of the subset. Control flow lowers structurally one-to-one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    Assign {
        target: Target,
        value: Expr,
    },
    Expr(Expr),
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        #[serde(default)]
        else_body: Vec<Stmt>,
    },
    While {
        cond: Expr,
        body: Vec<Stmt>,
    },
    /// `for var in iterable:` over a list.
    For {
        var: String,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    Pass,
}

/// The left-hand side of an assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Target {
    Name(String),
    Attribute { object: Expr, name: String },
    Index { object: Expr, index: Expr },
}

/// An expression node plus the resolved type the front end attached to it.
/// A missing type on a node the backend must consult is a contract violation
/// and aborts translation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expr {
    pub kind: ExprKind,
    #[serde(default)]
    pub ty: Option<Type>,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Type) -> Self {
        Self { kind, ty: Some(ty) }
    }

    /// An expression the front end left untyped. Legal only for nodes whose
    /// lowering never consults the type (e.g. the `__name__` guard).
    pub fn untyped(kind: ExprKind) -> Self {
        Self { kind, ty: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExprKind {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
    Name(String),
    Attribute {
        object: Box<Expr>,
        name: String,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    Compare {
        op: CmpOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    ListLit(Vec<Expr>),
    DictLit(Vec<(Expr, Expr)>),
    /// Conditional expression `then if cond else orelse`.
    Cond {
        cond: Box<Expr>,
        then: Box<Expr>,
        orelse: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Is,
    IsNot,
    In,
    NotIn,
}
