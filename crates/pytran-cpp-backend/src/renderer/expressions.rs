// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

//! Lowers expressions to C++ expression text.
//!
//! Consults the constant pool (string literals become pool identifiers), the
//! resolved types (string/container operations route to runtime calls), and
//! the virtual set (statically-bound method calls are emitted as explicitly
//! qualified direct calls; overridden ones stay unqualified and dispatch
//! through the vtable).

use anyhow::{bail, Result};
use itertools::Itertools;
use pytran_ast::{BinOp, CmpOp, Expr, ExprKind, Type, UnOp};

use crate::analysis::ClassHierarchy;
use crate::escape::escape_identifier;
use crate::pool::ConstPool;
use crate::renderer::type_renderer::render_type;

pub struct ExprRenderer<'a> {
    pool: &'a ConstPool,
    hierarchy: &'a ClassHierarchy,
}

impl<'a> ExprRenderer<'a> {
    pub fn new(pool: &'a ConstPool, hierarchy: &'a ClassHierarchy) -> Self {
        Self { pool, hierarchy }
    }

    pub fn render(&self, expr: &Expr) -> Result<String> {
        let rendered = match &expr.kind {
            ExprKind::Str(s) => {
                let id = match self.pool.lookup_str(s) {
                    Some(id) => id,
                    None => bail!("string literal {:?} missing from constant pool (pipeline bug)", s),
                };
                format!("str{}", id)
            }
            ExprKind::Int(i) => i.to_string(),
            ExprKind::Float(f) => {
                if !f.is_finite() {
                    bail!("float literal {} has no C++ literal form", f);
                }
                format!("{:?}", f)
            }
            ExprKind::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            ExprKind::None => "nullptr".to_string(),
            ExprKind::Name(name) => {
                if name == "self" {
                    "this".to_string()
                } else {
                    escape_identifier(name)
                }
            }
            ExprKind::Attribute { object, name } => {
                format!("{}->{}", self.render_receiver(object)?, escape_identifier(name))
            }
            ExprKind::Call { callee, args } => self.render_call(callee, args)?,
            ExprKind::Binary { op, lhs, rhs } => self.render_binary(expr, *op, lhs, rhs)?,
            ExprKind::Unary { op, operand } => match op {
                UnOp::Not => format!("!({})", self.render(operand)?),
                UnOp::Neg => format!("-{}", self.render_receiver(operand)?),
            },
            ExprKind::Compare { op, lhs, rhs } => self.render_compare(*op, lhs, rhs)?,
            ExprKind::Index { object, index } => {
                format!(
                    "{}->index({})",
                    self.render_receiver(object)?,
                    self.render(index)?
                )
            }
            ExprKind::ListLit(elems) => {
                let elem_ty = match resolved(expr)? {
                    Type::List(elem) => render_type(elem)?,
                    other => bail!("list literal resolved to non-list type {:?}", other),
                };
                if elems.is_empty() {
                    format!("new List<{}>()", elem_ty)
                } else {
                    let rendered: Vec<String> =
                        elems.iter().map(|e| self.render(e)).try_collect()?;
                    format!("new List<{}>({{{}}})", elem_ty, rendered.join(", "))
                }
            }
            ExprKind::DictLit(pairs) => {
                if !pairs.is_empty() {
                    bail!("non-empty dict literals are outside the supported subset");
                }
                match resolved(expr)? {
                    Type::Dict(key, value) => {
                        format!("new Dict<{}, {}>()", render_type(key)?, render_type(value)?)
                    }
                    other => bail!("dict literal resolved to non-dict type {:?}", other),
                }
            }
            ExprKind::Cond { cond, then, orelse } => format!(
                "({} ? {} : {})",
                self.render(cond)?,
                self.render(then)?,
                self.render(orelse)?
            ),
        };
        Ok(rendered)
    }

    fn render_call(&self, callee: &Expr, args: &[Expr]) -> Result<String> {
        let args_s = self.render_args(args)?;
        match &callee.kind {
            // A call to a class name allocates an instance.
            ExprKind::Name(name) if self.hierarchy.contains(name) => {
                Ok(format!("new {}({})", escape_identifier(name), args_s))
            }
            // Free functions and runtime builtins (len, print) pass through.
            ExprKind::Name(name) => Ok(format!("{}({})", escape_identifier(name), args_s)),
            ExprKind::Attribute { object, name } => {
                let receiver = self.render_receiver(object)?;
                match resolved(object)?.class_name() {
                    Some(class) => {
                        let declaring = match self.hierarchy.declaring_class(class, name) {
                            Some(d) => d,
                            None => bail!("class `{}` has no method `{}`", class, name),
                        };
                        if self.hierarchy.is_virtual(declaring, name) {
                            // Overridden somewhere: dispatch through the vtable.
                            Ok(format!("{}->{}({})", receiver, escape_identifier(name), args_s))
                        } else {
                            // Statically bound: qualified direct call.
                            Ok(format!(
                                "{}->{}::{}({})",
                                receiver,
                                escape_identifier(declaring),
                                escape_identifier(name),
                                args_s
                            ))
                        }
                    }
                    None => match (resolved(object)?, name.as_str()) {
                        (Type::List(_), "append") => {
                            Ok(format!("{}->append({})", receiver, args_s))
                        }
                        (ty, _) => bail!(
                            "method `{}` on receiver of type {:?} is outside the supported subset",
                            name,
                            ty
                        ),
                    },
                }
            }
            _ => bail!("call through a computed callee is outside the supported subset"),
        }
    }

    fn render_binary(&self, expr: &Expr, op: BinOp, lhs: &Expr, rhs: &Expr) -> Result<String> {
        let l = self.render(lhs)?;
        let r = self.render(rhs)?;
        if op == BinOp::Add && matches!(resolved(expr)?, Type::Str) {
            return Ok(format!("str_concat({}, {})", l, r));
        }
        let tok = match op {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::And => "&&",
            BinOp::Or => "||",
        };
        Ok(format!("({} {} {})", l, tok, r))
    }

    fn render_compare(&self, op: CmpOp, lhs: &Expr, rhs: &Expr) -> Result<String> {
        let l = self.render(lhs)?;
        let r = self.render(rhs)?;
        let is_str = matches!(lhs.ty.as_ref().or(rhs.ty.as_ref()), Some(Type::Str));
        let rendered = match op {
            CmpOp::Eq if is_str => format!("str_equals({}, {})", l, r),
            CmpOp::NotEq if is_str => format!("!str_equals({}, {})", l, r),
            CmpOp::Eq | CmpOp::Is => format!("({} == {})", l, r),
            CmpOp::NotEq | CmpOp::IsNot => format!("({} != {})", l, r),
            CmpOp::Lt => format!("({} < {})", l, r),
            CmpOp::LtEq => format!("({} <= {})", l, r),
            CmpOp::Gt => format!("({} > {})", l, r),
            CmpOp::GtEq => format!("({} >= {})", l, r),
            CmpOp::In | CmpOp::NotIn => {
                let call = match resolved(rhs)? {
                    Type::Dict(_, _) => format!("dict_contains({}, {})", r, l),
                    Type::List(_) => format!("list_contains({}, {})", r, l),
                    Type::Str => format!("str_contains({}, {})", r, l),
                    other => bail!("`in` on type {:?} is outside the supported subset", other),
                };
                if op == CmpOp::NotIn {
                    format!("!{}", call)
                } else {
                    call
                }
            }
        };
        Ok(rendered)
    }

    fn render_args(&self, args: &[Expr]) -> Result<String> {
        let rendered: Vec<String> = args.iter().map(|a| self.render(a)).try_collect()?;
        Ok(rendered.join(", "))
    }

    /// Render the base of a postfix chain, parenthesizing compound
    /// expressions so `->` binds to the whole thing.
    fn render_receiver(&self, expr: &Expr) -> Result<String> {
        let needs_parens = matches!(
            expr.kind,
            ExprKind::Binary { .. } | ExprKind::Compare { .. } | ExprKind::Cond { .. }
        );
        let rendered = self.render(expr)?;
        if needs_parens {
            Ok(format!("({})", rendered))
        } else {
            Ok(rendered)
        }
    }
}

/// The resolved type of a node the lowering must consult; its absence is a
/// front-end contract violation and aborts translation.
fn resolved(expr: &Expr) -> Result<&Type> {
    match &expr.ty {
        Some(ty) => Ok(ty),
        None => bail!(
            "node {:?} carries no resolved type (front-end contract violation)",
            expr.kind
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::CppWriter;
    use pytran_ast::{ClassDecl, FuncDecl, Module};

    fn hierarchy_abc() -> ClassHierarchy {
        let mut h = ClassHierarchy::new();
        for (name, base, methods) in [
            ("A", None, vec!["run", "helper"]),
            ("B", Some("A"), vec!["run"]),
            ("C", Some("B"), vec![]),
        ] {
            h.record_class(&ClassDecl {
                name: name.to_string(),
                base: base.map(str::to_string),
                fields: vec![],
                methods: methods
                    .into_iter()
                    .map(|m| FuncDecl {
                        name: m.to_string(),
                        params: vec![],
                        ret: Type::NoneType,
                        body: vec![],
                    })
                    .collect(),
            })
            .unwrap();
        }
        h.calculate().unwrap();
        h
    }

    fn pooled(strings: &[&str]) -> ConstPool {
        let mut pool = ConstPool::new();
        let mut w = CppWriter::new();
        let module = Module {
            name: "m".to_string(),
            imports: vec![],
            body: strings
                .iter()
                .map(|s| {
                    pytran_ast::Decl::Stmt(pytran_ast::Stmt::Expr(Expr::new(
                        ExprKind::Str(s.to_string()),
                        Type::Str,
                    )))
                })
                .collect(),
        };
        pool.collect(&[&module], &mut w).unwrap();
        pool
    }

    fn obj(name: &str, class: &str) -> Expr {
        Expr::new(
            ExprKind::Name(name.to_string()),
            Type::Class(class.to_string()),
        )
    }

    fn call(receiver: Expr, method: &str) -> Expr {
        Expr::new(
            ExprKind::Call {
                callee: Box::new(Expr::new(
                    ExprKind::Attribute {
                        object: Box::new(receiver),
                        name: method.to_string(),
                    },
                    Type::Func {
                        params: vec![],
                        ret: Box::new(Type::NoneType),
                    },
                )),
                args: vec![],
            },
            Type::NoneType,
        )
    }

    #[test]
    fn overridden_method_dispatches_dynamically() {
        let h = hierarchy_abc();
        let pool = pooled(&[]);
        let r = ExprRenderer::new(&pool, &h);
        // run is overridden below A; a call on a C receiver stays virtual.
        assert_eq!(r.render(&call(obj("c", "C"), "run")).unwrap(), "c->run()");
    }

    #[test]
    fn statically_bound_method_gets_qualified_call() {
        let h = hierarchy_abc();
        let pool = pooled(&[]);
        let r = ExprRenderer::new(&pool, &h);
        // helper is never overridden: direct call, qualified by declaring class.
        assert_eq!(
            r.render(&call(obj("c", "C"), "helper")).unwrap(),
            "c->A::helper()"
        );
    }

    #[test]
    fn string_literal_uses_pool_id() {
        let h = hierarchy_abc();
        let pool = pooled(&["x", "hello"]);
        let r = ExprRenderer::new(&pool, &h);
        let e = Expr::new(ExprKind::Str("hello".to_string()), Type::Str);
        assert_eq!(r.render(&e).unwrap(), "str1");
    }

    #[test]
    fn str_equality_routes_to_runtime() {
        let h = hierarchy_abc();
        let pool = pooled(&["a"]);
        let r = ExprRenderer::new(&pool, &h);
        let e = Expr::new(
            ExprKind::Compare {
                op: CmpOp::Eq,
                lhs: Box::new(Expr::new(ExprKind::Str("a".to_string()), Type::Str)),
                rhs: Box::new(Expr::new(ExprKind::Name("s".to_string()), Type::Str)),
            },
            Type::Bool,
        );
        assert_eq!(r.render(&e).unwrap(), "str_equals(str0, s)");
    }

    #[test]
    fn class_call_allocates() {
        let h = hierarchy_abc();
        let pool = pooled(&[]);
        let r = ExprRenderer::new(&pool, &h);
        let e = Expr::new(
            ExprKind::Call {
                callee: Box::new(Expr::untyped(ExprKind::Name("A".to_string()))),
                args: vec![Expr::new(ExprKind::Int(1), Type::Int)],
            },
            Type::Class("A".to_string()),
        );
        assert_eq!(r.render(&e).unwrap(), "new A(1)");
    }

    #[test]
    fn unknown_method_is_fatal() {
        let h = hierarchy_abc();
        let pool = pooled(&[]);
        let r = ExprRenderer::new(&pool, &h);
        assert!(r.render(&call(obj("a", "A"), "missing")).is_err());
    }
}
