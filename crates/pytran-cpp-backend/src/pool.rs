// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

//! Global constant pool.
//!
//! One pass over every selected module collects literal constants so that
//! identical literals across all translation units collapse to a single
//! global definition. Identifiers are assigned in first-seen order and never
//! renumbered; the pool is append-only for the duration of a run.

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use log::info;

use pytran_ast::{Decl, Expr, ExprKind, FuncDecl, Module, Stmt, Target};

use crate::escape::escape_string_literal;
use crate::renderer::cpp_writer::CppWriter;

/// Stable identifier of a pooled constant.
pub type ConstId = usize;

/// The kind of a pooled literal. Only strings are pooled today; the key space
/// leaves room for other literal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstKind {
    Str,
}

#[derive(Debug, Clone)]
pub struct ConstEntry {
    pub id: ConstId,
    pub kind: ConstKind,
}

/// Deduplicated literal constants, keyed by (kind, value).
pub struct ConstPool {
    entries: IndexMap<(ConstKind, String), ConstEntry>,
}

impl ConstPool {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Collect constants from all selected modules, emitting one global
    /// definition per distinct literal as it is first seen.
    pub fn collect(&mut self, modules: &[&Module], w: &mut CppWriter) -> Result<()> {
        for module in modules {
            self.collect_module(module, w)
                .with_context(|| format!("collecting constants in module `{}`", module.name))?;
        }
        info!("constant pool: {} entries", self.entries.len());
        Ok(())
    }

    /// Look up the pool id of a string literal. Later passes use this instead
    /// of re-deriving identifiers.
    pub fn lookup_str(&self, value: &str) -> Option<ConstId> {
        self.entries
            .get(&(ConstKind::Str, value.to_string()))
            .map(|e| e.id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn collect_module(&mut self, module: &Module, w: &mut CppWriter) -> Result<()> {
        for decl in &module.body {
            match decl {
                Decl::Class(class) => {
                    for method in &class.methods {
                        self.collect_func(method, w)?;
                    }
                }
                Decl::Func(func) => self.collect_func(func, w)?,
                Decl::Stmt(stmt) => self.collect_stmt(stmt, w)?,
            }
        }
        Ok(())
    }

    fn collect_func(&mut self, func: &FuncDecl, w: &mut CppWriter) -> Result<()> {
        self.collect_stmts(&func.body, w)
    }

    fn collect_stmts(&mut self, stmts: &[Stmt], w: &mut CppWriter) -> Result<()> {
        for stmt in stmts {
            self.collect_stmt(stmt, w)?;
        }
        Ok(())
    }

    fn collect_stmt(&mut self, stmt: &Stmt, w: &mut CppWriter) -> Result<()> {
        match stmt {
            Stmt::Assign { target, value } => {
                match target {
                    Target::Name(_) => {}
                    Target::Attribute { object, .. } => self.collect_expr(object, w)?,
                    Target::Index { object, index } => {
                        self.collect_expr(object, w)?;
                        self.collect_expr(index, w)?;
                    }
                }
                self.collect_expr(value, w)?;
            }
            Stmt::Expr(e) => self.collect_expr(e, w)?,
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                self.collect_expr(cond, w)?;
                self.collect_stmts(then_body, w)?;
                self.collect_stmts(else_body, w)?;
            }
            Stmt::While { cond, body } => {
                self.collect_expr(cond, w)?;
                self.collect_stmts(body, w)?;
            }
            Stmt::For { iterable, body, .. } => {
                self.collect_expr(iterable, w)?;
                self.collect_stmts(body, w)?;
            }
            Stmt::Return(Some(e)) => self.collect_expr(e, w)?,
            Stmt::Return(None) | Stmt::Break | Stmt::Continue | Stmt::Pass => {}
        }
        Ok(())
    }

    fn collect_expr(&mut self, expr: &Expr, w: &mut CppWriter) -> Result<()> {
        match &expr.kind {
            ExprKind::Str(s) => self.intern_str(s, w),
            // Constants are foundational: a float no target literal can
            // express aborts the run before any later section is emitted.
            ExprKind::Float(f) if !f.is_finite() => {
                bail!("float literal {} has no C++ literal form", f)
            }
            ExprKind::Float(_)
            | ExprKind::Int(_)
            | ExprKind::Bool(_)
            | ExprKind::None
            | ExprKind::Name(_) => {}
            ExprKind::Attribute { object, .. } => self.collect_expr(object, w)?,
            ExprKind::Call { callee, args } => {
                self.collect_expr(callee, w)?;
                for arg in args {
                    self.collect_expr(arg, w)?;
                }
            }
            ExprKind::Binary { lhs, rhs, .. } | ExprKind::Compare { lhs, rhs, .. } => {
                self.collect_expr(lhs, w)?;
                self.collect_expr(rhs, w)?;
            }
            ExprKind::Unary { operand, .. } => self.collect_expr(operand, w)?,
            ExprKind::Index { object, index } => {
                self.collect_expr(object, w)?;
                self.collect_expr(index, w)?;
            }
            ExprKind::ListLit(elems) => {
                for e in elems {
                    self.collect_expr(e, w)?;
                }
            }
            ExprKind::DictLit(pairs) => {
                for (k, v) in pairs {
                    self.collect_expr(k, w)?;
                    self.collect_expr(v, w)?;
                }
            }
            ExprKind::Cond { cond, then, orelse } => {
                self.collect_expr(cond, w)?;
                self.collect_expr(then, w)?;
                self.collect_expr(orelse, w)?;
            }
        }
        Ok(())
    }

    fn intern_str(&mut self, value: &str, w: &mut CppWriter) {
        let key = (ConstKind::Str, value.to_string());
        if self.entries.contains_key(&key) {
            return;
        }
        let id = self.entries.len();
        self.entries.insert(
            key,
            ConstEntry {
                id,
                kind: ConstKind::Str,
            },
        );
        w.line(&format!(
            "GLOBAL_STR(str{}, \"{}\");",
            id,
            escape_string_literal(value)
        ));
    }
}

impl Default for ConstPool {
    fn default() -> Self {
        Self::new()
    }
}
