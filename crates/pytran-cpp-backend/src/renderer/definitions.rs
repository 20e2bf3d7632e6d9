// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

//! Definition pass: lowers every function and method body into C++
//! statements.
//!
//! Control flow lowers structurally one-to-one; the source subset has no
//! construct without a direct C++ equivalent. Each local is declared with
//! its recorded storage type at its first binding; the local-type table was
//! fully populated by the declaration pass before this pass runs.

use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use pytran_ast::{ClassDecl, Decl, Expr, FuncDecl, Module, Stmt, Target, Type};

use crate::analysis::{ClassHierarchy, FuncId, LocalTypeTable};
use crate::escape::escape_identifier;
use crate::pool::ConstPool;
use crate::renderer::declarations::render_params;
use crate::renderer::expressions::ExprRenderer;
use crate::renderer::type_renderer::{render_return_type, render_type};
use crate::renderer::CppWriter;

/// Emit definitions for one module.
pub fn emit_definitions(
    module: &Module,
    pool: &ConstPool,
    hierarchy: &ClassHierarchy,
    locals: &LocalTypeTable,
    w: &mut CppWriter,
) -> Result<()> {
    for decl in &module.body {
        match decl {
            // Module-level statements were fully handled by the declaration pass.
            Decl::Stmt(_) => {}
            Decl::Func(func) => {
                emit_function(module, None, func, pool, hierarchy, locals, w)?;
            }
            Decl::Class(class) => {
                for method in &class.methods {
                    emit_function(module, Some(class), method, pool, hierarchy, locals, w)?;
                }
            }
        }
    }
    Ok(())
}

fn emit_function(
    module: &Module,
    class: Option<&ClassDecl>,
    func: &FuncDecl,
    pool: &ConstPool,
    hierarchy: &ClassHierarchy,
    locals: &LocalTypeTable,
    w: &mut CppWriter,
) -> Result<()> {
    let id = FuncId {
        module: module.name.clone(),
        class: class.map(|c| c.name.clone()),
        name: func.name.clone(),
    };
    let local_types = locals
        .locals(&id)
        .expect("BUG: function missing from local-type table");

    let params = render_params(func).with_context(|| format!("defining `{}`", id))?;
    let signature = match class {
        Some(class) if func.name == "__init__" => {
            let class_name = escape_identifier(&class.name);
            format!("{}::{}({})", class_name, class_name, params)
        }
        Some(class) => format!(
            "{} {}::{}({})",
            render_return_type(&func.ret)?,
            escape_identifier(&class.name),
            escape_identifier(&func.name),
            params
        ),
        None => format!(
            "{} {}({})",
            render_return_type(&func.ret)?,
            escape_identifier(&func.name),
            params
        ),
    };

    w.blank();
    w.line(&format!("{} {{", signature));
    w.indent();

    // A local declared inside a C++ block is invisible to sibling branches
    // and to everything after the block. Only locals whose first binding is a
    // top-level statement of the body may be declared at that binding; the
    // rest are declared up front, at function scope.
    let top_level_first = top_level_first_bindings(&func.body);
    let mut declared = HashSet::new();
    for (name, ty) in local_types {
        if !top_level_first.contains(name.as_str()) {
            let storage =
                render_type(ty).with_context(|| format!("declaring local `{}`", name))?;
            w.line(&format!("{} {};", storage, escape_identifier(name)));
            declared.insert(name.clone());
        }
    }

    let mut body = BodyEmitter {
        exprs: ExprRenderer::new(pool, hierarchy),
        local_types,
        declared,
    };
    body.emit_stmts(&func.body, w)
        .with_context(|| format!("lowering body of `{}`", id))?;
    w.dedent();
    w.line("}");
    Ok(())
}

struct BodyEmitter<'a> {
    exprs: ExprRenderer<'a>,
    local_types: &'a [(String, Type)],
    /// Locals already declared at an earlier binding.
    declared: HashSet<String>,
}

impl<'a> BodyEmitter<'a> {
    fn emit_stmts(&mut self, stmts: &[Stmt], w: &mut CppWriter) -> Result<()> {
        for stmt in stmts {
            self.emit_stmt(stmt, w)?;
        }
        Ok(())
    }

    fn emit_stmt(&mut self, stmt: &Stmt, w: &mut CppWriter) -> Result<()> {
        match stmt {
            Stmt::Assign { target, value } => self.emit_assign(target, value, w)?,
            Stmt::Expr(e) => {
                let rendered = self.exprs.render(e)?;
                w.line(&format!("{};", rendered));
            }
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                w.line(&format!("if ({}) {{", self.exprs.render(cond)?));
                w.indent();
                self.emit_stmts(then_body, w)?;
                w.dedent();
                if else_body.is_empty() {
                    w.line("}");
                } else {
                    w.line("} else {");
                    w.indent();
                    self.emit_stmts(else_body, w)?;
                    w.dedent();
                    w.line("}");
                }
            }
            Stmt::While { cond, body } => {
                w.line(&format!("while ({}) {{", self.exprs.render(cond)?));
                w.indent();
                self.emit_stmts(body, w)?;
                w.dedent();
                w.line("}");
            }
            Stmt::For {
                var,
                iterable,
                body,
            } => {
                let elem_ty = match iterable.ty.as_ref() {
                    Some(Type::List(elem)) => render_type(elem)?,
                    Some(other) => bail!(
                        "iteration over type {:?} is outside the supported subset",
                        other
                    ),
                    None => bail!(
                        "loop iterable carries no resolved type (front-end contract violation)"
                    ),
                };
                w.line(&format!(
                    "for ({} {} : *{}) {{",
                    elem_ty,
                    escape_identifier(var),
                    self.exprs.render(iterable)?
                ));
                w.indent();
                self.emit_stmts(body, w)?;
                w.dedent();
                w.line("}");
            }
            Stmt::Return(None) => w.line("return;"),
            Stmt::Return(Some(e)) => {
                let rendered = self.exprs.render(e)?;
                w.line(&format!("return {};", rendered));
            }
            Stmt::Break => w.line("break;"),
            Stmt::Continue => w.line("continue;"),
            Stmt::Pass => {}
        }
        Ok(())
    }

    fn emit_assign(&mut self, target: &Target, value: &Expr, w: &mut CppWriter) -> Result<()> {
        let rendered = self.exprs.render(value)?;
        match target {
            Target::Name(name) => {
                let escaped = escape_identifier(name);
                if let Some(ty) = self.local_type(name) {
                    if self.declared.insert(name.clone()) {
                        // First binding: declare with the recorded storage type.
                        let storage = render_type(ty)
                            .with_context(|| format!("declaring local `{}`", name))?;
                        w.line(&format!("{} {} = {};", storage, escaped, rendered));
                        return Ok(());
                    }
                }
                w.line(&format!("{} = {};", escaped, rendered));
            }
            Target::Attribute { object, name } => {
                let obj = self.exprs.render(object)?;
                w.line(&format!("{}->{} = {};", obj, escape_identifier(name), rendered));
            }
            Target::Index { object, index } => {
                let obj = self.exprs.render(object)?;
                let idx = self.exprs.render(index)?;
                w.line(&format!("{}->set({}, {});", obj, idx, rendered));
            }
        }
        Ok(())
    }

    fn local_type(&self, name: &str) -> Option<&'a Type> {
        self.local_types
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, ty)| ty)
    }
}

/// Names whose first binding in the body is a top-level assignment, i.e. the
/// only locals whose declaration may be fused with that assignment.
fn top_level_first_bindings(body: &[Stmt]) -> HashSet<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut top_level = HashSet::new();
    for stmt in body {
        if let Stmt::Assign {
            target: Target::Name(name),
            ..
        } = stmt
        {
            if seen.insert(name.clone()) {
                top_level.insert(name.clone());
            }
        } else {
            collect_bound_names(stmt, &mut seen);
        }
    }
    top_level
}

fn collect_bound_names(stmt: &Stmt, seen: &mut HashSet<String>) {
    match stmt {
        Stmt::Assign {
            target: Target::Name(name),
            ..
        } => {
            seen.insert(name.clone());
        }
        Stmt::Assign { .. }
        | Stmt::Expr(_)
        | Stmt::Return(_)
        | Stmt::Break
        | Stmt::Continue
        | Stmt::Pass => {}
        Stmt::If {
            then_body,
            else_body,
            ..
        } => {
            for s in then_body.iter().chain(else_body) {
                collect_bound_names(s, seen);
            }
        }
        Stmt::While { body, .. } | Stmt::For { body, .. } => {
            for s in body {
                collect_bound_names(s, seen);
            }
        }
    }
}
