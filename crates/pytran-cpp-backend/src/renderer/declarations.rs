// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

//! Declaration pass: full class shapes, free-function prototypes, and
//! module-level constant globals.
//!
//! Method signatures carry `virtual` per the dispatch analysis. While each
//! function is visited for its signature, its body is scanned once to
//! populate the local-type table - this pass already has the per-statement
//! type information, and the definition pass must not re-derive it.

use anyhow::{bail, Context, Result};
use itertools::Itertools;
use pytran_ast::{ClassDecl, CmpOp, Decl, Expr, ExprKind, FuncDecl, Module, Stmt, Target};

use crate::analysis::{ClassHierarchy, FuncId, LocalTypeTable};
use crate::escape::escape_identifier;
use crate::pool::ConstPool;
use crate::renderer::type_renderer::{render_return_type, render_type};
use crate::renderer::CppWriter;

/// Emit full declarations for one module and record its local-type entries.
pub fn emit_declarations(
    module: &Module,
    hierarchy: &ClassHierarchy,
    pool: &ConstPool,
    locals: &mut LocalTypeTable,
    w: &mut CppWriter,
) -> Result<()> {
    for decl in &module.body {
        match decl {
            Decl::Stmt(stmt) => emit_global(module, stmt, pool, w)
                .with_context(|| format!("at module level in `{}`", module.name))?,
            Decl::Func(func) => {
                let id = FuncId {
                    module: module.name.clone(),
                    class: None,
                    name: func.name.clone(),
                };
                locals.record_function(id, func, hierarchy)?;
                w.line(&format!(
                    "{} {}({});",
                    render_return_type(&func.ret)?,
                    escape_identifier(&func.name),
                    render_params(func)?
                ));
            }
            Decl::Class(class) => emit_class(module, class, hierarchy, locals, w)
                .with_context(|| format!("declaring class `{}` in `{}`", class.name, module.name))?,
        }
    }
    Ok(())
}

fn emit_class(
    module: &Module,
    class: &ClassDecl,
    hierarchy: &ClassHierarchy,
    locals: &mut LocalTypeTable,
    w: &mut CppWriter,
) -> Result<()> {
    w.blank();
    let class_name = escape_identifier(&class.name);
    match &class.base {
        Some(base) => w.line(&format!(
            "class {} : public {} {{",
            class_name,
            escape_identifier(base)
        )),
        None => w.line(&format!("class {} {{", class_name)),
    }
    w.line(" public:");
    w.indent();

    for method in &class.methods {
        let id = FuncId {
            module: module.name.clone(),
            class: Some(class.name.clone()),
            name: method.name.clone(),
        };
        locals.record_function(id, method, hierarchy)?;

        if method.name == "__init__" {
            w.line(&format!("{}({});", class_name, render_params(method)?));
        } else {
            let qualifier = if hierarchy.is_virtual(&class.name, &method.name) {
                "virtual "
            } else {
                ""
            };
            w.line(&format!(
                "{}{} {}({});",
                qualifier,
                render_return_type(&method.ret)?,
                escape_identifier(&method.name),
                render_params(method)?
            ));
        }
    }

    for field in &class.fields {
        w.line(&format!(
            "{} {};",
            render_type(&field.ty)
                .with_context(|| format!("field `{}`", field.name))?,
            escape_identifier(&field.name)
        ));
    }

    w.dedent();
    w.line("};");
    Ok(())
}

/// Lower a module-level statement. Constant bindings become globals; the
/// `if __name__ == '__main__'` guard is dropped; anything else is outside
/// the subset.
fn emit_global(module: &Module, stmt: &Stmt, pool: &ConstPool, w: &mut CppWriter) -> Result<()> {
    match stmt {
        Stmt::Assign {
            target: Target::Name(name),
            value,
        } => {
            let name = escape_identifier(name);
            match &value.kind {
                ExprKind::Str(s) => {
                    let id = pool
                        .lookup_str(s)
                        .expect("BUG: module-level literal missing from constant pool");
                    w.line(&format!("Str* {} = str{};", name, id));
                }
                ExprKind::Int(i) => w.line(&format!("int {} = {};", name, i)),
                ExprKind::Float(f) => w.line(&format!("double {} = {:?};", name, f)),
                ExprKind::Bool(b) => w.line(&format!("bool {} = {};", name, b)),
                other => bail!(
                    "module-level binding `{}` of {:?} is outside the supported subset",
                    name,
                    other
                ),
            }
        }
        Stmt::If { cond, .. } if is_name_guard(cond) => {
            // `if __name__ == '__main__':` - entry-point glue, not translated.
        }
        Stmt::Pass => {}
        other => bail!(
            "module-level statement {:?} in `{}` is outside the supported subset",
            other,
            module.name
        ),
    }
    Ok(())
}

fn is_name_guard(cond: &Expr) -> bool {
    if let ExprKind::Compare {
        op: CmpOp::Eq,
        lhs,
        rhs,
    } = &cond.kind
    {
        return matches!(&lhs.kind, ExprKind::Name(n) if n == "__name__")
            || matches!(&rhs.kind, ExprKind::Name(n) if n == "__name__");
    }
    false
}

pub(crate) fn render_params(func: &FuncDecl) -> Result<String> {
    let params: Vec<String> = func
        .params
        .iter()
        .map(|p| {
            render_type(&p.ty)
                .map(|ty| format!("{} {}", ty, escape_identifier(&p.name)))
                .with_context(|| format!("parameter `{}`", p.name))
        })
        .try_collect()?;
    Ok(params.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pytran_ast::{Field, Param, Type};

    fn method(name: &str, params: Vec<Param>, ret: Type) -> FuncDecl {
        FuncDecl {
            name: name.to_string(),
            params,
            ret,
            body: vec![],
        }
    }

    #[test]
    fn class_shape_marks_virtual_methods() {
        let base = ClassDecl {
            name: "Node".to_string(),
            base: None,
            fields: vec![Field {
                name: "label".to_string(),
                ty: Type::Str,
            }],
            methods: vec![
                method("__init__", vec![], Type::NoneType),
                method("eval", vec![], Type::Int),
                method("tag", vec![], Type::Str),
            ],
        };
        let leaf = ClassDecl {
            name: "Leaf".to_string(),
            base: Some("Node".to_string()),
            fields: vec![],
            methods: vec![method("eval", vec![], Type::Int)],
        };
        let module = Module {
            name: "m".to_string(),
            imports: vec![],
            body: vec![Decl::Class(base.clone()), Decl::Class(leaf)],
        };

        let mut hierarchy = ClassHierarchy::new();
        for decl in &module.body {
            if let Decl::Class(c) = decl {
                hierarchy.record_class(c).unwrap();
            }
        }
        hierarchy.calculate().unwrap();

        let pool = ConstPool::new();
        let mut locals = LocalTypeTable::new();
        let mut w = CppWriter::new();
        emit_declarations(&module, &hierarchy, &pool, &mut locals, &mut w).unwrap();
        let out = w.into_inner();

        assert!(out.contains("class Node {"));
        assert!(out.contains("class Leaf : public Node {"));
        assert!(out.contains("virtual int eval();"));
        assert!(out.contains("Str* tag();"));
        assert!(!out.contains("virtual Str* tag"));
        assert!(out.contains("Node();"));
        assert!(out.contains("Str* label;"));
        // Both __init__ and eval got local-type entries.
        assert!(locals
            .locals(&FuncId {
                module: "m".to_string(),
                class: Some("Leaf".to_string()),
                name: "eval".to_string(),
            })
            .is_some());
    }

    #[test]
    fn module_level_string_binding_uses_pool_id() {
        let module = Module {
            name: "m".to_string(),
            imports: vec![],
            body: vec![Decl::Stmt(Stmt::Assign {
                target: Target::Name("LABEL".to_string()),
                value: Expr::new(ExprKind::Str("x".to_string()), Type::Str),
            })],
        };
        let mut pool = ConstPool::new();
        let mut pool_w = CppWriter::new();
        pool.collect(&[&module], &mut pool_w).unwrap();

        let mut hierarchy = ClassHierarchy::new();
        hierarchy.calculate().unwrap();
        let mut locals = LocalTypeTable::new();
        let mut w = CppWriter::new();
        emit_declarations(&module, &hierarchy, &pool, &mut locals, &mut w).unwrap();
        assert!(w.into_inner().contains("Str* LABEL = str0;"));
    }

    #[test]
    fn module_level_call_is_fatal() {
        let module = Module {
            name: "m".to_string(),
            imports: vec![],
            body: vec![Decl::Stmt(Stmt::Expr(Expr::new(
                ExprKind::Int(1),
                Type::Int,
            )))],
        };
        let pool = ConstPool::new();
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.calculate().unwrap();
        let mut locals = LocalTypeTable::new();
        let mut w = CppWriter::new();
        let err =
            emit_declarations(&module, &hierarchy, &pool, &mut locals, &mut w).unwrap_err();
        assert!(format!("{:#}", err).contains("module level"));
    }
}
