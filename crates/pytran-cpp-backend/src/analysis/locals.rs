// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

//! Local-variable storage types.
//!
//! The source declares no local types; the target requires one on every
//! local. The declaration pass scans each function body while it already has
//! the per-statement type information and records every assigned local here,
//! exactly once per name, with a type wide enough for every value the source
//! ever assigns to it. The definition pass then declares each local at its
//! first binding using the recorded type.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use pytran_ast::{Expr, FuncDecl, Stmt, Target, Type};

use crate::analysis::hierarchy::ClassHierarchy;

/// Identity of a function or method: module, enclosing class (if any), name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FuncId {
    pub module: String,
    pub class: Option<String>,
    pub name: String,
}

impl fmt::Display for FuncId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.class {
            Some(class) => write!(f, "{}.{}.{}", self.module, class, self.name),
            None => write!(f, "{}.{}", self.module, self.name),
        }
    }
}

/// Per-function record of every local's inferred concrete storage type,
/// in first-assignment order.
pub struct LocalTypeTable {
    entries: BTreeMap<FuncId, Vec<(String, Type)>>,
}

impl LocalTypeTable {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Scan one function body and record its locals. Parameters are typed by
    /// the signature and `for` loop variables by the loop header, so neither
    /// appears in the entry. Every function gets an entry, empty or not.
    pub fn record_function(
        &mut self,
        id: FuncId,
        func: &FuncDecl,
        hierarchy: &ClassHierarchy,
    ) -> Result<()> {
        let mut skip: BTreeSet<String> = func.params.iter().map(|p| p.name.clone()).collect();
        skip.insert("self".to_string());

        let mut locals: IndexMap<String, Type> = IndexMap::new();
        scan_stmts(&func.body, &mut skip, &mut locals, hierarchy)
            .with_context(|| format!("inferring local types in `{}`", id))?;

        self.entries.insert(id, locals.into_iter().collect());
        Ok(())
    }

    /// The recorded locals of a function. `None` means the declaration pass
    /// never visited it, which is a pipeline bug.
    pub fn locals(&self, id: &FuncId) -> Option<&[(String, Type)]> {
        self.entries.get(id).map(|v| v.as_slice())
    }
}

impl Default for LocalTypeTable {
    fn default() -> Self {
        Self::new()
    }
}

fn scan_stmts(
    stmts: &[Stmt],
    skip: &mut BTreeSet<String>,
    locals: &mut IndexMap<String, Type>,
    hierarchy: &ClassHierarchy,
) -> Result<()> {
    for stmt in stmts {
        scan_stmt(stmt, skip, locals, hierarchy)?;
    }
    Ok(())
}

fn scan_stmt(
    stmt: &Stmt,
    skip: &mut BTreeSet<String>,
    locals: &mut IndexMap<String, Type>,
    hierarchy: &ClassHierarchy,
) -> Result<()> {
    match stmt {
        Stmt::Assign {
            target: Target::Name(name),
            value,
        } => {
            if skip.contains(name) {
                return Ok(());
            }
            let assigned = resolved_type(value)
                .with_context(|| format!("in assignment to `{}`", name))?;
            let storage = match locals.get(name) {
                Some(existing) => widen(existing, assigned, hierarchy)
                    .with_context(|| format!("reassignment of `{}`", name))?,
                None => assigned.clone(),
            };
            locals.insert(name.clone(), storage);
        }
        // Assignments through attributes or subscripts bind no new local.
        Stmt::Assign { .. } | Stmt::Expr(_) => {}
        Stmt::If {
            then_body,
            else_body,
            ..
        } => {
            scan_stmts(then_body, skip, locals, hierarchy)?;
            scan_stmts(else_body, skip, locals, hierarchy)?;
        }
        Stmt::While { body, .. } => scan_stmts(body, skip, locals, hierarchy)?,
        Stmt::For { var, body, .. } => {
            // The loop header types the variable only within the loop; an
            // assignment to the same name after the loop is an ordinary local.
            let newly_skipped = skip.insert(var.clone());
            scan_stmts(body, skip, locals, hierarchy)?;
            if newly_skipped {
                skip.remove(var);
            }
        }
        Stmt::Return(_) | Stmt::Break | Stmt::Continue | Stmt::Pass => {}
    }
    Ok(())
}

fn resolved_type(expr: &Expr) -> Result<&Type> {
    match &expr.ty {
        Some(ty) => Ok(ty),
        None => bail!("expression carries no resolved type (front-end contract violation)"),
    }
}

/// Widen two static types into one storage type.
///
/// `int` and `float` widen to `double`; a pointer type and `None` widen to
/// the optional (still the same pointer, now nullable); two class types widen
/// to their nearest common ancestor. Everything else has no single storage
/// type in the target and is rejected.
pub fn widen(a: &Type, b: &Type, hierarchy: &ClassHierarchy) -> Result<Type> {
    if a == b {
        return Ok(a.clone());
    }
    let widened = match (a, b) {
        (Type::Int, Type::Float) | (Type::Float, Type::Int) => Type::Float,
        (Type::NoneType, other) | (other, Type::NoneType) => {
            if !other.is_pointer() {
                bail!("`None` cannot share storage with non-pointer type {:?}", other);
            }
            match other {
                Type::Optional(_) => other.clone(),
                _ => Type::Optional(Box::new(other.clone())),
            }
        }
        (Type::Optional(inner), other) | (other, Type::Optional(inner)) => {
            let other_inner = match other {
                Type::Optional(o) => o.as_ref(),
                _ => other,
            };
            Type::Optional(Box::new(widen(inner, other_inner, hierarchy)?))
        }
        (Type::Class(x), Type::Class(y)) => {
            let ancestor = hierarchy.common_ancestor(x, y).ok_or_else(|| {
                anyhow::anyhow!("classes `{}` and `{}` share no common ancestor", x, y)
            })?;
            Type::Class(ancestor.to_string())
        }
        _ => bail!("types {:?} and {:?} cannot be widened to one storage type", a, b),
    };
    Ok(widened)
}
