// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

//! Typed AST contract between the front end and the C++ backend.
//!
//! This crate defines the shape of what the type-checking front end hands to
//! the translation backend: one [`Module`] per source file, every expression
//! annotated with its resolved [`Type`]. The backend holds read-only
//! references into these trees and never re-derives a type. It does NOT
//! contain the front end itself - parsing and type checking live in an
//! external toolchain that exports a [`TypedProgram`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub mod ast;
pub mod types;

pub use ast::{
    BinOp, ClassDecl, CmpOp, Decl, Expr, ExprKind, Field, FuncDecl, Param, Stmt, Target, UnOp,
};
pub use types::Type;

/// The front end's whole-program export: the full module graph (requested
/// modules plus everything they transitively import) in front-end order,
/// together with any diagnostics the type checker produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypedProgram {
    /// Module graph keyed by qualified module name, in front-end order.
    pub modules: IndexMap<String, Module>,

    /// Type-checker diagnostics, already formatted per module/line.
    #[serde(default)]
    pub diagnostics: Vec<FrontendDiag>,
}

impl TypedProgram {
    pub fn new() -> Self {
        Self {
            modules: IndexMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// True if any diagnostic is an error (as opposed to a warning).
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

impl Default for TypedProgram {
    fn default() -> Self {
        Self::new()
    }
}

/// One parsed, fully-typed source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// Qualified name (e.g. "asdl.runtime"). The final dotted component is
    /// what module selection matches against.
    pub name: String,

    /// Names of modules this module imports.
    #[serde(default)]
    pub imports: Vec<String>,

    /// Top-level declarations in source order.
    pub body: Vec<Decl>,
}

impl Module {
    /// Final dotted component of the qualified name.
    pub fn basename(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// A diagnostic reported by the front end's type checker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendDiag {
    pub module: String,
    pub line: u32,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}
