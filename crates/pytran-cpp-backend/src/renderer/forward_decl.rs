// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

//! Forward-declaration pass.
//!
//! Emits one name-only stub per class before any full shape is known, so
//! mutually-referencing classes compile regardless of declaration order.
//! Recording into the class hierarchy (phase one of dispatch analysis) is
//! interleaved here: this pass already visits every class exactly once.

use anyhow::{Context, Result};
use pytran_ast::{Decl, Module};

use crate::analysis::ClassHierarchy;
use crate::escape::escape_identifier;
use crate::renderer::CppWriter;

/// Emit `class Name;` stubs for every class in every selected module, in
/// selection order, source order within a module.
pub fn emit_forward_decls(
    modules: &[&Module],
    hierarchy: &mut ClassHierarchy,
    w: &mut CppWriter,
) -> Result<()> {
    for module in modules {
        for decl in &module.body {
            if let Decl::Class(class) = decl {
                hierarchy
                    .record_class(class)
                    .with_context(|| format!("in module `{}`", module.name))?;
                w.line(&format!("class {};", escape_identifier(&class.name)));
            }
        }
    }
    Ok(())
}
