// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

//! Translation pipeline orchestrator.
//!
//! Runs the passes in strict order over the selected modules: constant pool,
//! forward declarations (recording the class hierarchy), dispatch
//! classification, full declarations (building the local-type table),
//! definitions. Each pass appends to the single output buffer; section
//! ordering comes entirely from pass sequencing. Shared state is owned here
//! and handed to each pass by reference: mutable to the pass that builds it,
//! read-only to every later one.

use anyhow::{Context, Result};
use log::info;
use pytran_ast::TypedProgram;

use crate::analysis::{ClassHierarchy, LocalTypeTable};
use crate::pool::ConstPool;
use crate::renderer::{declarations, definitions, forward_decl, CppWriter};
use crate::selection;

pub struct TranslationPipeline<'a> {
    program: &'a TypedProgram,
}

impl<'a> TranslationPipeline<'a> {
    pub fn new(program: &'a TypedProgram) -> Self {
        Self { program }
    }

    /// Run the full translation and return the output stream. Any failure
    /// aborts the whole run; the caller gets no partial output.
    pub fn run(&self, requested: &[String]) -> Result<String> {
        let selected = selection::select_modules(self.program, requested);
        info!(
            "translating {} of {} modules",
            selected.len(),
            self.program.modules.len()
        );

        let mut w = CppWriter::new();

        // Section 1: constant pool, shared across all translation units.
        let mut pool = ConstPool::new();
        pool.collect(&selected, &mut w)?;
        if !pool.is_empty() {
            w.blank();
        }

        // Section 2: forward declarations. Interleaved: phase one of the
        // hierarchy analysis records every class in the program.
        let mut hierarchy = ClassHierarchy::new();
        let before_stubs = w.len();
        forward_decl::emit_forward_decls(&selected, &mut hierarchy, &mut w)?;

        // Phase two runs only once every class is recorded: an override in
        // one module affects dispatch for a class declared in another.
        hierarchy.calculate()?;
        if w.len() > before_stubs {
            w.blank();
        }

        // Section 3: full declarations; populates the local-type table.
        let mut locals = LocalTypeTable::new();
        for module in &selected {
            declarations::emit_declarations(module, &hierarchy, &pool, &mut locals, &mut w)
                .with_context(|| format!("emitting declarations for module `{}`", module.name))?;
        }

        // Section 4: definitions.
        for module in &selected {
            definitions::emit_definitions(module, &pool, &hierarchy, &locals, &mut w)
                .with_context(|| format!("emitting definitions for module `{}`", module.name))?;
        }

        Ok(w.into_inner())
    }
}
