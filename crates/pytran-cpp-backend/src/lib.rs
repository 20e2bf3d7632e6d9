// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

//! Multi-pass translation backend from typed Python ASTs to C++ source.
//!
//! Consumes the front end's [`TypedProgram`] and emits one linear C++
//! stream: pooled constants, then forward declarations, then full class and
//! function declarations, then definitions. All errors are fatal; emitting
//! syntactically valid but semantically wrong C++ is strictly worse than
//! failing loudly, so there is no best-effort degraded output.

#![forbid(unsafe_code)]

pub mod analysis;
pub mod escape;
pub mod pipeline;
pub mod pool;
pub mod renderer;
pub mod selection;

pub use analysis::{ClassHierarchy, FuncId, LocalTypeTable};
pub use pipeline::TranslationPipeline;
pub use pool::ConstPool;
pub use selection::module_names_from_paths;

use anyhow::Result;
use pytran_ast::TypedProgram;

/// Translate the requested modules (by basename) out of the front end's
/// module graph into a single C++ translation unit.
pub fn translate(program: &TypedProgram, requested: &[String]) -> Result<String> {
    TranslationPipeline::new(program).run(requested)
}
