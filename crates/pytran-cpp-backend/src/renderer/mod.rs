// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

//! C++ renderer: pure translation with minimal logic.
//!
//! These modules take the analysis results and emit C++ text. The renderers
//! are intentionally "dumb" - they pattern match AST nodes and emit
//! corresponding C++, deferring every decision to the analyses that already
//! ran (constant pool, virtual set, local-type table).

pub mod cpp_writer;
pub mod declarations;
pub mod definitions;
pub mod expressions;
pub mod forward_decl;
pub mod type_renderer;

pub use cpp_writer::CppWriter;
