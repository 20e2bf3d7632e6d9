// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

//! Whole-program analyses feeding the emission passes.

pub mod hierarchy;
pub mod locals;

pub use hierarchy::{ClassHierarchy, ClassRecord};
pub use locals::{FuncId, LocalTypeTable};
