// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

//! Resolved types attached by the front end.

use serde::{Deserialize, Serialize};

/// The static type the front end resolved for an expression or declaration.
/// Read-only input to the backend; never mutated or re-derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Int,
    Float,
    Bool,
    Str,
    /// Python's `None` type (function returns, absent values).
    NoneType,
    /// Homogeneous list.
    List(Box<Type>),
    /// Dictionary with key and value types.
    Dict(Box<Type>, Box<Type>),
    /// `Optional[T]`.
    Optional(Box<Type>),
    /// Instance of a user-defined class, by class name.
    Class(String),
    /// Function type (appears on callee expressions).
    Func { params: Vec<Type>, ret: Box<Type> },
    /// Union of several types. The restricted subset only produces unions
    /// the widening rules can collapse; anything else is rejected later.
    Union(Vec<Type>),
}

impl Type {
    /// True for types the target represents as heap pointers, i.e. the ones
    /// for which `None` / `nullptr` is a legal value.
    pub fn is_pointer(&self) -> bool {
        match self {
            Type::Str | Type::List(_) | Type::Dict(_, _) | Type::Class(_) => true,
            Type::Optional(inner) => inner.is_pointer(),
            _ => false,
        }
    }

    /// The class name, if this type is (an optional of) a class instance.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Class(name) => Some(name),
            Type::Optional(inner) => inner.class_name(),
            _ => None,
        }
    }

}
