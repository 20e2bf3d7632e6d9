// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

//! Renders resolved types to C++ storage types.
//! Pure translation - no logic, just pattern matching.
//!
//! Heap values (strings, containers, class instances) are runtime-managed
//! pointers; `Optional` of a pointer is the same pointer, now nullable.

use anyhow::{bail, Result};
use pytran_ast::Type;

use crate::escape::escape_identifier;

/// Render a type as a C++ storage type (locals, fields, parameters).
pub fn render_type(ty: &Type) -> Result<String> {
    let rendered = match ty {
        Type::Int => "int".to_string(),
        Type::Float => "double".to_string(),
        Type::Bool => "bool".to_string(),
        Type::Str => "Str*".to_string(),
        Type::NoneType => bail!("`None` is not a storage type"),
        Type::List(elem) => format!("List<{}>*", render_type(elem)?),
        Type::Dict(key, value) => {
            format!("Dict<{}, {}>*", render_type(key)?, render_type(value)?)
        }
        Type::Class(name) => format!("{}*", escape_identifier(name)),
        Type::Optional(inner) => {
            if !inner.is_pointer() {
                bail!("Optional[{:?}] has no C++ representation", inner);
            }
            render_type(inner)?
        }
        Type::Func { .. } => bail!("function values have no C++ storage type"),
        Type::Union(alts) => bail!("union type {:?} was not widened before rendering", alts),
    };
    Ok(rendered)
}

/// Render a function return type. `None` becomes `void`.
pub fn render_return_type(ty: &Type) -> Result<String> {
    match ty {
        Type::NoneType => Ok("void".to_string()),
        _ => render_type(ty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containers_nest() {
        let ty = Type::Dict(
            Box::new(Type::Str),
            Box::new(Type::List(Box::new(Type::Int))),
        );
        assert_eq!(render_type(&ty).unwrap(), "Dict<Str*, List<int>*>*");
    }

    #[test]
    fn optional_pointer_is_the_pointer() {
        let ty = Type::Optional(Box::new(Type::Class("Token".to_string())));
        assert_eq!(render_type(&ty).unwrap(), "Token*");
    }

    #[test]
    fn optional_int_is_rejected() {
        assert!(render_type(&Type::Optional(Box::new(Type::Int))).is_err());
    }

    #[test]
    fn none_return_is_void() {
        assert_eq!(render_return_type(&Type::NoneType).unwrap(), "void");
        assert_eq!(render_return_type(&Type::Int).unwrap(), "int");
    }
}
