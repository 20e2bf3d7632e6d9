// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

//! Escaping utilities for C++ identifiers and string literals.
//!
//! Python identifiers that collide with C++ reserved words get a trailing
//! underscore; string literal contents are escaped into C++ double-quoted
//! literal syntax.

use once_cell::sync::Lazy;
use std::collections::HashSet;

static CPP_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "alignas", "alignof", "auto", "bool", "break", "case", "catch", "char", "class", "const",
        "constexpr", "continue", "default", "delete", "do", "double", "else", "enum", "explicit",
        "export", "extern", "false", "float", "for", "friend", "goto", "if", "inline", "int",
        "long", "mutable", "namespace", "new", "noexcept", "nullptr", "operator", "private",
        "protected", "public", "register", "return", "short", "signed", "sizeof", "static",
        "struct", "switch", "template", "this", "throw", "true", "try", "typedef", "typeid",
        "typename", "union", "unsigned", "using", "virtual", "void", "volatile", "while",
    ]
    .into_iter()
    .collect()
});

/// Escape an identifier that collides with a C++ reserved word.
pub fn escape_identifier(name: &str) -> String {
    if CPP_KEYWORDS.contains(name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// Escape string contents for a C++ double-quoted literal.
/// Control bytes are emitted as octal escapes so the output never depends on
/// the compiler's source character set.
pub fn escape_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\{:03o}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}
