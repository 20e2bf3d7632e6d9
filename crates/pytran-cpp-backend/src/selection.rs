// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

//! Module selection: filters the front end's whole-program module graph down
//! to the modules the caller actually named.
//!
//! The front end's graph contains every transitively imported module; only
//! the ones whose basename was requested on the command line are translated.

use std::collections::BTreeSet;
use std::path::Path;

use log::debug;
use pytran_ast::{Module, TypedProgram};

/// Derive requested module names from source paths: the base filename with
/// the extension stripped (`asdl/typed_arith_parse.py` -> `typed_arith_parse`).
pub fn module_names_from_paths<P: AsRef<Path>>(paths: &[P]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|p| p.as_ref().file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .collect()
}

/// Select the modules to translate, in front-end graph order.
///
/// A module is selected when the final dotted component of its qualified name
/// is in the requested set. The front end's package-root resolution can list
/// the same module under a second, prefixed key; later graph entries whose
/// basename was already selected are skipped so no module is translated
/// twice. Pure filter; an empty result is legal.
pub fn select_modules<'a>(program: &'a TypedProgram, requested: &[String]) -> Vec<&'a Module> {
    let wanted: BTreeSet<&str> = requested.iter().map(|s| s.as_str()).collect();
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut selected = Vec::new();

    for (key, module) in &program.modules {
        let basename = module.basename();
        if !wanted.contains(basename) {
            continue;
        }
        if !seen.insert(basename) {
            debug!("skipping duplicate graph entry {} for module {}", key, basename);
            continue;
        }
        selected.push(module);
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(name: &str) -> Module {
        Module {
            name: name.to_string(),
            imports: vec![],
            body: vec![],
        }
    }

    fn program(names: &[&str]) -> TypedProgram {
        let mut p = TypedProgram::new();
        for name in names {
            p.modules.insert(name.to_string(), module(name));
        }
        p
    }

    #[test]
    fn names_from_paths_strip_dirs_and_extension() {
        let names = module_names_from_paths(&["asdl/arith_parse.py", "b.py"]);
        assert_eq!(names, vec!["arith_parse", "b"]);
    }

    #[test]
    fn unrequested_imports_are_excluded() {
        let p = program(&["a", "b", "c"]);
        let selected = select_modules(&p, &["a".to_string(), "b".to_string()]);
        let names: Vec<_> = selected.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn prefixed_duplicate_entries_are_skipped() {
        // Front-end package-root artifact: "asdl.tdop" appears again as
        // "pkg.asdl.tdop". Only the first entry is translated.
        let p = program(&["asdl.tdop", "pkg.asdl.tdop"]);
        let selected = select_modules(&p, &["tdop".to_string()]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "asdl.tdop");
    }

    #[test]
    fn empty_selection_is_legal() {
        let p = program(&["a"]);
        assert!(select_modules(&p, &[]).is_empty());
        assert!(select_modules(&p, &["nope".to_string()]).is_empty());
    }
}
