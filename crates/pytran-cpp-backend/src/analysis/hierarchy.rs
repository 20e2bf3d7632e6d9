// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

//! Class hierarchy analysis and virtual-dispatch classification.
//!
//! Two phases. Phase one records every class in every selected module (it is
//! interleaved with forward-declaration emission, which already visits each
//! class once). Phase two runs only after the whole program has been
//! recorded: a method declared in one module can be overridden in another,
//! so dispatch cannot be classified per class as classes are visited. A class
//! whose subtree overrides nothing keeps every method statically bound and
//! pays no dispatch-table cost.

use std::collections::{BTreeSet, HashMap, HashSet};

use anyhow::{anyhow, bail, Result};
use indexmap::IndexMap;
use log::debug;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use pytran_ast::ClassDecl;

/// One class as seen by phase one: its name, direct base and own method set.
#[derive(Debug, Clone)]
pub struct ClassRecord {
    pub name: String,
    pub base: Option<String>,
    /// Method names declared by the class itself, source order.
    /// `__init__` is excluded: constructors never dispatch dynamically.
    pub methods: Vec<String>,
}

/// The class-record table plus, after [`calculate`](ClassHierarchy::calculate),
/// the set of (declaring class, method) pairs that require dynamic dispatch.
pub struct ClassHierarchy {
    records: IndexMap<String, ClassRecord>,
    virtuals: BTreeSet<(String, String)>,
    calculated: bool,
}

impl ClassHierarchy {
    pub fn new() -> Self {
        Self {
            records: IndexMap::new(),
            virtuals: BTreeSet::new(),
            calculated: false,
        }
    }

    /// Phase one: record a class declaration. All classes in the program
    /// must be recorded before [`calculate`](Self::calculate) runs.
    pub fn record_class(&mut self, class: &ClassDecl) -> Result<()> {
        if self.records.contains_key(&class.name) {
            bail!(
                "class `{}` is declared more than once across the selected modules",
                class.name
            );
        }
        let methods = class
            .methods
            .iter()
            .map(|m| m.name.clone())
            .filter(|name| name != "__init__")
            .collect();
        self.records.insert(
            class.name.clone(),
            ClassRecord {
                name: class.name.clone(),
                base: class.base.clone(),
                methods,
            },
        );
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Phase two: classify dispatch. Walks each inheritance tree with
    /// ancestors before descendants; when a class re-declares a method an
    /// ancestor also declares, the pair goes virtual for the re-declaring
    /// class and for every declaring class up the chain.
    pub fn calculate(&mut self) -> Result<()> {
        for record in self.records.values() {
            if let Some(base) = &record.base {
                if !self.records.contains_key(base) {
                    bail!(
                        "class `{}` extends `{}`, which is not a class in the selected modules",
                        record.name,
                        base
                    );
                }
            }
        }

        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for name in self.records.keys() {
            graph.add_node(name.as_str());
        }
        for record in self.records.values() {
            if let Some(base) = &record.base {
                graph.add_edge(base.as_str(), record.name.as_str(), ());
            }
        }
        let order = toposort(&graph, None)
            .map_err(|cycle| anyhow!("inheritance cycle involving class `{}`", cycle.node_id()))?;

        // Per class, per method name: the chain of declaring classes from the
        // root of the tree down to (and including) that class.
        let mut chains: HashMap<&str, HashMap<&str, Vec<&str>>> = HashMap::new();
        let mut virtuals: BTreeSet<(String, String)> = BTreeSet::new();

        for class in order {
            let record = &self.records[class];
            let mut methods: HashMap<&str, Vec<&str>> = match record.base.as_deref() {
                Some(base) => chains
                    .get(base)
                    .expect("BUG: base class processed after derived class")
                    .clone(),
                None => HashMap::new(),
            };
            for method in &record.methods {
                let chain = methods.entry(method.as_str()).or_default();
                if !chain.is_empty() {
                    for declaring in chain.iter() {
                        virtuals.insert((declaring.to_string(), method.clone()));
                    }
                    virtuals.insert((class.to_string(), method.clone()));
                }
                chain.push(class);
            }
            chains.insert(class, methods);
        }

        debug!("virtual set: {} entries", virtuals.len());
        self.virtuals = virtuals;
        self.calculated = true;
        Ok(())
    }

    /// Whether the method, as declared by `class`, needs dynamic dispatch.
    /// Callers pass a declaring class (see [`declaring_class`](Self::declaring_class)).
    pub fn is_virtual(&self, class: &str, method: &str) -> bool {
        debug_assert!(self.calculated, "is_virtual queried before calculate");
        self.virtuals
            .contains(&(class.to_string(), method.to_string()))
    }

    pub fn virtual_count(&self) -> usize {
        self.virtuals.len()
    }

    /// The nearest self-or-ancestor of `class` that declares `method`.
    pub fn declaring_class(&self, class: &str, method: &str) -> Option<&str> {
        for ancestor in self.ancestry(class) {
            let record = &self.records[ancestor];
            if record.methods.iter().any(|m| m == method) {
                return Some(ancestor);
            }
        }
        None
    }

    /// The nearest common ancestor of two classes (either class counts as
    /// its own ancestor). Used to widen two class-typed assignments into one
    /// storage type.
    pub fn common_ancestor(&self, a: &str, b: &str) -> Option<&str> {
        let of_b: HashSet<&str> = self.ancestry(b).into_iter().collect();
        self.ancestry(a).into_iter().find(|anc| of_b.contains(anc))
    }

    /// `class` followed by its base chain, nearest first.
    fn ancestry(&self, class: &str) -> Vec<&str> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.records.get_key_value(class).map(|(k, _)| k.as_str());
        while let Some(name) = current {
            if !seen.insert(name) {
                break; // cycle; calculate() reports it as fatal
            }
            out.push(name);
            current = self.records[name].base.as_deref();
        }
        out
    }
}

impl Default for ClassHierarchy {
    fn default() -> Self {
        Self::new()
    }
}
