// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// A minimal graph: one module `m` with one function `f` that evaluates a
/// string literal.
const GRAPH_OK: &str = r#"{
  "modules": {
    "m": {
      "name": "m",
      "body": [
        {
          "Func": {
            "name": "f",
            "params": [],
            "ret": "NoneType",
            "body": [
              { "Expr": { "kind": { "Str": "hello" }, "ty": "Str" } }
            ]
          }
        }
      ]
    }
  }
}"#;

fn write_graph(dir: &TempDir, contents: &str) -> (PathBuf, PathBuf) {
    let graph = dir.path().join("graph.json");
    fs::write(&graph, contents).unwrap();
    let source = dir.path().join("m.py");
    fs::write(&source, "").unwrap();
    (graph, source)
}

fn pytran() -> Command {
    Command::cargo_bin("pytran").unwrap()
}

#[test]
fn translates_and_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let (graph, source) = write_graph(&dir, GRAPH_OK);
    let out = dir.path().join("out.cc");

    pytran()
        .arg("--graph")
        .arg(&graph)
        .arg("-o")
        .arg(&out)
        .arg(&source)
        .assert()
        .success();

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("GLOBAL_STR(str0, \"hello\");"));
    assert!(written.contains("void f()"));
}

#[test]
fn type_errors_abort_before_translation() {
    let dir = TempDir::new().unwrap();
    let graph_with_error = GRAPH_OK.replacen(
        "  }\n}",
        "  },\n  \"diagnostics\": [\n    { \"module\": \"m\", \"line\": 3, \"message\": \"bad type\", \"severity\": \"error\" }\n  ]\n}",
        1,
    );
    let (graph, source) = write_graph(&dir, &graph_with_error);
    let out = dir.path().join("out.cc");

    let assert = pytran()
        .arg("--graph")
        .arg(&graph)
        .arg("-o")
        .arg(&out)
        .arg(&source)
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("bad type"));
    assert!(!out.exists());
}

#[test]
fn keep_going_overrides_type_errors() {
    let dir = TempDir::new().unwrap();
    let graph_with_error = GRAPH_OK.replacen(
        "  }\n}",
        "  },\n  \"diagnostics\": [\n    { \"module\": \"m\", \"line\": 3, \"message\": \"bad type\", \"severity\": \"error\" }\n  ]\n}",
        1,
    );
    let (graph, source) = write_graph(&dir, &graph_with_error);
    let out = dir.path().join("out.cc");

    pytran()
        .arg("--graph")
        .arg(&graph)
        .arg("--keep-going")
        .arg("-o")
        .arg(&out)
        .arg(&source)
        .assert()
        .success();

    assert!(fs::read_to_string(&out).unwrap().contains("void f()"));
}

#[test]
fn missing_graph_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("m.py");
    fs::write(&source, "").unwrap();

    let assert = pytran()
        .arg("--graph")
        .arg(dir.path().join("nope.json"))
        .arg(&source)
        .assert()
        .failure();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("reading module graph"));
}
