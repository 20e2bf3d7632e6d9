// Copyright (c) The pytran Authors
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use codespan_reporting::term::termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use colored::Colorize;
use log::{debug, LevelFilter};
use pytran_ast::{Severity, TypedProgram};
use pytran_cpp_backend::{module_names_from_paths, translate};

#[derive(Parser)]
#[clap(
    name = env!("CARGO_BIN_NAME"),
    about = "Translates a type-checked module graph into a single C++ translation unit. \
             The graph is the front end's JSON export; the source paths name which of \
             its modules to translate.",
    rename_all = "kebab-case",
    author,
    version = env!("CARGO_PKG_VERSION"),
)]
struct Args {
    /// Path to the front end's typed module-graph export
    #[clap(long = "graph", short = 'g')]
    graph: PathBuf,

    /// Output file (stdout if omitted)
    #[clap(long = "output", short = 'o')]
    output: Option<PathBuf>,

    /// Translate even if the front end reported type errors
    #[clap(long = "keep-going")]
    keep_going: bool,

    /// Verbose logging to stderr
    #[clap(long = "verbose", short = 'v')]
    verbose: bool,

    /// Source files whose modules to translate
    #[clap(required = true)]
    sources: Vec<PathBuf>,
}

fn report_diagnostics(program: &TypedProgram) -> Result<()> {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    for diag in &program.diagnostics {
        let (label, color) = match diag.severity {
            Severity::Error => ("error", Color::Red),
            Severity::Warning => ("warning", Color::Yellow),
        };
        stderr.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(stderr, "{}", label)?;
        stderr.reset()?;
        writeln!(stderr, ": {}:{}: {}", diag.module, diag.line, diag.message)?;
    }
    Ok(())
}

fn execute(args: &Args) -> Result<()> {
    let graph = fs::read_to_string(&args.graph)
        .with_context(|| format!("reading module graph {}", args.graph.display()))?;
    let program: TypedProgram = serde_json::from_str(&graph)
        .with_context(|| format!("parsing module graph {}", args.graph.display()))?;

    report_diagnostics(&program)?;
    if program.has_errors() && !args.keep_going {
        anyhow::bail!("front end reported type errors (pass --keep-going to translate anyway)");
    }

    let requested = module_names_from_paths(&args.sources);
    debug!("requested modules: {:?}", requested);

    let output = translate(&program, &requested)?;

    // Written only after the whole translation succeeded.
    match &args.output {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{}", output),
    }
    Ok(())
}

fn main() {
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).unwrap();

    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )
    .ok();

    debug!("pytran version {}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = execute(&args) {
        let err = format!("{:?}", err);
        println!("{}", err.bold().red());
        std::process::exit(1);
    }
}
