//! tmplc-check - drive the type checker against a JSON fixture.
//!
//! Works like a thin harness over `tmplc_types`: it owns no parser and no
//! elaborator, it only decodes a fixture into the crate's own `TypeDecls`/
//! `Expr` types and calls one of the four external entry points.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use tmplc_types::{
    type_check, type_check_all, type_check_incremental, type_tree, CheckConfig, Expr, Name,
    Type, TypeDecls,
};

/// Source position carried on every node of a fixture's expressions.
/// Stands in for whatever span type a real front end would use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub col: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// `typeCheck`: the outer type of a single expression.
    Check,
    /// `typeTree`: every node of a single expression, fully annotated.
    Tree,
    /// `typeCheckAll`: a batch of mutually recursive definitions.
    All,
    /// `typeCheckIncremental`: a batch checked against previously known types.
    Incremental,
}

#[derive(Parser)]
#[command(name = "tmplc-check")]
#[command(about = "Type-check a JSON fixture against the template type inference core")]
#[command(version)]
struct Args {
    /// Fixture file to check
    input: PathBuf,

    /// Which entry point to exercise
    #[arg(long, value_enum, default_value = "check")]
    mode: Mode,

    /// Stop accumulating solver errors past this many (generation errors
    /// are never bounded)
    #[arg(long)]
    max_errors: Option<usize>,

    /// Enforce that a record's leftover field constraints are a subset of
    /// its declared fields, instead of the permissive default
    #[arg(long)]
    strict_record_fields: bool,
}

/// On-disk shape of a fixture file. `exprs`/`known` are only read in batch
/// modes; `expr` is only read in single-expression modes.
#[derive(Deserialize)]
struct Fixture {
    #[serde(default)]
    decls: TypeDecls,
    #[serde(default)]
    expr: Option<Expr<Span>>,
    #[serde(default)]
    exprs: BTreeMap<Name, Expr<Span>>,
    #[serde(default)]
    known: BTreeMap<Name, Type>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading fixture {}", args.input.display()))?;
    let mut fixture: Fixture =
        serde_json::from_str(&text).with_context(|| "parsing fixture JSON")?;
    fixture.decls.reindex();

    let config = CheckConfig {
        max_errors: args.max_errors,
        permissive_record_fields: !args.strict_record_fields,
    };

    match args.mode {
        Mode::Check => {
            let expr = fixture
                .expr
                .context("fixture has no top-level `expr` for --mode check")?;
            run_single(&fixture.decls, &config, &expr, |decls, config, expr| {
                type_check(decls, config, expr).map(|ty| serde_json::json!({ "type": ty }))
            })
        }
        Mode::Tree => {
            let expr = fixture
                .expr
                .context("fixture has no top-level `expr` for --mode tree")?;
            run_single(&fixture.decls, &config, &expr, |decls, config, expr| {
                type_tree(decls, config, expr).map(|tree| serde_json::json!({ "tree": tree }))
            })
        }
        Mode::All => run_batch(&fixture.decls, &config, &fixture.exprs, |decls, config, exprs| {
            type_check_all(decls, config, exprs)
        }),
        Mode::Incremental => run_batch(&fixture.decls, &config, &fixture.exprs, |decls, config, exprs| {
            type_check_incremental(decls, config, &fixture.known, exprs)
        }),
    }
}

fn run_single(
    decls: &TypeDecls,
    config: &CheckConfig,
    expr: &Expr<Span>,
    check: impl FnOnce(&TypeDecls, &CheckConfig, &Expr<Span>) -> Result<serde_json::Value, Vec<tmplc_types::TypeError<Span>>>,
) -> Result<()> {
    match check(decls, config, expr) {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(errs) => report_errors(&errs),
    }
}

fn run_batch(
    decls: &TypeDecls,
    config: &CheckConfig,
    exprs: &BTreeMap<Name, Expr<Span>>,
    check: impl FnOnce(
        &TypeDecls,
        &CheckConfig,
        &BTreeMap<Name, Expr<Span>>,
    ) -> Result<BTreeMap<Name, Expr<(Type, Span)>>, Vec<tmplc_types::TypeError<Span>>>,
) -> Result<()> {
    match check(decls, config, exprs) {
        Ok(tree) => {
            println!("{}", serde_json::to_string_pretty(&tree)?);
            Ok(())
        }
        Err(errs) => report_errors(&errs),
    }
}

fn report_errors(errs: &[tmplc_types::TypeError<Span>]) -> Result<()> {
    for err in errs {
        eprintln!("error: {err}");
    }
    anyhow::bail!("{} type error(s)", errs.len())
}
