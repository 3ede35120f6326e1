//! planexpr - build and evaluate an expression tree from a JSON plan

use anyhow::{bail, Context, Result};
use clap::Parser as ClapParser;
use std::path::PathBuf;
use planexpr::access::Value;
use planexpr::expression::plan::read_plan_file;
use planexpr::expression::{build_expression_tree, EvaluationContext};

/// Build an expression tree from a serialized plan and evaluate it
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON plan node
    plan: PathBuf,

    /// Tuple to evaluate against, as a JSON array
    #[arg(short, long)]
    tuple: Option<String>,

    /// Query parameters, as a JSON array
    #[arg(short = 'p', long)]
    params: Option<String>,

    /// Address of the tuple being evaluated
    #[arg(short = 'a', long)]
    tuple_address: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let plan = read_plan_file(&args.plan)?;
    let expression = build_expression_tree(&plan).context("Failed to build expression tree")?;
    println!("{}", expression);

    let tuple = parse_values(args.tuple.as_deref(), "tuple")?;
    let params = parse_values(args.params.as_deref(), "params")?;
    if args.tuple.is_none() && args.params.is_none() && args.tuple_address.is_none() {
        return Ok(());
    }

    let mut context = EvaluationContext::new(&tuple).with_parameters(&params);
    if let Some(address) = args.tuple_address {
        context = context.with_tuple_address(address);
    }
    let result = expression
        .evaluate(&context)
        .context("Failed to evaluate expression")?;
    println!("=> {}", result);

    Ok(())
}

fn parse_values(raw: Option<&str>, what: &str) -> Result<Vec<Value>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let json: serde_json::Value =
        serde_json::from_str(raw).with_context(|| format!("Invalid JSON for --{}", what))?;
    let serde_json::Value::Array(items) = json else {
        bail!("--{} must be a JSON array", what);
    };
    items.iter().map(Value::from_json).collect()
}
