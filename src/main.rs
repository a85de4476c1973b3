use std::path::Path;

use anyhow::{bail, Result};
use localjudge::{judge_problem, EngineError, LanguageRegistry, SessionOptions, Verdict};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        if let Some(EngineError::Compile { file, log }) = err.downcast_ref::<EngineError>() {
            eprintln!("{}", log.trim_end());
            println!("{}: {}", Verdict::CompileError, file);
        } else {
            eprintln!("error: {:#}", err);
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        bail!("usage: localjudge <problem_dir> <source_file> [language] [validator]");
    }

    let registry = LanguageRegistry::builtin()?;
    let opts = SessionOptions {
        language: args.get(2).cloned(),
        validator: args.get(3).cloned().unwrap_or_else(|| "diff".to_string()),
    };

    let (results, report) =
        judge_problem(&registry, Path::new(&args[0]), Path::new(&args[1]), &opts).await?;

    for case in &results {
        println!("{}: {}", case.name, case.verdict);
    }
    println!();
    println!("{}", report);
    Ok(())
}
