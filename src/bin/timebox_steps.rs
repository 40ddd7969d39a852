// src/bin/timebox_steps.rs

use clap::Parser;
use timebox::cli::StepsArgs;
use timebox::{logging, run_setup_steps};

#[tokio::main]
async fn main() {
    let code = match run_main().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("timebox-steps error: {err:?}");
            1
        }
    };
    std::process::exit(code);
}

async fn run_main() -> anyhow::Result<i32> {
    let args = StepsArgs::parse();
    logging::init_logging(args.log_level, tracing::Level::WARN)?;
    run_setup_steps(args).await
}
