use std::process;

use clap::Parser;
use log::warn;
use sublive::api::{ScanConfig, ScanEngine};
use sublive::input::Opts;
use sublive::state::cancel_pair;
use sublive::{logger, output, ScanError};

#[tokio::main]
async fn main() {
    let opts = Opts::parse();
    logger::init_logger(opts.verbose);

    let code = match run(opts).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", e);
            1
        }
    };
    process::exit(code);
}

async fn run(opts: Opts) -> Result<(), ScanError> {
    let config = ScanConfig::try_from(opts)?;
    if config.verbose {
        println!(
            "sublive v{} - scanning {}",
            env!("CARGO_PKG_VERSION"),
            config.root_domain
        );
    }

    let engine = ScanEngine::new(config)?;
    let candidates = engine.load_candidates()?;

    let (cancel, signal) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("收到中断信号，正在取消扫描");
            cancel.cancel();
        }
    });

    let outcome = engine.scan(candidates, signal).await?;
    output::emit(engine.config(), &outcome)
}
