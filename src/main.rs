// src/main.rs

use carrierlab::{cli, logging, run};

// No #[tokio::main]: the main thread is the caller's carrier and the harness
// drives its own runtime on it.
fn main() {
    if let Err(err) = run_main() {
        eprintln!("carrierlab error: {err:?}");
        std::process::exit(1);
    }
}

fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args)
}
