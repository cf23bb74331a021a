// src/main.rs

use procstream::{cli, config, exit_code_for, logging, run};

#[tokio::main]
async fn main() {
    let args = cli::parse();

    let cfg = match config::load_or_default(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("procstream error: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = logging::init_logging(args.log_level, cfg.run.log_level) {
        eprintln!("procstream error: {err:?}");
        std::process::exit(1);
    }

    if let Err(err) = run(args, cfg).await {
        eprintln!("procstream error: {err}");
        std::process::exit(exit_code_for(&err));
    }
}
