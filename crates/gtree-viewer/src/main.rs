#![forbid(unsafe_code)]

//! `gtree` binary entry point.

use gtree_runtime::{Program, ProgramConfig};
use gtree_viewer::app::AppModel;
use gtree_viewer::{cli, data_source, logging};

fn main() {
    let opts = cli::Opts::parse();

    if let Err(e) = logging::init(&opts.log_file, &opts.log_filter) {
        eprintln!("Cannot open log file {}: {e}", opts.log_file.display());
        std::process::exit(1);
    }

    let source = match data_source(&opts) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let config = ProgramConfig::default()
        .with_ui_height(opts.ui_height)
        .with_mouse(opts.mouse);
    match Program::new(AppModel::new(source), config) {
        Ok(program) => {
            if let Err(e) = program.run() {
                tracing::error!(error = %e, "runtime error");
                eprintln!("Runtime error: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Failed to initialize: {e}");
            std::process::exit(1);
        }
    }
}
