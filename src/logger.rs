use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

/// Install the global logger once. `RUST_LOG` overrides the levels set here.
pub fn initialize_logger(verbose: bool) {
    INIT.call_once_force(|_| {
        let mut builder = builder(verbose);
        builder.parse_default_env();

        // Another logger may already be installed (tests, embedding binaries).
        let _ = builder.try_init();
    });
}

/// Warn for dependencies; info (debug when verbose) for the table and the benchmark binary.
fn builder(verbose: bool) -> Builder {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Warn)
        .filter_module("chaintable_rs", level)
        .filter_module("chainbench", level)
        .format_timestamp_millis();
    builder
}
