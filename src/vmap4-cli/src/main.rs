//! vmap4extractor - batch world collision geometry extractor

mod cli;
mod dump;

use anyhow::Result;
use clap::Parser;

use vmap4::pipeline::{self, RunOptions};

fn main() -> Result<()> {
    // Usage problems (and explicit help requests) exit 1, not clap's
    // default error status.
    let args = match cli::Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    };

    println!("vmap4extractor v{}. Beginning work...\n", env!("CARGO_PKG_VERSION"));

    let opener = dump::DumpOpener::new(&args.data);
    let opts = RunOptions {
        out_dir: args.output.clone(),
        precise: args.large,
    };

    let summary = pipeline::run(&opener, &opts)?;

    println!();
    println!(
        "Work complete. Locale {} build {}: {} of {} maps walked.",
        summary.locale, summary.build, summary.maps_walked, summary.maps_total
    );
    println!(
        "Models: extracted {}, skipped {}, failed {}.",
        summary.models.extracted, summary.models.skipped, summary.models.failed
    );
    if summary.unresolved_copies > 0 {
        println!(
            "Warning: {} map copy records referenced unknown source ids.",
            summary.unresolved_copies
        );
    }

    Ok(())
}
