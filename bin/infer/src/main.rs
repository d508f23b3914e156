//! Inference Binary
//!
//! Labels and superpixelizes every image named in a list file, in parallel.
//!
//! Options: --mode infer|truth|loss, --clusters, --threads, --eight

mod args;

fn main() -> anyhow::Result<()> {
    hseg_core::log();
    use clap::Parser;
    args::Args::parse().run()
}
