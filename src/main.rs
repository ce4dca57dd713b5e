//! CLI entrypoint. No flags: every input/output path is hard-coded relative to the working
//! directory under `./DataGenerator/` (§6). Generates a deterministic CSV fixture under that
//! directory on first run (only filling in files that do not already exist), then builds and
//! drives the topology to completion.

use bond_desk_fabric::config::Config;
use bond_desk_fabric::{fixtures, logging, topology::Topology};
use chrono::Local;

fn main() {
    logging::init();

    let config = Config::default();
    let today = Local::now().date_naive();

    if let Err(err) = fixtures::generate_if_absent(&config.data_dir, 2024, today) {
        tracing::error!(error = %err, "failed to generate input fixtures");
        std::process::exit(1);
    }

    let mut topology = Topology::build(config, today);
    if let Err(err) = topology.run() {
        tracing::error!(error = %err, "fabric run aborted");
        std::process::exit(1);
    }
}
