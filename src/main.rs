// NETMETRICS: Aggregate Network-Performance Metrics from Discrete-Event Simulation Traces
// Copyright (C) 2024-2025 Roland Schmid <roschmi@ethz.ch> and Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Aggregate the traces of a node-density or traffic-load sweep, print the averaged metrics, and
//! plot them.

use std::{path::PathBuf, process};

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use netmetrics::{
    config::{SweepConfig, SweepFile, Variant},
    plot,
    sweep::Sweep,
    util,
};

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Experiment parameter that was varied.
    #[arg(value_enum)]
    variant: Variant,
    /// Overwrite the directory containing the `output_{value}_{seed}.tr` traces.
    #[arg(short, long)]
    results_dir: Option<PathBuf>,
    /// Overwrite the output path for plots.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
    /// JSON file with the values, seeds, and directories of the sweep. Command line arguments take
    /// precedence.
    #[arg(short, long)]
    sweep_file: Option<PathBuf>,
    /// Comma-separated list of parameter values to evaluate.
    #[arg(long, value_delimiter = ',')]
    values: Option<Vec<u32>>,
    /// Comma-separated list of seeds to evaluate.
    #[arg(long, value_delimiter = ',')]
    seeds: Option<Vec<u32>>,
    /// Also write interactive HTML plots next to the images.
    #[arg(long)]
    html: bool,
}

impl Args {
    fn sweep_config(&self) -> Result<SweepConfig> {
        let mut config = SweepConfig::new(self.variant);
        if let Some(path) = &self.sweep_file {
            let file = SweepFile::load(path)
                .with_context(|| format!("Cannot load the sweep file {path:?}"))?;
            config = config.with_file(file);
        }
        if let Some(results_dir) = &self.results_dir {
            config = config.results_dir(results_dir);
        }
        if let Some(output_dir) = &self.output_dir {
            config = config.output_dir(output_dir);
        }
        if let Some(values) = &self.values {
            config = config.values(values.clone());
        }
        if let Some(seeds) = &self.seeds {
            config = config.seeds(seeds.clone());
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let multi = util::init_logging()?;

    let args = Args::parse();
    let config = args.sweep_config()?;

    // ensure that the results folder exists
    if config.variant.requires_results_dir() && !config.results_dir.exists() {
        log::error!(
            "Error: Results directory {:?} does not exist.",
            config.results_dir
        );
        process::exit(1)
    }

    let sweep = Sweep::new(config);
    log::info!(
        "Evaluating {} traces of the {} sweep in {:?}",
        sweep.num_runs(),
        sweep.variant(),
        sweep.config().results_dir
    );

    let pb = multi.add(ProgressBar::new(sweep.num_runs() as u64).with_style(
        ProgressStyle::with_template(
            "[{bar:80}] run: {pos:>4}/{len:4}, elapsed: {elapsed}, eta: {eta}",
        )?
        .progress_chars("##-"),
    ));
    let table = sweep.run_with(|_, _| pb.inc(1));
    pb.finish_and_clear();
    multi.remove(&pb);

    print!("{table}");

    let plot_dir = sweep.config().plot_dir();
    let written = plot::render(&table, &plot_dir, args.html)
        .with_context(|| format!("Cannot render the plots into {plot_dir:?}"))?;
    for path in written {
        log::info!("Written plot to: {}", path.display());
    }

    Ok(())
}
