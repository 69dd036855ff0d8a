use std::{
    fs::File,
    io::{self, BufWriter},
};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use rayon::ThreadPoolBuilder;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use chili_quality::{
    write_report, Config, ImageLoader, OutputOptions, QualityAnalyzer, Record,
    SegmentationStrategy, Strategy,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::parse();

    ensure!(config.input.exists(), "Input path does not exist");
    let pipeline_config = config.pipeline_config()?;

    ThreadPoolBuilder::new()
        .num_threads(config.num_threads)
        .build_global()?;

    let records = match pipeline_config.strategy {
        Strategy::Color => run(&QualityAnalyzer::from_config(&pipeline_config)?, &config)?,
        Strategy::Edge => {
            warn!("edge segmentation only uses a single channel gradient; results are experimental");
            run(&QualityAnalyzer::edge_from_config(&pipeline_config)?, &config)?
        }
    };

    for record in &records {
        println!(
            "{}: {} {}",
            record.path.display(),
            record.features,
            record.estimate
        );
    }

    if let Some(report) = &config.report {
        let file = File::create(report)
            .with_context(|| format!("Failed to create report: {}", report.display()))?;
        write_report(&records, BufWriter::new(file))
            .with_context(|| format!("Failed to write report: {}", report.display()))?;
    }

    Ok(())
}

fn run<L: ImageLoader, S: SegmentationStrategy>(
    analyzer: &QualityAnalyzer<L, S>,
    config: &Config,
) -> Result<Vec<Record>> {
    let output = config.output_dir.clone().map(|output_dir| OutputOptions {
        output_dir,
        format: config.format.clone(),
    });

    if config.input.is_dir() {
        Ok(analyzer.process_directory(&config.input, output.as_ref())?)
    } else {
        let record = analyzer
            .process_file(&config.input, output.as_ref())
            .with_context(|| format!("Failed to analyze photo: {}", config.input.display()))?;
        Ok(vec![record])
    }
}
