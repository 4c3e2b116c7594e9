mod cli;

use std::fs::File;
use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use cli::{Args, Commands};
use segsample::{
    pipeline::{reflow, write_segments, Pipeline},
    transform::{TransformChain, WordFilter},
    writer::RecordWriter,
    ExcludePrefix, FileSourceStream,
};

fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    match args.command {
        Commands::Process {
            species,
            chromosome,
            input,
            target_folder,
            params,
        } => {
            let config = params.resolve()?.validate()?;
            let pipeline = Pipeline::new(config);
            let (paths, stats) = pipeline
                .run_file(&input, &species, &chromosome, &target_folder)
                .with_context(|| format!("Unable to process {}", input.display()))?;
            info!(
                "Wrote {} samples to {}",
                stats.samples,
                paths.samples.display()
            );
        }
        Commands::Segments {
            species,
            chromosome,
            input,
            params,
        } => {
            let config = params.resolve()?;
            let source = FileSourceStream::open(&input)?.span_mode(config.span_mode);
            let stage = TransformChain::new()
                .then(config.splitter())
                .then(WordFilter::new(config.min_word_length));
            let mut out = RecordWriter::new(io::stdout().lock(), &species, &chromosome);
            let stats = write_segments(source, config.segment_size, stage, &mut out)?;
            info!("{stats}");
        }
        Commands::Reflow {
            input,
            line_length,
            output,
            header_prefix,
        } => {
            let filter = ExcludePrefix::new(header_prefix.as_bytes());
            let source = FileSourceStream::open_with_filter(&input, filter)?;
            let out: Box<dyn Write> = match &output {
                Some(path) => Box::new(
                    File::create(path)
                        .with_context(|| format!("Unable to create {}", path.display()))?,
                ),
                None => Box::new(io::stdout().lock()),
            };
            let stats = reflow(source, line_length, out)?;
            info!("Reflowed {} characters into {} lines", stats.filtered_length, stats.segments);
        }
    }
    Ok(())
}
