use std::fs::File;
use std::io::{self, BufReader};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use beacond_scanner::publisher::{ConsolePublisher, MsgPublisher, SpoolPublisher};
use beacond_scanner::stream::{process_stream, StreamOptions};
use beacond_scanner::Cli;

fn main() -> Result<()> {
    let args = Cli::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    info!(
        "beacond {} starting, scanner id {}, client id {}",
        beacond_scanner::VERSION,
        args.scanner_id,
        args.client_id()
    );

    let mut publisher: Box<dyn MsgPublisher> = if args.skip_publish {
        Box::new(ConsolePublisher::new())
    } else {
        Box::new(SpoolPublisher::new(&args.spool))
    };

    let options = StreamOptions {
        scanner_id: args.scanner_id.clone(),
        topic: args.topic.clone(),
        qos: args.qos,
        properties: args.properties || args.skip_publish,
    };

    publisher.start()?;

    let stats = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("cannot open dump file {}", path.display()))?;
            process_stream(BufReader::new(file), &options, publisher.as_mut())?
        }
        None => process_stream(io::stdin().lock(), &options, publisher.as_mut())?,
    };

    publisher.stop()?;

    info!(
        "stream ended: {} events, {} published, {} discarded, {} lines passed through",
        stats.events, stats.published, stats.discarded, stats.passthrough
    );
    Ok(())
}
