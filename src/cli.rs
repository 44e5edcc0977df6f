//! Command-line front end.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::config::{BlockRange, Options};
use crate::consts::DEFAULT_SEGMENT_SIZE;
use crate::dump;

#[derive(Parser, Debug)]
#[command(
    name = "hexpage",
    version,
    about = "Annotate PostgreSQL heap and index segment files for wxHexEditor",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Verify page checksums
    #[arg(short = 'k', long)]
    checksums: bool,

    /// Skip non-root b-tree leaf pages (one whole-page tag each)
    #[arg(short = 'l', long)]
    skip_leaf: bool,

    /// Annotate a specific block range, inclusive and indexed from 0;
    /// a bare START annotates that single block
    #[arg(short = 'R', long, value_name = "START[:END]", value_parser = parse_block_range)]
    range: Option<BlockRange>,

    /// Force the relation segment size in bytes
    #[arg(
        short = 's',
        long,
        value_name = "BYTES",
        default_value_t = DEFAULT_SEGMENT_SIZE,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    segment_size: u64,

    /// Force the segment number (default: inferred from the file name)
    #[arg(short = 'n', long, value_name = "N")]
    segment_number: Option<u32>,

    /// Heap or index segment file to annotate
    file: PathBuf,
}

fn parse_block_range(s: &str) -> Result<BlockRange, String> {
    match s.split_once(':') {
        None => s
            .parse::<u32>()
            .map(BlockRange::single)
            .map_err(|_| format!("invalid block number <{}>", s)),
        Some((start, end)) => {
            let start = start
                .parse::<u32>()
                .map_err(|_| format!("invalid range start <{}>", start))?;
            let end = end
                .parse::<u32>()
                .map_err(|_| format!("invalid range end <{}>", end))?;
            BlockRange::new(start, end)
                .ok_or_else(|| format!("range start {} is greater than end {}", start, end))
        }
    }
}

/// Parse options, run the dump, and map the outcome to an exit code:
/// 0 clean, 1 when anything was reported along the way.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    let opts = Options {
        verify_checksums: cli.checksums,
        skip_leaf_pages: cli.skip_leaf,
        range: cli.range,
        segment_size: cli.segment_size,
        segment_number: cli.segment_number,
    };

    let stdout = io::stdout();
    let failed = dump::dump_file(&cli.file, &opts, stdout.lock())?;
    Ok(if failed { 1 } else { 0 })
}
