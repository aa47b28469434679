// SPDX-FileCopyrightText: 2026 Obscodec Contributors
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Obscodec CLI
//!
//! Command-line tool for observation stream files.
//!
//! ## Usage
//!
//! ```sh
//! # Show file information
//! obscodec inspect scene.xml
//!
//! # Convert between formats
//! obscodec convert scene.xml cloud.pcd
//!
//! # Convert with a binary PCD payload
//! obscodec convert scene.xml cloud.pcd --binary
//! ```

use std::io::IsTerminal as _;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};

use obscodec::io::formats::pcd::PcdWriter;
use obscodec::io::registry::{create_writer, open_reader_auto};
use obscodec::{FormatTag, KernelEncoding, ObservationReader, ObservationWriter};

type Result<T = ()> = anyhow::Result<T>;

/// Obscodec - observation stream toolkit
///
/// Read, inspect and convert CoViS3D and PCD observation files through a
/// unified interface. Format auto-detection means you rarely need to
/// specify file types.
#[derive(Parser, Clone)]
#[command(name = "obscodec")]
#[command(about = "Observation stream toolkit for CoViS3D and PCD files", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Show format and record count of a file
    Inspect {
        /// Input observation file
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },

    /// Convert an observation file to another format
    Convert {
        /// Input observation file (format auto-detected)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output observation file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Output format (covis3d, pcd); inferred from the output
        /// extension when omitted
        #[arg(short, long)]
        format: Option<FormatTag>,

        /// Write binary PCD payload instead of ascii
        #[arg(long)]
        binary: bool,
    },
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { input } => cmd_inspect(input),
        Commands::Convert {
            input,
            output,
            format,
            binary,
        } => cmd_convert(input, output, format, binary),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

/// Show format and record statistics for a file.
fn cmd_inspect(input: PathBuf) -> Result<()> {
    let mut reader =
        open_reader_auto(&input).with_context(|| format!("open {}", input.display()))?;

    println!("File:    {}", input.display());
    println!("Format:  {}", reader.format());

    let mut count = 0usize;
    let mut weight_sum = 0.0f64;
    for obs in reader.observations() {
        let obs = obs.with_context(|| format!("read {}", input.display()))?;
        count += 1;
        weight_sum += obs.kernel.weight;
    }

    println!("Records: {count}");
    if count > 0 {
        println!("Mean weight: {:.6}", weight_sum / count as f64);
    }
    Ok(())
}

/// Convert a file to another format, re-tagging each record.
fn cmd_convert(
    input: PathBuf,
    output: PathBuf,
    format: Option<FormatTag>,
    binary: bool,
) -> Result<()> {
    let tag = match format {
        Some(tag) => tag,
        None => format_from_extension(&output).ok_or_else(|| {
            anyhow!(
                "cannot infer output format from {}; pass --format",
                output.display()
            )
        })?,
    };
    if binary && tag != FormatTag::Pcd {
        return Err(anyhow!("--binary only applies to pcd output"));
    }

    let mut reader =
        open_reader_auto(&input).with_context(|| format!("open {}", input.display()))?;

    println!("Converting {} to {}:", reader.format(), tag);
    println!("  Input:  {}", input.display());
    println!("  Output: {}", output.display());

    let mut writer: Box<dyn ObservationWriter> = if tag == FormatTag::Pcd && binary {
        Box::new(PcdWriter::new(&output).with_encoding(KernelEncoding::Binary))
    } else {
        create_writer(tag, &output)?
    };
    writer
        .init()
        .with_context(|| format!("initialize {}", output.display()))?;

    let progress = spinner();
    let mut count = 0usize;
    for obs in reader.observations() {
        let obs = obs.with_context(|| format!("read {}", input.display()))?;
        writer.write_observation(&obs.retagged(tag))?;
        count += 1;
        if let Some(pb) = &progress {
            pb.set_position(count as u64);
        }
    }
    writer
        .write_buffer()
        .with_context(|| format!("write {}", output.display()))?;

    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }
    println!("  Records converted: {count}");
    Ok(())
}

/// Guess the output format from a path extension.
fn format_from_extension(path: &Path) -> Option<FormatTag> {
    match path.extension()?.to_str()? {
        ext if ext.eq_ignore_ascii_case("pcd") => Some(FormatTag::Pcd),
        ext if ext.eq_ignore_ascii_case("xml") || ext.eq_ignore_ascii_case("covis3d") => {
            Some(FormatTag::Covis3d)
        }
        _ => None,
    }
}

/// A spinner for interactive runs; silent when stderr is not a terminal.
fn spinner() -> Option<indicatif::ProgressBar> {
    if std::io::stderr().is_terminal() {
        let pb = indicatif::ProgressBar::new_spinner();
        pb.set_style(
            indicatif::ProgressStyle::default_spinner()
                .template("{spinner:.green} {pos} records")
                .ok()?,
        );
        Some(pb)
    } else {
        None
    }
}
