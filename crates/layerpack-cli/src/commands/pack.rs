//! Pack command implementation
//!
//! Lists the source images of a directory, packs their alpha channels into
//! `output_{n}.png` files and optionally writes a manifest.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;

use layerpack_core::{pack_files, LayerLayout, OutputRecord, PackOptions};

use crate::codec::ImageFileCodec;
use crate::discover::list_images;
use crate::manifest::Manifest;

/// Settings of a pack run after input resolution.
#[derive(Debug, Clone)]
pub struct PackArgs {
    /// Directory holding the source images.
    pub directory: PathBuf,
    /// Requested bits per layer before clamping.
    pub bits_per_layer: i64,
    /// Directory receiving the outputs.
    pub output_dir: PathBuf,
    pub parallel: bool,
    pub verify: bool,
    pub manifest: bool,
    pub verbose: bool,
    pub quiet: bool,
}

/// Run the pack command
///
/// # Returns
/// Exit code: 0 on success
pub fn run(args: &PackArgs) -> Result<ExitCode> {
    let layout = LayerLayout::clamped(args.bits_per_layer);
    if i64::from(layout.bits_per_layer()) != args.bits_per_layer {
        eprintln!(
            "{} bits per layer {} is outside 1-32, using {}",
            "warning:".yellow().bold(),
            args.bits_per_layer,
            layout.bits_per_layer()
        );
    }

    let listing = list_images(&args.directory)?;
    if listing.has_jpg {
        eprintln!(
            "{} .jpg files will likely pack poorly since only the alpha channel is used.",
            "warning:".yellow().bold()
        );
        eprintln!("  Prefer a format with transparency such as .png for the input images.");
    }

    let sources = listing.paths;
    if !args.quiet {
        println!("{}", "Packing layers:".cyan().bold());
        println!("  {} {}", "Input:".dimmed(), args.directory.display());
        println!("  {} {}", "Images:".dimmed(), sources.len());
        println!(
            "  {} {} ({} per image)",
            "Bits per layer:".dimmed(),
            layout.bits_per_layer(),
            layout.layers_per_image()
        );
        println!("  {} {}", "Outputs:".dimmed(), layout.output_count(sources.len()));
    }

    let options = PackOptions {
        parallel: args.parallel,
        verify: args.verify,
    };
    let codec = ImageFileCodec::default();
    let summary = pack_files(
        &codec,
        &sources,
        layout,
        &args.output_dir,
        &options,
        |record| report_output(record, &sources, layout, args),
    )
    .with_context(|| format!("Failed to pack images from {}", args.directory.display()))?;

    if args.manifest {
        let manifest = Manifest::from_summary(&summary, &sources)?;
        let path = manifest.write(&args.output_dir)?;
        if !args.quiet {
            println!("  {} {}", "Manifest:".dimmed(), path.display());
        }
    }

    if !args.quiet {
        println!(
            "\n{} {} image(s) packed into {} output(s) in {}",
            "Done:".green().bold(),
            summary.source_count,
            summary.outputs.len(),
            args.output_dir.display()
        );
    }

    Ok(ExitCode::SUCCESS)
}

fn report_output(record: &OutputRecord, sources: &[PathBuf], layout: LayerLayout, args: &PackArgs) {
    if !args.quiet {
        print!("{}", output_report(record, sources, layout, args.verbose));
    }
}

/// Lines describing one written output, printed in one call so parallel
/// outputs do not interleave.
fn output_report(
    record: &OutputRecord,
    sources: &[PathBuf],
    layout: LayerLayout,
    verbose: bool,
) -> String {
    let mut report = format!("  {} {}\n", "+".green(), display_name(&record.path));
    if verbose {
        for slot in &record.slots {
            report.push_str(&format!(
                "      {} layer {} (bits {}..{}) <- {}\n",
                "-".dimmed(),
                slot.layer,
                slot.offset,
                slot.offset + layout.bits_per_layer(),
                display_name(&sources[slot.source])
            ));
        }
    }
    report
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
