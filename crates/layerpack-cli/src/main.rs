//! Layerpack CLI - packs the alpha channels of an image sequence into RGBA32 images
//!
//! Run with a directory and a bits-per-layer value, or with no arguments to be
//! prompted for both.

use clap::Parser;
use colored::Colorize;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use layerpack_cli::commands::pack::{self, PackArgs};
use layerpack_cli::input::{self, InputError, USAGE};

/// Layerpack - packs image sequence alpha channels into bit-fields of RGBA32 images
#[derive(Parser, Debug)]
#[command(name = "layerpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Folder holding the images to pack (prompted for when omitted)
    directory: Option<String>,

    /// Bits assigned to each layer, 1-32 (prompted for when omitted)
    #[arg(allow_negative_numbers = true)]
    bits_per_layer: Option<String>,

    /// Directory receiving output_N.png files
    #[arg(short, long, default_value = "Output")]
    output_dir: PathBuf,

    /// Build output images concurrently
    #[arg(long)]
    parallel: bool,

    /// Re-read every written output and check it bit for bit
    #[arg(long)]
    verify: bool,

    /// Write manifest.json describing the layer layout next to the outputs
    #[arg(long)]
    manifest: bool,

    /// Print every layer as it is packed
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let stdin = io::stdin();
    let resolved = input::resolve(
        cli.directory,
        cli.bits_per_layer,
        &mut stdin.lock(),
        &mut io::stdout(),
    );

    let run_input = match resolved {
        Ok(run_input) => run_input,
        Err(err @ InputError::InvalidArgumentCount(_)) => {
            eprintln!("{}\n", USAGE);
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    pack::run(&PackArgs {
        directory: run_input.directory,
        bits_per_layer: run_input.bits_per_layer,
        output_dir: cli.output_dir,
        parallel: cli.parallel,
        verify: cli.verify,
        manifest: cli.manifest,
        verbose: cli.verbose,
        quiet: cli.quiet,
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red(), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_no_arguments() {
        let cli = Cli::try_parse_from(["layerpack"]).unwrap();
        assert!(cli.directory.is_none());
        assert!(cli.bits_per_layer.is_none());
        assert_eq!(cli.output_dir, PathBuf::from("Output"));
        assert!(!cli.parallel && !cli.verify && !cli.manifest);
    }

    #[test]
    fn test_cli_parses_positionals() {
        let cli = Cli::try_parse_from(["layerpack", "frames", "8"]).unwrap();
        assert_eq!(cli.directory.as_deref(), Some("frames"));
        assert_eq!(cli.bits_per_layer.as_deref(), Some("8"));
    }

    #[test]
    fn test_cli_keeps_non_numeric_bits_for_reporting() {
        let cli = Cli::try_parse_from(["layerpack", "frames", "many"]).unwrap();
        assert_eq!(cli.bits_per_layer.as_deref(), Some("many"));
    }

    #[test]
    fn test_cli_accepts_negative_bits() {
        let cli = Cli::try_parse_from(["layerpack", "frames", "-4"]).unwrap();
        assert_eq!(cli.bits_per_layer.as_deref(), Some("-4"));
    }

    #[test]
    fn test_cli_rejects_extra_positionals() {
        assert!(Cli::try_parse_from(["layerpack", "frames", "8", "extra"]).is_err());
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "layerpack",
            "frames",
            "2",
            "--output-dir",
            "packed",
            "--parallel",
            "--verify",
            "--manifest",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.output_dir, PathBuf::from("packed"));
        assert!(cli.parallel && cli.verify && cli.manifest && cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_cli_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["layerpack", "frames", "2", "-v", "-q"]).is_err());
    }
}
