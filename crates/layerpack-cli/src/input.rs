//! Run input resolution.
//!
//! The input directory and bits-per-layer come either from two positional
//! arguments or, when none are given, from interactive prompts.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use thiserror::Error;

/// Usage text printed when the positional arguments are wrong.
pub const USAGE: &str = "\
To run non-interactively, pass two arguments:
  1) the path of the folder holding the images to pack
  2) the number of bits assigned to each layer (1-32, a power of two is recommended)

Run with no arguments to be prompted for both values.";

/// Errors in the user-provided run input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("expected 0 or 2 positional arguments, got {0}")]
    InvalidArgumentCount(usize),

    #[error("cannot convert bits per layer value ({0:?}) to a number")]
    NonNumericBitsPerLayer(String),

    #[error("could not open the directory {}", .path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("could not list the directory {}: {message}", .path.display())]
    Enumeration { path: PathBuf, message: String },

    #[error("could not find any supported image files in {}", .path.display())]
    NoSupportedImagesFound { path: PathBuf },

    #[error("failed to read interactive input: {0}")]
    Prompt(#[from] std::io::Error),
}

/// Directory and raw bits-per-layer value for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInput {
    pub directory: PathBuf,
    /// Parsed but not yet clamped.
    pub bits_per_layer: i64,
}

/// Parse a bits-per-layer value.
///
/// Surrounding whitespace is ignored; anything else that is not an integer is
/// rejected.
pub fn parse_bits_per_layer(raw: &str) -> Result<i64, InputError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| InputError::NonNumericBitsPerLayer(raw.trim().to_string()))
}

/// Resolve the run input from positional arguments, prompting when both are absent.
pub fn resolve<R: BufRead, W: Write>(
    directory: Option<String>,
    bits_per_layer: Option<String>,
    input: &mut R,
    output: &mut W,
) -> Result<RunInput, InputError> {
    match (directory, bits_per_layer) {
        (Some(directory), Some(bits)) => Ok(RunInput {
            directory: PathBuf::from(directory),
            bits_per_layer: parse_bits_per_layer(&bits)?,
        }),
        (None, None) => prompt(input, output),
        (Some(_), None) | (None, Some(_)) => Err(InputError::InvalidArgumentCount(1)),
    }
}

/// Ask for the directory and bits-per-layer on `output`, reading answers from `input`.
pub fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<RunInput, InputError> {
    writeln!(
        output,
        "Type the name of the folder with the images to pack (every supported image in it is used):"
    )?;
    output.flush()?;
    let directory = read_answer(input)?;

    writeln!(
        output,
        "Type how many bits to assign to each layer (1-32, a power of two is recommended):"
    )?;
    output.flush()?;
    let bits = read_answer(input)?;

    Ok(RunInput {
        directory: PathBuf::from(directory),
        bits_per_layer: parse_bits_per_layer(&bits)?,
    })
}

fn read_answer<R: BufRead>(input: &mut R) -> Result<String, InputError> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
