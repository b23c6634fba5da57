//! The read → fill → write pipeline, over buffers or files.

use crate::format::{c_array, keys, mct, mfd};
use crate::sector::Dump;
use crate::{Error, Result};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, trace_span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    /// Raw binary image.
    Mfd,
    /// MIFARE Classic Tool text.
    Mct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Raw binary image.
    Mfd,
    /// MIFARE Classic Tool text.
    Mct,
    /// C source array.
    C,
    /// Key list.
    Keys,
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mfd => write!(f, "mfd"),
            Self::Mct => write!(f, "mct"),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mfd => write!(f, "mfd"),
            Self::Mct => write!(f, "mct"),
            Self::C => write!(f, "c"),
            Self::Keys => write!(f, "keys"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Fail on missing data instead of filling it with zeroes.
    pub strict: bool,
    /// Accept MFD images larger than 1024 bytes.
    pub fuzzy: bool,
}

pub fn read(format: InputFormat, raw: &[u8], fuzzy: bool) -> Result<Dump> {
    match format {
        InputFormat::Mfd => mfd::read(raw, fuzzy),
        InputFormat::Mct => mct::read(raw),
    }
}

pub fn write(format: OutputFormat, dump: &Dump, strict: bool) -> Result<Vec<u8>> {
    Ok(match format {
        OutputFormat::Mfd => mfd::write(dump, strict)?,
        OutputFormat::Mct => mct::write(dump).into_bytes(),
        OutputFormat::C => c_array::write(dump, strict)?.into_bytes(),
        OutputFormat::Keys => keys::write(dump).into_bytes(),
    })
}

pub fn convert_bytes(
    from: InputFormat,
    to: OutputFormat,
    raw: &[u8],
    opts: Options,
) -> Result<Vec<u8>> {
    let span = trace_span!("convert", %from, %to);
    let _enter = span.enter();

    let dump = read(from, raw, opts.fuzzy)?;
    write(to, &dump, opts.strict)
}

/// Converts a file. The output is rendered in full before anything is
/// written, so a failed conversion never leaves a partial output file behind.
pub fn convert(
    from: InputFormat,
    to: OutputFormat,
    input: &Path,
    output: &Path,
    opts: Options,
) -> Result<()> {
    debug!(input = %input.display(), "Reading dump");
    let raw = std::fs::read(input).map_err(|source| Error::Io {
        path: input.into(),
        source,
    })?;
    let out = convert_bytes(from, to, &raw, opts)?;
    std::fs::write(output, &out).map_err(|source| Error::Io {
        path: output.into(),
        source,
    })?;
    info!(
        output = %output.display(),
        len = out.len(),
        "Converted {} to {}",
        from,
        to
    );
    Ok(())
}
