use std::io;
use thiserror::Error;

/// Errors produced while parsing a `.dbc` file.
#[derive(Debug, Error)]
pub enum DbcParseError {
    #[error("Not a valid .dbc file: {path}")]
    InvalidExtension { path: String },
    #[error("Failed to open '{path}'. \nError: {source}")]
    OpenFile {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while reading '{path}'. \nError: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Errors produced while saving a [`DatabaseDBC`](crate::dbc::types::database::DatabaseDBC)
/// into a `.dbc` file.
#[derive(Debug, Error)]
pub enum DbcSaveError {
    #[error("Output path must end in .dbc: {path}")]
    InvalidExtension { path: String },
    #[error("Failed to create '{path}'. \nError: {source}")]
    CreateFile {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to create directories for '{path}'. \nError: {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while writing '{path}'. \nError: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to format DBC content")]
    Format,
}

/// Errors produced while extracting or inserting a raw signal value.
///
/// An out-of-range window is recoverable per data point: series extraction
/// skips the frame and continues with the rest of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error(
        "Signal window out of range: bit_start={bit_start}, bit_length={bit_length}, payload has {payload_bits} bits"
    )]
    OutOfRange {
        bit_start: u16,
        bit_length: u16,
        payload_bits: usize,
    },
}

/// Errors produced while inferring the documented physical range of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Signal bit length must be within 1..=64, got {bit_length}")]
    InvalidSignalWidth { bit_length: u16 },
}
