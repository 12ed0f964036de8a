//! Errors raised while loading a grid structure or a word list, or saving a rendered grid.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while reading a structure or dictionary file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error while encoding or writing a rendered image.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// A structure cell that is neither open (`_` or `.`) nor blocked (`#` or a space).
    #[error("invalid cell {cell:?} at row {row}, column {column}")]
    InvalidCell { row: usize, column: usize, cell: char },

    /// The structure has no rows at all.
    #[error("grid structure is empty")]
    EmptyStructure,
}

pub type Result<T> = std::result::Result<T, Error>;
