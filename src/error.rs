//! Crate-level error types.

use std::fmt;

/// Errors produced by the cadre crate.
///
/// Every variant reports a caller-side contract violation (bad buffer size,
/// incomplete attribute layout, undersized destination). The transcoding
/// pipeline itself is deterministic and has no runtime failure modes, so
/// nothing is retried - errors surface immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CadreError {
    /// Input buffer length is not a multiple of the variant's record size.
    /// Raised before any record is decoded.
    InvalidBufferLength {
        /// Input primitive variant being decoded.
        variant: &'static str,
        /// Offending buffer length in bytes.
        length: usize,
        /// Fixed record size of the variant in bytes.
        stride: usize,
    },
    /// An attribute layout lacks an attribute the output kind requires.
    MissingAttribute {
        /// Output kind whose layout was being resolved.
        kind: &'static str,
        /// Name of the absent attribute.
        attribute: String,
    },
    /// A destination buffer is too small for the records written into it.
    OutputOverflow {
        /// Output kind being written when the destination ran out.
        kind: &'static str,
    },
    /// The default appearance given to a style texture builder carries a
    /// world transform, which the default texel cannot encode.
    DefaultStyleTransform,
}

impl fmt::Display for CadreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBufferLength {
                variant,
                length,
                stride,
            } => {
                write!(
                    f,
                    "invalid {variant} buffer length: {length} bytes is not \
                     a multiple of the {stride}-byte record size"
                )
            }
            Self::MissingAttribute { kind, attribute } => {
                write!(
                    f,
                    "{kind} attribute layout is missing '{attribute}'"
                )
            }
            Self::OutputOverflow { kind } => {
                write!(f, "{kind} output buffer is too small")
            }
            Self::DefaultStyleTransform => {
                write!(
                    f,
                    "configuration error: a default style must not carry a \
                     world transform"
                )
            }
        }
    }
}

impl std::error::Error for CadreError {}
