// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
// Graphics/wire-format allowances - casts between float and byte widths are
// intentional, and float literals are compared exactly against wire values.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::suboptimal_flops)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]

//! Binary transcoding of packed CAD primitive sectors into
//! GPU-instancing-ready buffers.
//!
//! An offline converter packs CAD models into sectors of fixed-layout,
//! little-endian primitive records (boxes, cones, cylinders, rings, ...).
//! This crate decodes those records, reconstructs the derived geometry
//! (cap centers, rotation frames, cap planes, trapezium walls), and writes
//! fixed-stride instance records into destination buffers laid out for a
//! consumer-defined GPU attribute scheme.
//!
//! # Key entry points
//!
//! - [`estimate::SectorLengths`] - exact output-buffer sizing from input
//!   byte lengths
//! - [`transcode`] - one transcoder per input primitive variant, plus
//!   [`transcode::transcode_sector`] to drive a whole sector at once
//! - [`layout::AttributeLayout`] - the runtime name-to-offset map that
//!   decouples transcoders from the GPU attribute layout
//! - [`rtree::RTree`] - incremental bounding-volume index over sector
//!   bounds
//! - [`styling::StyleTextureBuilder`] - per-object style/transform texel
//!   encoding with incremental-diff updates
//!
//! # Architecture
//!
//! All operations are synchronous, deterministic, pure-data-in /
//! pure-data-out transforms with no hidden state; they are safe to invoke
//! from background workers and parallelize trivially across independent
//! input buffers. Failures (wrong buffer length, missing attribute,
//! undersized destination) are caller bugs and surface immediately as
//! [`error::CadreError`] - nothing is retried or silently truncated.

pub mod bounds;
pub mod error;
pub mod estimate;
pub mod layout;
pub mod math;
pub mod output;
pub mod rtree;
pub mod styling;
pub mod transcode;
pub(crate) mod wire;

pub use error::CadreError;
