//! # imgpipe
//!
//! An image geometry and transformation engine. An image is read from a
//! file, an http(s) URL or memory, run through an ordered queue of
//! operations, and encoded as GIF, PNG or JPEG.
//!
//! # Architecture
//!
//! ```text
//! InputSource ─▶ decode ─▶ Operation 1 ─▶ … ─▶ Operation n ─▶ encode ─▶ file | bytes
//!       └──────────────── tunnel (nothing to do) ──────────────────────┘
//! ```
//!
//! The canvas is a single owned raster threaded through the queue: every
//! operation either edits it in place or consumes it and returns its
//! replacement, so exactly one raster is alive between steps.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`processor`] | [`ImageProcessor`](processor::ImageProcessor): configuration, queue, `execute`, tunneling, output metadata |
//! | [`imaging`] | Coordinate calculator, operation types, backend trait and the pure-Rust backend |
//! | [`source`] | Input sources (file, URL, bytes), naming and remote fetch |
//! | [`config`] | TOML recipes: output settings plus operations, merged over stock defaults |
//! | [`types`] | `ImageType`, `Quality` and filename helpers shared by all layers |
//!
//! # Design Decisions
//!
//! ## Typed Operations
//!
//! Operations are a closed enum ([`imaging::Operation`]) dispatched with an
//! exhaustive `match`. A recipe with a misspelt key or unknown `kind` fails to
//! load instead of being silently ignored at run time.
//!
//! ## Backend Trait
//!
//! All pixel work goes through [`imaging::ImageBackend`]. The geometry is pure
//! and unit tested on its own; the pipeline is tested against a recording
//! mock that counts decode and encode calls.
//!
//! ## Best-Effort Overlays
//!
//! A watermark whose file is missing, or a canvas too small to carry it,
//! skips that one operation and logs a warning. Decode and encode failures
//! abort the whole run and leave no output file behind.

pub mod config;
pub mod imaging;
pub mod processor;
pub mod source;
pub mod types;
