//! The transformation pipeline.
//!
//! An [`ImageProcessor`] is configured with an input (file, URL or bytes), an
//! output target (file or in-memory buffer), an output type and quality, and
//! an ordered queue of [`Operation`]s. [`ImageProcessor::execute`] then runs
//! the whole chain:
//!
//! ```text
//! read input ─┬─ tunnel? ── copy raw bytes ─────────────────────┐
//!             └─ decode ── op 1 ── op 2 ── … ── encode ─────────┴─ write output
//! ```
//!
//! ## Tunneling
//!
//! When the output type equals the input type, quality is 100 and the queue
//! is empty, nothing would change, so the input bytes are copied through
//! without touching the backend at all.
//!
//! ## Failure
//!
//! Decode and encode failures abort the run. The encoded result is produced
//! fully in memory and written through a `.part` sibling that is renamed into
//! place, so a failed run never leaves a partial output file.
//!
//! One processor handles one transformation at a time; it holds no locks and
//! is not meant to be shared across threads while executing.

use crate::imaging::{
    BackendError, Color, Dimensions, ImageBackend, Operation, RustBackend, apply_all,
};
use crate::source::{InputSource, SourceError, is_url};
use crate::types::{ImageType, Quality, UnsupportedFormat, split_name_extension};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("No input set: provide a file, URL or data")]
    InputMissing,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Fetch failed: {0}")]
    Fetch(String),
    #[error("Cannot decode input: {0}")]
    Decode(#[source] BackendError),
    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormat),
    #[error("Cannot encode output: {0}")]
    Encode(#[source] BackendError),
    #[error("Image processing failed: {0}")]
    Backend(#[from] BackendError),
}

impl From<SourceError> for ProcessError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Io(e) => Self::Io(e),
            SourceError::Fetch(msg) => Self::Fetch(msg),
        }
    }
}

/// Placeholder produced by [`ImageProcessor::create_default`].
const DEFAULT_NAME: &str = "default";
const DEFAULT_TYPE: ImageType = ImageType::Png;

/// Configurable image pipeline over an [`ImageBackend`].
pub struct ImageProcessor<B: ImageBackend = RustBackend> {
    backend: B,
    input: Option<InputSource>,
    /// Name and type derived from the input when it is set.
    name: String,
    input_type: ImageType,
    output_file: Option<PathBuf>,
    /// Explicit type from [`set_output_type`](Self::set_output_type).
    output_type: Option<ImageType>,
    quality: Quality,
    operations: Vec<Operation>,
    output_data: Option<Vec<u8>>,
    /// Set by [`create_default`](Self::create_default): output is the PNG placeholder.
    placeholder: bool,
}

impl ImageProcessor<RustBackend> {
    pub fn new() -> Self {
        Self::with_backend(RustBackend::new())
    }
}

impl Default for ImageProcessor<RustBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ImageBackend> ImageProcessor<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            input: None,
            name: String::new(),
            input_type: ImageType::Image,
            output_file: None,
            output_type: None,
            quality: Quality::default(),
            operations: Vec::new(),
            output_data: None,
            placeholder: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // --- configuration ---------------------------------------------------

    /// Use an existing file or an http(s) URL as input.
    ///
    /// Anything else is ignored and `false` returned; the previous input
    /// stays in place.
    pub fn set_input_file(&mut self, location: &str) -> bool {
        match InputSource::from_location(location) {
            Some(source) => {
                self.set_input(source);
                true
            }
            None => {
                log::warn!("ignoring input {location:?}: not a file or http(s) URL");
                false
            }
        }
    }

    /// Use an in-memory buffer as input. Empty buffers are ignored.
    pub fn set_input_data(&mut self, data: Vec<u8>) -> bool {
        if data.is_empty() {
            log::warn!("ignoring empty input data");
            return false;
        }
        self.set_input(InputSource::Bytes(data));
        true
    }

    fn set_input(&mut self, source: InputSource) {
        let (name, kind) = source.name_and_type();
        log::debug!("input {name:?} ({kind})");
        self.name = name;
        self.input_type = kind;
        self.input = Some(source);
        self.placeholder = false;
    }

    /// Write the result to `path` instead of keeping it in memory.
    ///
    /// A recognised extension on `path` also decides the output type.
    pub fn set_output_file(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return;
        }
        if is_url(&path.to_string_lossy()) {
            log::warn!("ignoring output {}: cannot write to a URL", path.display());
            return;
        }
        self.output_file = Some(path);
    }

    /// Keep the result in memory (the default).
    pub fn clear_output_file(&mut self) {
        self.output_file = None;
    }

    /// Set the output type by name (`gif`, `png`, `jpg`, `jpeg`, `jpe`).
    pub fn set_output_type(&mut self, name: &str) -> Result<(), UnsupportedFormat> {
        let kind: ImageType = name.parse()?;
        if kind.is_generic() {
            return Err(UnsupportedFormat(name.to_string()));
        }
        self.output_type = Some(kind);
        Ok(())
    }

    /// Set JPEG quality. Values above 100 are ignored.
    pub fn set_output_quality(&mut self, quality: u32) {
        if quality > Quality::MAX.value() {
            log::warn!("ignoring output quality {quality}: must be 0-100");
            return;
        }
        self.quality = Quality::new(quality);
    }

    /// Append an operation to the queue.
    pub fn push(&mut self, op: impl Into<Operation>) -> &mut Self {
        self.operations.push(op.into());
        self
    }

    pub fn extend(&mut self, ops: impl IntoIterator<Item = Operation>) -> &mut Self {
        self.operations.extend(ops);
        self
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Drop all queued operations, keeping input and output settings.
    pub fn clear_operations(&mut self) {
        self.operations.clear();
    }

    /// Back to a freshly constructed state. The backend is kept.
    pub fn reset(&mut self) {
        self.input = None;
        self.name.clear();
        self.input_type = ImageType::Image;
        self.output_file = None;
        self.output_type = None;
        self.quality = Quality::default();
        self.operations.clear();
        self.output_data = None;
        self.placeholder = false;
    }

    // --- execution -------------------------------------------------------

    /// Run the pipeline.
    pub fn execute(&mut self) -> Result<(), ProcessError> {
        self.output_data = None;
        self.placeholder = false;
        let input = self.input.as_ref().ok_or(ProcessError::InputMissing)?;
        let output_type = self.output_type();

        let encoded = if self.can_tunnel(output_type) {
            log::debug!("tunneling {} input unchanged", self.input_type);
            if let Some(path) = &self.output_file {
                write_output(path, |partial| Ok(input.copy_to(partial)?))?;
                return Ok(());
            }
            input.read()?.into_owned()
        } else {
            let bytes = input.read()?;
            let raster = self
                .backend
                .decode(&bytes, self.input_type)
                .map_err(ProcessError::Decode)?;
            let raster = apply_all(&self.backend, raster, &self.operations)?;
            log::debug!("encoding {output_type} at quality {}", self.quality.value());
            self.backend
                .encode(raster, output_type, self.quality)
                .map_err(ProcessError::Encode)?
        };

        self.deliver(encoded)
    }

    fn can_tunnel(&self, output_type: ImageType) -> bool {
        self.operations.is_empty() && self.quality.is_max() && output_type == self.input_type
    }

    fn deliver(&mut self, encoded: Vec<u8>) -> Result<(), ProcessError> {
        match &self.output_file {
            Some(path) => {
                write_output(path, |partial| Ok(std::fs::write(partial, &encoded)?))?;
            }
            None => self.output_data = Some(encoded),
        }
        Ok(())
    }

    /// Produce the placeholder image: a 1x1 fully transparent white PNG
    /// named `default.png`.
    ///
    /// Written to the output file if one is set, otherwise kept in memory.
    /// The queue and input are left alone.
    pub fn create_default(&mut self) -> Result<(), ProcessError> {
        self.output_data = None;
        let raster = self
            .backend
            .blank(Dimensions::new(1, 1), Color::WHITE, true)?;
        let encoded = self
            .backend
            .encode(raster, DEFAULT_TYPE, Quality::MAX)
            .map_err(ProcessError::Encode)?;

        if let Some(path) = &self.output_file {
            if ImageType::from_path(&path.to_string_lossy()) != DEFAULT_TYPE {
                log::warn!("placeholder is always PNG; {} keeps its name", path.display());
            }
            write_output(path, |partial| Ok(std::fs::write(partial, &encoded)?))?;
        } else {
            self.output_data = Some(encoded);
        }
        self.placeholder = true;
        Ok(())
    }

    // --- results ---------------------------------------------------------

    /// The type the output is (or will be) encoded as.
    ///
    /// Output file extension first, then an explicit type, then the input
    /// type; a generic type falls back to JPEG.
    pub fn output_type(&self) -> ImageType {
        if self.placeholder {
            return DEFAULT_TYPE;
        }
        let from_file = self
            .output_file
            .as_deref()
            .map(|p| ImageType::from_path(&p.to_string_lossy()))
            .filter(|t| !t.is_generic());
        from_file
            .or(self.output_type)
            .unwrap_or(self.input_type)
            .or_jpg()
    }

    /// MIME type of the output.
    pub fn output_mime(&self) -> &'static str {
        self.output_type().mime().unwrap_or("image/jpeg")
    }

    /// Output file name (or the input name when writing to memory) with the
    /// output type's extension. The placeholder is always `default.png`.
    pub fn output_name(&self) -> String {
        let name = if self.placeholder {
            DEFAULT_NAME.to_string()
        } else {
            self.output_file
                .as_deref()
                .map(|p| split_name_extension(&p.to_string_lossy()).0)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| self.name.clone())
        };
        match self.output_type().extension() {
            Some(ext) => format!("{name}.{ext}"),
            None => name,
        }
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.output_file.as_deref()
    }

    /// Encoded bytes of the last run when no output file is set.
    pub fn output_data(&self) -> Option<&[u8]> {
        self.output_data.as_deref()
    }

    pub fn take_output_data(&mut self) -> Option<Vec<u8>> {
        self.output_data.take()
    }

    pub fn output_len(&self) -> usize {
        self.output_data.as_ref().map_or(0, Vec::len)
    }
}

/// Write through a `.part` sibling and rename it into place.
fn write_output(
    path: &Path,
    fill: impl FnOnce(&Path) -> Result<(), ProcessError>,
) -> Result<(), ProcessError> {
    let mut partial_name = path.file_name().unwrap_or_default().to_os_string();
    partial_name.push(".part");
    let partial = path.with_file_name(partial_name);

    if let Err(e) = fill(&partial) {
        let _ = std::fs::remove_file(&partial);
        return Err(e);
    }
    std::fs::rename(&partial, path)?;
    log::debug!("wrote {}", path.display());
    Ok(())
}
