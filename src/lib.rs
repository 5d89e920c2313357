//! ZVD HEVC core - transform and interpolation primitives in Rust
//!
//! The residual and motion-compensation core of an H.265/HEVC encoder:
//! integer DCT/DST transforms, fractional-sample interpolation filters,
//! signed residual buffers addressed by coding-tree partition, and the
//! dispatch table that selects kernel implementations at start-up.
//!
//! # Architecture
//!
//! - `codec::h265`: the kernels, buffers and tables
//! - `error`: the crate error type
//!
//! A process calls [`init`] once with a [`Config`] and gets back a [`Core`],
//! which hands out buffers and transform / prediction drivers that share the
//! same geometry tables and kernel table.

pub mod codec;
pub mod error;

use std::sync::Arc;

use tracing::debug;

use codec::h265::{
    primitives, GeometryTables, Interpolator, Primitives, ShortYuv, Transform, Yuv,
    MIN_PARTITION_SIZE,
};

pub use error::{Error, Result};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const VERSION_MAJOR: u32 = 0;
pub const VERSION_MINOR: u32 = 1;
pub const VERSION_PATCH: u32 = 0;

/// Configuration for the HEVC core
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of threads to use for parallel processing
    pub max_threads: Option<usize>,
    /// Enable verbose logging
    pub verbose: bool,
    /// Enable debug output
    pub debug: bool,
    /// Sample bit depth (8, 10 or 12)
    pub bit_depth: u8,
    /// Largest coding unit edge in luma samples
    pub max_cu_size: u32,
    /// Number of quadtree splits below the largest coding unit
    pub max_cu_depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_threads: None,
            verbose: false,
            debug: false,
            bit_depth: 8,
            max_cu_size: 64,
            max_cu_depth: 4,
        }
    }
}

impl Config {
    /// Check the configuration before anything is allocated
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.bit_depth, 8 | 10 | 12) {
            return Err(Error::config(format!(
                "bit depth must be 8, 10 or 12, got {}",
                self.bit_depth
            )));
        }
        if !self.max_cu_size.is_power_of_two() || !(16..=64).contains(&self.max_cu_size) {
            return Err(Error::config(format!(
                "max CU size must be 16, 32 or 64, got {}",
                self.max_cu_size
            )));
        }
        if !(1..=4).contains(&self.max_cu_depth)
            || (self.max_cu_size >> self.max_cu_depth) < MIN_PARTITION_SIZE
        {
            return Err(Error::config(format!(
                "max CU depth {} is invalid for a {}x{} coding unit",
                self.max_cu_depth, self.max_cu_size, self.max_cu_size
            )));
        }
        if self.max_threads == Some(0) {
            return Err(Error::config("max_threads must be at least 1"));
        }
        Ok(())
    }
}

/// Initialize the HEVC core with the given configuration
pub fn init(config: &Config) -> Result<Core> {
    config.validate()?;

    // Initialize thread pool if max_threads is specified
    if let Some(threads) = config.max_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| Error::Init(format!("Failed to initialize thread pool: {}", e)))?;
    }

    // Initialize logging
    if config.verbose || config.debug {
        let level = if config.debug { "debug" } else { "info" };
        if let Err(e) = tracing_subscriber::fmt().with_env_filter(level).try_init() {
            debug!("logging already initialized: {}", e);
        }
    }

    let geometry = Arc::new(GeometryTables::new(
        config.max_cu_size,
        config.max_cu_depth,
    )?);

    Ok(Core {
        config: config.clone(),
        geometry,
        primitives: primitives::primitives(),
    })
}

/// Shared state for all coding-unit contexts of one encoder
#[derive(Debug, Clone)]
pub struct Core {
    config: Config,
    geometry: Arc<GeometryTables>,
    primitives: &'static Primitives,
}

impl Core {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn geometry(&self) -> &Arc<GeometryTables> {
        &self.geometry
    }

    pub fn primitives(&self) -> &'static Primitives {
        self.primitives
    }

    /// Residual buffer covering the largest coding unit
    pub fn create_residual_buffer(&self) -> Result<ShortYuv> {
        let size = self.config.max_cu_size as usize;
        ShortYuv::with_size(size, size, self.geometry.clone())
    }

    /// Picture-domain buffer covering the largest coding unit
    pub fn create_picture_buffer(&self) -> Result<Yuv> {
        let size = self.config.max_cu_size as usize;
        Yuv::create(size, size, self.geometry.clone())
    }

    pub fn transform(&self) -> Result<Transform> {
        Transform::with_primitives(self.config.bit_depth, self.primitives)
    }

    pub fn interpolator(&self) -> Result<Interpolator> {
        Interpolator::with_primitives(self.config.bit_depth, self.primitives)
    }
}
