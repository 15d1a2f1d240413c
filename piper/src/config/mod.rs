//! Process-wide engine defaults with sensible values.
//!
//! An [`EngineConfig`] is an explicit value passed at pipeline
//! construction; there are no implicit globals. The sole environment
//! input is [`DEBUG_ENV_VAR`] (`PIPER_DEBUG`), read once at `init`, which
//! overrides every segment's resolved debug level when set to a non-zero
//! integer.

// Layer 1: Standard library imports
use std::env;
use std::fmt;
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::logger::{PipeLogger, TracingPipeLogger};
use crate::queue::{QueueBehavior, SimpleQueue};
use crate::segment::BuildError;

/// Default batch size when neither a segment nor an ancestor sets one
pub const DEFAULT_BATCH_SIZE: usize = 200;

/// Default debug level (silent)
pub const DEFAULT_DEBUG: u32 = 0;

/// Default verbosity level (silent)
pub const DEFAULT_VERBOSE: u32 = 0;

/// Segments are enabled unless something says otherwise
pub const DEFAULT_ENABLED: bool = true;

/// Environment variable overriding the resolved debug level globally
pub const DEBUG_ENV_VAR: &str = "PIPER_DEBUG";

/// Factory producing one fresh FIFO per leaf segment (plus the root
/// output queue).
pub type QueueFactory<T> = Box<dyn Fn() -> Box<dyn QueueBehavior<T>>>;

/// Process-wide defaults for a pipeline.
///
/// Carries the fallback batch size, the logger implementation, and the
/// queue factory. Built with [`EngineConfig::builder`] in the usual
/// fluent style; `Default` wires in [`TracingPipeLogger`] and
/// [`SimpleQueue`].
///
/// # Examples
///
/// ```rust
/// use piper::config::{EngineConfig, DEFAULT_BATCH_SIZE};
///
/// let config = EngineConfig::<u32>::default();
/// assert_eq!(config.batch_size(), DEFAULT_BATCH_SIZE);
///
/// let config = EngineConfig::<u32>::builder()
///     .with_batch_size(50)
///     .build()
///     .unwrap();
/// assert_eq!(config.batch_size(), 50);
/// ```
pub struct EngineConfig<T> {
    batch_size: usize,
    logger: Arc<dyn PipeLogger>,
    queue_factory: QueueFactory<T>,
}

impl<T: fmt::Debug + 'static> Default for EngineConfig<T> {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            logger: Arc::new(TracingPipeLogger::new()),
            queue_factory: Box::new(|| Box::new(SimpleQueue::new())),
        }
    }
}

impl<T: fmt::Debug + 'static> EngineConfig<T> {
    /// Create a new configuration builder.
    pub fn builder() -> EngineConfigBuilder<T> {
        EngineConfigBuilder::default()
    }

    /// Fallback batch size for segments that neither set nor inherit one.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// The configured logger.
    pub fn logger(&self) -> &Arc<dyn PipeLogger> {
        &self.logger
    }

    /// Produce a fresh FIFO from the configured factory.
    pub(crate) fn make_queue(&self) -> Box<dyn QueueBehavior<T>> {
        (self.queue_factory)()
    }

    /// Validate configuration values.
    ///
    /// Returns `Err` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.batch_size == 0 {
            return Err(BuildError::InvalidConfig(
                "batch_size must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl<T> fmt::Debug for EngineConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("batch_size", &self.batch_size)
            .field("logger", &self.logger)
            .finish_non_exhaustive()
    }
}

/// Builder for [`EngineConfig`] with a fluent API.
#[derive(Debug)]
pub struct EngineConfigBuilder<T> {
    config: EngineConfig<T>,
}

impl<T: fmt::Debug + 'static> Default for EngineConfigBuilder<T> {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }
}

impl<T: fmt::Debug + 'static> EngineConfigBuilder<T> {
    /// Set the fallback batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Install a logger implementation.
    pub fn with_logger(mut self, logger: Arc<dyn PipeLogger>) -> Self {
        self.config.logger = logger;
        self
    }

    /// Install a queue factory.
    pub fn with_queue_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Box<dyn QueueBehavior<T>> + 'static,
    {
        self.config.queue_factory = Box::new(factory);
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidConfig`] if a value is out of range.
    pub fn build(self) -> Result<EngineConfig<T>, BuildError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Parse a raw `PIPER_DEBUG` value; only non-zero integers count.
pub(crate) fn parse_debug_env(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|level| *level != 0)
}

/// Read the global debug override from the environment.
pub(crate) fn debug_env_override() -> Option<u32> {
    parse_debug_env(env::var(DEBUG_ENV_VAR).ok().as_deref())
}
