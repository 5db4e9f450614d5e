//! Logging setup for binaries and tests built on kiln.
//!
//! Generated code and the compiler crates log through the `log` facade; this
//! module installs a backend for it. Exactly one of the `tracing_log` (default)
//! and `env_logger` features may be enabled.

#[cfg(feature = "env_logger")]
pub use self::env_logger::*;
pub use log::*;

#[cfg(not(any(feature = "env_logger", feature = "tracing_log")))]
pub use self::none::*;
#[cfg(feature = "tracing_log")]
pub use self::tracing_log::*;

#[cfg(all(feature = "env_logger", feature = "tracing_log"))]
compile_error!("feature \"env_logger\" and feature \"tracing_log\" cannot be enabled at the same time");

#[cfg(feature = "env_logger")]
mod env_logger {
    use ::env_logger::{builder, Env};

    pub struct LogOptions<'a> {
        env: Env<'a>,
    }

    impl Default for LogOptions<'_> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<'a> LogOptions<'a> {
        pub fn new() -> Self {
            Self {
                env: Env::default().default_filter_or("info"),
            }
        }

        pub fn debug(mut self, debug: bool) -> Self {
            if debug {
                self.env = Env::default().default_filter_or("debug");
            }
            self
        }

        pub fn init(self) -> crate::Result<()> {
            builder()
                .parse_env(self.env)
                .try_init()
                .map_err(anyhow::Error::new)?;
            Ok(())
        }
    }
}

#[cfg(feature = "tracing_log")]
mod tracing_log {
    use tracing_subscriber::{filter::Directive, filter::LevelFilter, EnvFilter};

    use crate::Result;

    pub struct LogOptions {
        default_directive: Directive,
    }

    impl Default for LogOptions {
        fn default() -> Self {
            Self::new()
        }
    }

    impl LogOptions {
        pub fn new() -> Self {
            Self {
                default_directive: LevelFilter::INFO.into(),
            }
        }

        pub fn debug(mut self, debug: bool) -> Self {
            if debug {
                self.default_directive = LevelFilter::DEBUG.into();
            }
            self
        }

        /// Installs a `tracing` subscriber that also receives `log` records.
        pub fn init(self) -> Result<()> {
            let filter = EnvFilter::builder()
                .with_default_directive(self.default_directive)
                .from_env_lossy();

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .try_init()
                .map_err(|err| anyhow::anyhow!(err))?;

            tracing::debug!("kiln logging initialized");
            Ok(())
        }
    }

}

#[cfg(not(any(feature = "env_logger", feature = "tracing_log")))]
mod none {
    #[derive(Default)]
    pub struct LogOptions;

    impl LogOptions {
        pub fn new() -> Self {
            Self
        }

        pub fn debug(self, _: bool) -> Self {
            self
        }

        pub fn init(self) -> crate::Result<()> {
            Ok(())
        }
    }
}
