//! Observability utilities for toolflow hosts.

#![warn(missing_docs, clippy::pedantic)]

pub mod tracing_support {
    //! Structured tracing helpers.

    use tracing_subscriber::EnvFilter;

    /// Installs a global fmt subscriber writing to stderr.
    ///
    /// `RUST_LOG` wins when set; otherwise `default_filter` is used, and an
    /// unparsable filter falls back to `info`. Returns `false` when a global
    /// subscriber was already installed.
    pub fn init(default_filter: &str) -> bool {
        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter(default_filter))
            .with_writer(std::io::stderr)
            .with_target(true)
            .try_init()
            .is_ok();
        if installed {
            tracing::debug!(filter = default_filter, "tracing initialised");
        }
        installed
    }

    fn filter(default_filter: &str) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_filter))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }

}
