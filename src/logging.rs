//! Tracing setup.
//!
//! The CLI logs to stderr and honours `RUST_LOG`. The browser bundle sends
//! each formatted event to the developer console.

#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter directive for a `-v` count
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "tailor_site=warn",
        1 => "tailor_site=info",
        2 => "tailor_site=debug",
        _ => "tailor_site=trace",
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn init_cli(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    // A second init (tests, embedding) keeps the first subscriber
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(target_arch = "wasm32")]
pub use console::init_browser;

#[cfg(target_arch = "wasm32")]
mod console {
    use std::io;

    use tracing_subscriber::{fmt, EnvFilter};

    /// Collects one formatted event and logs it when dropped
    #[derive(Default)]
    struct ConsoleWriter {
        buf: Vec<u8>,
    }

    impl io::Write for ConsoleWriter {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for ConsoleWriter {
        fn drop(&mut self) {
            let line = String::from_utf8_lossy(&self.buf);
            let line = line.trim_end();
            if !line.is_empty() {
                web_sys::console::log_1(&line.into());
            }
        }
    }

    pub fn init_browser(directive: &str) {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(directive))
            .with_ansi(false)
            .without_time()
            .with_writer(ConsoleWriter::default)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(default_directive(0), "tailor_site=warn");
        assert_eq!(default_directive(2), "tailor_site=debug");
        assert_eq!(default_directive(9), "tailor_site=trace");
    }
}
