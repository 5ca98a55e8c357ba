//! # Access-Chain Test Suite
//!
//! Unified test crate containing cross-module integration flows.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs      # End-to-end signed meta-transaction flows
//!     └── atomicity.rs  # All-or-nothing batch application
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ac-tests
//!
//! # By category
//! cargo test -p ac-tests integration::flows
//! cargo test -p ac-tests integration::atomicity
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]


/// Opt-in log capture while debugging flows:
/// `RUST_LOG=ac_engine=debug cargo test -p ac-tests -- --nocapture`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
