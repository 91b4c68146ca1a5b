//! # Task-Cluster Test Suite
//!
//! ```text
//! tests/src/
//! └── integration/      # Cross-subsystem flows over a wired master container
//!     ├── node_lifecycle.rs
//!     ├── message_routing.rs
//!     ├── delegate.rs
//!     └── telemetry.rs
//! tests/benches/
//! └── cluster_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tc-tests
//! cargo test -p tc-tests integration::delegate
//! cargo bench -p tc-tests
//! ```

pub mod integration;
