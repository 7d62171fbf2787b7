//! Shared test fixtures for StreamForge crates.
//!
//! This crate provides plain domain types and their domain models.
//! It does NOT depend on `streamforge-scoring`, so the scoring crate can use
//! it as a dev-dependency.
//!
//! - [`scheduling`] - Meetings assigned to rooms with a capacity
//! - [`shifts`] - Shifts assigned to employees
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! streamforge-test = { workspace = true }
//! ```
//!
//! ```
//! use streamforge_test::scheduling::{scheduling_model, Meeting, Room};
//!
//! let model = scheduling_model();
//! assert_eq!(model.len(), 2);
//! let m = Meeting::new(1, Some('A'), 12);
//! assert_eq!(m.with_room(None).room, None);
//! # let _ = Room::new('A', 10);
//! ```

pub mod scheduling;
pub mod shifts;

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

pub use scheduling::{scheduling_model, Meeting, Room};
pub use shifts::{shift_model, Employee, Shift};

static TRACING: OnceLock<()> = OnceLock::new();

/// Installs a test-friendly `tracing` subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call has effect.
pub fn init_tracing() {
    TRACING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
