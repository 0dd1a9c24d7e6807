#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory implementations of the dispatch persistence traits.
//!
//! [`MemoryIncidentStore`] implements
//! [`IncidentStore`](emergency_dispatch::IncidentStore) and
//! [`ResponderRegistry`] implements
//! [`ResponderSnapshotProvider`](emergency_dispatch::ResponderSnapshotProvider).
//! Both keep their records behind a `tokio` `RwLock` and hand out
//! monotonically increasing IDs starting at 1.

pub mod incidents;
pub mod responders;

pub use incidents::MemoryIncidentStore;
pub use responders::ResponderRegistry;
