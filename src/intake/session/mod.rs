// SPDX-License-Identifier: MIT

//! Keyed storage of in-flight runs

pub mod store;

pub use store::{MemoryRunStore, RunId, RunStore};
