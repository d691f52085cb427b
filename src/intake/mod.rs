// SPDX-License-Identifier: MIT

pub mod analysis;
pub mod config;
pub mod error;
pub mod session;
pub mod survey;
