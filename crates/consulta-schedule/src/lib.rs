// SPDX-FileCopyrightText: 2026 Consulta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure availability computations for the Consulta booking engine.
//!
//! Nothing in this crate touches storage or the network. Callers read the
//! profiles and the ledger's occupied slots, then ask [`generator`] and
//! [`matcher`] what is bookable.

pub mod generator;
pub mod matcher;

pub use generator::{Slots, default_target_date, generate_slots};
pub use matcher::{Occupancy, find_alternatives, find_exact};
