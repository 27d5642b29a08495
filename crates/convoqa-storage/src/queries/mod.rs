// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules, one per warehouse area. Every statement binds its values
//! through positional parameters.

pub mod audit;
pub mod conversations;
pub mod dimensions;
pub mod messages;
pub mod snapshots;
pub mod tickets;
