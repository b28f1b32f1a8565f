// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node registries for specific graph kinds.

pub mod geometry;
