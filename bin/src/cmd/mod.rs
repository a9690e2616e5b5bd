//! CLI subcommand modules.
//!
//! This module contains the implementations for all cima CLI subcommands.

pub(crate) mod changes;
pub(crate) mod history;
pub(crate) mod rank;
pub(crate) mod universes;
