//! Shared test harness modules for the stopdelta CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod delta_steps;
mod helpers;
mod transfers_steps;
