//! Shared test harness modules for the HOS CLI.

use super::*;

mod helpers;
mod plan_steps;
mod records_unit;
