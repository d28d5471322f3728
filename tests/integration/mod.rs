//! Integration tests for hpxconf

mod cli_commands;
mod concurrent_resolution;
mod dlwp_samples;
mod interpolation_errors;
mod test_utils;
