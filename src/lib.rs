//! Sterben library exports for testing

pub mod core;
pub mod features;
pub mod tui;

#[cfg(test)]
pub mod test_support;
