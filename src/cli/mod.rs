//! Command workflows used by the `devflow` binary
pub mod orchestration;
