pub mod cli;
pub mod config;
pub mod distribution;
pub mod domain;
pub mod error;
pub mod git;
pub mod notice;
pub mod template;
pub mod ui;
pub mod versioning;

pub use error::{DevflowError, Result};
pub use notice::Notice;
