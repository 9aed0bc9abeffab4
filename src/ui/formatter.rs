//! Pure formatting functions for UI output.
//!
//! Everything here prints; nothing reads input.

use console::style;

use crate::domain::BranchClassification;
use crate::notice::Notice;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a notice as a warning on stderr.
pub fn display_notice(notice: &Notice) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), notice);
}

/// Display the proposed base version change.
pub fn display_proposed_version(old: &str, new: &str) {
    println!("\n{}", style("Proposed Version Change:").bold());
    println!("  From: {}", style(old).red());
    println!("  To:   {}", style(new).green());
}

/// Display how a branch name was classified.
///
/// Shows the normalized name, the branch type with its build modes and the
/// embedded version, if any.
pub fn display_classification(classification: &BranchClassification) {
    let descriptor = classification.descriptor();
    println!("{}", style(&classification.name).bold());
    if classification.normalized != classification.name {
        println!("  upstream:  {}", classification.normalized);
    }
    println!("  type:      {}", style(classification.branch_type).cyan());
    println!(
        "  builds:    {}",
        match (descriptor.builds_snapshot, descriptor.builds_release) {
            (true, true) => "snapshot, release",
            (true, false) => "snapshot",
            (false, true) => "release",
            (false, false) => "nothing",
        }
    );
    if let Some(version) = &classification.embedded_version {
        println!("  version:   {}", version);
    }
    println!("  debian:    {}", descriptor.debian_branch);
}
