use log::debug;
use std::process::Command;

/// Run a command and return its stdout when it succeeds
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        debug!("'{}' exited with {}", program, output.status);
        return None;
    }
    String::from_utf8(output.stdout).ok()
}

/// Extract the codename from `lsb_release -c` output (`Codename:\tbionic`)
pub fn parse_lsb_release(output: &str) -> Option<String> {
    let (_, codename) = output.split_once(|c: char| c == '\t' || c == ':')?;
    let codename = codename.trim_start_matches(':').trim();
    if codename.is_empty() {
        None
    } else {
        Some(codename.to_lowercase())
    }
}

/// Distribution codename used in debian versions and branch names.
///
/// A configured value wins. Otherwise the lower-cased kernel name is used,
/// refined through `lsb_release` on Linux.
pub fn distribution_codename(configured: Option<&str>) -> String {
    if let Some(codename) = configured {
        return codename.to_string();
    }

    let kernel = command_output("uname", &[])
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| std::env::consts::OS.to_string());

    if kernel == "linux" {
        if let Some(codename) = command_output("lsb_release", &["-c"])
            .as_deref()
            .and_then(parse_lsb_release)
        {
            return codename;
        }
        debug!("lsb_release unavailable, using kernel name as codename");
    }

    kernel
}
