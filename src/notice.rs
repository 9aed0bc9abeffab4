use std::fmt;
use std::path::PathBuf;

/// Non-fatal conditions met while computing or writing versions.
/// These should be reported to the user but never abort a command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Notice {
    /// No configuration file was found, defaults are in use
    NoConfigFile,
    /// A configured package has no version file to generate
    PackageWithoutVersionFile { package: String },
    /// Earlier debian revisions of this version are already tagged
    DebianRevisionTaken { version: String, revision: u32 },
    /// A debian branch was created for the current upstream branch
    DebianBranchCreated { branch: String, from: String },
    /// A version file was written
    VersionFileWritten { path: PathBuf },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoConfigFile => {
                write!(f, "No devflow.toml found, using default configuration")
            }
            Notice::PackageWithoutVersionFile { package } => {
                write!(f, "Package '{}' has no version file, skipping", package)
            }
            Notice::DebianRevisionTaken { version, revision } => {
                write!(
                    f,
                    "Version '{}' is already packaged, using debian revision {}",
                    version, revision
                )
            }
            Notice::DebianBranchCreated { branch, from } => {
                write!(f, "Created branch '{}' from '{}'", branch, from)
            }
            Notice::VersionFileWritten { path } => {
                write!(f, "Updated version file '{}'", path.display())
            }
        }
    }
}
