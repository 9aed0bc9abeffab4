use std::fmt;

/// A debian packaging tag: `debian/<stem>-<revision><codename>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebianTag {
    pub stem: String,
    pub revision: u32,
    pub codename: String,
}

impl DebianTag {
    /// Create a tag for a debian version stem (no `~` characters)
    pub fn new(stem: impl Into<String>, revision: u32, codename: impl Into<String>) -> Self {
        DebianTag {
            stem: stem.into(),
            revision,
            codename: codename.into(),
        }
    }

    /// The same tag with the next revision number
    pub fn next_revision(&self) -> Self {
        DebianTag {
            stem: self.stem.clone(),
            revision: self.revision + 1,
            codename: self.codename.clone(),
        }
    }

    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DebianTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "debian/{}-{}{}", self.stem, self.revision, self.codename)
    }
}
