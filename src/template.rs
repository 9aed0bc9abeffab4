//! Rendering of version files.
//!
//! Templates refer to values as `{DEVFLOW_VERSION}` and so on; unknown
//! placeholders are left untouched.

use crate::domain::VcsInfo;

/// Content written when a package has no template of its own
pub const DEFAULT_VERSION_TEMPLATE: &str = r#"
__version__ = "{DEVFLOW_VERSION}"
__version_vcs_info__ = {
    'branch': '{DEVFLOW_BRANCH}',
    'revid': '{DEVFLOW_REVISION_ID}',
    'revno': {DEVFLOW_REVISION_NUMBER}}
__version_user_email__ = "{DEVFLOW_USER_EMAIL}"
__version_user_name__ = "{DEVFLOW_USER_NAME}"
"#;

/// Values available to version file templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateValues {
    pub version: String,
    pub debian_version: String,
    pub branch: String,
    pub revision_id: String,
    pub revision_number: usize,
    pub user_email: String,
    pub user_name: String,
}

impl TemplateValues {
    pub fn new(version: String, debian_version: String, vcs: &VcsInfo) -> Self {
        TemplateValues {
            version,
            debian_version,
            branch: vcs.branch.clone(),
            revision_id: vcs.revid.clone(),
            revision_number: vcs.revno,
            user_email: vcs.email.clone(),
            user_name: vcs.name.clone(),
        }
    }

    /// Placeholder names with their values
    pub fn pairs(&self) -> [(&'static str, String); 7] {
        [
            ("DEVFLOW_VERSION", self.version.clone()),
            ("DEVFLOW_DEBIAN_VERSION", self.debian_version.clone()),
            ("DEVFLOW_BRANCH", self.branch.clone()),
            ("DEVFLOW_REVISION_ID", self.revision_id.clone()),
            ("DEVFLOW_REVISION_NUMBER", self.revision_number.to_string()),
            ("DEVFLOW_USER_EMAIL", self.user_email.clone()),
            ("DEVFLOW_USER_NAME", self.user_name.clone()),
        ]
    }
}

/// Substitute every `{DEVFLOW_*}` placeholder in `template`
pub fn render(template: &str, values: &TemplateValues) -> String {
    values
        .pairs()
        .iter()
        .fold(template.to_string(), |content, (key, value)| {
            content.replace(&format!("{{{}}}", key), value)
        })
}
