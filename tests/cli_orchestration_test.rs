// tests/cli_orchestration_test.rs
use devflow::cli::orchestration::{
    self, GlobalOptions, Proposal, ProposalKind, Session,
};
use devflow::config::{Config, PackageConfig, PathList, CONFIG_FILE_NAME};
use devflow::domain::{BranchType, BuildMode, VcsInfo};
use devflow::git::MockRepository;
use devflow::{DevflowError, Notice};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn checkout(branch: &str, base_version: &str) -> (TempDir, MockRepository) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("version"), format!("{}\n", base_version)).unwrap();
    let repo = MockRepository::with_head(VcsInfo {
        branch: branch.to_string(),
        revid: "abc1234".to_string(),
        revno: 249,
        toplevel: dir.path().to_path_buf(),
        name: "Test User".to_string(),
        email: "test@example.com".to_string(),
    });
    (dir, repo)
}

fn session(mode: Option<BuildMode>) -> Session {
    Session::with_config(Config::default(), mode, "bionic")
}

#[test]
fn test_python_and_debian_versions() {
    let (_dir, repo) = checkout("release-0.14", "0.14rc2");

    assert_eq!(
        orchestration::python_version(&repo, &session(None)).unwrap(),
        "0.14rc2_249_abc1234"
    );
    let debian = orchestration::debian_version(&repo, &session(None)).unwrap();
    assert_eq!(debian.version, "0.14~rc2~249~abc1234-1~bionic");
    assert_eq!(debian.notice(), None);

    assert_eq!(
        orchestration::python_version(&repo, &session(Some(BuildMode::Release))).unwrap(),
        "0.14rc2"
    );
}

#[test]
fn test_debian_version_needs_tag_access() {
    let (_dir, mut repo) = checkout("master", "0.14");
    repo.make_tags_unreadable();

    let err = orchestration::debian_version(&repo, &session(Some(BuildMode::Release))).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DevflowError>(),
        Some(DevflowError::NoRepositoryAccess(_))
    ));
}

#[test]
fn test_release_mode_rejected_on_feature_branch() {
    let (_dir, repo) = checkout("feature-foo", "0.15next");
    let err = orchestration::python_version(&repo, &session(Some(BuildMode::Release))).unwrap_err();
    assert!(err.to_string().contains("feature"));
}

#[test]
fn test_update_writes_configured_files() {
    let (dir, repo) = checkout("master", "0.14");
    let mut config = Config::default();
    config.packages.insert(
        "core".to_string(),
        PackageConfig {
            version_file: Some(PathList::One("core/_version.py".to_string())),
            version_template: None,
        },
    );
    let session = Session::with_config(config, Some(BuildMode::Release), "bionic");

    let notices = orchestration::update_version_files(&repo, &session).unwrap();
    assert_eq!(
        notices,
        vec![Notice::VersionFileWritten {
            path: dir.path().join("core/_version.py")
        }]
    );
    let written = fs::read_to_string(dir.path().join("core/_version.py")).unwrap();
    assert!(written.contains("__version__ = \"0.14\""));
    assert!(written.contains("'branch': 'master'"));
}

#[test]
fn test_propose_versions() {
    let (_dir, repo) = checkout("develop", "0.14next");
    assert_eq!(
        orchestration::propose_version(&repo, ProposalKind::Release).unwrap(),
        Proposal {
            current: "0.14next".to_string(),
            proposed: "0.15".to_string()
        }
    );

    let (_dir, repo) = checkout("master", "0.14");
    assert_eq!(
        orchestration::propose_version(&repo, ProposalKind::Develop)
            .unwrap()
            .proposed,
        "0.15next"
    );
    assert_eq!(
        orchestration::propose_version(&repo, ProposalKind::Hotfix)
            .unwrap()
            .proposed,
        "0.14.1"
    );
}

#[test]
fn test_bump_commits_base_version() {
    let (dir, repo) = checkout("develop", "0.14next");
    let outcome = orchestration::bump_version(&repo, &session(None), "0.15.dev").unwrap();
    assert_eq!(outcome.old, "0.14next");
    assert_eq!(orchestration::current_version(&repo).unwrap(), "0.15.dev");
    assert_eq!(
        fs::read_to_string(dir.path().join("version")).unwrap(),
        "0.15.dev\n"
    );
    assert_eq!(repo.commits()[0].message, "Bump version to 0.15.dev");
}

#[test]
fn test_bump_error_names_version() {
    let (_dir, repo) = checkout("master", "0.14");
    let err = orchestration::bump_version(&repo, &session(None), "0.15next").unwrap_err();
    assert!(format!("{:#}", err).contains("0.15next"));
    assert!(repo.commits().is_empty());
}

#[test]
fn test_classify_head_or_named_branch() {
    let (_dir, repo) = checkout("hotfix-0.14.1", "0.14.1");
    let head = orchestration::classify_branch(&repo, &session(None), None).unwrap();
    assert_eq!(head.branch_type, BranchType::Hotfix);

    let named =
        orchestration::classify_branch(&repo, &session(None), Some("debian-bionic")).unwrap();
    assert_eq!(named.branch_type, BranchType::Master);
}

#[test]
fn test_debian_branch_created_from_counterpart() {
    let (_dir, mut repo) = checkout("hotfix-0.14.1", "0.14.1");
    repo.add_branch("debian");

    let debian = orchestration::debian_branch(&repo, &session(None), None).unwrap();
    assert_eq!(debian.name, "debian-hotfix-0.14.1");
    assert_eq!(
        repo.created_branches(),
        vec![("debian-hotfix-0.14.1".to_string(), "debian".to_string())]
    );
}

#[test]
#[serial]
fn test_session_reports_missing_config() {
    let user_dir = TempDir::new().unwrap();
    env::set_var("XDG_CONFIG_HOME", user_dir.path());

    let options = GlobalOptions {
        codename: Some("bionic".to_string()),
        ..GlobalOptions::default()
    };
    let session = Session::open(&options, Some(Path::new("/nonexistent"))).unwrap();
    assert_eq!(session.notices, vec![Notice::NoConfigFile]);
    assert_eq!(session.codename, "bionic");
    assert_eq!(session.mode, None);

    env::remove_var("XDG_CONFIG_HOME");
}

#[test]
#[serial]
fn test_session_mode_precedence() {
    let user_dir = TempDir::new().unwrap();
    let repo_dir = TempDir::new().unwrap();
    env::set_var("XDG_CONFIG_HOME", user_dir.path());
    fs::write(
        repo_dir.path().join(CONFIG_FILE_NAME),
        "[build]\nmode = \"release\"\ncodename = \"focal\"\n",
    )
    .unwrap();

    let from_config = Session::open(&GlobalOptions::default(), Some(repo_dir.path())).unwrap();
    assert_eq!(from_config.mode, Some(BuildMode::Release));
    assert_eq!(from_config.codename, "focal");
    assert!(from_config.notices.is_empty());

    let options = GlobalOptions {
        mode: Some(BuildMode::Snapshot),
        codename: Some("bionic".to_string()),
        ..GlobalOptions::default()
    };
    let explicit = Session::open(&options, Some(repo_dir.path())).unwrap();
    assert_eq!(explicit.mode, Some(BuildMode::Snapshot));
    assert_eq!(explicit.codename, "bionic");

    env::remove_var("XDG_CONFIG_HOME");
}
