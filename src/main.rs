use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use devflow::cli::orchestration::{self, GlobalOptions, ProposalKind, Session};
use devflow::domain::BuildMode;
use devflow::git::Git2Repository;
use devflow::ui;
use devflow::Notice;

#[derive(Parser)]
#[command(
    name = "devflow",
    version,
    about = "Derive python and debian versions from git flow branches"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        env = "DEVFLOW_BUILD_MODE",
        help = "Build mode: snapshot or release"
    )]
    mode: Option<BuildMode>,

    #[arg(long, global = true, help = "Distribution codename, e.g. bionic")]
    codename: Option<String>,

    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the python version of HEAD
    Python,
    /// Print the debian version of HEAD
    Debian,
    /// Regenerate the configured version files
    Update,
    /// Set and commit a new base version
    Bump {
        version: String,
        #[arg(short, long, help = "Skip confirmation prompt")]
        yes: bool,
    },
    /// Propose the base version of the next branch line
    Propose {
        #[arg(value_enum)]
        kind: Kind,
    },
    /// Show how a branch name is classified
    Classify { branch: Option<String> },
    /// Print (and create if needed) the debian branch of a branch
    DebianBranch { branch: Option<String> },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Release,
    Develop,
    Hotfix,
}

impl From<Kind> for ProposalKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Release => ProposalKind::Release,
            Kind::Develop => ProposalKind::Develop,
            Kind::Hotfix => ProposalKind::Hotfix,
        }
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let repo = Git2Repository::open(".")?;
    let options = GlobalOptions {
        config_path: args.config,
        mode: args.mode,
        codename: args.codename,
    };
    let session = Session::open(&options, repo.toplevel().ok().as_deref())?;
    for notice in &session.notices {
        ui::display_notice(notice);
    }

    match args.command {
        Command::Python => {
            println!("{}", orchestration::python_version(&repo, &session)?);
        }
        Command::Debian => {
            let debian = orchestration::debian_version(&repo, &session)?;
            if let Some(notice) = debian.notice() {
                ui::display_notice(&notice);
            }
            println!("{}", debian.version);
        }
        Command::Update => {
            for notice in orchestration::update_version_files(&repo, &session)? {
                match &notice {
                    Notice::VersionFileWritten { .. } => ui::display_success(&notice.to_string()),
                    _ => ui::display_notice(&notice),
                }
            }
        }
        Command::Bump { version, yes } => {
            let current = orchestration::current_version(&repo)?;
            ui::display_proposed_version(&current, &version);
            if !yes && !ui::confirm_action("Commit this base version?")? {
                println!("Operation cancelled by user.");
                return Ok(());
            }
            let outcome = orchestration::bump_version(&repo, &session, &version)?;
            ui::display_success(&format!(
                "Bumped version from {} to {} ({})",
                outcome.old, outcome.new, outcome.commit
            ));
        }
        Command::Propose { kind } => {
            let proposal = orchestration::propose_version(&repo, kind.into())?;
            ui::display_proposed_version(&proposal.current, &proposal.proposed);
        }
        Command::Classify { branch } => {
            let classification =
                orchestration::classify_branch(&repo, &session, branch.as_deref())?;
            ui::display_classification(&classification);
        }
        Command::DebianBranch { branch } => {
            let debian = orchestration::debian_branch(&repo, &session, branch.as_deref())?;
            for notice in &debian.notices {
                ui::display_status(&notice.to_string());
            }
            println!("{}", debian.name);
        }
    }

    Ok(())
}
