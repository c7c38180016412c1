use std::ffi::OsString;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;

use crate::{
    constants,
    types::{CloneError, CloneRequest},
};

const LONG_FLAGS: &[&str] = &[
    "url",
    "dir",
    "name",
    "branch",
    "tag",
    "depth",
    "quiet",
    "completion",
    "help",
    "version",
];

#[derive(Parser, Debug)]
#[command(
    name = "gitclone",
    author,
    version,
    about = "Clones a single branch or tag of a git repository and prints the checked out commit",
    long_about = None
)]
pub struct Cli {
    #[arg(long, env = "GITCLONE_URL", help = "Repository URL")]
    pub url: Option<String>,
    #[arg(long, env = "GITCLONE_DIR", help = "Local directory")]
    pub dir: Option<String>,
    #[arg(long, env = "GITCLONE_NAME", help = "Repository name")]
    pub name: Option<String>,
    #[arg(long, env = "GITCLONE_BRANCH", help = "Branch name")]
    pub branch: Option<String>,
    #[arg(long, env = "GITCLONE_TAG", help = "Tag name")]
    pub tag: Option<String>,
    #[arg(
        long,
        env = "GITCLONE_DEPTH",
        default_value_t = constants::DEFAULT_DEPTH,
        help = "Number of commits to fetch. 0 fetches the full history of the ref"
    )]
    pub depth: u32,
    #[arg(long, help = "Hides fetch and checkout progress bars")]
    pub quiet: bool,
    #[arg(long, value_name = "SHELL", help = "Outputs a shell completion script")]
    pub completion: Option<Shell>,
}

impl TryFrom<&Cli> for CloneRequest {
    type Error = CloneError;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        Ok(CloneRequest::new(
            cli.url.as_deref(),
            cli.dir.as_deref(),
            cli.name.as_deref(),
            cli.branch.as_deref(),
            cli.tag.as_deref(),
        )?
        .with_depth(cli.depth))
    }
}

fn is_single_dash_long_flag(arg: &str) -> bool {
    match arg.strip_prefix('-') {
        Some(rest) if !rest.starts_with('-') => {
            let name = rest.split('=').next().unwrap_or(rest);
            LONG_FLAGS.contains(&name)
        }
        _ => false,
    }
}

/// Rewrites `-url x` / `-url=x` into `--url x` / `--url=x` so both flag spellings parse.
/// Everything after a bare `--` is left untouched.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut passthrough = false;

    args.into_iter()
        .enumerate()
        .map(|(idx, arg)| {
            if idx == 0 || passthrough {
                return arg;
            }
            if arg == "--" {
                passthrough = true;
                return arg;
            }
            match arg.to_str() {
                Some(flag) if is_single_dash_long_flag(flag) => OsString::from(format!("-{}", flag)),
                _ => arg,
            }
        })
        .collect()
}

pub fn print_usage(error: &CloneError) {
    let mut cmd = Cli::command();
    eprintln!("{}", error.to_string().red());
    eprintln!("{}", cmd.render_help());
}
