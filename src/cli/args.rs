use super::ExitCodes;
use clap::Parser;
use clap::error::ErrorKind;

/// Runs a project's test suite inside every container declared in its Dockunit.json
#[derive(Parser, Debug)]
#[command(name = "dockunit", version)]
pub struct Cli {
    /// Project directory containing Dockunit.json (mounted into each container)
    #[arg(default_value = ".")]
    pub path: String,

    /// Output verbosity: 1 announces each step, 2 also streams before-script output
    #[arg(
        long = "du-verbose",
        num_args = 0..=1,
        require_equals = true,
        default_value_t = 0,
        default_missing_value = "1"
    )]
    pub verbose: u8,

    /// Run only the container at this index of the manifest
    #[arg(long = "du-container", require_equals = true)]
    pub container: Option<usize>,

    /// Kill any engine step running longer than this (e.g. 90s, 10m)
    #[arg(long = "du-timeout", require_equals = true)]
    pub timeout: Option<String>,

    /// Stop and remove containers after passing runs too
    #[arg(long = "du-teardown")]
    pub teardown: bool,

    /// Container engine binary
    #[arg(long = "du-engine", require_equals = true, env = "DOCKUNIT_ENGINE")]
    pub engine: Option<String>,

    /// Arguments forwarded to every test command
    #[arg(skip)]
    pub test_args: Vec<String>,
}

impl Cli {
    /// Parses the process arguments. Anything that is not a `--du-*` option,
    /// help/version, or the project path is collected for the test command.
    pub fn parse_with_passthrough<I, S>(argv: I) -> clap::error::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (own, passthrough) = split_argv(argv);
        let mut cli = Self::try_parse_from(own)?;
        cli.test_args = passthrough;
        Ok(cli)
    }

    /// Like [`Cli::parse_with_passthrough`], but reports usage errors and
    /// hands back the setup-error exit code. Help and version still exit 0.
    pub fn parse_or_exit_code<I, S>(argv: I) -> Result<Self, u8>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::parse_with_passthrough(argv).map_err(|e| match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                ExitCodes::SETUP_ERROR
            }
        })
    }
}

/// Separates our own options from the pass-through arguments.
///
/// A pass-through flag without `=` keeps the next bare token as its value,
/// the same way [`crate::domain::TestArgs::parse`] reads it, so the project
/// path must come before such a flag.
pub fn split_argv<I, S>(argv: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut iter = argv.into_iter().map(Into::into).peekable();
    let mut own: Vec<String> = iter.next().into_iter().collect();
    let mut passthrough = Vec::new();
    let mut path_seen = false;

    while let Some(arg) = iter.next() {
        if arg == "--" {
            passthrough.push(arg);
            passthrough.extend(iter.by_ref());
            break;
        }

        let is_own = arg.starts_with("--du-")
            || matches!(arg.as_str(), "-h" | "--help" | "-V" | "--version");

        if is_own {
            own.push(arg);
        } else if !path_seen && !arg.starts_with('-') {
            path_seen = true;
            own.push(arg);
        } else {
            let takes_value = takes_value(&arg);
            passthrough.push(arg);
            if takes_value {
                passthrough.extend(iter.next_if(|next| !next.starts_with('-')));
            }
        }
    }

    (own, passthrough)
}

fn takes_value(arg: &str) -> bool {
    match arg.strip_prefix("--") {
        Some(long) => !long.contains('=') && !long.starts_with("no-"),
        None => arg.len() > 1 && arg.starts_with('-'),
    }
}
