#![forbid(unsafe_code)]

//! Command-line argument parsing for the viewer.
//!
//! Parses args manually to keep the binary lean. Every option has a
//! `GTREE_*` environment variable; explicit flags win over the environment,
//! which wins over the defaults.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
gtree: interactive binary genealogy tree viewer

USAGE:
    gtree [OPTIONS]

DATA SOURCE (first match wins):
    --file=PATH          Load the tree from a JSON file
    --fixture            Use the bundled sample tree
    --api-url=URL        Fetch GET URL/api/referrals/genealogy-tree

OPTIONS:
    --token=TOKEN        Bearer token sent with the live fetch
    --ui-height=N        Rows used below the prompt (default: 24)
    --timeout-ms=N       Request timeout in milliseconds (default: 10000)
    --log-file=PATH      Log destination (default: gtree.log)
    --no-mouse           Disable mouse capture
    --help, -h           Show this help message
    --version, -V        Show version

KEYBINDINGS:
    Tab / Shift-Tab      Move focus between cards
    Enter / Space        Expand or collapse the focused card
    + / -                Zoom in / out
    Arrows, PgUp/PgDn    Scroll; drag with the mouse to pan
    /                    Search by username
    g                    Cycle the generation filter
    f                    Toggle fullscreen
    r                    Reload
    Esc                  Leave fullscreen or close details
    q / Ctrl+C           Quit

ENVIRONMENT VARIABLES:
    GTREE_API_URL        Override --api-url
    GTREE_TOKEN          Override --token
    GTREE_UI_HEIGHT      Override --ui-height
    GTREE_TIMEOUT_MS     Override --timeout-ms
    GTREE_LOG_FILE       Override --log-file
    GTREE_LOG            Log filter directives (default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub file: Option<PathBuf>,
    pub fixture: bool,
    /// UI height for inline mode.
    pub ui_height: u16,
    pub timeout_ms: u64,
    pub log_file: PathBuf,
    /// `EnvFilter` directives for the log file.
    pub log_filter: String,
    /// Whether mouse events are enabled.
    pub mouse: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            api_url: None,
            token: None,
            file: None,
            fixture: false,
            ui_height: 24,
            timeout_ms: 10_000,
            log_file: PathBuf::from("gtree.log"),
            log_filter: "info".into(),
            mouse: true,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

/// Command-line errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// A flag value that does not parse.
    InvalidValue { flag: &'static str, value: String },
    /// A flag this program does not know.
    Unknown(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { flag, value } => write!(f, "Invalid {flag} value: {value}"),
            Self::Unknown(arg) => write!(f, "Unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl Opts {
    /// Parse the process arguments and environment.
    ///
    /// Prints help or version and exits when asked to; prints the error and
    /// exits with status 1 on bad input.
    pub fn parse() -> Self {
        match Self::parse_from(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(Command::Run(opts)) => opts,
            Ok(Command::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Command::Version) => {
                println!("gtree {VERSION}");
                process::exit(0);
            }
            Err(err) => {
                eprintln!("{err}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse `args` with `env` as the variable lookup.
    ///
    /// Environment values that do not parse are ignored; flag values that do
    /// not parse are errors.
    pub fn parse_from<I, S, F>(args: I, env: F) -> Result<Command, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = env("GTREE_API_URL") {
            opts.api_url = Some(val);
        }
        if let Some(val) = env("GTREE_TOKEN") {
            opts.token = Some(val);
        }
        if let Some(val) = env("GTREE_UI_HEIGHT")
            && let Ok(n) = val.parse()
        {
            opts.ui_height = n;
        }
        if let Some(val) = env("GTREE_TIMEOUT_MS")
            && let Ok(n) = val.parse()
        {
            opts.timeout_ms = n;
        }
        if let Some(val) = env("GTREE_LOG_FILE") {
            opts.log_file = PathBuf::from(val);
        }
        if let Some(val) = env("GTREE_LOG") {
            opts.log_filter = val;
        }

        // Parse command-line args (override env vars)
        for arg in args {
            match arg.as_ref() {
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                "--no-mouse" => opts.mouse = false,
                "--fixture" => opts.fixture = true,
                other => {
                    if let Some(val) = other.strip_prefix("--api-url=") {
                        opts.api_url = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--token=") {
                        opts.token = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--file=") {
                        opts.file = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--ui-height=") {
                        opts.ui_height = number("--ui-height", val)?;
                    } else if let Some(val) = other.strip_prefix("--timeout-ms=") {
                        opts.timeout_ms = number("--timeout-ms", val)?;
                    } else if let Some(val) = other.strip_prefix("--log-file=") {
                        opts.log_file = PathBuf::from(val);
                    } else {
                        return Err(CliError::Unknown(other.to_string()));
                    }
                }
            }
        }

        Ok(Command::Run(opts))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn number<T: std::str::FromStr>(flag: &'static str, val: &str) -> Result<T, CliError> {
    val.parse().map_err(|_| CliError::InvalidValue {
        flag,
        value: val.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(args: &[&str], vars: &[(&str, &str)]) -> Result<Command, CliError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Opts::parse_from(args.iter().copied(), |key| vars.get(key).cloned())
    }

    fn run(args: &[&str], vars: &[(&str, &str)]) -> Opts {
        match parse(args, vars) {
            Ok(Command::Run(opts)) => opts,
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn default_opts() {
        let opts = run(&[], &[]);
        assert_eq!(opts, Opts::default());
        assert_eq!(opts.ui_height, 24);
        assert_eq!(opts.timeout(), Duration::from_secs(10));
        assert_eq!(opts.log_file, PathBuf::from("gtree.log"));
        assert_eq!(opts.log_filter, "info");
        assert!(opts.mouse);
    }

    #[test]
    fn env_fills_in_options() {
        let opts = run(
            &[],
            &[
                ("GTREE_API_URL", "https://mlm.example"),
                ("GTREE_TOKEN", "abc"),
                ("GTREE_UI_HEIGHT", "18"),
                ("GTREE_TIMEOUT_MS", "2500"),
                ("GTREE_LOG_FILE", "/tmp/g.log"),
                ("GTREE_LOG", "gtree_widgets=debug"),
            ],
        );
        assert_eq!(opts.api_url.as_deref(), Some("https://mlm.example"));
        assert_eq!(opts.token.as_deref(), Some("abc"));
        assert_eq!(opts.ui_height, 18);
        assert_eq!(opts.timeout_ms, 2500);
        assert_eq!(opts.log_file, PathBuf::from("/tmp/g.log"));
        assert_eq!(opts.log_filter, "gtree_widgets=debug");
    }

    #[test]
    fn flags_override_env() {
        let opts = run(
            &["--api-url=http://flag", "--ui-height=10", "--token=t2"],
            &[
                ("GTREE_API_URL", "http://env"),
                ("GTREE_UI_HEIGHT", "30"),
                ("GTREE_TOKEN", "t1"),
            ],
        );
        assert_eq!(opts.api_url.as_deref(), Some("http://flag"));
        assert_eq!(opts.ui_height, 10);
        assert_eq!(opts.token.as_deref(), Some("t2"));
    }

    #[test]
    fn bad_env_is_ignored_but_bad_flag_is_an_error() {
        let opts = run(&[], &[("GTREE_UI_HEIGHT", "tall")]);
        assert_eq!(opts.ui_height, 24);

        let err = parse(&["--timeout-ms=soon"], &[]).unwrap_err();
        assert_eq!(
            err,
            CliError::InvalidValue {
                flag: "--timeout-ms",
                value: "soon".into()
            }
        );
        assert_eq!(err.to_string(), "Invalid --timeout-ms value: soon");
    }

    #[test]
    fn switches_and_unknown_flags() {
        let opts = run(&["--fixture", "--no-mouse", "--file=tree.json"], &[]);
        assert!(opts.fixture);
        assert!(!opts.mouse);
        assert_eq!(opts.file, Some(PathBuf::from("tree.json")));

        assert_eq!(parse(&["-h"], &[]), Ok(Command::Help));
        assert_eq!(parse(&["--version"], &[]), Ok(Command::Version));
        assert_eq!(
            parse(&["--zoom=3"], &[]),
            Err(CliError::Unknown("--zoom=3".into()))
        );
    }

    #[test]
    fn help_text_lists_every_variable() {
        for var in [
            "GTREE_API_URL",
            "GTREE_TOKEN",
            "GTREE_UI_HEIGHT",
            "GTREE_TIMEOUT_MS",
            "GTREE_LOG_FILE",
            "GTREE_LOG",
        ] {
            assert!(HELP_TEXT.contains(var), "{var} missing from help");
        }
        assert!(!VERSION.is_empty());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn flags_beat_environment(
                env_height in any::<u16>(),
                flag_height in any::<u16>(),
                env_timeout in any::<u64>(),
                flag_timeout in any::<u64>(),
            ) {
                let env_height = env_height.to_string();
                let env_timeout = env_timeout.to_string();
                let height_flag = format!("--ui-height={flag_height}");
                let timeout_flag = format!("--timeout-ms={flag_timeout}");
                let opts = run(
                    &[height_flag.as_str(), timeout_flag.as_str()],
                    &[
                        ("GTREE_UI_HEIGHT", env_height.as_str()),
                        ("GTREE_TIMEOUT_MS", env_timeout.as_str()),
                    ],
                );
                prop_assert_eq!(opts.ui_height, flag_height);
                prop_assert_eq!(opts.timeout_ms, flag_timeout);
            }

            #[test]
            fn junk_environment_numbers_keep_defaults(junk in "[a-z ]{1,12}") {
                let opts = run(&[], &[("GTREE_UI_HEIGHT", junk.as_str()), ("GTREE_TIMEOUT_MS", junk.as_str())]);
                prop_assert_eq!(opts.ui_height, 24);
                prop_assert_eq!(opts.timeout_ms, 10_000);
            }
        }
    }
}
