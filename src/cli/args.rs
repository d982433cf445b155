//! Command-line argument parsing

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "registry-auth-probe")]
#[command(about = "Discover how a Docker registry wants to be authenticated and build its token URL")]
#[command(version, author)]
pub struct Args {
    /// Image repository, e.g. library/ubuntu
    #[arg(help = "Repository name the token is requested for")]
    pub image: String,

    /// Registry host
    #[arg(
        long = "registry",
        short = 'r',
        help = "Registry host or URL (falls back to REGISTRY_AUTH_SERVER)"
    )]
    pub registry: Option<String>,

    /// Explicit scopes
    #[arg(
        long = "scope",
        short = 's',
        help = "Repository scope as repository=actions, repeatable"
    )]
    pub scopes: Vec<String>,

    /// Cross-repository mount source
    #[arg(
        long = "source-image",
        help = "Repository blobs are mounted from; adds a pull scope when --push is set"
    )]
    pub source_image: Option<String>,

    /// Request push access
    #[arg(long = "push", help = "Request pull,push instead of pull")]
    pub push: bool,

    /// Timeout in seconds for the probe request
    #[arg(
        long = "timeout",
        short = 't',
        help = "Timeout for the probe request in seconds"
    )]
    pub timeout: Option<u64>,

    /// Registry username
    #[arg(
        long = "username",
        short = 'u',
        help = "Username the token will be requested for"
    )]
    pub username: Option<String>,

    /// Registry password
    #[arg(
        long = "password",
        short = 'p',
        help = "Password the token will be requested with"
    )]
    pub password: Option<String>,

    #[arg(long = "user-agent", help = "User-Agent sent with the probe")]
    pub user_agent: Option<String>,

    /// Output format for results
    #[arg(
        long = "output",
        short = 'o',
        default_value = "text",
        help = "Output format: text, json"
    )]
    pub output: String,

    /// Verbose output
    #[arg(long = "verbose", short = 'v', help = "Enable verbose output")]
    pub verbose: bool,

    /// Quiet mode
    #[arg(long = "quiet", short = 'q', help = "Only print the result")]
    pub quiet: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Validate arguments
    pub fn validate(&self) -> Result<(), String> {
        match self.output.as_str() {
            "text" | "json" => {}
            _ => return Err("Output format must be one of: text, json".to_string()),
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be greater than 0".to_string());
        }

        match (&self.username, &self.password) {
            (Some(_), None) => {
                return Err("Password is required when username is provided".to_string());
            }
            (None, Some(_)) => {
                return Err("Username is required when password is provided".to_string());
            }
            _ => {}
        }

        if self.verbose && self.quiet {
            return Err("--verbose and --quiet cannot be used together".to_string());
        }

        Ok(())
    }

    /// Load configuration from environment variables
    pub fn from_env(mut self) -> Self {
        if self.registry.is_none() {
            self.registry = std::env::var("REGISTRY_AUTH_SERVER").ok();
        }

        if self.username.is_none() {
            self.username = std::env::var("REGISTRY_AUTH_USERNAME").ok();
        }

        if self.password.is_none() {
            self.password = std::env::var("REGISTRY_AUTH_PASSWORD").ok();
        }

        if std::env::var("REGISTRY_AUTH_VERBOSE").is_ok() && !self.quiet {
            self.verbose = true;
        }

        self
    }
}
