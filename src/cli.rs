use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "rundeb")]
#[command(version)]
#[command(about = "A Rust .deb inspector with HTTP URL support", long_about = None)]
#[command(after_help = "Examples:\n  \
  rundeb hello.deb                 show control fields and checksums\n  \
  rundeb -f hello.deb              list the files the package installs\n  \
  rundeb -p debian-binary foo.deb  send a raw member to stdout\n  \
  rundeb -v https://example.com/pool/h/hello.deb   list members of a remote package")]
pub struct Cli {
    /// Package file path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// List archive members (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List archive members verbosely
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Print the raw control file
    #[arg(short = 'c')]
    pub control: bool,

    /// List installed files
    #[arg(short = 'f')]
    pub files: bool,

    /// Print a single control field
    #[arg(short = 'F', value_name = "KEY")]
    pub field: Option<String>,

    /// Print maintainer scripts
    #[arg(short = 's')]
    pub scripts: bool,

    /// Extract a member to pipe, no messages
    #[arg(short = 'p', value_name = "MEMBER")]
    pub pipe: Option<String>,

    /// Quiet mode
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.file.starts_with("http://") || self.file.starts_with("https://")
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe.is_some()
    }

    /// Whether only the archive layer is needed, without parsing the package
    pub fn is_member_mode(&self) -> bool {
        self.list || self.verbose || self.pipe.is_some()
    }
}
