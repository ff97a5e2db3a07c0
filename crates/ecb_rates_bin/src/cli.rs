use clap::{Parser, ValueEnum};
use ecb_api::Feed;
use std::fmt;
use std::io::{self, Write};

pub const USAGE: &str = "Usage: ecb_rates init | ecb_rates update";

/// Download ECB euro reference rates into a month-sharded JSON store.
#[derive(Debug, Parser)]
#[command(name = "ecb_rates", version)]
pub struct Cli {
    #[arg(value_enum)]
    pub mode: Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Load the full rate history
    Init,
    /// Fetch the most recent daily snapshot
    Update,
}

impl Mode {
    pub fn feed(self) -> Feed {
        match self {
            Mode::Init => Feed::History,
            Mode::Update => Feed::Daily,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mode::Init => write!(f, "init"),
            Mode::Update => write!(f, "update"),
        }
    }
}

/// Explains a rejected command line. Written straight to `out` so it shows up
/// whatever the log filter is.
pub fn write_usage(err: &clap::Error, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Invalid invocation: {}", err.kind())?;
    writeln!(out, "{}", USAGE)
}
