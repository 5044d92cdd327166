use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "telescope", version, about = "Auto recon tool driving nmap and gobuster")]
pub struct Cli {
    /// Target ip address (required)
    #[arg(short = 't', long = "target")]
    pub target: String,

    /// Skips ping check on all nmap scans
    #[arg(short = 'P', long = "no-ping", action = ArgAction::SetTrue)]
    pub no_ping: bool,

    /// Skips showing the telescope banner
    #[arg(short = 'b', long = "no-banner", action = ArgAction::SetTrue)]
    pub no_banner: bool,

    /// Sets the verbosity 0-5
    #[arg(long = "verbosity", default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=5))]
    pub verbosity: u8,

    /// Sets the gobuster wordlist
    #[arg(long = "gb-wordlist", value_name = "FILE")]
    pub gb_wordlist: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Base name of the result directory
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_short_and_long_flags() {
        let cli = Cli::try_parse_from([
            "telescope",
            "-t",
            "10.10.10.10",
            "-P",
            "-b",
            "--verbosity",
            "3",
            "--gb-wordlist",
            "/tmp/words.txt",
        ])
        .unwrap();
        assert_eq!(cli.target, "10.10.10.10");
        assert!(cli.no_ping);
        assert!(cli.no_banner);
        assert_eq!(cli.verbosity, 3);
        assert_eq!(cli.gb_wordlist, Some(PathBuf::from("/tmp/words.txt")));
    }

    #[test]
    fn test_target_is_required() {
        assert!(Cli::try_parse_from(["telescope"]).is_err());
    }

    #[test]
    fn test_verbosity_is_bounded() {
        assert!(Cli::try_parse_from(["telescope", "-t", "h", "--verbosity", "6"]).is_err());
    }
}
