use colored::Colorize;
use std::fmt;
use std::path::Path;

const BANNER: &str = r#"
  _______   _
 |__   __| | |
    | | ___| | ___  ___  ___ ___  _ __   ___
    | |/ _ \ |/ _ \/ __|/ __/ _ \| '_ \ / _ \
    | |  __/ |  __/\__ \ (_| (_) | |_) |  __/
    |_|\___|_|\___||___/\___\___/| .__/ \___|
                                 | |
                                 |_|         vALPHA
"#;

/// Component a line of operator output originates from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    Telescope,
    Nmap,
    Gobuster,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::Telescope => "TELESC",
            Source::Nmap => "NMAP",
            Source::Gobuster => "GOBUST",
        })
    }
}

pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// `[timestamp] SOURCE >> message`
pub fn format_line(source: Source, message: &str) -> String {
    format!("[{}] {} >> {}", timestamp(), source, message)
}

/// Operator-facing output gated by the run verbosity.
#[derive(Clone, Copy, Debug)]
pub struct Printer {
    verbosity: u8,
}

impl Printer {
    pub fn new(verbosity: u8) -> Self {
        Self { verbosity }
    }

    pub fn enabled(&self, level: u8) -> bool {
        level <= self.verbosity
    }

    pub fn say(&self, level: u8, source: Source, message: impl AsRef<str>) {
        if self.enabled(level) {
            println!(
                "[{}] {} >> {}",
                timestamp().dimmed(),
                source.to_string().cyan().bold(),
                message.as_ref()
            );
        }
    }

    /// Always shown, highlighted.
    pub fn warn(&self, source: Source, message: impl AsRef<str>) {
        println!(
            "[{}] {} >> {}",
            timestamp().dimmed(),
            source.to_string().yellow().bold(),
            message.as_ref().yellow()
        );
    }

    pub fn error(&self, source: Source, message: impl AsRef<str>) {
        eprintln!(
            "[{}] {} >> {}",
            timestamp().dimmed(),
            source.to_string().red().bold(),
            message.as_ref().red()
        );
    }
}

pub fn print_banner() {
    println!("{}", BANNER.trim_start_matches('\n').green().bold());
}

pub struct RunSummary<'a> {
    pub target: &'a str,
    pub results_dir: &'a Path,
    pub open_ports: usize,
    pub web_services: usize,
    pub scans_launched: usize,
    pub scans_failed: usize,
}

pub fn print_summary(summary: &RunSummary<'_>) {
    println!("\n{}", "═══════════════════════════════════════".green().bold());
    println!("{}", "telescope run complete".green().bold());
    println!("{}", "═══════════════════════════════════════".green().bold());

    println!("\n{}: {}", "Target".cyan().bold(), summary.target);
    println!("{}: {}", "Results".cyan().bold(), summary.results_dir.display());

    println!("\n{}", "Findings:".yellow().bold());
    println!("  Open Ports: {}", summary.open_ports.to_string().green().bold());
    println!("  Web Services: {}", summary.web_services.to_string().green().bold());

    println!("\n{}", "Discovery:".yellow().bold());
    println!("  Scans: {}", summary.scans_launched.to_string().green().bold());
    if summary.scans_failed > 0 {
        println!("  Failed: {}", summary.scans_failed.to_string().red().bold());
    }
}
