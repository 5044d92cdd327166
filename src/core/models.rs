use std::fmt;
use std::path::{Path, PathBuf};

/// Lines at or below this many characters carry no usable path.
pub const NOISE_THRESHOLD: usize = 10;

/// Delimiter gobuster places between a discovered path and its status code.
pub const STATUS_MARKER: &str = " (Status:";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub value: String, // host/IP
}

impl Target {
    pub fn new(value: impl Into<String>) -> anyhow::Result<Self> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            anyhow::bail!("Invalid target: value is empty");
        }
        if value.chars().any(|c| c.is_whitespace() || c == '/') {
            anyhow::bail!("Invalid target ({})", value);
        }
        Ok(Self { value })
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    /// Maps an nmap service name onto a web protocol, folding proxy variants.
    pub fn from_service(name: &str) -> Option<Self> {
        match name {
            "http" | "http-proxy" => Some(Protocol::Http),
            "https" | "https-proxy" => Some(Protocol::Https),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WebService {
    pub protocol: Protocol,
    pub port: u16,
}

/// One invocation of the content-discovery tool.
///
/// `base_path` is relative to the site root and carries no leading separator;
/// the empty string is the root itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanJob {
    pub protocol: Protocol,
    pub port: u16,
    pub base_path: String,
}

impl ScanJob {
    pub fn root(service: WebService) -> Self {
        Self {
            protocol: service.protocol,
            port: service.port,
            base_path: String::new(),
        }
    }

    /// Job for a directory discovered while scanning this one.
    pub fn child(&self, discovered_path: &str) -> Self {
        Self {
            protocol: self.protocol,
            port: self.port,
            base_path: format!("{}{}", self.base_path, discovered_path.trim_start_matches('/')),
        }
    }

    pub fn url(&self, target: &Target) -> String {
        format!("{}://{}:{}/{}", self.protocol, target, self.port, self.base_path)
    }

    /// Filesystem-safe name for this job's output file.
    pub fn label(&self) -> String {
        let trimmed = self.base_path.trim_matches('/');
        if trimmed.is_empty() {
            "root".to_string()
        } else {
            trimmed.replace('/', "-")
        }
    }

    pub fn output_file(&self, dir: &Path) -> PathBuf {
        dir.join(format!("gobuster-{}.txt", self.label()))
    }
}

/// One line of discovery output that survived the noise filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveredEntry {
    pub raw: String,
    pub path: String,
    pub is_directory: bool,
    pub status: Option<u16>,
}

impl DiscoveredEntry {
    /// Returns `None` for noise lines and lines without a path.
    ///
    /// A line lacking the status marker is taken whole as the path.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end();
        if line.chars().count() <= NOISE_THRESHOLD {
            return None;
        }

        let (path, rest) = match line.split_once(STATUS_MARKER) {
            Some((path, rest)) => (path, Some(rest)),
            None => (line, None),
        };
        let path = path.trim();
        if path.is_empty() {
            return None;
        }

        let status = rest.and_then(|rest| {
            let digits: String = rest
                .trim_start()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        });

        Some(Self {
            raw: line.to_string(),
            path: path.to_string(),
            is_directory: path.ends_with('/'),
            status,
        })
    }
}

/// Sticky recursion decision for a single scan invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecursionPolicy {
    #[default]
    Undecided,
    AlwaysRecurse,
    NeverRecurse,
}

/// Accepted operator answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Always,
    Never,
}

impl Answer {
    pub const YES_NO: &'static [Answer] = &[Answer::Yes, Answer::No];
    pub const RECURSION: &'static [Answer] =
        &[Answer::Yes, Answer::No, Answer::Always, Answer::Never];

    pub fn as_str(&self) -> &'static str {
        match self {
            Answer::Yes => "y",
            Answer::No => "n",
            Answer::Always => "always",
            Answer::Never => "never",
        }
    }

    /// Parses operator input against the answers allowed for one prompt.
    pub fn parse(input: &str, allowed: &[Answer]) -> Option<Self> {
        let input = input.trim().to_lowercase();
        allowed.iter().copied().find(|a| a.as_str() == input)
    }
}

impl RecursionPolicy {
    /// Whether a directory hit needs the operator, and what to do otherwise.
    pub fn standing_decision(&self) -> Option<bool> {
        match self {
            RecursionPolicy::Undecided => None,
            RecursionPolicy::AlwaysRecurse => Some(true),
            RecursionPolicy::NeverRecurse => Some(false),
        }
    }

    /// Applies an operator answer, returning whether to scan this hit.
    pub fn apply(&mut self, answer: Answer) -> bool {
        match answer {
            Answer::Yes => true,
            Answer::No => false,
            Answer::Always => {
                *self = RecursionPolicy::AlwaysRecurse;
                true
            }
            Answer::Never => {
                *self = RecursionPolicy::NeverRecurse;
                false
            }
        }
    }
}
