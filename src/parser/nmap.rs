use anyhow::Result;
use regex::Regex;

use crate::core::errors::TelescopeError;
use crate::core::models::{Protocol, WebService};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortEntry {
    pub port: u16,
    pub state: Option<String>,
    pub service: Option<String>,
}

impl PortEntry {
    /// Ports without a state element are listed by nmap only when open.
    pub fn is_open(&self) -> bool {
        self.state.as_deref().is_none_or(|s| s == "open")
    }
}

/// Port elements of an nmap XML report, in document order.
pub fn parse_ports(xml: &str) -> Result<Vec<PortEntry>> {
    if !xml.contains("<nmaprun") {
        return Err(TelescopeError::MalformedScanOutput(
            "no <nmaprun> element in scan output".to_string(),
        )
        .into());
    }

    let port_re = Regex::new(r#"(?s)<port\b([^>]*?)(?:/>|>(.*?)</port>)"#)?;
    let portid_re = Regex::new(r#"\bportid="(\d+)""#)?;
    let state_re = Regex::new(r#"<state\b[^>]*\bstate="([^"]*)""#)?;
    let service_re = Regex::new(r#"<service\b[^>]*\bname="([^"]*)""#)?;

    let mut ports = Vec::new();
    for cap in port_re.captures_iter(xml) {
        let attrs = cap.get(1).map_or("", |m| m.as_str());
        let body = cap.get(2).map_or("", |m| m.as_str());

        let port = portid_re
            .captures(attrs)
            .and_then(|c| c[1].parse::<u16>().ok())
            .ok_or_else(|| {
                TelescopeError::MalformedScanOutput(format!("port element without a valid portid: <port{}>", attrs))
            })?;

        ports.push(PortEntry {
            port,
            state: state_re.captures(body).map(|c| c[1].to_string()),
            service: service_re.captures(body).map(|c| c[1].to_string()),
        });
    }

    tracing::debug!("Parsed {} port entries from scan output", ports.len());
    Ok(ports)
}

pub fn open_ports(xml: &str) -> Result<Vec<u16>> {
    Ok(parse_ports(xml)?
        .into_iter()
        .filter(PortEntry::is_open)
        .map(|p| p.port)
        .collect())
}

/// Open ports whose service is http/https, with proxy variants folded in.
pub fn web_services(xml: &str) -> Result<Vec<WebService>> {
    Ok(parse_ports(xml)?
        .into_iter()
        .filter(PortEntry::is_open)
        .filter_map(|p| {
            let protocol = Protocol::from_service(p.service.as_deref()?)?;
            Some(WebService { protocol, port: p.port })
        })
        .collect())
}
