use std::net::SocketAddr;

use anyhow::{anyhow, Context, Result};

const RESOLV_CONF: &str = "/etc/resolv.conf";

/// Parse a resolver address string into a socket address, port 53 unless
/// given explicitly.
///
/// Supports formats:
///   "1.1.1.1"              -- IPv4, default port 53
///   "1.1.1.1:53"           -- IPv4 with explicit port
///   "2606:4700::1111"      -- bare IPv6, default port 53
///   "[2606:4700::1111]:53" -- bracketed IPv6 with port
pub fn parse_resolver(input: &str) -> Result<SocketAddr> {
	let trimmed = input.trim();
	if trimmed.is_empty() {
		return Err(anyhow!("empty resolver address"));
	}

	if trimmed.starts_with('[') {
		// Bracketed IPv6 with port: [::1]:53
		return trimmed.parse()
			.map_err(|e| anyhow!("invalid bracketed IPv6 address '{}': {}", trimmed, e));
	}
	if trimmed.contains("::") || trimmed.matches(':').count() > 1 {
		// Bare IPv6 address without port
		let ip = trimmed.parse()
			.map_err(|e| anyhow!("invalid IPv6 address '{}': {}", trimmed, e))?;
		return Ok(SocketAddr::new(ip, 53));
	}
	if let Ok(addr) = trimmed.parse::<SocketAddr>() {
		// IPv4 with port (e.g. "8.8.8.8:5353")
		return Ok(addr);
	}
	// Plain IPv4 without port
	let ip = trimmed.parse()
		.map_err(|e| anyhow!("invalid IP address '{}': {}", trimmed, e))?;
	Ok(SocketAddr::new(ip, 53))
}

/// Discover the system's default resolver: the first nameserver line of
/// /etc/resolv.conf. The whole run queries this one address.
///
/// Failing to find one is an error; the caller decides whether a CLI
/// override makes that survivable.
pub fn system_resolver() -> Result<SocketAddr> {
	let content = std::fs::read_to_string(RESOLV_CONF)
		.with_context(|| format!("failed to read {}", RESOLV_CONF))?;
	first_nameserver(&content)
		.ok_or_else(|| anyhow!("no usable nameserver line in {}", RESOLV_CONF))
}

fn first_nameserver(content: &str) -> Option<SocketAddr> {
	for line in content.lines() {
		let trimmed = line.trim();
		if trimmed.starts_with('#') {
			continue;
		}
		let mut parts = trimmed.split_whitespace();
		if parts.next() != Some("nameserver") {
			continue;
		}
		if let Some(address) = parts.next() {
			if let Ok(resolver) = parse_resolver(address) {
				return Some(resolver);
			}
		}
	}
	None
}
