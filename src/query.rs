use std::time::Duration;

use anyhow::{anyhow, Result};
use hickory_proto::rr::{DNSClass, RecordType};

/// A single DNS question: name, record type, class.
///
/// Immutable once built; identity is structural.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
	name: String,
	rtype: RecordType,
	class: DNSClass,
}

impl Query {
	/// Build a question for the given name and record type (class IN).
	///
	/// The name must be non-empty; callers are expected to pass a
	/// fully-qualified name (see [`fqdn`]).
	pub fn new(name: &str, rtype: RecordType) -> Result<Self> {
		if name.is_empty() {
			return Err(anyhow!("empty query name"));
		}
		Ok(Query {
			name: name.to_string(),
			rtype,
			class: DNSClass::IN,
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn rtype(&self) -> RecordType {
		self.rtype
	}

	pub fn class(&self) -> DNSClass {
		self.class
	}
}

/// Transport options applied to every query in a run.
///
/// Built once at startup from the CLI and passed by reference into
/// transport and resolver calls; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct QueryOptions {
	pub recursion_desired: bool,
	pub authenticated_data: bool,
	pub checking_disabled: bool,
	pub edns_payload_size: u16,
	pub timeout: Duration,
	/// Total UDP attempts, including the first.
	pub max_retries: u32,
}

impl Default for QueryOptions {
	fn default() -> Self {
		QueryOptions {
			recursion_desired: true,
			authenticated_data: false,
			checking_disabled: false,
			edns_payload_size: 1232,
			timeout: Duration::from_secs(3),
			max_retries: 3,
		}
	}
}

/// Return the fully-qualified form of a domain name.
///
/// Appends the terminating dot if absent; idempotent.
pub fn fqdn(name: &str) -> String {
	if name.ends_with('.') {
		name.to_string()
	} else {
		format!("{}.", name)
	}
}
