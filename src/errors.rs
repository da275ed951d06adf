use std::net::SocketAddr;

use hickory_proto::rr::RecordType;
use thiserror::Error;

/// Classified outcome of a single DNS lookup.
///
/// Transport and Timeout cover delivery failures, Protocol covers replies
/// that could not be understood, and the remaining variants map resolver
/// response codes and empty answers onto typed errors. The initial NS
/// lookup propagates any of these as fatal; per-nameserver sub-lookups
/// degrade to empty results instead (see pipeline and resolve modules).
#[derive(Debug, Error)]
pub enum LookupError {
	/// Socket-level failure other than a timeout. Never retried.
	#[error("network error: {0}")]
	Transport(#[from] std::io::Error),

	/// No usable reply before the deadline, after all retry attempts.
	#[error("no response from {server} after {attempts} attempt(s)")]
	Timeout { server: SocketAddr, attempts: u32 },

	/// The reply could not be parsed as a DNS message.
	#[error("malformed response: {0}")]
	Protocol(String),

	/// The queried name does not exist.
	#[error("NXDOMAIN: {name}: name doesn't exist")]
	NxDomain { name: String },

	/// Any response code other than NoError or NXDomain.
	#[error("response code: {rcode}")]
	ServerFailure { rcode: String },

	/// The query succeeded but returned no records of the requested type.
	#[error("NODATA: {name}/{rtype}")]
	NoData { name: String, rtype: RecordType },
}
