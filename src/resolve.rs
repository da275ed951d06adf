use std::net::{IpAddr, SocketAddr};

use hickory_proto::op::Message;
use hickory_proto::rr::RecordType;

use crate::errors::LookupError;
use crate::query::{Query, QueryOptions};
use crate::response::{answer_data, classify, AnswerData};
use crate::transport::send_query;

const ASN_SUFFIX_V4: &str = "origin.asn.cymru.com.";
const ASN_SUFFIX_V6: &str = "origin6.asn.cymru.com.";

/// Sentinel emitted when an address has no usable PTR record.
pub const NO_PTR: &str = "NO-PTR";

/// Send a query and classify the reply in one step.
///
/// Every lookup in the pipeline goes through here; the caller decides
/// whether a returned error is fatal or degrades to an empty result.
pub async fn lookup(
	query: &Query,
	server: SocketAddr,
	opts: &QueryOptions,
) -> Result<Message, LookupError> {
	let response = send_query(query, server, opts).await?;
	classify(response, query)
}

/// Resolve a hostname to its addresses, IPv6 first.
///
/// Queries AAAA then A and appends each successful type's addresses in
/// query order. A failing family contributes nothing; the error is logged
/// and swallowed so a single-family host still yields results. Never
/// fails the caller.
pub async fn resolve_addresses(
	hostname: &str,
	server: SocketAddr,
	opts: &QueryOptions,
) -> Vec<IpAddr> {
	let mut addresses = Vec::new();
	for rtype in [RecordType::AAAA, RecordType::A] {
		match address_lookup(hostname, rtype, server, opts).await {
			Ok(mut list) => addresses.append(&mut list),
			Err(e) => {
				log::debug!("{}/{}: {}", hostname, rtype, e);
			}
		}
	}
	addresses
}

async fn address_lookup(
	hostname: &str,
	rtype: RecordType,
	server: SocketAddr,
	opts: &QueryOptions,
) -> Result<Vec<IpAddr>, LookupError> {
	let query = Query::new(hostname, rtype)
		.map_err(|e| LookupError::Protocol(e.to_string()))?;
	let response = lookup(&query, server, opts).await?;
	Ok(answer_data(&response, rtype).into_iter()
		.filter_map(|data| match data {
			AnswerData::A(addr) => Some(IpAddr::V4(addr)),
			AnswerData::Aaaa(addr) => Some(IpAddr::V6(addr)),
			_ => None,
		})
		.collect())
}

/// Reverse-lookup query name for an address: in-addr.arpa for IPv4,
/// nibble-format ip6.arpa for IPv6.
pub fn ptr_query_name(addr: IpAddr) -> String {
	match addr {
		IpAddr::V4(v4) => {
			let o = v4.octets();
			format!("{}.{}.{}.{}.in-addr.arpa.", o[3], o[2], o[1], o[0])
		}
		IpAddr::V6(v6) => {
			format!("{}ip6.arpa.", reverse_nibbles(&v6.octets()))
		}
	}
}

/// Render the bytes as dotted lowercase hex nibbles in reverse order,
/// low nibble before high nibble, with a trailing dot.
fn reverse_nibbles(octets: &[u8; 16]) -> String {
	const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";
	let mut out = String::with_capacity(octets.len() * 4);
	for byte in octets.iter().rev() {
		out.push(HEX_DIGITS[(byte & 0xf) as usize] as char);
		out.push('.');
		out.push(HEX_DIGITS[(byte >> 4) as usize] as char);
		out.push('.');
	}
	out
}

/// Look up the PTR name for an address, degrading to the NO-PTR sentinel.
///
/// Reverse names are best-effort annotations; any failure is logged and
/// replaced with the sentinel rather than propagated.
pub async fn reverse_lookup(addr: IpAddr, server: SocketAddr, opts: &QueryOptions) -> String {
	match try_reverse_lookup(addr, server, opts).await {
		Ok(name) => name,
		Err(e) => {
			log::debug!("PTR {}: {}", addr, e);
			NO_PTR.to_string()
		}
	}
}

async fn try_reverse_lookup(
	addr: IpAddr,
	server: SocketAddr,
	opts: &QueryOptions,
) -> Result<String, LookupError> {
	let query = Query::new(&ptr_query_name(addr), RecordType::PTR)
		.map_err(|e| LookupError::Protocol(e.to_string()))?;
	let response = lookup(&query, server, opts).await?;
	match answer_data(&response, RecordType::PTR).into_iter().next() {
		Some(AnswerData::Ptr(target)) => Ok(target.to_string()),
		_ => Err(LookupError::NoData {
			name: query.name().to_string(),
			rtype: RecordType::PTR,
		}),
	}
}

/// ASN-lookup query name for an address, per the Team Cymru origin
/// convention: reversed octets for IPv4, reversed nibbles for IPv6, each
/// under the fixed suffix.
pub fn asn_query_name(addr: IpAddr) -> String {
	match addr {
		IpAddr::V4(v4) => {
			let o = v4.octets();
			format!("{}.{}.{}.{}.{}", o[3], o[2], o[1], o[0], ASN_SUFFIX_V4)
		}
		IpAddr::V6(v6) => {
			format!("{}{}", reverse_nibbles(&v6.octets()), ASN_SUFFIX_V6)
		}
	}
}

/// Look up the AS number announcing an address, as a label like "AS[15169]".
///
/// Same best-effort policy as reverse lookup: any failure yields an empty
/// label and the run continues.
pub async fn asn_lookup(addr: IpAddr, server: SocketAddr, opts: &QueryOptions) -> String {
	match try_asn_lookup(addr, server, opts).await {
		Ok(label) => label,
		Err(e) => {
			log::debug!("ASN {}: {}", addr, e);
			String::new()
		}
	}
}

async fn try_asn_lookup(
	addr: IpAddr,
	server: SocketAddr,
	opts: &QueryOptions,
) -> Result<String, LookupError> {
	let query = Query::new(&asn_query_name(addr), RecordType::TXT)
		.map_err(|e| LookupError::Protocol(e.to_string()))?;
	let response = lookup(&query, server, opts).await?;
	let strings = match answer_data(&response, RecordType::TXT).into_iter().next() {
		Some(AnswerData::Txt(strings)) => strings,
		_ => Vec::new(),
	};
	// First text string looks like "15169 | 192.0.2.0/24 | US | arin | ..."
	let asn = strings.first()
		.and_then(|s| s.split('|').next())
		.map(|field| field.trim_end_matches(' '))
		.ok_or_else(|| LookupError::NoData {
			name: query.name().to_string(),
			rtype: RecordType::TXT,
		})?;
	Ok(format!("AS[{}]", asn))
}
