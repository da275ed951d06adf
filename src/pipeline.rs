use std::cmp::Ordering;
use std::net::{IpAddr, SocketAddr};

use hickory_proto::rr::RecordType;

use crate::errors::LookupError;
use crate::query::{fqdn, Query, QueryOptions};
use crate::resolve::{asn_lookup, lookup, resolve_addresses, reverse_lookup};
use crate::response::{answer_data, AnswerData};

/// Ordering applied to the zone's nameserver names before resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NsOrder {
	/// Plain ASCII string sort, case-sensitive. The default, kept for
	/// output compatibility even though it is not DNS name order.
	Lexicographic,
	/// DNS canonical order per RFC 4034 section 6.1: case-insensitive,
	/// compared label by label from the rightmost label.
	Canonical,
}

/// One line of pipeline output: a nameserver, one of its addresses, and
/// the best-effort ASN and PTR annotations for that address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRecord {
	pub nameserver: String,
	pub addr: IpAddr,
	pub asn: String,
	pub ptr: String,
}

/// Resolve a zone's nameserver metadata, emitting records as computed.
///
/// The initial NS lookup propagates any error and aborts the run. After
/// that, every per-nameserver and per-address lookup is best-effort: a
/// failure degrades to an empty address list, an empty ASN label, or the
/// NO-PTR sentinel, and the pass continues. Records flow through `emit`
/// in final order: nameservers sorted, IPv6 before IPv4 within each.
pub async fn run<F>(
	zone: &str,
	server: SocketAddr,
	opts: &QueryOptions,
	order: NsOrder,
	mut emit: F,
) -> Result<(), LookupError>
where
	F: FnMut(ResolvedRecord),
{
	let zone = fqdn(zone);
	let query = Query::new(&zone, RecordType::NS)
		.map_err(|e| LookupError::Protocol(e.to_string()))?;
	let response = lookup(&query, server, opts).await?;

	let mut ns_names: Vec<String> = answer_data(&response, RecordType::NS).into_iter()
		.filter_map(|data| match data {
			AnswerData::Ns(name) => Some(name.to_string()),
			_ => None,
		})
		.collect();
	match order {
		NsOrder::Lexicographic => ns_names.sort(),
		NsOrder::Canonical => ns_names.sort_by(|a, b| canonical_cmp(a, b)),
	}

	for ns_name in &ns_names {
		for addr in resolve_addresses(ns_name, server, opts).await {
			let asn = asn_lookup(addr, server, opts).await;
			let ptr = reverse_lookup(addr, server, opts).await;
			emit(ResolvedRecord {
				nameserver: ns_name.clone(),
				addr,
				asn,
				ptr,
			});
		}
	}

	Ok(())
}

/// Compare two domain names in DNS canonical order: lowercased labels,
/// rightmost label most significant, shorter name first on a shared suffix.
fn canonical_cmp(a: &str, b: &str) -> Ordering {
	fn labels(name: &str) -> Vec<String> {
		name.trim_end_matches('.')
			.split('.')
			.rev()
			.map(|label| label.to_ascii_lowercase())
			.collect()
	}
	labels(a).cmp(&labels(b))
}

#[cfg(test)]
mod tests {
	use super::*;

	use std::collections::HashMap;
	use std::time::Duration;

	use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
	use hickory_proto::rr::rdata::{A, AAAA, NS, PTR, TXT};
	use hickory_proto::rr::{Name, RData, Record};
	use tokio::net::UdpSocket;

	use crate::resolve::{asn_query_name, ptr_query_name};

	type ZoneTable = HashMap<(String, RecordType), Vec<Record>>;

	fn record(name: &str, rdata: RData) -> Record {
		Record::from_rdata(Name::from_ascii(name).unwrap(), 300, rdata)
	}

	fn name(s: &str) -> Name {
		Name::from_ascii(s).unwrap()
	}

	/// Add address, ASN, and PTR entries for one nameserver address.
	fn add_address(table: &mut ZoneTable, ns: &str, addr: IpAddr, asn_txt: &str, ptr: &str) {
		let (rtype, rdata) = match addr {
			IpAddr::V4(v4) => (RecordType::A, RData::A(A(v4))),
			IpAddr::V6(v6) => (RecordType::AAAA, RData::AAAA(AAAA(v6))),
		};
		table.entry((ns.to_string(), rtype)).or_default().push(record(ns, rdata));
		table.insert(
			(asn_query_name(addr), RecordType::TXT),
			vec![record(&asn_query_name(addr), RData::TXT(TXT::new(vec![asn_txt.to_string()])))],
		);
		table.insert(
			(ptr_query_name(addr), RecordType::PTR),
			vec![record(&ptr_query_name(addr), RData::PTR(PTR(name(ptr))))],
		);
	}

	/// Serve the table over UDP on a loopback port. Names absent from the
	/// table answer NXDOMAIN; present-but-empty entries answer NoError
	/// with zero records (NODATA).
	async fn spawn_zone_server(table: ZoneTable) -> SocketAddr {
		let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
		let addr = socket.local_addr().unwrap();
		tokio::spawn(async move {
			let mut buf = vec![0u8; 4096];
			loop {
				let Ok((len, src)) = socket.recv_from(&mut buf).await else { break };
				let Ok(request) = Message::from_vec(&buf[..len]) else { continue };
				let Some(q) = request.queries().first() else { continue };

				let mut response = Message::new();
				response.set_id(request.id());
				response.set_message_type(MessageType::Response);
				response.set_op_code(OpCode::Query);
				response.set_recursion_desired(true);
				response.set_recursion_available(true);
				response.add_query(q.clone());

				match table.get(&(q.name().to_string(), q.query_type())) {
					Some(records) => {
						response.set_response_code(ResponseCode::NoError);
						for r in records {
							response.add_answer(r.clone());
						}
					}
					None => {
						response.set_response_code(ResponseCode::NXDomain);
					}
				}
				let _ = socket.send_to(&response.to_vec().unwrap(), src).await;
			}
		});
		addr
	}

	fn test_opts() -> QueryOptions {
		QueryOptions {
			timeout: Duration::from_secs(2),
			max_retries: 2,
			..QueryOptions::default()
		}
	}

	async fn collect_records(
		zone: &str,
		server: SocketAddr,
	) -> Result<Vec<ResolvedRecord>, LookupError> {
		let mut records = Vec::new();
		run(zone, server, &test_opts(), NsOrder::Lexicographic, |r| records.push(r)).await?;
		Ok(records)
	}

	#[tokio::test]
	async fn test_two_nameservers_v6_before_v4() {
		let mut table = ZoneTable::new();
		// NS answers deliberately out of sorted order
		table.insert(
			("example.com.".to_string(), RecordType::NS),
			vec![
				record("example.com.", RData::NS(NS(name("ns2.example.com.")))),
				record("example.com.", RData::NS(NS(name("ns1.example.com.")))),
			],
		);
		add_address(&mut table, "ns1.example.com.", "2001:db8::1".parse().unwrap(),
			"64496 | 2001:db8::/32 | XX | test | 2026-01-01", "host1.example.net.");
		add_address(&mut table, "ns1.example.com.", "192.0.2.1".parse().unwrap(),
			"64496 | 192.0.2.0/24 | XX | test | 2026-01-01", "host1.example.net.");
		add_address(&mut table, "ns2.example.com.", "2001:db8::2".parse().unwrap(),
			"64497 | 2001:db8::/32 | XX | test | 2026-01-01", "host2.example.net.");
		add_address(&mut table, "ns2.example.com.", "192.0.2.2".parse().unwrap(),
			"64497 | 192.0.2.0/24 | XX | test | 2026-01-01", "host2.example.net.");

		let server = spawn_zone_server(table).await;
		let records = collect_records("example.com", server).await.unwrap();

		assert_eq!(records.len(), 4);
		// Nameservers in sorted order, IPv6 line before IPv4 within each
		assert_eq!(records[0].nameserver, "ns1.example.com.");
		assert_eq!(records[0].addr, "2001:db8::1".parse::<IpAddr>().unwrap());
		assert_eq!(records[0].asn, "AS[64496]");
		assert_eq!(records[0].ptr, "host1.example.net.");
		assert_eq!(records[1].nameserver, "ns1.example.com.");
		assert_eq!(records[1].addr, "192.0.2.1".parse::<IpAddr>().unwrap());
		assert_eq!(records[2].nameserver, "ns2.example.com.");
		assert_eq!(records[2].addr, "2001:db8::2".parse::<IpAddr>().unwrap());
		assert_eq!(records[3].nameserver, "ns2.example.com.");
		assert_eq!(records[3].addr, "192.0.2.2".parse::<IpAddr>().unwrap());
	}

	#[tokio::test]
	async fn test_aaaa_nodata_still_yields_ipv4() {
		let mut table = ZoneTable::new();
		table.insert(
			("example.com.".to_string(), RecordType::NS),
			vec![record("example.com.", RData::NS(NS(name("ns1.example.com."))))],
		);
		// AAAA present but empty: NoError with zero answers
		table.insert(("ns1.example.com.".to_string(), RecordType::AAAA), vec![]);
		add_address(&mut table, "ns1.example.com.", "192.0.2.1".parse().unwrap(),
			"64496 | 192.0.2.0/24 | XX | test | 2026-01-01", "host1.example.net.");

		let server = spawn_zone_server(table).await;
		let records = collect_records("example.com.", server).await.unwrap();

		assert_eq!(records.len(), 1);
		assert_eq!(records[0].addr, "192.0.2.1".parse::<IpAddr>().unwrap());
	}

	#[tokio::test]
	async fn test_missing_asn_and_ptr_degrade() {
		let mut table = ZoneTable::new();
		table.insert(
			("example.com.".to_string(), RecordType::NS),
			vec![record("example.com.", RData::NS(NS(name("ns1.example.com."))))],
		);
		// Address exists, but no ASN or PTR data anywhere
		table.insert(
			("ns1.example.com.".to_string(), RecordType::A),
			vec![record("ns1.example.com.", RData::A(A::new(192, 0, 2, 9)))],
		);

		let server = spawn_zone_server(table).await;
		let records = collect_records("example.com.", server).await.unwrap();

		assert_eq!(records.len(), 1);
		assert_eq!(records[0].asn, "");
		assert_eq!(records[0].ptr, "NO-PTR");
	}

	#[tokio::test]
	async fn test_ns_nxdomain_is_fatal_with_no_output() {
		let server = spawn_zone_server(ZoneTable::new()).await;
		let mut records = Vec::new();
		let result = run(
			"nonexistent.example", server, &test_opts(),
			NsOrder::Lexicographic, |r| records.push(r),
		).await;

		match result {
			Err(LookupError::NxDomain { name }) => assert_eq!(name, "nonexistent.example."),
			other => panic!("expected NxDomain, got {:?}", other),
		}
		assert!(records.is_empty());
	}

	#[tokio::test]
	async fn test_nameserver_sort_is_ascii_case_sensitive() {
		let mut table = ZoneTable::new();
		table.insert(
			("example.com.".to_string(), RecordType::NS),
			vec![
				record("example.com.", RData::NS(NS(name("ns2.example.com.")))),
				record("example.com.", RData::NS(NS(name("NS1.example.com.")))),
				record("example.com.", RData::NS(NS(name("ns10.example.com.")))),
			],
		);
		let server = spawn_zone_server(table).await;

		let query = Query::new("example.com.", RecordType::NS).unwrap();
		let response = lookup(&query, server, &test_opts()).await.unwrap();
		let mut names: Vec<String> = answer_data(&response, RecordType::NS).into_iter()
			.filter_map(|d| match d {
				AnswerData::Ns(n) => Some(n.to_string()),
				_ => None,
			})
			.collect();
		names.sort();
		assert_eq!(names, vec![
			"NS1.example.com.".to_string(),
			"ns10.example.com.".to_string(),
			"ns2.example.com.".to_string(),
		]);
	}

	#[test]
	fn test_canonical_cmp_is_case_insensitive_and_label_reversed() {
		assert_eq!(canonical_cmp("NS1.example.com.", "ns2.example.com."), Ordering::Less);
		// Rightmost label is most significant
		assert_eq!(canonical_cmp("z.a.example.", "a.b.example."), Ordering::Less);
		// A name sorts after its own suffix
		assert_eq!(canonical_cmp("example.com.", "a.example.com."), Ordering::Less);
		assert_eq!(canonical_cmp("ns1.Example.COM.", "NS1.example.com."), Ordering::Equal);
	}
}
