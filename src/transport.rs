use std::net::SocketAddr;
use std::time::Instant;

use hickory_proto::op::{Edns, Message, MessageType, Query as WireQuery};
use hickory_proto::rr::Name;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};

use crate::errors::LookupError;
use crate::query::{Query, QueryOptions};

/// Serialize a query into wire format with the transport options applied.
///
/// The message carries the transaction ID, the RD/AD/CD flags, and an
/// EDNS(0) OPT record advertising the configured payload size.
fn build_message(query: &Query, opts: &QueryOptions, txid: u16) -> Result<Vec<u8>, LookupError> {
	let name = Name::from_ascii(query.name())
		.map_err(|e| LookupError::Protocol(format!("invalid query name '{}': {}", query.name(), e)))?;

	let mut message = Message::new();
	message.set_id(txid);
	message.set_recursion_desired(opts.recursion_desired);
	message.set_authentic_data(opts.authenticated_data);
	message.set_checking_disabled(opts.checking_disabled);

	let mut question = WireQuery::query(name, query.rtype());
	question.set_query_class(query.class());
	message.add_query(question);

	let edns = message.extensions_mut().get_or_insert_with(Edns::new);
	edns.set_max_payload(opts.edns_payload_size);
	edns.set_version(0);

	message.to_vec()
		.map_err(|e| LookupError::Protocol(format!("failed to serialize query: {}", e)))
}

/// Send a query and return the resolver's reply.
///
/// Delivery is UDP with bounded retry on timeout. If the UDP reply comes
/// back truncated, exactly one follow-up exchange runs over TCP and its
/// reply replaces the truncated one. This is the only place retries happen;
/// protocol-level rejections (NXDOMAIN, SERVFAIL) are classified later and
/// never retried.
pub async fn send_query(
	query: &Query,
	server: SocketAddr,
	opts: &QueryOptions,
) -> Result<Message, LookupError> {
	let txid: u16 = rand::random();
	let wire = build_message(query, opts, txid)?;

	let response = exchange_udp(&wire, server, opts, txid).await?;
	if !response.truncated() {
		return Ok(response);
	}

	log::debug!(
		"truncated UDP reply for {}/{}, retrying over TCP",
		query.name(), query.rtype(),
	);
	exchange_tcp(&wire, server, opts, txid).await
}

/// Exchange a wire message over UDP with up to `max_retries` attempts.
///
/// Only a timed-out attempt consumes retry budget; any other socket error
/// aborts immediately. Within one attempt, datagrams from the wrong source
/// or with the wrong transaction ID are ignored and the socket is read
/// again until the attempt's deadline.
async fn exchange_udp(
	wire: &[u8],
	server: SocketAddr,
	opts: &QueryOptions,
	txid: u16,
) -> Result<Message, LookupError> {
	let bind_addr = if server.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
	let socket = UdpSocket::bind(bind_addr).await?;

	let mut buf = vec![0u8; opts.edns_payload_size.max(512) as usize];

	for _attempt in 0..opts.max_retries {
		socket.send_to(wire, server).await?;

		let deadline = Instant::now() + opts.timeout;
		loop {
			let remaining = deadline.saturating_duration_since(Instant::now());
			if remaining.is_zero() {
				break;
			}
			match tokio::time::timeout(remaining, socket.recv_from(&mut buf)).await {
				Ok(Ok((len, src))) => {
					if src.ip() != server.ip() {
						continue;
					}
					// A stray datagram that does not parse, or carries the
					// wrong id, is not ours; keep listening for the real
					// reply until the attempt's deadline
					let message = match Message::from_vec(&buf[..len]) {
						Ok(m) => m,
						Err(e) => {
							log::debug!("ignoring unparseable datagram: {}", e);
							continue;
						}
					};
					if message.id() != txid
						|| message.message_type() != MessageType::Response
					{
						continue;
					}
					return Ok(message);
				}
				Ok(Err(e)) => return Err(LookupError::Transport(e)),
				Err(_) => break,
			}
		}
	}

	Err(LookupError::Timeout { server, attempts: opts.max_retries })
}

/// Exchange a wire message over TCP, single attempt.
///
/// Messages are length-prefixed with a 2-byte big-endian count per
/// RFC 1035. The whole exchange shares one deadline.
async fn exchange_tcp(
	wire: &[u8],
	server: SocketAddr,
	opts: &QueryOptions,
	txid: u16,
) -> Result<Message, LookupError> {
	let exchange = async {
		let mut stream = TcpStream::connect(server).await?;
		stream.write_all(&(wire.len() as u16).to_be_bytes()).await?;
		stream.write_all(wire).await?;

		let mut len_buf = [0u8; 2];
		stream.read_exact(&mut len_buf).await?;
		let mut reply = vec![0u8; u16::from_be_bytes(len_buf) as usize];
		stream.read_exact(&mut reply).await?;
		Ok::<_, std::io::Error>(reply)
	};

	let reply = tokio::time::timeout(opts.timeout, exchange)
		.await
		.map_err(|_| LookupError::Timeout { server, attempts: 1 })??;

	let message = Message::from_vec(&reply)
		.map_err(|e| LookupError::Protocol(format!("failed to parse DNS response: {}", e)))?;
	if message.id() != txid || message.message_type() != MessageType::Response {
		return Err(LookupError::Protocol("TCP reply id does not match query".to_string()));
	}
	Ok(message)
}
