use std::net::{Ipv4Addr, Ipv6Addr};

use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::{Name, RData, RecordType};

use crate::errors::LookupError;
use crate::query::Query;

/// Typed payload of one answer record, one case per record kind consumed.
///
/// Extraction pattern-matches on the wire rdata, so a record of an
/// unexpected type is simply skipped instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerData {
	A(Ipv4Addr),
	Aaaa(Ipv6Addr),
	Ns(Name),
	Ptr(Name),
	Txt(Vec<String>),
}

/// Decide whether a reply is a usable answer to the given query.
///
/// This is the single authority every resolver goes through:
/// - NXDomain becomes an error carrying the queried name
/// - any other non-NoError code becomes a server failure with the code text
/// - NoError with zero answers of the query's type becomes NODATA
/// - otherwise the message passes through unchanged
pub fn classify(response: Message, query: &Query) -> Result<Message, LookupError> {
	match response.response_code() {
		ResponseCode::NoError => {}
		ResponseCode::NXDomain => {
			return Err(LookupError::NxDomain { name: query.name().to_string() });
		}
		rcode => {
			return Err(LookupError::ServerFailure { rcode: rcode.to_string() });
		}
	}

	let relevant = response.answers().iter()
		.filter(|r| r.record_type() == query.rtype())
		.count();
	if relevant == 0 {
		return Err(LookupError::NoData {
			name: query.name().to_string(),
			rtype: query.rtype(),
		});
	}

	Ok(response)
}

/// Extract the typed data of every answer record of the given type,
/// in message order. Records of other types are ignored.
pub fn answer_data(response: &Message, rtype: RecordType) -> Vec<AnswerData> {
	response.answers().iter()
		.filter(|r| r.record_type() == rtype)
		.filter_map(|r| match r.data() {
			RData::A(a) => Some(AnswerData::A(a.0)),
			RData::AAAA(aaaa) => Some(AnswerData::Aaaa(aaaa.0)),
			RData::NS(ns) => Some(AnswerData::Ns(ns.0.clone())),
			RData::PTR(ptr) => Some(AnswerData::Ptr(ptr.0.clone())),
			RData::TXT(txt) => Some(AnswerData::Txt(
				txt.txt_data().iter()
					.map(|s| String::from_utf8_lossy(s).into_owned())
					.collect(),
			)),
			_ => None,
		})
		.collect()
}
