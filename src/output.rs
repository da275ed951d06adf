use crate::pipeline::ResolvedRecord;

/// Render one result line: nameserver, address, ASN label, PTR name,
/// whitespace-separated. No header, no summary.
pub fn format_record(record: &ResolvedRecord) -> String {
	format!(
		"{} {} {} {}",
		record.nameserver, record.addr, record.asn, record.ptr,
	)
}

pub fn print_record(record: &ResolvedRecord) {
	println!("{}", format_record(record));
}
