use clap::Parser;

/// Nameserver placement audit tool
#[derive(Parser, Debug)]
#[command(name = "nsinfo")]
#[command(about = "Resolve a zone's nameservers with their addresses, origin ASNs, and reverse DNS")]
pub struct Cli {
	/// Zone name to audit (e.g. example.com)
	pub zone: String,

	/// Resolver to query instead of the system default (e.g. 9.9.9.9 or [::1]:5353)
	#[arg(short = 'r', long = "resolver")]
	pub resolver: Option<String>,

	/// Per-attempt query timeout in milliseconds
	#[arg(short = 't', long = "timeout", default_value = "3000")]
	pub timeout: u64,

	/// Total UDP attempts per query, including the first
	#[arg(long = "retries", default_value = "3", value_parser = clap::value_parser!(u32).range(1..))]
	pub retries: u32,

	/// EDNS advertised UDP payload size in bytes
	#[arg(long = "payload", default_value = "1232")]
	pub payload: u16,

	/// Set the AD (authenticated data) bit on queries
	#[arg(long = "ad")]
	pub ad: bool,

	/// Set the CD (checking disabled) bit on queries
	#[arg(long = "cd")]
	pub cd: bool,

	/// Sort nameserver names in DNS canonical order instead of plain ASCII
	#[arg(long = "canonical-order")]
	pub canonical_order: bool,
}
