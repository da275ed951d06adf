mod cli;
mod errors;
mod output;
mod pipeline;
mod query;
mod resolve;
mod resolver;
mod response;
mod transport;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use crate::cli::Cli;
use crate::pipeline::NsOrder;
use crate::query::QueryOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	env_logger::init();
	let cli = Cli::parse();

	// One resolver for the whole run: CLI override or system default
	let server = match &cli.resolver {
		Some(input) => resolver::parse_resolver(input)?,
		None => resolver::system_resolver()
			.context("no resolver found; pass one with --resolver")?,
	};
	log::debug!("using resolver {}", server);

	let opts = QueryOptions {
		authenticated_data: cli.ad,
		checking_disabled: cli.cd,
		edns_payload_size: cli.payload,
		timeout: Duration::from_millis(cli.timeout),
		max_retries: cli.retries,
		..QueryOptions::default()
	};
	let order = if cli.canonical_order {
		NsOrder::Canonical
	} else {
		NsOrder::Lexicographic
	};

	pipeline::run(&cli.zone, server, &opts, order, |record| {
		output::print_record(&record);
	}).await?;

	Ok(())
}
