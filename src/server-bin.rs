use consistent_ring::core::{
	config::*,
	RingServer
};
use clap::Parser;

#[derive(Parser)]
struct Args {
	/// Local addr to bind (<host>:<port>)
	addr: String,

	/// Positions per physical node on the ring
	#[clap(short, long, default_value_t = 1)]
	virtual_nodes: usize,

	/// Add a node to the ring on startup (repeatable)
	#[clap(short, long = "node")]
	nodes: Vec<String>,

	/// Buckets in each node-local store
	#[clap(short, long, default_value_t = 64)]
	buckets: usize
}


#[tokio::main]
async fn main() -> anyhow::Result<()> {
	env_logger::init();
	let args = Args::parse();

	let config = Config {
		virtual_nodes: args.virtual_nodes,
		store_buckets: args.buckets,
		..Config::default()
	};
	let s = RingServer::new(&args.addr, config)?;
	if !args.nodes.is_empty() {
		s.add_nodes(args.nodes)?;
	}
	let manager = s.start().await?;
	manager.wait().await?;
	Ok(())
}
