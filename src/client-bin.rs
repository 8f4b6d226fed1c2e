use consistent_ring::{
	client::setup_client,
	rpc::RingServiceClient
};
use tarpc::context;
use clap::Parser;
use inquire::{Text, CustomUserError};
use anyhow::anyhow;

#[derive(Parser)]
struct Args {
	/// Server addr to connect to (<host>:<port>)
	addr: String,
}

const COMMANDS: [&str; 7] = [
	"add",
	"remove",
	"locate",
	"load",
	"nodes",
	"get",
	"set"
];

fn suggest_command(v: &str) -> Result<Vec<String>, CustomUserError> {
	let mut result = Vec::new();
	for command in COMMANDS {
		if !v.is_empty() && command.starts_with(v) {
			result.push(command.to_string());
		}
	}
	Ok(result)
}

fn complete_command(v: &str) -> Result<Option<String>, CustomUserError> {
	let result = suggest_command(v)?;
	let command = if !result.is_empty() {
		Some(result[0].clone() + " ")
	}
	else {
		None
	};
	Ok(command)
}

async fn execute_command(client: &RingServiceClient, command: &str) -> anyhow::Result<()> {
	// execute command
	let words: Vec<_> = command.split_whitespace().collect();
	if words.is_empty() {
		return Err(anyhow!("invalid command"));
	}

	let ctx = context::current();
	match words[0] {
		"add" => {
			if words.len() < 2 {
				return Err(anyhow!("add: expected at least one node"));
			}
			let nodes = words[1..].iter().map(|w| w.to_string()).collect();
			client.add_nodes_rpc(ctx, nodes).await?;
		},
		"remove" => {
			if words.len() != 2 {
				return Err(anyhow!("remove: invalid number of arguments"));
			}
			client.remove_node_rpc(ctx, words[1].to_string()).await?;
		},
		"locate" => {
			if words.len() != 2 {
				return Err(anyhow!("locate: invalid number of arguments"));
			}
			match client.locate_rpc(ctx, words[1].to_string()).await? {
				Some(node) => println!("{}", node),
				None => return Err(anyhow!("locate: ring is empty"))
			};
		},
		"load" => {
			let mut shares: Vec<_> = client.load_distribution_rpc(ctx).await?.into_iter().collect();
			shares.sort_by(|a, b| a.0.cmp(&b.0));
			for (node, pct) in shares {
				println!("{}: {:.2}%", node, pct);
			}
		},
		"nodes" => {
			for node in client.nodes_rpc(ctx).await? {
				println!("{}", node);
			}
		},
		"get" => {
			if words.len() != 2 {
				return Err(anyhow!("get: invalid number of arguments"));
			}
			let value = client.get_rpc(ctx, words[1].to_string()).await?;
			match value {
				Some(v) => println!("{}", String::from_utf8(v)?),
				None => return Err(anyhow!("get: key doesn't exist"))
			};
		},
		"set" => {
			if words.len() < 2 || words.len() > 4 {
				return Err(anyhow!("set: invalid number of arguments"));
			}
			let ttl_secs = match words.get(3) {
				Some(t) => Some(t.parse::<u64>().map_err(|_| anyhow!("set: invalid ttl {}", t))?),
				None => None
			};
			let owner = client.set_rpc(
				ctx,
				words[1].to_string(),
				words.get(2).map(|v| v.as_bytes().to_vec()),
				ttl_secs
			).await?;
			match owner {
				Some(node) => println!("stored at {}", node),
				None => return Err(anyhow!("set: no node available"))
			};
		},
		_ => {
			return Err(anyhow!("invalid command"));
		}
	};
	Ok(())
}


#[tokio::main]
async fn main() -> anyhow::Result<()> {
	env_logger::init();
	let args = Args::parse();
	let client = setup_client(&args.addr).await?;

	loop {
		let command = Text::new("")
			.with_suggester(&suggest_command)
			.with_completer(&complete_command)
			.prompt()?;

		match execute_command(&client, &command).await {
			Ok(_) => (),
			Err(e) => println!("Error: {}", e)
		};
	}
}
