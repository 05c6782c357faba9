mod commands;
mod wire;

use anyhow::Result;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(name = "durakv-client", about = "Client for the durakv key-value store")]
struct Opt {
	/// Address of the durakv server to connect to.
	#[structopt(long, default_value = "127.0.0.1:7878")]
	server: String,

	#[structopt(subcommand)]
	command: Option<Command>,
}

#[derive(StructOpt)]
pub enum Command {
	/// Insert or replace a key's value.
	Put { key: String, value: String },
	/// Look up a key.
	Get { key: String },
	/// Insert or replace a key's value, printing the displaced value.
	Swap { key: String, value: String },
	/// Remove a key.
	Delete { key: String },
	/// List all entries with key in [start, end], inclusive.
	Scan { start: String, end: String },
}

fn main() -> Result<()> {
	let opt = Opt::from_args();

	match opt.command {
		Some(command) => commands::exec::run(&opt.server, command),
		None => commands::shell::run(&opt.server),
	}
}
