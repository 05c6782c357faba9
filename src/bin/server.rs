use std::net::TcpListener;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use ::log::{error, info};
use structopt::StructOpt;

use durakv::log::{DurableLog, FileLog, SqliteLog};
use durakv::recovery::recover;
use durakv::Server;

#[derive(StructOpt)]
#[structopt(name = "durakv-server", about = "Durable ordered key-value store server")]
struct Opt {
	/// Address to listen on.
	#[structopt(long, default_value = "127.0.0.1:7878")]
	listen: String,

	/// Use the file-backed durable log at this path.
	#[structopt(long, parse(from_os_str), conflicts_with = "db_dir")]
	log_file: Option<PathBuf>,

	/// Use the embedded-database durable log in this directory.
	#[structopt(long, parse(from_os_str), conflicts_with = "log_file")]
	db_dir: Option<PathBuf>,
}

fn main() {
	env_logger::init();
	let opt = Opt::from_args();

	let mut backend: Box<dyn DurableLog> = match (&opt.log_file, &opt.db_dir) {
		(Some(path), None) => match FileLog::open(path) {
			Ok(log) => Box::new(log),
			Err(e) => {
				error!(target: "durakv::server", "failed to open file log at {}: {}", path.display(), e);
				process::exit(1);
			}
		},
		(None, Some(dir)) => match SqliteLog::open(dir) {
			Ok(log) => Box::new(log),
			Err(e) => {
				error!(target: "durakv::server", "failed to open sqlite log at {}: {}", dir.display(), e);
				process::exit(1);
			}
		},
		_ => {
			eprintln!("exactly one of --log-file or --db-dir must be given");
			process::exit(2);
		}
	};

	let index = match recover(backend.as_mut()) {
		Ok(index) => index,
		Err(e) => {
			error!(target: "durakv::server", "recovery failed, refusing to serve: {}", e);
			process::exit(1);
		}
	};
	info!(target: "durakv::server", "recovered {} entries", index.len());

	let listener = match TcpListener::bind(&opt.listen) {
		Ok(l) => l,
		Err(e) => {
			error!(target: "durakv::net", "failed to bind {}: {}", opt.listen, e);
			process::exit(1);
		}
	};
	let server = Arc::new(Server::new(index, backend));

	if let Err(e) = durakv::net::serve(listener, server) {
		error!(target: "durakv::net", "listener loop exited: {}", e);
		process::exit(1);
	}
}
