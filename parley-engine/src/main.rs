use clap::Parser;
use parley_engine::config::CliArgs;
use parley_engine::server::ChatServer;
use parley_engine::session::ChatSession;
use parley_engine::transport::NdjsonTransport;

fn main() {
	let args = CliArgs::parse();

	// stdout carries the protocol, so logs go to stderr
	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
		)
		.init();

	let session = match ChatSession::open(args.session_config()) {
		Ok(s) => s,
		Err(e) => {
			tracing::error!(code = e.code(), "Failed to open vocabulary: {}", e);
			std::process::exit(1);
		}
	};

	let mut server = ChatServer::new(NdjsonTransport::new(), session);

	tracing::info!("parley-engine ready");

	if let Err(e) = server.run() {
		tracing::error!("Server error: {}", e);
		std::process::exit(1);
	}
}
