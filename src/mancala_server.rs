// src/mancala_server.rs
// Entry point of the Mancala game server.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use mancala::config::ServerConfig;
use mancala::logging::{log_error_stderr, log_info, set_verbose};
use mancala::server::Server;

#[derive(Parser, Debug)]
#[command(name = "mancala-server")]
#[command(about = "Multiplayer Mancala over a plain text line protocol")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Pebbles per pit for the first player
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pebbles: Option<u32>,

    /// Configuration file (key = value) [default: conf/server.conf]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory where finished games are archived as JSON
    #[arg(long)]
    dump_dir: Option<PathBuf>,

    /// Log debug messages
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load_from_or_default(path),
            None => ServerConfig::load_or_default(),
        };
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(pebbles) = self.pebbles {
            config.pebbles = pebbles;
        }
        if self.dump_dir.is_some() {
            config.dump_dir = self.dump_dir;
        }
        config
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    set_verbose(args.verbose);
    let config = args.into_config();

    let server = match Server::bind(config.clone()).await {
        Ok(server) => server,
        Err(e) => {
            log_error_stderr(&format!("Failed to listen on {}: {e}", config.listen_addr()));
            return ExitCode::FAILURE;
        }
    };

    match server.run().await {
        Ok(record) => {
            log_info(&format!("Game {} finished with {} players", record.id, record.scores.len()));
            ExitCode::SUCCESS
        }
        Err(e) => {
            log_error_stderr(&format!("Server error: {e}"));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "mancala-server",
            "-p",
            "4000",
            "--pebbles",
            "6",
            "--config",
            "/nonexistent/server.conf",
        ]);
        let config = args.into_config();
        assert_eq!(config.port, 4000);
        assert_eq!(config.pebbles, 6);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.dump_dir, None);
    }

    #[test]
    fn test_config_path_defaults_to_conf_dir() {
        let args = Args::parse_from(["mancala-server"]);
        assert_eq!(args.config, None);
        let config = args.into_config();
        assert!(config.pebbles > 0);
    }

    #[test]
    fn test_rejects_zero_pebbles() {
        assert!(Args::try_parse_from(["mancala-server", "--pebbles", "0"]).is_err());
    }
}
