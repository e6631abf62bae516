use crate::error::{EmulatorError, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Runtime configuration of the emulator
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP/control listener binds to
    pub listen_addr: SocketAddr,
    /// Serve HTTPS/WSS instead of plain HTTP/WS
    pub use_tls: bool,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    /// Where the pairing token is persisted
    pub token_path: PathBuf,
    /// Run the multicast discovery responder
    pub discovery: bool,
    /// Port the discovery responder binds to
    pub discovery_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8001)),
            use_tls: false,
            cert_path: PathBuf::from("cert.pem"),
            key_path: PathBuf::from("key.pem"),
            token_path: PathBuf::from("tv_token.txt"),
            discovery: true,
            discovery_port: crate::discovery::SSDP_PORT,
        }
    }
}

/// Command line, with every option also readable from the environment
#[derive(Debug, Parser)]
#[command(
    name = "smarttv-emulator",
    version,
    about = "Emulates a smart TV's discovery and remote-control protocols"
)]
pub struct Cli {
    /// Port for the HTTP endpoints and control channel.
    #[arg(long, env = "FAKE_TV_PORT", default_value_t = 8001)]
    pub port: u16,

    /// Interface address to listen on.
    #[arg(long, env = "FAKE_TV_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// Serve the encrypted (HTTPS/WSS) variant.
    #[arg(
        long,
        env = "FAKE_TV_WSS",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub wss: bool,

    /// PEM certificate used when --wss is set.
    #[arg(long, env = "FAKE_TV_CERT", default_value = "cert.pem")]
    pub cert: PathBuf,

    /// PEM (PKCS#8) private key used when --wss is set.
    #[arg(long, env = "FAKE_TV_KEY", default_value = "key.pem")]
    pub key: PathBuf,

    /// File holding the persisted pairing token.
    #[arg(long, env = "FAKE_TV_TOKEN", default_value = "tv_token.txt")]
    pub token_file: PathBuf,

    /// Do not start the multicast discovery responder.
    #[arg(
        long,
        env = "FAKE_TV_NO_DISCOVERY",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub no_discovery: bool,
}

impl TryFrom<Cli> for Config {
    type Error = EmulatorError;

    fn try_from(cli: Cli) -> Result<Self> {
        let ip: IpAddr = cli
            .bind
            .parse()
            .map_err(|_| EmulatorError::InvalidConfig(format!("invalid bind address: {}", cli.bind)))?;

        Ok(Config {
            listen_addr: SocketAddr::new(ip, cli.port),
            use_tls: cli.wss,
            cert_path: cli.cert,
            key_path: cli.key,
            token_path: cli.token_file,
            discovery: !cli.no_discovery,
            ..Config::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_device() {
        let cli = Cli::parse_from(["smarttv-emulator"]);
        let config = Config::try_from(cli).unwrap();
        assert_eq!(config.listen_addr, SocketAddr::from(([0, 0, 0, 0], 8001)));
        assert!(!config.use_tls);
        assert!(config.discovery);
        assert_eq!(config.token_path, PathBuf::from("tv_token.txt"));
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "smarttv-emulator",
            "--port",
            "9001",
            "--bind",
            "127.0.0.1",
            "--wss",
            "--no-discovery",
        ]);
        let config = Config::try_from(cli).unwrap();
        assert_eq!(config.listen_addr, SocketAddr::from(([127, 0, 0, 1], 9001)));
        assert!(config.use_tls);
        assert!(!config.discovery);
    }

    #[test]
    fn rejects_bad_bind_address() {
        let cli = Cli::parse_from(["smarttv-emulator", "--bind", "not-an-ip"]);
        assert!(matches!(
            Config::try_from(cli),
            Err(EmulatorError::InvalidConfig(_))
        ));
    }
}
