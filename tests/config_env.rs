use clap::Parser;
use smarttv_emulator::{Cli, Config};

// Environment flags are process-wide, so this lives in its own test binary.
#[test]
fn env_flags_accept_any_case() {
    std::env::set_var("FAKE_TV_WSS", "TRUE");
    std::env::set_var("FAKE_TV_NO_DISCOVERY", "True");
    let config = Config::try_from(Cli::try_parse_from(["smarttv-emulator"]).unwrap()).unwrap();
    assert!(config.use_tls);
    assert!(!config.discovery);

    std::env::set_var("FAKE_TV_WSS", "false");
    std::env::set_var("FAKE_TV_NO_DISCOVERY", "0");
    let config = Config::try_from(Cli::try_parse_from(["smarttv-emulator"]).unwrap()).unwrap();
    assert!(!config.use_tls);
    assert!(config.discovery);

    std::env::remove_var("FAKE_TV_WSS");
    std::env::remove_var("FAKE_TV_NO_DISCOVERY");
}
