//! `vortex join-token` — mint a join token and print the join instruction

use super::COMMAND_BASE;
use crate::settings::AppConfig;
use anyhow::Result;
use vortex_core::JoinToken;

/// Run the join-token command
pub fn run(config: &AppConfig, host: Option<String>) -> Result<()> {
    let token = mint(config, host)?;

    println!("\n{}\n", join_command(COMMAND_BASE, &token));
    println!(
        "  Valid until {} ({}s).",
        token.expires_at().format("%Y-%m-%d %H:%M:%S UTC"),
        token.ttl().num_seconds()
    );
    println!();

    Ok(())
}

/// Mint a standalone token from the `[join_token]` and `[discovery]` tables,
/// with `host` taking precedence over the configured host.
pub fn mint(config: &AppConfig, host: Option<String>) -> vortex_core::Result<JoinToken> {
    let mut token_config = config.join_token.clone();
    if let Some(host) = host {
        token_config.host = Some(host);
    }
    JoinToken::create_with_discovery(&token_config, &config.discovery)
}

/// Render the command a joining machine should run
pub fn join_command(program: &str, token: &JoinToken) -> String {
    format!(
        "{} join --host={} --token={}",
        program,
        token.host(),
        token.value()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use vortex_core::JoinTokenConfig;

    #[test]
    fn test_join_command_format() {
        let token = JoinToken::create(&JoinTokenConfig::default().with_host("127.0.0.1")).unwrap();
        let command = join_command(COMMAND_BASE, &token);

        assert_eq!(
            command,
            format!("vortex join --host=127.0.0.1 --token={}", token.value())
        );
    }

    #[test]
    fn test_run_with_host_override() {
        let config = AppConfig::default();
        assert!(run(&config, Some("127.0.0.1".to_string())).is_ok());
    }

    #[test]
    fn test_run_rejects_invalid_ttl() {
        let mut config = AppConfig::default();
        config.join_token.ttl_secs = 0;
        let err = run(&config, Some("127.0.0.1".to_string())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<vortex_core::Error>(),
            Some(vortex_core::Error::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_mint_discovers_host_from_discovery_table() {
        let mut config = AppConfig::default();
        config.discovery.probe_addr = "127.0.0.1:9".to_string();

        let token = mint(&config, None).unwrap();
        assert_eq!(token.host(), "127.0.0.1");
    }

    #[test]
    fn test_mint_reports_bad_discovery_target() {
        let mut config = AppConfig::default();
        config.discovery.probe_addr = "not-an-address".to_string();

        assert!(matches!(
            mint(&config, None),
            Err(vortex_core::Error::NoRoute(_))
        ));
        // an explicit host never consults discovery
        assert!(mint(&config, Some("127.0.0.1".to_string())).is_ok());
    }

    #[test]
    fn test_mint_rejects_out_of_range_ttl() {
        let mut config = AppConfig::default();
        config.join_token.ttl_secs = 9_000_000_000_000;
        assert!(matches!(
            mint(&config, Some("127.0.0.1".to_string())),
            Err(vortex_core::Error::InvalidConfig { .. })
        ));
    }
}
