//! CLI-side configuration: flag overrides on top of the file and env layers.

use secrecy::SecretString;

use meraki_config::Config;

use crate::cli::Cli;
use crate::error::CliError;

/// Load the config file (or defaults) and apply command-line overrides.
pub fn load(cli: &Cli) -> Result<Config, CliError> {
    let mut config = meraki_config::load_config(cli.config.as_deref())?;
    apply_overrides(&mut config, cli);
    Ok(config)
}

/// Flags win over the file; `--vpn` and `--port-usage-bytes` can only switch
/// a collection on, `--no-floor-plans` can only switch one off.
pub fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(ref host) = cli.host {
        config.listen.host.clone_from(host);
    }
    if let Some(port) = cli.port {
        config.listen.port = port;
    }
    if let Some(ref url) = cli.base_url {
        config.base_url.clone_from(url);
    }
    if let Some(ref ip) = cli.probe_ip {
        config.probe_ip.clone_from(ip);
    }
    if let Some(timeout) = cli.timeout {
        config.timeout = timeout;
    }
    if let Some(timeout) = cli.fetch_timeout {
        config.fetch_timeout = timeout;
    }

    config.collect.vpn |= cli.vpn;
    config.collect.port_usage_bytes |= cli.port_usage_bytes;
    if cli.no_floor_plans {
        config.collect.floor_plans = false;
    }
}

/// Resolve the API key with the flag / `MERAKI_API_KEY` first.
///
/// Falls back to the env var named by `api_key_env`, then the plaintext
/// `api_key` in the file.
pub fn resolve_api_key(cli: &Cli, config: &Config) -> Result<SecretString, CliError> {
    if let Some(ref key) = cli.api_key {
        if !key.is_empty() {
            return Ok(SecretString::from(key.clone()));
        }
    }
    Ok(meraki_config::resolve_api_key(config)?)
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use meraki_config::Config;
    use secrecy::ExposeSecret;

    use super::{apply_overrides, resolve_api_key};
    use crate::cli::Cli;
    use crate::error::CliError;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["meraki-exporter"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("arguments parse")
    }

    #[test]
    fn flags_override_file_values() {
        let cli = parse(&[
            "--host",
            "127.0.0.1",
            "-p",
            "9900",
            "--vpn",
            "--fetch-timeout",
            "15",
            "--probe-ip",
            "1.1.1.1",
        ]);
        let mut config = Config::default();
        config.collect.floor_plans = true;

        apply_overrides(&mut config, &cli);

        assert_eq!(config.listen.host, "127.0.0.1");
        assert_eq!(config.listen.port, 9900);
        assert_eq!(config.fetch_timeout, 15);
        assert_eq!(config.probe_ip, "1.1.1.1");
        assert!(config.collect.vpn);
        // Toggles left off on the command line keep the file's value
        assert!(config.collect.floor_plans);
        assert!(!config.collect.port_usage_bytes);
    }

    #[test]
    fn floor_plans_can_be_switched_off() {
        let mut config = Config::default();
        apply_overrides(&mut config, &parse(&[]));
        assert!(config.collect.floor_plans);

        apply_overrides(&mut config, &parse(&["--no-floor-plans"]));
        assert!(!config.collect.floor_plans);
    }

    #[test]
    fn absent_flags_leave_config_alone() {
        let cli = parse(&[]);
        let mut config = Config::default();
        config.listen.port = 9100;
        apply_overrides(&mut config, &cli);
        assert_eq!(config.listen.port, 9100);
        assert_eq!(config.timeout, Config::default().timeout);
    }

    #[test]
    fn flag_key_wins_over_file_key() {
        let cli = parse(&["--api-key", "from-flag"]);
        let config = Config {
            api_key: Some("from-file".into()),
            ..Config::default()
        };
        let key = resolve_api_key(&cli, &config).expect("key resolves");
        assert_eq!(key.expose_secret(), "from-flag");
    }

    #[test]
    fn empty_flag_key_falls_through_to_file() {
        let cli = parse(&["--api-key", ""]);
        let config = Config {
            api_key: Some("from-file".into()),
            ..Config::default()
        };
        let key = resolve_api_key(&cli, &config).expect("key resolves");
        assert_eq!(key.expose_secret(), "from-file");
    }

    #[test]
    fn missing_key_is_a_credentials_error() {
        let cli = parse(&["--api-key", ""]);
        let result = resolve_api_key(&cli, &Config::default());
        assert!(matches!(result, Err(CliError::NoCredentials)));
    }
}
