use crate::config::CoincConfig;

/// Internal validation, called automatically during `CoincConfig::from_str` / `load`.
/// Each section validates itself; this just aggregates and surfaces the first
/// failure, in section-declaration order.
pub(crate) fn validate(config: &CoincConfig) -> anyhow::Result<()> {
    config.server.validate()?;
    config.coincidence.validate()?;
    config.bus.validate()?;
    config.heartbeat.validate()?;
    config.storage.validate()?;
    config.alert.validate()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::CoincConfig;

    const FULL_TOML: &str = r#"
[server]
listen = "tcp://127.0.0.1:9600"

[coincidence]
threshold = "10s"
max_retriable = 20
cache_expiration = "24h"
stash_time = "24h"
server_tag = "snews-cs-rs-1"

[bus]
observation_topic = "snews.obs"
firedrill_observation_topic = "snews.obs.firedrill"
firedrill_mode = true
exit_on_error = false

[heartbeat]
store_heartbeat = true
false_alarm_prob_default = 0.0

[storage]
path = "data/observations.jsonl"

[alert]
path = "data/alerts.jsonl"
"#;

    #[test]
    fn reject_invalid_listen() {
        let toml = FULL_TOML.replace("tcp://127.0.0.1:9600", "http://bad");
        assert!(toml.parse::<CoincConfig>().is_err());
    }

    #[test]
    fn reject_zero_max_retriable() {
        let toml = FULL_TOML.replace("max_retriable = 20", "max_retriable = 0");
        assert!(toml.parse::<CoincConfig>().is_err());
    }

    #[test]
    fn reject_out_of_range_false_alarm_default() {
        let toml = FULL_TOML.replace("false_alarm_prob_default = 0.0", "false_alarm_prob_default = 1.5");
        assert!(toml.parse::<CoincConfig>().is_err());
    }

    #[test]
    fn accept_full_toml() {
        let cfg: CoincConfig = FULL_TOML.parse().unwrap();
        assert_eq!(cfg.server.listen, "tcp://127.0.0.1:9600");
        assert_eq!(cfg.coincidence.max_retriable, 20);
        assert!(cfg.bus.firedrill_mode);
    }
}
