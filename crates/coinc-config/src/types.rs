use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A duration written in TOML as a number plus a unit suffix: `"10s"`,
/// `"24h"`, `"30m"`, `"1d"`. A bare number with no suffix is seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HumanDuration(Duration);

impl HumanDuration {
    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// Converts to [`chrono::Duration`] for arithmetic against
    /// `DateTime<Utc>`. Panics only if the value overflows `chrono`'s range,
    /// which no configuration-sourced duration will.
    pub fn as_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.0).expect("config-sourced duration fits in chrono::Duration")
    }
}

impl From<Duration> for HumanDuration {
    fn from(d: Duration) -> Self {
        Self(d)
    }
}

impl From<HumanDuration> for Duration {
    fn from(h: HumanDuration) -> Duration {
        h.0
    }
}

impl FromStr for HumanDuration {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split_at = s
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(s.len());
        let (num, suffix) = s.split_at(split_at);
        let value: f64 = num
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid duration {s:?}: {num:?} is not a number"))?;
        let secs = match suffix {
            "" | "s" => value,
            "m" => value * 60.0,
            "h" => value * 3600.0,
            "d" => value * 86400.0,
            other => anyhow::bail!("unknown duration suffix {other:?} in {s:?}"),
        };
        if secs < 0.0 {
            anyhow::bail!("duration {s:?} must not be negative");
        }
        Ok(HumanDuration(Duration::from_secs_f64(secs)))
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0.as_secs_f64())
    }
}

impl<'de> Deserialize<'de> for HumanDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl Serialize for HumanDuration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.to_string())
    }
}
