use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub transport: TransportConfig,
    pub sampler: SamplerConfig,
    pub producer: ProducerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Queue manager the programs connect to.
    pub queue_manager: String,
    /// Queue the producer puts to and the consumers get from.
    pub queue: String,
    /// File holding the whitespace-separated username/password pair.
    pub credentials_file: String,
    /// How long a get waits for a message before the consumer loop ends.
    #[serde(default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,
    /// Receive buffer size; longer messages are reported as truncated.
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
}

fn default_wait_timeout_ms() -> u64 {
    10_000
}

fn default_max_message_len() -> usize {
    4096
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplerConfig {
    /// Delay between the two CPU counter reads.
    #[serde(default = "default_sample_delay_ms")]
    pub sample_delay_ms: u64,
}

fn default_sample_delay_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProducerConfig {
    /// Number of status reports to build and enqueue before exiting.
    #[serde(default = "default_report_count")]
    pub report_count: u64,
}

fn default_report_count() -> u64 {
    1
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.transport.queue_manager.is_empty(),
            "transport.queue_manager must be non-empty"
        );
        anyhow::ensure!(
            !self.transport.queue.is_empty(),
            "transport.queue must be non-empty"
        );
        anyhow::ensure!(
            !self.transport.credentials_file.is_empty(),
            "transport.credentials_file must be non-empty"
        );
        anyhow::ensure!(
            self.transport.wait_timeout_ms > 0,
            "transport.wait_timeout_ms must be > 0, got {}",
            self.transport.wait_timeout_ms
        );
        anyhow::ensure!(
            self.transport.max_message_len > 0,
            "transport.max_message_len must be > 0, got {}",
            self.transport.max_message_len
        );
        anyhow::ensure!(
            self.sampler.sample_delay_ms > 0,
            "sampler.sample_delay_ms must be > 0, got {}",
            self.sampler.sample_delay_ms
        );
        anyhow::ensure!(
            self.producer.report_count > 0,
            "producer.report_count must be > 0, got {}",
            self.producer.report_count
        );
        Ok(())
    }
}

/// Username/password pair handed to the transport on connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read credentials file {}", path))?;
        Self::parse(&s).with_context(|| format!("malformed credentials file {}", path))
    }

    /// Two whitespace-separated tokens: username then password.
    /// Anything past the second token is ignored.
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let mut tokens = s.split_whitespace();
        let username = tokens.next().context("missing username")?;
        let password = tokens.next().context("missing password")?;
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}
