use clap::{Parser, ValueEnum};
use payments_core::ServerConfig;
use std::time::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "payments")]
#[command(about = "Payments service HTTP listener")]
pub struct ServiceConfig {
    #[arg(long, env = "PAYMENTS_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PAYMENTS_PORT", default_value_t = 8081)]
    pub port: u16,

    #[arg(long, env = "PAYMENTS_WORKERS", default_value_t = num_cpus::get())]
    pub workers: usize,

    /// Time allowed for in-flight connections after a shutdown signal (0 = wait forever)
    #[arg(long, env = "PAYMENTS_SHUTDOWN_TIMEOUT_MS", default_value_t = 5000)]
    pub shutdown_timeout_ms: u64,

    #[arg(long, env = "PAYMENTS_LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ServiceConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.workers == 0 {
            anyhow::bail!("--workers must be at least 1");
        }
        Ok(())
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            port: self.port,
            hostname: self.host.clone(),
            workers: self.workers,
            shutdown_timeout: Duration::from_millis(self.shutdown_timeout_ms),
        }
    }
}
