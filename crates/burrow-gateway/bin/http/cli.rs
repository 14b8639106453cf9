use clap::Parser;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const SERVER_ADDRESS_ENV: &str = "SERVER_ADDRESS";
pub const BASE_URL_ENV: &str = "BASE_URL";
pub const FILE_STORAGE_PATH_ENV: &str = "FILE_STORAGE_PATH";
pub const DATABASE_DSN_ENV: &str = "DATABASE_DSN";
pub const REQUEST_TIMEOUT_MS_ENV: &str = "REQUEST_TIMEOUT_MS";
pub const SHORT_CODE_LENGTH_ENV: &str = "SHORT_CODE_LENGTH";

pub const DEFAULT_SERVER_ADDRESS: &str = "localhost:8080";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_SHORT_CODE_LENGTH: u64 = 8;

/// Storage backend picked from the configuration, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres(String),
    File(PathBuf),
    InMemory,
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Postgres(_) => write!(f, "postgres"),
            StorageBackend::File(path) => write!(f, "file ({})", path.display()),
            StorageBackend::InMemory => write!(f, "in-memory"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "burrow-gateway")]
pub struct CLI {
    /// Address the HTTP server listens on.
    #[arg(short = 'a', long, env = SERVER_ADDRESS_ENV, default_value = DEFAULT_SERVER_ADDRESS)]
    pub server_address: String,

    /// Prefix of every issued short URL.
    #[arg(short = 'b', long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(short = 'f', long, env = FILE_STORAGE_PATH_ENV)]
    pub file_storage_path: Option<PathBuf>,

    #[arg(short = 'd', long, env = DATABASE_DSN_ENV)]
    pub database_dsn: Option<String>,

    #[arg(long, env = REQUEST_TIMEOUT_MS_ENV, default_value_t = DEFAULT_REQUEST_TIMEOUT_MS)]
    pub request_timeout_ms: u64,

    #[arg(
        long,
        env = SHORT_CODE_LENGTH_ENV,
        default_value_t = DEFAULT_SHORT_CODE_LENGTH,
        value_parser = clap::value_parser!(u64).range(1..=64),
    )]
    pub short_code_length: u64,
}

impl CLI {
    /// A database DSN wins over a file path; with neither, URLs live in memory.
    pub fn storage_backend(&self) -> StorageBackend {
        match (&self.database_dsn, &self.file_storage_path) {
            (Some(dsn), _) if !dsn.is_empty() => StorageBackend::Postgres(dsn.clone()),
            (_, Some(path)) if !path.as_os_str().is_empty() => StorageBackend::File(path.clone()),
            _ => StorageBackend::InMemory,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn short_code_length(&self) -> usize {
        self.short_code_length as usize
    }
}
