use core_config::{AppInfo, FromEnv, app_info, env_parse_or, server::ServerConfig};
use database::postgres::PostgresConfig;
use domain_tags::{ElasticsearchConfig, TagServiceConfig};

pub use core_config::Environment;

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub elasticsearch: ElasticsearchConfig,
    pub tags: TagServiceConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            database: PostgresConfig::from_env()?, // Required: DATABASE_URL
            elasticsearch: ElasticsearchConfig::from_env()?,
            tags: TagServiceConfig::from_env()?,
            server: ServerConfig::from_env()?, // HOST=0.0.0.0, PORT=9800
            environment: Environment::from_env(),
            run_migrations: env_parse_or("RUN_MIGRATIONS", true)?,
        })
    }
}
