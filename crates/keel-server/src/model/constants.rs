// Configuration keys and defaults

pub const DEFAULT_CONFIG_FILE: &str = "conf/application.yml";
pub const ENV_PREFIX: &str = "KEEL";

pub const DB_URL: &str = "db.url";
pub const DB_MAX_CONNECTIONS: &str = "db.max_connections";
pub const DB_MIN_CONNECTIONS: &str = "db.min_connections";
pub const DB_CONNECT_TIMEOUT_SECS: &str = "db.connect_timeout_secs";
pub const DB_SQLX_LOGGING: &str = "db.sqlx_logging";
pub const DB_INIT_SCHEMA: &str = "db.init_schema";

pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_DB_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 30;

pub const STORAGE_MODE: &str = "keel.storage.mode";
pub const EMBEDDED_SEED_FILE: &str = "keel.storage.embedded.seed_file";

/// The deployment mode toggle
pub const USE_DEPLOYMENT_CONFIG_DATA: &str = "keel.deployment.use_deployment_config_data";

pub const LOGS_PATH: &str = "keel.logs.path";
pub const LOGS_LEVEL: &str = "keel.logs.level";
pub const LOGS_CONSOLE: &str = "keel.logs.console";
pub const LOGS_FILE: &str = "keel.logs.file";
