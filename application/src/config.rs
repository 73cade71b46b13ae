//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: Server,

    /// Service configuration.
    #[serde(default)]
    pub service: Service,

    /// Postgres configuration.
    #[serde(default)]
    pub postgres: Postgres,

    /// Notifier configuration.
    #[serde(default)]
    pub notifier: Notifier,

    /// Log configuration.
    #[serde(default)]
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// Maximum duration of handling a single request.
    #[default(time::Duration::from_secs(10))]
    #[serde(with = "humantime_serde")]
    pub request_timeout: time::Duration,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// Secret the page tokens are signed with.
    #[default(SecretString::from("secret"))]
    pub cursor_secret: SecretString,

    /// Service tasks configuration.
    pub tasks: Tasks,
}

impl Service {
    /// Converts this [`Service`] configuration into a [`service::Config`],
    /// retaining connections of the provided [`Pool`].
    #[must_use]
    pub fn into_config(self, pool: Pool) -> service::Config {
        let Self {
            cursor_secret,
            tasks: Tasks { retain_connections },
        } = self;
        let Pool {
            max_size: _,
            max_idle,
            max_lifetime,
        } = pool;

        service::Config {
            cursor_codec: service::read::user::list::Codec::new(
                cursor_secret.expose_secret(),
            ),
            retain_connections: service::task::retain_connections::Config {
                interval: retain_connections.interval,
                retention: service::infra::database::Retention {
                    max_idle,
                    max_lifetime,
                },
            },
        }
    }
}

/// Service tasks configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Tasks {
    /// `RetainConnections` task configuration.
    pub retain_connections: Task,
}

/// Service task configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Task {
    /// Task execution interval.
    #[default(time::Duration::from_secs(30))]
    #[serde(with = "humantime_serde")]
    pub interval: time::Duration,
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,

    /// Duration after which the server cancels a running statement.
    #[default(time::Duration::from_secs(10))]
    #[serde(with = "humantime_serde")]
    pub statement_timeout: time::Duration,

    /// Connection [`Pool`] configuration.
    pub pool: Pool,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
            statement_timeout,
            pool,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            options: Some(format!(
                "-c statement_timeout={}",
                statement_timeout.as_millis(),
            )),
            pool: Some(service::infra::postgres::PoolConfig::new(
                pool.max_size,
            )),
            ..Self::default()
        }
    }
}

/// Postgres connection pool configuration.
#[derive(Clone, Copy, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Pool {
    /// Maximum number of open connections.
    #[default(16)]
    pub max_size: usize,

    /// Maximum number of idle connections kept open.
    #[default(8)]
    pub max_idle: usize,

    /// Maximum lifetime of a connection.
    #[default(time::Duration::from_secs(5 * 60))]
    #[serde(with = "humantime_serde")]
    pub max_lifetime: time::Duration,
}

/// Notifier configuration.
#[derive(Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Notifier {
    /// Indicator whether mutations are published to the topic.
    pub enabled: bool,

    /// Base URL of the Pub/Sub REST API.
    #[default("https://pubsub.googleapis.com".to_owned())]
    pub endpoint: String,

    /// Full name of the topic, in the `projects/{project}/topics/{topic}`
    /// format.
    pub topic: String,

    /// OAuth 2.0 access token to publish with.
    pub token: Option<SecretString>,

    /// Timeout of a single publish request.
    #[default(time::Duration::from_secs(10))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,
}

impl From<Notifier> for service::infra::pubsub::Config {
    fn from(value: Notifier) -> Self {
        let Notifier {
            enabled: _,
            endpoint,
            topic,
            token,
            timeout,
        } = value;

        Self {
            endpoint,
            topic,
            token,
            timeout,
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use service::infra::database::Retention;

    use super::{Config, Notifier, Pool, Postgres, Service};

    #[test]
    fn defaults_when_nothing_configured() {
        let conf = Config::new("non-existent.toml").unwrap();

        assert_eq!(conf.server.port, 8080);
        assert_eq!(conf.server.request_timeout, Duration::from_secs(10));
        assert_eq!(conf.postgres.pool.max_size, 16);
        assert_eq!(conf.postgres.pool.max_idle, 8);
        assert_eq!(conf.postgres.pool.max_lifetime, Duration::from_secs(300));
        assert!(!conf.notifier.enabled);
    }

    #[test]
    fn passes_statement_timeout_to_postgres() {
        let conf = service::infra::postgres::Config::from(Postgres {
            statement_timeout: Duration::from_millis(2500),
            ..Postgres::default()
        });

        assert_eq!(conf.options.as_deref(), Some("-c statement_timeout=2500"));
        assert_eq!(conf.pool.map(|p| p.max_size), Some(16));
    }

    #[test]
    fn keeps_notifier_endpoint() {
        let conf = service::infra::pubsub::Config::from(Notifier {
            topic: "projects/users/topics/changes".to_owned(),
            ..Notifier::default()
        });

        assert_eq!(conf.endpoint, "https://pubsub.googleapis.com");
        assert_eq!(conf.topic, "projects/users/topics/changes");
        assert!(conf.token.is_none());
    }

    #[test]
    fn retains_connections_within_pool_limits() {
        let conf = Service::default().into_config(Pool {
            max_idle: 3,
            max_lifetime: Duration::from_secs(60),
            ..Pool::default()
        });

        assert_eq!(
            conf.retain_connections.retention,
            Retention {
                max_idle: 3,
                max_lifetime: Duration::from_secs(60),
            },
        );
        assert_eq!(conf.retain_connections.interval, Duration::from_secs(30));
    }
}
