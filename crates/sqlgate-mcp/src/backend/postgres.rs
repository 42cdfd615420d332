//! Postgres backend.

use super::{BackendError, QueryBackend, Row};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{Value, json};
use sqlgate_core::{ConnectionConfig, SharedDatabaseConfig, SslMode};
use sqlx::postgres::types::{PgInterval, PgTimeTz};
use sqlx::postgres::{PgColumn, PgConnectOptions, PgPool, PgPoolOptions, PgRow, PgSslMode};
use sqlx::{Column, Decode, Postgres, Row as _, Type, TypeInfo, ValueRef};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use uuid::Uuid;

struct CachedPool {
    url: Option<String>,
    password: Option<String>,
    config: ConnectionConfig,
    pool: PgPool,
}

/// Runs statements against the Postgres connections named in the shared
/// database configuration.
///
/// Pools are opened lazily on first use and kept per connection name. The
/// configuration is read on every call, so a reload takes effect for the next
/// request; a pool whose settings changed is replaced.
///
/// Every statement runs in its own transaction, which is always rolled back.
/// With `read_only_session` on, that transaction is declared `READ ONLY`
/// before the statement runs, so the statement cannot switch it back.
pub struct PgBackend {
    config: SharedDatabaseConfig,
    pools: Mutex<HashMap<String, CachedPool>>,
}

impl PgBackend {
    pub fn new(config: SharedDatabaseConfig) -> Self {
        Self {
            config,
            pools: Mutex::new(HashMap::new()),
        }
    }

    /// The pool for `name` and whether its statements must run read-only.
    fn pool_for(&self, name: &str) -> Result<(PgPool, bool), BackendError> {
        let connection = self
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .connection(name)
            .cloned()
            .ok_or_else(|| BackendError::UnknownConnection(name.to_string()))?;
        let read_only = connection.read_only_session;
        let url = connection.database_url();
        let password = connection.password();

        let mut pools = self.pools.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = pools.get(name)
            && cached.url == url
            && cached.password == password
            && cached.config == connection
        {
            return Ok((cached.pool.clone(), read_only));
        }

        let options = connect_options(&connection, url.as_deref(), password.as_deref())?;
        let pool = build_pool(&connection, options);
        tracing::info!(
            connection = name,
            read_only_session = read_only,
            "Opened connection pool"
        );
        if let Some(stale) = pools.insert(
            name.to_string(),
            CachedPool {
                url,
                password,
                config: connection,
                pool: pool.clone(),
            },
        ) {
            tracing::debug!(connection = name, "Replacing pool after configuration change");
            tokio::spawn(async move { stale.pool.close().await });
        }

        Ok((pool, read_only))
    }
}

#[async_trait]
impl QueryBackend for PgBackend {
    fn default_connection(&self) -> String {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .default
            .clone()
    }

    fn prefix(&self, connection: &str) -> String {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .prefix(connection)
            .to_string()
    }

    async fn select(&self, connection: &str, sql: &str) -> Result<Vec<Row>, BackendError> {
        let (pool, read_only) = self.pool_for(connection)?;

        let mut tx = pool.begin().await?;
        if read_only {
            sqlx::query("SET TRANSACTION READ ONLY")
                .execute(&mut *tx)
                .await?;
        }

        // Extended protocol: one statement per call, nothing cached.
        let rows = sqlx::query(sql)
            .persistent(false)
            .fetch_all(&mut *tx)
            .await?;

        // Also undoes any SET or set_config() the statement made.
        tx.rollback().await?;

        rows.iter().map(row_to_json).collect()
    }
}

/// Connect options from the URL when one is configured, otherwise from the
/// individual fields. Credentials are passed as values, never spliced into a
/// URL.
fn connect_options(
    connection: &ConnectionConfig,
    url: Option<&str>,
    password: Option<&str>,
) -> Result<PgConnectOptions, BackendError> {
    let mut options = match url {
        Some(url) => url.parse::<PgConnectOptions>()?,
        None => {
            let options = PgConnectOptions::new()
                .host(&connection.host)
                .port(connection.port)
                .database(&connection.database)
                .username(&connection.username);
            match password {
                Some(password) => options.password(password),
                None => options,
            }
        }
    };

    // Prefer is also the driver default; leave any sslmode in the URL alone.
    if connection.ssl_mode != SslMode::Prefer {
        options = options.ssl_mode(pg_ssl_mode(connection.ssl_mode));
    }
    if connection.read_only_session {
        options = options.options([("default_transaction_read_only", "on")]);
    }

    Ok(options)
}

fn build_pool(connection: &ConnectionConfig, options: PgConnectOptions) -> PgPool {
    let pool = connection.pool_config();
    PgPoolOptions::new()
        .min_connections(pool.min_connections)
        .max_connections(pool.max_connections)
        .acquire_timeout(Duration::from_secs(pool.acquire_timeout_seconds.into()))
        .idle_timeout(Duration::from_secs(pool.idle_timeout_seconds.into()))
        .connect_lazy_with(options)
}

fn pg_ssl_mode(mode: SslMode) -> PgSslMode {
    match mode {
        SslMode::Disable => PgSslMode::Disable,
        SslMode::Allow => PgSslMode::Allow,
        SslMode::Prefer => PgSslMode::Prefer,
        SslMode::Require => PgSslMode::Require,
        SslMode::VerifyCa => PgSslMode::VerifyCa,
        SslMode::VerifyFull => PgSslMode::VerifyFull,
    }
}

/// Convert a row to a JSON object, column by column.
fn row_to_json(row: &PgRow) -> Result<Row, BackendError> {
    row.columns()
        .iter()
        .map(|col| Ok((col.name().to_string(), column_value(row, col)?)))
        .collect()
}

fn column_value(row: &PgRow, column: &PgColumn) -> Result<Value, BackendError> {
    fn get<'r, T>(row: &'r PgRow, index: usize) -> Option<T>
    where
        T: Decode<'r, Postgres> + Type<Postgres>,
    {
        row.try_get::<T, _>(index).ok()
    }

    fn array<'r, T>(row: &'r PgRow, index: usize) -> Option<Value>
    where
        T: Into<Value>,
        Vec<Option<T>>: Decode<'r, Postgres> + Type<Postgres>,
    {
        get::<Vec<Option<T>>>(row, index).map(|items| {
            items
                .into_iter()
                .map(|item| item.map_or(Value::Null, Into::into))
                .collect()
        })
    }

    let index = column.ordinal();
    if row.try_get_raw(index)?.is_null() {
        return Ok(Value::Null);
    }

    let type_name = column.type_info().name();
    let value = match type_name {
        "BOOL" => get::<bool>(row, index).map(Value::from),
        "INT2" => get::<i16>(row, index).map(Value::from),
        "INT4" => get::<i32>(row, index).map(Value::from),
        "INT8" => get::<i64>(row, index).map(Value::from),
        "FLOAT4" => get::<f32>(row, index).map(Value::from),
        "FLOAT8" => get::<f64>(row, index).map(Value::from),
        // Kept as text so no precision is lost.
        "NUMERIC" => get::<BigDecimal>(row, index).map(|v| Value::String(v.to_string())),
        "JSON" | "JSONB" => get::<Value>(row, index),
        "UUID" => get::<Uuid>(row, index).map(|v| Value::String(v.to_string())),
        "TIMESTAMPTZ" => get::<DateTime<Utc>>(row, index).map(|v| Value::String(v.to_rfc3339())),
        "TIMESTAMP" => get::<NaiveDateTime>(row, index)
            .map(|v| Value::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
        "DATE" => get::<NaiveDate>(row, index).map(|v| Value::String(v.to_string())),
        "TIME" => get::<NaiveTime>(row, index).map(|v| Value::String(v.to_string())),
        "TIMETZ" => get::<PgTimeTz<NaiveTime, FixedOffset>>(row, index)
            .map(|v| Value::String(format!("{}{}", v.time, v.offset))),
        "INTERVAL" => get::<PgInterval>(row, index).map(|v| {
            json!({"months": v.months, "days": v.days, "microseconds": v.microseconds})
        }),
        "BYTEA" => get::<Vec<u8>>(row, index).map(|bytes| {
            let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
            Value::String(format!("\\x{}", hex))
        }),
        "BOOL[]" => array::<bool>(row, index),
        "INT2[]" => array::<i16>(row, index),
        "INT4[]" => array::<i32>(row, index),
        "INT8[]" => array::<i64>(row, index),
        "FLOAT4[]" => array::<f32>(row, index),
        "FLOAT8[]" => array::<f64>(row, index),
        "TEXT[]" | "VARCHAR[]" | "BPCHAR[]" | "NAME[]" => array::<String>(row, index),
        "UUID[]" => get::<Vec<Option<Uuid>>>(row, index).map(|items| {
            items
                .into_iter()
                .map(|item| item.map_or(Value::Null, |v| Value::String(v.to_string())))
                .collect()
        }),
        // TEXT, VARCHAR, BPCHAR, NAME and anything else that decodes as text.
        _ => get::<String>(row, index).map(Value::String),
    };

    value.ok_or_else(|| {
        tracing::debug!(column = column.name(), type_name, "Undecodable column value");
        BackendError::UnsupportedType {
            column: column.name().to_string(),
            type_name: type_name.to_string(),
        }
    })
}
