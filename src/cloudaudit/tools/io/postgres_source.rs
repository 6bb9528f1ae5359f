//! Relational inventory source: one table per resource kind in a Postgres
//! schema populated by a cloud query engine.

use serde_json::{Map, Value};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, instrument, warn};

use crate::cloudaudit::tools::config::is_plain_identifier;
use crate::cloudaudit::tools::error::{Result, ToolError};
use crate::cloudaudit::tools::model::{ResourceKind, ResourceRecord, SourceTables, Table};

/// Loads every resource kind from `schema`.
///
/// Connection failures abort the load. A query that fails for a single table
/// is logged and the table is treated as absent.
#[instrument(level = "info", skip_all, fields(schema = %schema))]
pub fn load_database(url: &str, schema: &str) -> Result<SourceTables> {
    if !is_plain_identifier(schema) {
        return Err(ToolError::InvalidConfig(format!(
            "schema '{schema}' is not a plain identifier"
        )));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let pool = PgPoolOptions::new().max_connections(1).connect(url).await?;
        let mut sources = SourceTables::new();

        for kind in ResourceKind::ALL {
            match fetch_table(&pool, schema, kind).await {
                Ok(table) => {
                    debug!(kind = %kind, rows = table.len(), "loaded table");
                    sources.insert(kind, table);
                }
                Err(error) => {
                    warn!(kind = %kind, table = kind.table_name(), %error, "table unavailable");
                }
            }
        }

        pool.close().await;
        Ok::<_, ToolError>(sources)
    })
}

async fn fetch_table(pool: &PgPool, schema: &str, kind: ResourceKind) -> Result<Table> {
    let sql = format!(
        "SELECT row_to_json(t)::text FROM {schema}.{} t",
        kind.table_name()
    );
    let rows: Vec<String> = sqlx::query_scalar(&sql).fetch_all(pool).await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let object: Map<String, Value> = serde_json::from_str(&row)?;
        records.push(object.into_iter().collect::<ResourceRecord>());
    }
    Ok(Table::from_records(records))
}
