//! PostgreSQL adapter for QueryRunner
//!
//! Runs chatbot-generated SQL inside a read-only transaction that is always
//! rolled back.

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, JsonValue, Statement,
    TransactionTrait,
};

use crate::domain::ports::QueryRunner;
use crate::error::DomainError;

pub struct PostgresQueryRunner {
    db: DatabaseConnection,
}

impl PostgresQueryRunner {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Wrap a SELECT so the database enforces the row cap
fn capped(sql: &str, max_rows: usize) -> String {
    let sql = sql.trim().trim_end_matches(';').trim_end();
    format!("SELECT * FROM ({}) AS chatbot_query LIMIT {}", sql, max_rows)
}

#[async_trait]
impl QueryRunner for PostgresQueryRunner {
    async fn run_select(
        &self,
        sql: &str,
        max_rows: usize,
    ) -> Result<Vec<serde_json::Value>, DomainError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        txn.execute_unprepared("SET TRANSACTION READ ONLY")
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        let rows = JsonValue::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            capped(sql, max_rows),
        ))
        .all(&txn)
        .await
        .map_err(|e| DomainError::Validation(format!("Query failed: {}", e)));

        txn.rollback()
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        rows
    }
}
