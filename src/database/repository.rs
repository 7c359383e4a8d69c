use sqlx::{self, postgres::PgRow, FromRow, PgExecutor};

use crate::database::manager::DatabaseError;

/// Shared SQL for one table whose rows map to `T`. Table and column names are
/// compile-time constants, never request input.
pub struct Repository<T> {
    table: &'static str,
    id_column: &'static str,
    _phantom: std::marker::PhantomData<fn() -> T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table: &'static str, id_column: &'static str) -> Self {
        Self {
            table,
            id_column,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn id_column(&self) -> &'static str {
        self.id_column
    }

    pub async fn select_all<'e, E>(&self, executor: E) -> Result<Vec<T>, DatabaseError>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("SELECT * FROM {} ORDER BY {}", self.table, self.id_column);
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(executor).await?)
    }

    pub async fn select_where<'e, E>(
        &self,
        executor: E,
        column: &'static str,
        value: i32,
    ) -> Result<Vec<T>, DatabaseError>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = $1 ORDER BY {}",
            self.table, column, self.id_column
        );
        Ok(sqlx::query_as::<_, T>(&sql).bind(value).fetch_all(executor).await?)
    }

    pub async fn select_one<'e, E>(&self, executor: E, id: i32) -> Result<Option<T>, DatabaseError>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("SELECT * FROM {} WHERE {} = $1", self.table, self.id_column);
        Ok(sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(executor).await?)
    }

    /// Row-locks the record until the surrounding transaction ends.
    pub async fn select_for_update<'e, E>(&self, executor: E, id: i32) -> Result<Option<T>, DatabaseError>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = $1 FOR UPDATE",
            self.table, self.id_column
        );
        Ok(sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(executor).await?)
    }

    /// `ON DELETE` actions of dependent tables run inside the same statement.
    pub async fn delete<'e, E>(&self, executor: E, id: i32) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("DELETE FROM {} WHERE {} = $1", self.table, self.id_column);
        let result = sqlx::query(&sql).bind(id).execute(executor).await?;
        Ok(result.rows_affected() > 0)
    }
}
