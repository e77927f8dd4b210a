//! SQLite-backed data source.

use super::{parse_date, ContentRow, DataSource, PaymentRow};
use crate::error::{EventError, Result};
use chrono::{DateTime, NaiveDate};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};
use std::path::Path;

/// Table and column names the queries run against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteTables {
    /// Per-title daily coins: `date`, `"Title"`, `"Total_coins"`.
    pub content_table: String,
    /// Payments: `date`, `amount`.
    pub payment_table: String,
    /// Optional per-payment first-time flag summed per day.
    pub first_payment_column: Option<String>,
}

impl Default for SqliteTables {
    fn default() -> Self {
        Self {
            content_table: "fra_daily".to_string(),
            payment_table: "payment".to_string(),
            first_payment_column: None,
        }
    }
}

fn check_identifier(name: &str) -> Result<&str> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(EventError::InvalidParameter(format!(
            "invalid SQL identifier '{}'",
            name
        )))
    }
}

impl SqliteTables {
    fn content_sql(&self) -> Result<String> {
        Ok(format!(
            r#"SELECT date, "Title", "Total_coins" FROM "{}""#,
            check_identifier(&self.content_table)?
        ))
    }

    fn payment_sql(&self) -> Result<String> {
        let table = check_identifier(&self.payment_table)?;
        let first_time = match &self.first_payment_column {
            Some(column) => format!(r#"SUM("{}")"#, check_identifier(column)?),
            None => "NULL".to_string(),
        };
        Ok(format!(
            r#"SELECT date, SUM(amount) AS amount, {} AS first_time FROM "{}" GROUP BY date ORDER BY date"#,
            first_time, table
        ))
    }
}

/// Read-only SQLite source running the content and payment queries.
pub struct SqliteSource {
    conn: Connection,
    content_sql: String,
    payment_sql: String,
}

impl SqliteSource {
    /// Open `path` read-only with the default table layout.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, SqliteTables::default())
    }

    pub fn open_with(path: impl AsRef<Path>, tables: SqliteTables) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        log::info!("opened SQLite source {}", path.as_ref().display());
        Self::from_connection(conn, tables)
    }

    /// Wrap an existing connection; it is switched to query-only mode.
    pub fn from_connection(conn: Connection, tables: SqliteTables) -> Result<Self> {
        conn.pragma_update(None, "query_only", true)?;
        Ok(Self {
            conn,
            content_sql: tables.content_sql()?,
            payment_sql: tables.payment_sql()?,
        })
    }
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let invalid = |msg: String| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(EventError::TimestampError(msg)),
        )
    };

    match row.get_ref(idx)? {
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes).map_err(|e| invalid(e.to_string()))?;
            parse_date(text).map_err(|e| invalid(e.to_string()))
        }
        // Unix seconds
        ValueRef::Integer(secs) => DateTime::from_timestamp(secs, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| invalid(format!("timestamp {} out of range", secs))),
        other => Err(invalid(format!(
            "unsupported date column type {:?}",
            other.data_type()
        ))),
    }
}

impl DataSource for SqliteSource {
    fn content_rows(&self) -> Result<Vec<ContentRow>> {
        let mut stmt = self.conn.prepare(&self.content_sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(ContentRow {
                date: date_column(row, 0)?,
                title: row.get(1)?,
                coins: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
            })
        })?;

        let rows = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        log::debug!("loaded {} content rows", rows.len());
        Ok(rows)
    }

    fn payment_rows(&self) -> Result<Vec<PaymentRow>> {
        let mut stmt = self.conn.prepare(&self.payment_sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(PaymentRow {
                date: date_column(row, 0)?,
                amount: row.get::<_, Option<f64>>(1)?.unwrap_or(0.0),
                first_time_count: row
                    .get::<_, Option<i64>>(2)?
                    .map(|count| count.max(0) as u64),
            })
        })?;

        let rows = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        log::debug!("loaded {} payment rows", rows.len());
        Ok(rows)
    }

    fn content_query(&self) -> &str {
        &self.content_sql
    }

    fn payment_query(&self) -> &str {
        &self.payment_sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE fra_daily (date TEXT, "Title" TEXT, "Total_coins" REAL);
            INSERT INTO fra_daily VALUES ('2024-01-01', 'Alpha', 10.0);
            INSERT INTO fra_daily VALUES ('2024-01-01 00:00:00', 'Beta', 4);
            INSERT INTO fra_daily VALUES ('2024-01-02', 'Alpha', NULL);
            CREATE TABLE payment (date TEXT, amount REAL, is_first INTEGER);
            INSERT INTO payment VALUES ('2024-01-01', 5.5, 1);
            INSERT INTO payment VALUES ('2024-01-01', 4.5, 0);
            INSERT INTO payment VALUES ('2024-01-02', 3.0, 1);
            "#,
        )
        .unwrap();
        conn
    }

    #[test]
    fn reads_content_rows_and_normalizes_dates() {
        let source = SqliteSource::from_connection(seeded(), SqliteTables::default()).unwrap();
        let rows = source.content_rows().unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(rows[1].coins, 4.0);
        assert_eq!(rows[2].coins, 0.0);
    }

    #[test]
    fn payment_rows_are_grouped_by_date() {
        let tables = SqliteTables {
            first_payment_column: Some("is_first".to_string()),
            ..SqliteTables::default()
        };
        let source = SqliteSource::from_connection(seeded(), tables).unwrap();
        let rows = source.payment_rows().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, 10.0);
        assert_eq!(rows[0].first_time_count, Some(1));
        assert_eq!(rows[1].first_time_count, Some(1));

        let plain = SqliteSource::from_connection(seeded(), SqliteTables::default()).unwrap();
        assert_eq!(plain.payment_rows().unwrap()[0].first_time_count, None);
    }

    #[test]
    fn connection_is_query_only() {
        let source = SqliteSource::from_connection(seeded(), SqliteTables::default()).unwrap();
        assert!(source
            .conn
            .execute("DELETE FROM payment", [])
            .is_err());
    }

    #[test]
    fn identifiers_are_validated() {
        let tables = SqliteTables {
            content_table: "fra_daily; DROP TABLE payment".to_string(),
            ..SqliteTables::default()
        };
        assert!(matches!(
            SqliteSource::from_connection(seeded(), tables),
            Err(EventError::InvalidParameter(_))
        ));
    }

    #[test]
    fn malformed_dates_surface_as_source_errors() {
        let conn = seeded();
        conn.execute(
            r#"INSERT INTO fra_daily VALUES ('yesterday', 'Alpha', 1.0)"#,
            [],
        )
        .unwrap();
        let source = SqliteSource::from_connection(conn, SqliteTables::default()).unwrap();
        assert!(matches!(source.content_rows(), Err(EventError::Source(_))));
    }
}
