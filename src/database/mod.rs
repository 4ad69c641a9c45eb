mod query;

use base64::Engine;
use log::debug;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Params};
use serde_json::{Map, Number, Value};
use std::cell::RefCell;
use thiserror::Error;

pub use query::QueryBuilder;
pub use rusqlite::params;

/// One result row, column name to value.
pub type Row = Map<String, Value>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("failed to open {path}: {source}")]
    ConnectionFailed {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to close connection: {0}")]
    CloseFailed(#[source] rusqlite::Error),
    #[error("statement failed: {0}")]
    QueryFailed(#[from] rusqlite::Error),
}

/// A single SQLite handle, opened on first use.
///
/// The SQL handed to `execute_*` runs as written. Only values passed through
/// `params` are bound; anything formatted into the SQL string beforehand is
/// executed as SQL.
pub struct DatabaseConnection {
    connection_string: String,
    connection: RefCell<Option<Connection>>,
}

impl DatabaseConnection {
    pub fn new<T: Into<String>>(connection_string: T) -> Self {
        Self {
            connection_string: connection_string.into(),
            connection: RefCell::new(None),
        }
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    pub fn is_connected(&self) -> bool {
        self.connection.borrow().is_some()
    }

    /// Opens the handle unless it is already open.
    pub fn connect(&self) -> Result<(), DatabaseError> {
        let mut slot = self.connection.borrow_mut();
        if slot.is_none() {
            *slot = Some(self.open()?);
        }
        Ok(())
    }

    /// Releases the handle. The next statement reopens it.
    pub fn close(&self) -> Result<(), DatabaseError> {
        if let Some(conn) = self.connection.borrow_mut().take() {
            debug!("closing database {}", self.connection_string);
            conn.close().map_err(|(_, err)| DatabaseError::CloseFailed(err))?;
        }
        Ok(())
    }

    pub fn execute_query<P: Params>(&self, sql: &str, params: P) -> Result<Vec<Row>, DatabaseError> {
        debug!("execute_query: {}", sql);
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let mut rows = stmt.query(params)?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                let mut record = Row::new();
                for (index, column) in columns.iter().enumerate() {
                    record.insert(column.clone(), to_json(row.get_ref(index)?));
                }
                results.push(record);
            }
            Ok(results)
        })
    }

    /// Runs a statement to completion and returns the number of rows it
    /// changed. Rows it yields are stepped through and dropped, so a
    /// read-only statement reports 0.
    pub fn execute_update<P: Params>(&self, sql: &str, params: P) -> Result<usize, DatabaseError> {
        debug!("execute_update: {}", sql);
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let readonly = stmt.readonly();
            let mut rows = stmt.query(params)?;
            while rows.next()?.is_some() {}
            Ok(if readonly { 0 } else { conn.changes() as usize })
        })
    }

    /// Runs a script of one or more statements with no parameter binding.
    pub fn execute_raw(&self, sql: &str) -> Result<(), DatabaseError> {
        debug!("execute_raw: {}", sql);
        self.with_connection(|conn| conn.execute_batch(sql))
    }

    fn open(&self) -> Result<Connection, DatabaseError> {
        debug!("opening database {}", self.connection_string);
        Connection::open(&self.connection_string).map_err(|source| DatabaseError::ConnectionFailed {
            path: self.connection_string.clone(),
            source,
        })
    }

    fn with_connection<T, F>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let mut slot = self.connection.borrow_mut();
        let conn = match slot.take() {
            Some(conn) => conn,
            None => self.open()?,
        };
        let result = f(&conn);
        *slot = Some(conn);
        Ok(result?)
    }
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(blob) => {
            Value::String(base64::engine::general_purpose::STANDARD.encode(blob))
        }
    }
}
