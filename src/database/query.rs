/// Fluent builder for a single `SELECT` statement.
///
/// Conditions are stored and emitted verbatim; nothing is quoted or bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    table: String,
    columns: String,
    conditions: Vec<String>,
    order_by: Option<String>,
    limit: Option<u64>,
}

impl QueryBuilder {
    pub fn new<T: Into<String>>(table: T) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_string(),
            conditions: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    /// An empty column list selects `*`.
    pub fn select<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.columns = if columns.is_empty() {
            "*".to_string()
        } else {
            columns
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .join(", ")
        };
        self
    }

    pub fn where_raw<T: Into<String>>(mut self, condition: T) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn order_by(mut self, column: &str, direction: &str) -> Self {
        self.order_by = Some(format!("{} {}", column, direction));
        self
    }

    pub fn order_by_asc(self, column: &str) -> Self {
        self.order_by(column, "ASC")
    }

    pub fn limit(mut self, count: u64) -> Self {
        self.limit = Some(count);
        self
    }

    pub fn build(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.columns, self.table);
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        if let Some(order_by) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        sql
    }
}
