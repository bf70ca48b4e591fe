use crate::{ConnectionPool, FederationConfig, FederationError};
use futures::future::join_all;
use itertools::Itertools;
use rdf_federation_adapters::{Adapter, AdapterError};
use rdf_federation_model::vocab::xsd;
use rdf_federation_model::{
    compare_optional_terms, Literal, NamedNode, StatementPattern, Term, Triple,
};
use rdf_federation_query::{Query, Row, Solutions, SortDirection};
use std::cmp::Ordering;
use std::sync::Arc;

/// Options of [FederationManager::query].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryOptions {
    /// Whether a result with zero or one element is returned as [QueryResult::Empty],
    /// [QueryResult::Value] or [QueryResult::Row] instead of a collection.
    ///
    /// Count queries are always unwrapped.
    pub unwrap_single: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            unwrap_single: true,
        }
    }
}

impl QueryOptions {
    /// Options that always return collections.
    pub fn collections() -> Self {
        Self {
            unwrap_single: false,
        }
    }
}

/// The shaped result of a federated query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryResult {
    Boolean(bool),
    Count(usize),
    /// Nothing matched.
    Empty,
    /// The single value of a single-variable query.
    Value(Term),
    /// The single row of a multi-variable query.
    Row(Row),
    /// The values of a single-variable query.
    Values(Vec<Term>),
    Rows(Vec<Row>),
}

impl QueryResult {
    /// Returns the values in a uniform row layout, whatever the shape.
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            QueryResult::Boolean(value) => vec![vec![Some(Literal::from(value).into())]],
            QueryResult::Count(count) => vec![vec![Some(count_literal(count).into())]],
            QueryResult::Empty => Vec::new(),
            QueryResult::Value(term) => vec![vec![Some(term)]],
            QueryResult::Row(row) => vec![row],
            QueryResult::Values(values) => values.into_iter().map(|v| vec![Some(v)]).collect(),
            QueryResult::Rows(rows) => rows,
        }
    }
}

/// Dispatches queries to every read adapter of a [ConnectionPool] and merges their answers.
///
/// Writes go to the single write adapter of the pool. A failing source is logged and skipped
/// as long as another source answers. If every dispatched source fails, the query fails.
#[derive(Debug, Clone)]
pub struct FederationManager {
    pool: Arc<ConnectionPool>,
    config: FederationConfig,
}

impl FederationManager {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self::with_config(pool, FederationConfig::default())
    }

    pub fn with_config(pool: Arc<ConnectionPool>, config: FederationConfig) -> Self {
        Self { pool, config }
    }

    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    pub fn config(&self) -> &FederationConfig {
        &self.config
    }

    /// Answers `query` from every enabled read adapter and shapes the merged result.
    pub async fn query(
        &self,
        query: &Query,
        options: QueryOptions,
    ) -> Result<QueryResult, FederationError> {
        let solutions = self.query_solutions(query).await?;
        Ok(shape(query, solutions, options))
    }

    /// Answers `query` from every enabled read adapter and returns the merged, unshaped result.
    ///
    /// Rows without any value are dropped. Distinct queries are deduplicated over the union.
    pub async fn query_solutions(&self, query: &Query) -> Result<Solutions, FederationError> {
        let answers = self.dispatch(query).await?;
        Ok(merge(query, answers))
    }

    /// Calls `callback` for every merged row and returns the number of rows.
    ///
    /// Ask and count answers are delivered as a single row holding a boolean or integer literal.
    pub async fn for_each_row<F>(&self, query: &Query, mut callback: F) -> Result<usize, FederationError>
    where
        F: FnMut(Row),
    {
        let rows = match self.query_solutions(query).await? {
            Solutions::Rows(rows) => rows,
            Solutions::Boolean(value) => QueryResult::Boolean(value).into_rows(),
            Solutions::Count(count) => QueryResult::Count(count).into_rows(),
        };
        let count = rows.len();
        rows.into_iter().for_each(&mut callback);
        Ok(count)
    }

    /// Adds a statement through the write adapter.
    pub async fn add(
        &self,
        triple: &Triple,
        context: Option<&NamedNode>,
    ) -> Result<bool, FederationError> {
        let writer = self.writer()?;
        tracing::debug!(adapter_type = writer.adapter_type(), %triple, "Adding statement");
        Ok(writer.add(triple, context).await?)
    }

    /// Removes the statements matching `pattern` through the write adapter.
    pub async fn delete(&self, pattern: &StatementPattern) -> Result<Option<usize>, FederationError> {
        let writer = self.writer()?;
        tracing::debug!(adapter_type = writer.adapter_type(), ?pattern, "Removing statements");
        Ok(writer.remove(pattern).await?)
    }

    /// Removes every statement that has `resource` as subject or object.
    pub async fn delete_all(&self, resource: &NamedNode) -> Result<Option<usize>, FederationError> {
        let as_subject = self
            .delete(&StatementPattern::new(Some(resource.clone()), None, None))
            .await?;
        let as_object = self
            .delete(&StatementPattern::new(None, None, Some(resource.clone().into())))
            .await?;
        Ok(as_subject.zip(as_object).map(|(s, o)| s + o))
    }

    /// Removes every statement of `context`, or every statement at all if no context is given.
    pub async fn clear(&self, context: Option<&NamedNode>) -> Result<Option<usize>, FederationError> {
        let pattern = match context {
            Some(context) => StatementPattern::any().in_context(context.clone()),
            None => StatementPattern::any(),
        };
        self.delete(&pattern).await
    }

    /// Persists the pending changes of the write adapter.
    pub async fn flush(&self) -> Result<(), FederationError> {
        Ok(self.writer()?.flush().await?)
    }

    fn writer(&self) -> Result<Arc<dyn Adapter>, FederationError> {
        self.pool
            .write_adapter()
            .ok_or(FederationError::NoWriteAdapter)
    }

    async fn dispatch(&self, query: &Query) -> Result<Vec<Solutions>, FederationError> {
        let adapters = self.pool.read_adapters();
        if adapters.is_empty() {
            return Err(FederationError::NoDataSource);
        }
        tracing::debug!(
            sources = adapters.len(),
            concurrent = self.config.concurrent_dispatch,
            "Dispatching query"
        );

        let outcomes = if self.config.concurrent_dispatch {
            join_all(adapters.iter().map(|adapter| self.query_source(adapter, query))).await
        } else {
            let mut outcomes = Vec::with_capacity(adapters.len());
            for adapter in &adapters {
                outcomes.push(self.query_source(adapter, query).await);
            }
            outcomes
        };

        let mut answers = Vec::with_capacity(outcomes.len());
        let mut errors = Vec::new();
        for (adapter, outcome) in adapters.iter().zip(outcomes) {
            match outcome {
                Ok(solutions) => answers.push(solutions),
                Err(error) => {
                    tracing::warn!(
                        adapter_type = adapter.adapter_type(),
                        error = %error,
                        "Data source failed, skipping it"
                    );
                    errors.push(error);
                }
            }
        }

        if answers.is_empty() {
            return Err(match errors.len() {
                1 => errors.remove(0).into(),
                _ => FederationError::AllSourcesFailed(errors),
            });
        }
        Ok(answers)
    }

    async fn query_source(
        &self,
        adapter: &Arc<dyn Adapter>,
        query: &Query,
    ) -> Result<Solutions, AdapterError> {
        match self.config.source_timeout {
            Some(timeout) => tokio::time::timeout(timeout, adapter.query(query))
                .await
                .unwrap_or_else(|_| {
                    Err(AdapterError::Timeout {
                        endpoint: adapter.adapter_type().to_owned(),
                        timeout,
                    })
                }),
            None => adapter.query(query).await,
        }
    }
}

fn merge(query: &Query, answers: Vec<Solutions>) -> Solutions {
    if query.is_ask() {
        return Solutions::Boolean(answers.iter().any(|answer| match answer {
            Solutions::Boolean(value) => *value,
            Solutions::Count(count) => *count > 0,
            Solutions::Rows(rows) => !rows.is_empty(),
        }));
    }
    if query.is_count() {
        return Solutions::Count(
            answers
                .iter()
                .map(|answer| match answer {
                    Solutions::Count(count) => *count,
                    Solutions::Rows(rows) => rows.len(),
                    Solutions::Boolean(_) => 0,
                })
                .sum(),
        );
    }

    let rows = answers
        .into_iter()
        .flat_map(|answer| match answer {
            Solutions::Rows(rows) => rows,
            Solutions::Boolean(_) | Solutions::Count(_) => Vec::new(),
        })
        .filter(|row| row.iter().any(Option::is_some));
    let mut rows = if query.is_distinct() {
        rows.unique().collect::<Vec<_>>()
    } else {
        rows.collect()
    };
    if let Some(limit) = query.limit_clause() {
        if sort_union(query, &mut rows) {
            rows.truncate(limit);
        }
    }
    Solutions::Rows(rows)
}

/// Restores the requested order over the union of per-source rows.
///
/// Returns false if an order variable is not projected, in which case the union cannot be
/// ordered and is left as is.
fn sort_union(query: &Query, rows: &mut [Row]) -> bool {
    let projection = query.projection();
    let keys = query
        .order_clauses()
        .iter()
        .map(|clause| {
            projection
                .iter()
                .position(|variable| *variable == clause.variable)
                .map(|column| (column, clause.direction))
        })
        .collect::<Option<Vec<_>>>();
    let Some(keys) = keys else {
        return false;
    };
    if keys.is_empty() {
        return true;
    }
    rows.sort_by(|lhs, rhs| {
        keys.iter().fold(Ordering::Equal, |ordering, (column, direction)| {
            ordering.then_with(|| {
                let ordering = compare_optional_terms(
                    lhs.get(*column).and_then(Option::as_ref),
                    rhs.get(*column).and_then(Option::as_ref),
                );
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            })
        })
    });
    true
}

fn shape(query: &Query, solutions: Solutions, options: QueryOptions) -> QueryResult {
    let rows = match solutions {
        Solutions::Boolean(value) => return QueryResult::Boolean(value),
        Solutions::Count(count) => return QueryResult::Count(count),
        Solutions::Rows(rows) => rows,
    };

    if query.projection().len() == 1 {
        let mut values = rows
            .into_iter()
            .filter_map(|row| row.into_iter().next().flatten())
            .collect::<Vec<_>>();
        if !options.unwrap_single {
            return QueryResult::Values(values);
        }
        return match values.len() {
            0 => QueryResult::Empty,
            1 => values.pop().map_or(QueryResult::Empty, QueryResult::Value),
            _ => QueryResult::Values(values),
        };
    }

    if !options.unwrap_single {
        return QueryResult::Rows(rows);
    }
    let mut rows = rows;
    match rows.len() {
        0 => QueryResult::Empty,
        1 => rows.pop().map_or(QueryResult::Empty, QueryResult::Row),
        _ => QueryResult::Rows(rows),
    }
}

fn count_literal(count: usize) -> Literal {
    Literal::new_typed_literal(count.to_string(), xsd::INTEGER)
}
