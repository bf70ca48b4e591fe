use crate::{Query, SortDirection};
use itertools::Itertools;
use rdf_federation_model::{compare_optional_terms, Term, Variable};
use std::cmp::Ordering;

/// The values bound to the projected variables of a query, one entry per variable.
pub type Row = Vec<Option<Term>>;

/// The answer of a single backend to a query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Solutions {
    Rows(Vec<Row>),
    Boolean(bool),
    Count(usize),
}

impl Solutions {
    /// Returns the answer to `query` if nothing matched.
    pub fn empty_for(query: &Query) -> Self {
        if query.is_ask() {
            Solutions::Boolean(false)
        } else if query.is_count() {
            Solutions::Count(0)
        } else {
            Solutions::Rows(Vec::new())
        }
    }
}

/// Rows of bindings before the filters and solution modifiers of a query are applied.
///
/// Every row holds one entry per variable of the set. The embedded store produces a set from its
/// join output. Backends without server-side filtering produce one from their raw response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolutionSet {
    variables: Vec<Variable>,
    rows: Vec<Row>,
}

impl SolutionSet {
    pub fn new(variables: Vec<Variable>, rows: Vec<Row>) -> Self {
        Self { variables, rows }
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Evaluates the rest of `query` on the set.
    ///
    /// Filters and keyword constraints run first, then ordering, then projection with
    /// deduplication for distinct and count queries, then offset and limit. A query that uses
    /// variables its where clauses never bind has an empty answer.
    pub fn finish(mut self, query: &Query) -> Solutions {
        if !query.unbound_variables().is_empty() {
            return Solutions::empty_for(query);
        }

        self.retain_matching(query);
        if query.is_ask() {
            return Solutions::Boolean(!self.rows.is_empty());
        }

        self.sort(query);
        let rows = self.project(&query.projection());
        if query.is_count() {
            return Solutions::Count(rows.into_iter().unique().count());
        }

        let rows = if query.is_distinct() {
            rows.into_iter().unique().collect()
        } else {
            rows
        };
        Solutions::Rows(slice(rows, query.offset_clause(), query.limit_clause()))
    }

    fn column(&self, variable: &Variable) -> Option<usize> {
        self.variables.iter().position(|v| v == variable)
    }

    fn retain_matching(&mut self, query: &Query) {
        let filters = query
            .filter_clauses()
            .iter()
            .map(|clause| (self.column(&clause.variable), &clause.filter))
            .collect::<Vec<_>>();
        let keywords = query
            .keywords()
            .iter()
            .map(|clause| (self.column(&clause.variable), clause))
            .collect::<Vec<_>>();
        if filters.is_empty() && keywords.is_empty() {
            return;
        }

        self.rows.retain(|row| {
            filters
                .iter()
                .all(|(column, filter)| value(row, *column).is_some_and(|v| filter.matches(v)))
                && keywords
                    .iter()
                    .all(|(column, clause)| value(row, *column).is_some_and(|v| clause.matches(v)))
        });
    }

    fn sort(&mut self, query: &Query) {
        let keys = query
            .order_clauses()
            .iter()
            .map(|clause| (self.column(&clause.variable), clause.direction))
            .collect::<Vec<_>>();
        if keys.is_empty() {
            return;
        }

        self.rows.sort_by(|lhs, rhs| {
            keys.iter().fold(Ordering::Equal, |ordering, (column, direction)| {
                ordering.then_with(|| {
                    let ordering = compare_optional_terms(value(lhs, *column), value(rhs, *column));
                    match direction {
                        SortDirection::Ascending => ordering,
                        SortDirection::Descending => ordering.reverse(),
                    }
                })
            })
        });
    }

    fn project(self, projection: &[Variable]) -> Vec<Row> {
        let columns = projection
            .iter()
            .map(|variable| self.column(variable))
            .collect::<Vec<_>>();
        self.rows
            .into_iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| value(&row, *column).cloned())
                    .collect()
            })
            .collect()
    }
}

fn value(row: &Row, column: Option<usize>) -> Option<&Term> {
    column.and_then(|column| row.get(column)).and_then(Option::as_ref)
}

/// Applies an offset and a limit to rows.
pub fn slice(rows: Vec<Row>, offset: Option<usize>, limit: Option<usize>) -> Vec<Row> {
    rows.into_iter()
        .skip(offset.unwrap_or(0))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}
