use crate::sparql::{SparqlCompiler, SparqlDialect};
use crate::{
    ComparisonOperator, Filter, FilterClause, KeywordClause, PatternPosition, QueryError,
    RegexPattern,
};
use rdf_federation_model::{NamedNode, Term, TermPattern, Variable};
use std::fmt;

/// The name prefix of the variables that stand in for wildcard terms.
///
/// User-chosen variables must not start with this prefix.
pub const ANONYMOUS_VARIABLE_PREFIX: &str = "_anon";

/// A triple pattern, optionally restricted to a context.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WhereClause {
    pub subject: TermPattern,
    pub predicate: TermPattern,
    pub object: TermPattern,
    pub context: Option<NamedNode>,
}

impl WhereClause {
    pub fn terms(&self) -> [&TermPattern; 3] {
        [&self.subject, &self.predicate, &self.object]
    }

    /// Returns the variables of the clause in subject, predicate, object order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.terms().into_iter().filter_map(TermPattern::as_variable)
    }

    pub fn binds(&self, variable: &Variable) -> bool {
        self.variables().any(|v| v == variable)
    }
}

impl fmt::Display for WhereClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OrderClause {
    pub variable: Variable,
    pub direction: SortDirection,
}

/// A conjunctive query over triple patterns.
///
/// The query is built with mutators that return the builder for chaining. Applying an identical
/// constraint twice has no additional effect. Mutators that take variable names validate them and
/// fail instead of coercing invalid input.
///
/// ```
/// # use rdf_federation_query::Query;
/// # use rdf_federation_model::{NamedNode, Variable};
/// let knows = NamedNode::new("http://xmlns.com/foaf/0.1/knows")?;
/// let mut query = Query::new();
/// query
///     .distinct(["s"])?
///     .where_pattern(Some(Variable::new("s")?.into()), Some(knows.into()), None)?
///     .limit(10);
/// assert_eq!(
///     query.to_sparql()?,
///     "SELECT DISTINCT ?s WHERE { ?s <http://xmlns.com/foaf/0.1/knows> ?_anon0 .} LIMIT 10"
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    select_clauses: Vec<Variable>,
    where_clauses: Vec<WhereClause>,
    filter_clauses: Vec<FilterClause>,
    order_clauses: Vec<OrderClause>,
    keywords: Vec<KeywordClause>,
    distinct: bool,
    ask: bool,
    count: bool,
    limit: Option<usize>,
    offset: Option<usize>,
    anonymous_variables: usize,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the given variables to the select list.
    pub fn select<'a>(
        &mut self,
        variables: impl IntoIterator<Item = &'a str>,
    ) -> Result<&mut Self, QueryError> {
        for name in variables {
            let variable = parse_variable(name)?;
            if !self.select_clauses.contains(&variable) {
                self.select_clauses.push(variable);
            }
        }
        Ok(self)
    }

    /// Selects the given variables and removes duplicate rows from the result.
    pub fn distinct<'a>(
        &mut self,
        variables: impl IntoIterator<Item = &'a str>,
    ) -> Result<&mut Self, QueryError> {
        self.distinct = true;
        self.select(variables)
    }

    /// Selects the given variables and asks for the number of distinct rows instead of the rows.
    pub fn count<'a>(
        &mut self,
        variables: impl IntoIterator<Item = &'a str>,
    ) -> Result<&mut Self, QueryError> {
        self.count = true;
        self.select(variables)
    }

    /// Asks whether the where clauses match at all.
    pub fn ask(&mut self) -> &mut Self {
        self.ask = true;
        self
    }

    pub fn clear_select(&mut self) -> &mut Self {
        self.select_clauses.clear();
        self
    }

    /// Adds a triple pattern. `None` terms match anything.
    ///
    /// Every `None` is replaced by a fresh anonymous variable that never co-binds with another
    /// clause. Subjects and predicates must be resources or variables.
    pub fn where_pattern(
        &mut self,
        subject: Option<TermPattern>,
        predicate: Option<TermPattern>,
        object: Option<TermPattern>,
    ) -> Result<&mut Self, QueryError> {
        self.add_where_clause([subject, predicate, object], None)
    }

    /// Adds a triple pattern that only matches statements of the given context.
    pub fn where_in_context(
        &mut self,
        subject: Option<TermPattern>,
        predicate: Option<TermPattern>,
        object: Option<TermPattern>,
        context: NamedNode,
    ) -> Result<&mut Self, QueryError> {
        self.add_where_clause([subject, predicate, object], Some(context))
    }

    pub fn filter(&mut self, variable: &str, filter: Filter) -> Result<&mut Self, QueryError> {
        let clause = FilterClause {
            variable: parse_variable(variable)?,
            filter,
        };
        if !self.filter_clauses.contains(&clause) {
            self.filter_clauses.push(clause);
        }
        Ok(self)
    }

    /// Requires the lexical form of `variable` to match the regular expression `pattern`.
    pub fn regex(&mut self, variable: &str, pattern: &str) -> Result<&mut Self, QueryError> {
        self.filter(variable, Filter::Regex(RegexPattern::new(pattern)?))
    }

    /// Requires `variable` to be a literal tagged with `tag`, or with a sub-tag of it unless
    /// `exact` is set.
    pub fn lang(
        &mut self,
        variable: &str,
        tag: &str,
        exact: bool,
    ) -> Result<&mut Self, QueryError> {
        self.filter(
            variable,
            Filter::Lang {
                tag: tag.to_owned(),
                exact,
            },
        )
    }

    pub fn datatype(
        &mut self,
        variable: &str,
        datatype: NamedNode,
    ) -> Result<&mut Self, QueryError> {
        self.filter(variable, Filter::Datatype(datatype))
    }

    pub fn compare(
        &mut self,
        variable: &str,
        operator: ComparisonOperator,
        operand: impl Into<Term>,
    ) -> Result<&mut Self, QueryError> {
        self.filter(
            variable,
            Filter::Compare {
                operator,
                operand: operand.into(),
            },
        )
    }

    /// Orders the result ascending by the given variables.
    pub fn sort<'a>(
        &mut self,
        variables: impl IntoIterator<Item = &'a str>,
    ) -> Result<&mut Self, QueryError> {
        self.add_order_clauses(variables, SortDirection::Ascending)
    }

    /// Orders the result descending by the given variables.
    pub fn reverse_sort<'a>(
        &mut self,
        variables: impl IntoIterator<Item = &'a str>,
    ) -> Result<&mut Self, QueryError> {
        self.add_order_clauses(variables, SortDirection::Descending)
    }

    pub fn limit(&mut self, limit: usize) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: usize) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    /// Adds a free-text constraint. Texts for the same variable are joined with a space.
    pub fn keyword_where(&mut self, variable: &str, text: &str) -> Result<&mut Self, QueryError> {
        let variable = parse_variable(variable)?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(self);
        }
        match self.keywords.iter_mut().find(|k| k.variable == variable) {
            Some(clause) => {
                if !format!(" {} ", clause.text).contains(&format!(" {text} ")) {
                    clause.text.push(' ');
                    clause.text.push_str(text);
                }
            }
            None => self.keywords.push(KeywordClause {
                variable,
                text: text.to_owned(),
            }),
        }
        Ok(self)
    }

    pub fn select_clauses(&self) -> &[Variable] {
        &self.select_clauses
    }

    pub fn where_clauses(&self) -> &[WhereClause] {
        &self.where_clauses
    }

    pub fn filter_clauses(&self) -> &[FilterClause] {
        &self.filter_clauses
    }

    /// Returns all ordering constraints in the order they were added.
    pub fn order_clauses(&self) -> &[OrderClause] {
        &self.order_clauses
    }

    pub fn sort_clauses(&self) -> impl Iterator<Item = &Variable> {
        self.order_variables(SortDirection::Ascending)
    }

    pub fn reverse_sort_clauses(&self) -> impl Iterator<Item = &Variable> {
        self.order_variables(SortDirection::Descending)
    }

    pub fn keywords(&self) -> &[KeywordClause] {
        &self.keywords
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn is_ask(&self) -> bool {
        self.ask
    }

    pub fn is_count(&self) -> bool {
        self.count
    }

    pub fn limit_clause(&self) -> Option<usize> {
        self.limit
    }

    pub fn offset_clause(&self) -> Option<usize> {
        self.offset
    }

    /// Returns the variables bound by the where clauses in first-appearance order.
    pub fn bound_variables(&self) -> Vec<&Variable> {
        let mut variables = Vec::new();
        for variable in self.where_clauses.iter().flat_map(WhereClause::variables) {
            if !variables.contains(&variable) {
                variables.push(variable);
            }
        }
        variables
    }

    /// Returns the variables of the result rows.
    ///
    /// These are the selected variables or, if nothing is selected, every non-anonymous variable
    /// bound by the where clauses.
    pub fn projection(&self) -> Vec<Variable> {
        if !self.select_clauses.is_empty() {
            return self.select_clauses.clone();
        }
        self.bound_variables()
            .into_iter()
            .filter(|v| !is_anonymous(v))
            .cloned()
            .collect()
    }

    /// Returns the variables that are used outside the where clauses but never bound by them.
    ///
    /// A query with unbound variables has an empty result.
    pub fn unbound_variables(&self) -> Vec<&Variable> {
        let bound = self.bound_variables();
        let mut unbound = Vec::new();
        let used = self
            .select_clauses
            .iter()
            .chain(self.filter_clauses.iter().map(|f| &f.variable))
            .chain(self.order_clauses.iter().map(|o| &o.variable))
            .chain(self.keywords.iter().map(|k| &k.variable));
        for variable in used {
            if !bound.contains(&variable) && !unbound.contains(&variable) {
                unbound.push(variable);
            }
        }
        unbound
    }

    /// Compiles the query to standard SPARQL.
    pub fn to_sparql(&self) -> Result<String, QueryError> {
        SparqlCompiler::new(SparqlDialect::Standard).compile(self)
    }

    fn add_where_clause(
        &mut self,
        terms: [Option<TermPattern>; 3],
        context: Option<NamedNode>,
    ) -> Result<&mut Self, QueryError> {
        for (term, position) in terms.iter().zip([
            PatternPosition::Subject,
            PatternPosition::Predicate,
            PatternPosition::Object,
        ]) {
            match term {
                Some(TermPattern::Variable(variable)) if is_anonymous(variable) => {
                    return Err(QueryError::ReservedVariable(variable.as_str().to_owned()));
                }
                Some(TermPattern::Literal(literal)) if position != PatternPosition::Object => {
                    return Err(QueryError::LiteralInPosition {
                        position,
                        literal: literal.clone(),
                    });
                }
                _ => {}
            }
        }

        let already_present = self
            .where_clauses
            .iter()
            .any(|clause| clause.context == context && is_same_request(clause, &terms));
        if already_present {
            return Ok(self);
        }

        let [subject, predicate, object] = terms.map(|term| match term {
            Some(term) => term,
            None => TermPattern::Variable(self.mint_anonymous_variable()),
        });
        self.where_clauses.push(WhereClause {
            subject,
            predicate,
            object,
            context,
        });
        Ok(self)
    }

    fn mint_anonymous_variable(&mut self) -> Variable {
        let variable = Variable::new_unchecked(format!(
            "{ANONYMOUS_VARIABLE_PREFIX}{}",
            self.anonymous_variables
        ));
        self.anonymous_variables += 1;
        variable
    }

    fn add_order_clauses<'a>(
        &mut self,
        variables: impl IntoIterator<Item = &'a str>,
        direction: SortDirection,
    ) -> Result<&mut Self, QueryError> {
        for name in variables {
            let clause = OrderClause {
                variable: parse_variable(name)?,
                direction,
            };
            if !self.order_clauses.contains(&clause) {
                self.order_clauses.push(clause);
            }
        }
        Ok(self)
    }

    fn order_variables(&self, direction: SortDirection) -> impl Iterator<Item = &Variable> {
        self.order_clauses
            .iter()
            .filter(move |o| o.direction == direction)
            .map(|o| &o.variable)
    }
}

/// Returns true if the variable was minted for a wildcard term.
pub fn is_anonymous(variable: &Variable) -> bool {
    variable.as_str().starts_with(ANONYMOUS_VARIABLE_PREFIX)
}

fn is_same_request(clause: &WhereClause, terms: &[Option<TermPattern>; 3]) -> bool {
    clause
        .terms()
        .into_iter()
        .zip(terms)
        .all(|(existing, requested)| match requested {
            Some(requested) => existing == requested,
            None => existing.as_variable().is_some_and(is_anonymous),
        })
}

/// Parses a user-chosen variable name. A leading `?` or `$` is accepted.
fn parse_variable(name: &str) -> Result<Variable, QueryError> {
    let name = name
        .strip_prefix('?')
        .or_else(|| name.strip_prefix('$'))
        .unwrap_or(name);
    let variable = Variable::new(name).map_err(|source| QueryError::InvalidVariable {
        name: name.to_owned(),
        source,
    })?;
    if is_anonymous(&variable) {
        return Err(QueryError::ReservedVariable(name.to_owned()));
    }
    Ok(variable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_federation_model::Literal;

    fn var(name: &str) -> Option<TermPattern> {
        Some(Variable::new_unchecked(name).into())
    }

    fn ex(name: &str) -> Option<TermPattern> {
        Some(NamedNode::new_unchecked(format!("http://example.com/{name}")).into())
    }

    #[test]
    fn select_is_idempotent() -> Result<(), QueryError> {
        let mut query = Query::new();
        query.select(["s", "p"])?.select(["s"])?.select(["?p"])?;
        assert_eq!(
            query.select_clauses(),
            [Variable::new_unchecked("s"), Variable::new_unchecked("p")]
        );
        Ok(())
    }

    #[test]
    fn identical_where_clause_is_added_once() -> Result<(), QueryError> {
        let mut query = Query::new();
        query
            .where_pattern(var("s"), ex("p"), None)?
            .where_pattern(var("s"), ex("p"), None)?;
        assert_eq!(query.where_clauses().len(), 1);
        Ok(())
    }

    #[test]
    fn wildcards_never_unify() -> Result<(), QueryError> {
        let mut query = Query::new();
        query
            .where_pattern(None, ex("p"), None)?
            .where_pattern(None, ex("q"), var("o"))?;
        let anonymous = query
            .where_clauses()
            .iter()
            .flat_map(WhereClause::variables)
            .filter(|v| is_anonymous(v))
            .collect::<Vec<_>>();
        assert_eq!(anonymous.len(), 3);
        assert!(anonymous[0] != anonymous[1] && anonymous[1] != anonymous[2]);
        Ok(())
    }

    #[test]
    fn literal_subject_is_rejected() {
        let literal = Some(Literal::new_simple_literal("x").into());
        let result = Query::new().where_pattern(literal.clone(), ex("p"), var("o")).err();
        assert!(matches!(
            result,
            Some(QueryError::LiteralInPosition {
                position: PatternPosition::Subject,
                ..
            })
        ));
        let result = Query::new().where_pattern(var("s"), literal, var("o")).err();
        assert!(matches!(
            result,
            Some(QueryError::LiteralInPosition {
                position: PatternPosition::Predicate,
                ..
            })
        ));
    }

    #[test]
    fn literal_object_is_accepted() -> Result<(), QueryError> {
        let mut query = Query::new();
        query.where_pattern(var("s"), ex("p"), Some(Literal::new_simple_literal("x").into()))?;
        assert_eq!(query.where_clauses().len(), 1);
        Ok(())
    }

    #[test]
    fn invalid_and_reserved_names_are_rejected() {
        assert!(matches!(
            Query::new().select(["not a name"]).err(),
            Some(QueryError::InvalidVariable { .. })
        ));
        assert!(matches!(
            Query::new().select(["_anon0"]).err(),
            Some(QueryError::ReservedVariable(_))
        ));
        assert!(matches!(
            Query::new().where_pattern(var("_anon3"), ex("p"), None).err(),
            Some(QueryError::ReservedVariable(_))
        ));
    }

    #[test]
    fn keywords_are_concatenated() -> Result<(), QueryError> {
        let mut query = Query::new();
        query
            .keyword_where("o", "Bernhard")?
            .keyword_where("o", "Schandl")?
            .keyword_where("o", "Schandl")?;
        assert_eq!(query.keywords().len(), 1);
        assert_eq!(query.keywords()[0].text, "Bernhard Schandl");
        Ok(())
    }

    #[test]
    fn sort_and_reverse_sort_keep_declaration_order() -> Result<(), QueryError> {
        let mut query = Query::new();
        query.sort(["a"])?.reverse_sort(["b"])?.sort(["c", "a"])?;
        let ascending = query.sort_clauses().map(Variable::as_str).collect::<Vec<_>>();
        let descending = query
            .reverse_sort_clauses()
            .map(Variable::as_str)
            .collect::<Vec<_>>();
        assert_eq!(ascending, ["a", "c"]);
        assert_eq!(descending, ["b"]);
        assert_eq!(query.order_clauses().len(), 3);
        Ok(())
    }

    #[test]
    fn empty_select_projects_named_variables() -> Result<(), QueryError> {
        let mut query = Query::new();
        query
            .where_pattern(var("s"), ex("p"), None)?
            .where_pattern(var("o"), ex("q"), var("s"))?;
        let projection = query.projection();
        assert_eq!(
            projection,
            [Variable::new_unchecked("s"), Variable::new_unchecked("o")]
        );
        Ok(())
    }

    #[test]
    fn unbound_variables_are_reported() -> Result<(), QueryError> {
        let mut query = Query::new();
        query
            .select(["s", "x"])?
            .sort(["y"])?
            .where_pattern(var("s"), ex("p"), None)?;
        let unbound = query
            .unbound_variables()
            .into_iter()
            .map(Variable::as_str)
            .collect::<Vec<_>>();
        assert_eq!(unbound, ["x", "y"]);
        Ok(())
    }
}
