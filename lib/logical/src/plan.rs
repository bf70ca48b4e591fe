use rdf_federation_model::{NamedNode, Term, Variable};
use std::fmt;
use std::fmt::{Display, Formatter};

/// A position of a [PatternScan]. Constants filter the scanned triples, columns bind variables.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScanTerm {
    Constant(Term),
    Column(Variable),
}

impl ScanTerm {
    pub fn as_column(&self) -> Option<&Variable> {
        match self {
            ScanTerm::Column(variable) => Some(variable),
            ScanTerm::Constant(_) => None,
        }
    }
}

impl Display for ScanTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScanTerm::Constant(term) => write!(f, "{term}"),
            ScanTerm::Column(variable) => write!(f, "{variable}"),
        }
    }
}

/// A scan of the triple table for a single where clause.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PatternScan {
    alias: usize,
    subject: ScanTerm,
    predicate: ScanTerm,
    object: ScanTerm,
    context: Option<NamedNode>,
}

impl PatternScan {
    pub fn new(
        alias: usize,
        subject: ScanTerm,
        predicate: ScanTerm,
        object: ScanTerm,
        context: Option<NamedNode>,
    ) -> Self {
        Self {
            alias,
            subject,
            predicate,
            object,
            context,
        }
    }

    /// The index of the where clause this scan was created from.
    pub fn alias(&self) -> usize {
        self.alias
    }

    pub fn subject(&self) -> &ScanTerm {
        &self.subject
    }

    pub fn predicate(&self) -> &ScanTerm {
        &self.predicate
    }

    pub fn object(&self) -> &ScanTerm {
        &self.object
    }

    /// If set, only triples of this context are scanned.
    pub fn context(&self) -> Option<&NamedNode> {
        self.context.as_ref()
    }

    pub fn terms(&self) -> [&ScanTerm; 3] {
        [&self.subject, &self.predicate, &self.object]
    }

    /// Returns the distinct variables bound by the scan.
    pub fn variables(&self) -> Vec<&Variable> {
        let mut variables = Vec::with_capacity(3);
        for variable in self.terms().into_iter().filter_map(ScanTerm::as_column) {
            if !variables.contains(&variable) {
                variables.push(variable);
            }
        }
        variables
    }
}

impl Display for PatternScan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scan[t{}]: {} {} {}",
            self.alias, self.subject, self.predicate, self.object
        )?;
        if let Some(context) = &self.context {
            write!(f, " IN {context}")?;
        }
        Ok(())
    }
}

/// A left-deep join tree over pattern scans.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum JoinPlan {
    Scan(PatternScan),
    /// Joins the accumulated relation with one more scan. The relations are equi-joined on the
    /// variables in `on`. If `on` is empty, the join is a cross join.
    Join {
        lhs: Box<JoinPlan>,
        rhs: PatternScan,
        on: Vec<Variable>,
    },
}

impl JoinPlan {
    /// Returns the variables bound by the plan in first-appearance order.
    pub fn variables(&self) -> Vec<Variable> {
        match self {
            JoinPlan::Scan(scan) => scan.variables().into_iter().cloned().collect(),
            JoinPlan::Join { lhs, rhs, .. } => {
                let mut variables = lhs.variables();
                for variable in rhs.variables() {
                    if !variables.contains(variable) {
                        variables.push(variable.clone());
                    }
                }
                variables
            }
        }
    }

    /// Returns the scans in the order they are joined.
    pub fn scans(&self) -> Vec<&PatternScan> {
        match self {
            JoinPlan::Scan(scan) => vec![scan],
            JoinPlan::Join { lhs, rhs, .. } => {
                let mut scans = lhs.scans();
                scans.push(rhs);
                scans
            }
        }
    }

    fn explain_lines(&self, indent: usize, lines: &mut Vec<String>) {
        let padding = "  ".repeat(indent);
        match self {
            JoinPlan::Scan(scan) => lines.push(format!("{padding}{scan}")),
            JoinPlan::Join { lhs, rhs, on } => {
                if on.is_empty() {
                    lines.push(format!("{padding}CrossJoin"));
                } else {
                    let on = on
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    lines.push(format!("{padding}Join: on=[{on}]"));
                }
                lhs.explain_lines(indent + 1, lines);
                lines.push(format!("{padding}  {rhs}"));
            }
        }
    }
}

impl Display for JoinPlan {
    /// Writes the plan as an indented tree, one node per line.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();
        self.explain_lines(0, &mut lines);
        f.write_str(&lines.join("\n"))
    }
}

/// The executable form of the where clauses of a query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct QueryPlan {
    root: Option<JoinPlan>,
    variables: Vec<Variable>,
}

impl QueryPlan {
    pub fn new(root: Option<JoinPlan>) -> Self {
        let variables = root.as_ref().map(JoinPlan::variables).unwrap_or_default();
        Self { root, variables }
    }

    /// The join tree, or `None` for a query without where clauses.
    pub fn root(&self) -> Option<&JoinPlan> {
        self.root.as_ref()
    }

    /// The variables of every output row, in order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }
}

impl Display for QueryPlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => write!(f, "{root}"),
            None => f.write_str("EmptyRelation"),
        }
    }
}
