use crate::{JoinPlan, PatternScan, QueryPlan, ScanTerm};
use rdf_federation_model::{TermPattern, Variable};
use rdf_federation_query::{Query, WhereClause};

/// Compiles the where clauses of a [Query] into a left-deep join tree.
///
/// The first clause seeds the relation. Every further clause is joined to the accumulated
/// relation on all variables it shares with the clauses before it, or cross-joined if it shares
/// none. Constants stay in the scans so that the store can use them to pick an index. The plan
/// only depends on the order of the where clauses.
#[derive(Clone, Copy, Debug, Default)]
pub struct JoinPlanner;

impl JoinPlanner {
    pub fn plan(&self, query: &Query) -> QueryPlan {
        let mut root: Option<JoinPlan> = None;
        let mut bound: Vec<Variable> = Vec::new();

        for (alias, clause) in query.where_clauses().iter().enumerate() {
            let scan = create_scan(alias, clause);
            let scan_variables = scan.variables();
            let on = scan_variables
                .iter()
                .filter(|v| bound.contains(v))
                .map(|v| (*v).clone())
                .collect::<Vec<_>>();
            for variable in scan_variables {
                if !bound.contains(variable) {
                    bound.push(variable.clone());
                }
            }

            root = Some(match root {
                None => JoinPlan::Scan(scan),
                Some(lhs) => JoinPlan::Join {
                    lhs: Box::new(lhs),
                    rhs: scan,
                    on,
                },
            });
        }

        QueryPlan::new(root)
    }
}

fn create_scan(alias: usize, clause: &WhereClause) -> PatternScan {
    PatternScan::new(
        alias,
        scan_term(&clause.subject),
        scan_term(&clause.predicate),
        scan_term(&clause.object),
        clause.context.clone(),
    )
}

fn scan_term(pattern: &TermPattern) -> ScanTerm {
    match pattern {
        TermPattern::Variable(variable) => ScanTerm::Column(variable.clone()),
        TermPattern::NamedNode(node) => ScanTerm::Constant(node.clone().into()),
        TermPattern::Literal(literal) => ScanTerm::Constant(literal.clone().into()),
    }
}
