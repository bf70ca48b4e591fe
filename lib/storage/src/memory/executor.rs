use crate::memory::index::{EncodedQuad, EncodedQuadPattern, IndexComponent};
use crate::memory::object_id::EncodedObjectId;
use crate::memory::storage::MemStorage;
use rdf_federation_logical::{JoinPlan, PatternScan, QueryPlan, ScanTerm};
use rdf_federation_model::{Term, Variable};
use rdf_federation_query::{Row, SolutionSet};
use rustc_hash::FxHashMap;

/// A row of the join output. Every variable of the plan has a fixed slot.
type EncodedRow = Vec<Option<EncodedObjectId>>;

const POSITIONS: [IndexComponent; 3] = [
    IndexComponent::Subject,
    IndexComponent::Predicate,
    IndexComponent::Object,
];

/// Evaluates a [QueryPlan] against a consistent view of a [MemStorage].
///
/// Scans produce encoded rows. Joins are hash joins that build on the scan side. Terms are only
/// decoded once the whole join tree has been evaluated.
pub(crate) struct PlanExecutor<'a> {
    storage: &'a MemStorage,
    plan: &'a QueryPlan,
    slots: FxHashMap<&'a Variable, usize>,
}

impl<'a> PlanExecutor<'a> {
    pub(crate) fn new(storage: &'a MemStorage, plan: &'a QueryPlan) -> Self {
        let slots = plan
            .variables()
            .iter()
            .enumerate()
            .map(|(slot, variable)| (variable, slot))
            .collect();
        Self {
            storage,
            plan,
            slots,
        }
    }

    pub(crate) fn execute(&self) -> SolutionSet {
        let variables = self.plan.variables().to_vec();
        let Some(root) = self.plan.root() else {
            return SolutionSet::new(variables, Vec::new());
        };

        let rows = self
            .evaluate(root)
            .into_iter()
            .map(|row| self.decode_row(&row))
            .collect();
        SolutionSet::new(variables, rows)
    }

    fn evaluate(&self, plan: &JoinPlan) -> Vec<EncodedRow> {
        match plan {
            JoinPlan::Scan(scan) => self.scan(scan),
            JoinPlan::Join { lhs, rhs, on } => {
                let lhs = self.evaluate(lhs);
                if lhs.is_empty() {
                    return lhs;
                }
                let rhs = self.scan(rhs);
                self.hash_join(lhs, &rhs, on)
            }
        }
    }

    fn scan(&self, scan: &PatternScan) -> Vec<EncodedRow> {
        let Some(pattern) = self.encode_scan(scan) else {
            return Vec::new();
        };
        let columns = scan
            .terms()
            .map(|term| term.as_column().and_then(|v| self.slots.get(v).copied()));

        self.storage
            .scan(pattern)
            .filter_map(|quad| self.bind(&quad, &columns))
            .collect()
    }

    /// Encodes the constants of a scan. Returns `None` if a constant was never stored.
    fn encode_scan(&self, scan: &PatternScan) -> Option<EncodedQuadPattern> {
        let object_ids = self.storage.object_ids();
        let mut encoded = [None; 3];
        for (slot, term) in encoded.iter_mut().zip(scan.terms()) {
            if let ScanTerm::Constant(term) = term {
                *slot = Some(object_ids.try_encode(term)?);
            }
        }
        let context = match scan.context() {
            Some(context) => Some(object_ids.try_encode(&Term::NamedNode(context.clone()))?),
            None => None,
        };
        let [subject, predicate, object] = encoded;
        Some(EncodedQuadPattern {
            subject,
            predicate,
            object,
            context,
        })
    }

    /// Binds the columns of a scanned quad. A variable that occurs twice in the pattern must be
    /// bound to the same id twice.
    fn bind(&self, quad: &EncodedQuad, columns: &[Option<usize>; 3]) -> Option<EncodedRow> {
        let mut row = vec![None; self.slots.len()];
        for (position, column) in POSITIONS.iter().zip(columns) {
            let Some(slot) = column else {
                continue;
            };
            let value = quad.get(*position);
            match row[*slot] {
                Some(bound) if bound != value => return None,
                _ => row[*slot] = Some(value),
            }
        }
        Some(row)
    }

    fn hash_join(&self, lhs: Vec<EncodedRow>, rhs: &[EncodedRow], on: &[Variable]) -> Vec<EncodedRow> {
        let key_slots = on
            .iter()
            .filter_map(|v| self.slots.get(v).copied())
            .collect::<Vec<_>>();

        if key_slots.is_empty() {
            return lhs
                .iter()
                .flat_map(|left| rhs.iter().map(move |right| merge(left, right)))
                .collect();
        }

        let mut table: FxHashMap<Vec<Option<EncodedObjectId>>, Vec<&EncodedRow>> =
            FxHashMap::default();
        for right in rhs {
            table.entry(key(right, &key_slots)).or_default().push(right);
        }

        let mut result = Vec::new();
        for left in &lhs {
            if let Some(matches) = table.get(&key(left, &key_slots)) {
                result.extend(matches.iter().map(|right| merge(left, right)));
            }
        }
        result
    }

    fn decode_row(&self, row: &EncodedRow) -> Row {
        row.iter()
            .map(|id| id.and_then(|id| self.storage.object_ids().decode(id).cloned()))
            .collect()
    }
}

fn key(row: &EncodedRow, slots: &[usize]) -> Vec<Option<EncodedObjectId>> {
    slots.iter().map(|slot| row[*slot]).collect()
}

fn merge(lhs: &EncodedRow, rhs: &EncodedRow) -> EncodedRow {
    lhs.iter()
        .zip(rhs)
        .map(|(left, right)| left.or(*right))
        .collect()
}
