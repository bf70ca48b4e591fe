use crate::loader::{parse_statements, write_statements, Statement};
use crate::memory::{MemStorage, PlanExecutor};
use crate::LoaderError;
use rdf_federation_logical::{JoinPlanner, QueryPlan};
use rdf_federation_model::{BlankNodeSkolemizer, NamedNode, StatementPattern, Triple};
use rdf_federation_query::{Query, SolutionSet, Solutions};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// An embedded, in-memory triple store.
///
/// The store holds a set of statements, so inserting a statement twice has no effect. Cloning the
/// store is cheap and yields a handle to the same content.
///
/// Writers take an exclusive lock for the duration of one operation. Readers share the lock, so
/// queries run concurrently with each other but never observe a half-applied write.
///
/// Usage example:
/// ```
/// use rdf_federation_model::{NamedNode, TermPattern, Triple, Variable};
/// use rdf_federation_query::{Query, Solutions};
/// use rdf_federation_storage::MemTripleStore;
///
/// let store = MemTripleStore::new();
/// let knows = NamedNode::new("http://xmlns.com/foaf/0.1/knows")?;
/// let alice = NamedNode::new("http://example.com/alice")?;
/// let bob = NamedNode::new("http://example.com/bob")?;
/// assert!(store.insert(&Triple::new(alice.clone(), knows.clone(), bob.clone())));
///
/// let mut query = Query::new();
/// query.select(["s"])?.where_pattern(
///     Some(TermPattern::from(Variable::new("s")?)),
///     Some(knows.into()),
///     Some(bob.into()),
/// )?;
/// assert_eq!(
///     store.query(&query),
///     Solutions::Rows(vec![vec![Some(alice.into())]])
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemTripleStore {
    storage: Arc<RwLock<MemStorage>>,
    skolemizer: BlankNodeSkolemizer,
}

impl MemTripleStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a triple into the default context.
    ///
    /// Returns whether the triple was newly added.
    pub fn insert(&self, triple: &Triple) -> bool {
        self.insert_in_context(triple, None)
    }

    /// Inserts a triple into the given context.
    ///
    /// Returns whether the statement was newly added.
    pub fn insert_in_context(&self, triple: &Triple, context: Option<&NamedNode>) -> bool {
        self.write().insert(triple, context)
    }

    /// Removes every statement matching `pattern` and returns how many were removed.
    ///
    /// A pattern without any restriction clears the store.
    pub fn delete(&self, pattern: &StatementPattern) -> usize {
        self.write().remove_matching(pattern)
    }

    /// Removes every statement of a context and returns how many were removed.
    ///
    /// `None` denotes the default context.
    pub fn clear_context(&self, context: Option<&NamedNode>) -> usize {
        self.write().clear_context(context)
    }

    /// Removes all statements.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Returns the number of stored statements.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        let storage = self.read();
        storage
            .encode_pattern(&StatementPattern::from(triple))
            .is_some_and(|pattern| storage.scan(pattern).next().is_some())
    }

    /// Returns the statements matching `pattern`.
    pub fn statements_for_pattern(&self, pattern: &StatementPattern) -> Vec<Statement> {
        let storage = self.read();
        let Some(encoded) = storage.encode_pattern(pattern) else {
            return Vec::new();
        };
        storage
            .scan(encoded)
            .filter_map(|quad| storage.decode_quad(&quad))
            .collect()
    }

    /// Loads an N-Triples or N-Quads file and returns the number of statements read.
    ///
    /// The file is parsed completely before anything is inserted, so a malformed line leaves the
    /// store unchanged. A blank node label maps to the same resource in every load into this
    /// store, so loading a file again adds nothing.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<usize, LoaderError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoaderError::File {
            path: path.to_owned(),
            source,
        })?;
        let count = self.load_from_reader(file)?;
        tracing::info!(path = %path.display(), count, "Loaded statements");
        Ok(count)
    }

    /// Loads N-Triples or N-Quads from a reader and returns the number of statements read.
    pub fn load_from_reader(&self, reader: impl Read) -> Result<usize, LoaderError> {
        let statements = parse_statements(BufReader::new(reader), &self.skolemizer)?;
        let mut storage = self.write();
        for (triple, context) in &statements {
            storage.insert(triple, context.as_ref());
        }
        Ok(statements.len())
    }

    /// Writes all statements as N-Quads to `path` and returns their number.
    ///
    /// The content is written to a temporary file first that then replaces `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<usize> {
        let path = path.as_ref();
        let mut temporary = path.as_os_str().to_owned();
        temporary.push(".tmp");

        let statements = self.read().statements().collect::<Vec<_>>();
        let count = statements.len();
        let writer = write_statements(BufWriter::new(File::create(&temporary)?), statements)?;
        writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        std::fs::rename(&temporary, path)?;

        tracing::info!(path = %path.display(), count, "Saved statements");
        Ok(count)
    }

    /// Writes all statements as N-Quads.
    pub fn dump<W: Write>(&self, writer: W) -> std::io::Result<W> {
        let statements = self.read().statements().collect::<Vec<_>>();
        write_statements(writer, statements)
    }

    /// Evaluates the join tree of `plan` and returns the unfiltered join output.
    ///
    /// An empty plan or a plan over an empty store yields an empty set.
    pub fn execute(&self, plan: &QueryPlan) -> SolutionSet {
        let storage = self.read();
        PlanExecutor::new(&storage, plan).execute()
    }

    /// Plans and evaluates `query`.
    pub fn query(&self, query: &Query) -> Solutions {
        let plan = JoinPlanner.plan(query);
        tracing::debug!(%plan, "Executing join plan");
        self.execute(&plan).finish(query)
    }

    fn read(&self) -> RwLockReadGuard<'_, MemStorage> {
        self.storage.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemStorage> {
        self.storage.write().unwrap_or_else(PoisonError::into_inner)
    }
}
