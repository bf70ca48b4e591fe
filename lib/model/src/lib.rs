mod ordering;
mod skolem;
mod term;
mod triple;

pub use ordering::*;
pub use skolem::*;
pub use term::*;
pub use triple::*;

// Re-export some oxrdf types.
pub use oxrdf::vocab;
pub use oxrdf::Term as DecodedTerm;
pub use oxrdf::{
    BlankNode, GraphName, IriParseError, Literal, LiteralRef, NamedNode, NamedNodeRef, Quad,
    TermParseError, Variable, VariableNameParseError, VariableRef,
};
