mod bindings;

pub use bindings::Bindings;

// Re-export some oxrdf types.
pub use oxrdf::vocab;
pub use oxrdf::{
    BlankNode, BlankNodeRef, GraphName, GraphNameRef, Literal, LiteralRef, NamedNode,
    NamedNodeRef, Subject, SubjectRef, Term, TermRef, Variable, VariableRef,
};

// Re-export the spargebra algebra. Parsing queries is not the concern of this workspace, the
// algebra only serves as the operation tree that is handed to the query operation bus.
pub use spargebra::algebra::{GraphPattern, PropertyPathExpression};
pub use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern};
