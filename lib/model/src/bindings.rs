use oxrdf::{Term, Variable};
use rustc_hash::FxHasher;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An immutable solution mapping from variables to RDF terms.
///
/// Updating a [Bindings] never changes the receiver. Instead, [Bindings::set] and
/// [Bindings::delete] return a new instance. Cloning is cheap as the entries are shared.
///
/// Two instances are equal if they bind the same variables to the same terms, regardless of the
/// order in which the variables were bound.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bindings {
    entries: Arc<BTreeMap<Variable, Term>>,
}

impl Bindings {
    /// Creates an empty [Bindings].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the term bound to `variable`.
    pub fn get(&self, variable: &Variable) -> Option<&Term> {
        self.entries.get(variable)
    }

    /// Returns whether `variable` is bound.
    pub fn contains(&self, variable: &Variable) -> bool {
        self.entries.contains_key(variable)
    }

    /// Returns a new [Bindings] where `variable` is bound to `term`.
    #[must_use]
    pub fn set(&self, variable: Variable, term: impl Into<Term>) -> Self {
        let mut entries = BTreeMap::clone(&self.entries);
        entries.insert(variable, term.into());
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Returns a new [Bindings] without `variable`.
    #[must_use]
    pub fn delete(&self, variable: &Variable) -> Self {
        if !self.entries.contains_key(variable) {
            return self.clone();
        }

        let mut entries = BTreeMap::clone(&self.entries);
        entries.remove(variable);
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Returns the number of bound variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no variable is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the bound variables.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.entries.keys()
    }

    /// Returns the variable/term pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.entries.iter()
    }

    /// Returns whether `self` and `other` are join-compatible.
    ///
    /// Two solution mappings are compatible if every variable that is bound in both maps to the
    /// same term.
    pub fn is_compatible(&self, other: &Bindings) -> bool {
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        smaller
            .iter()
            .all(|(variable, term)| larger.get(variable).map_or(true, |other| other == term))
    }

    /// Merges two compatible [Bindings]. Returns [None] if they are not compatible.
    pub fn merge(&self, other: &Bindings) -> Option<Bindings> {
        if !self.is_compatible(other) {
            return None;
        }

        let mut entries = BTreeMap::clone(&self.entries);
        for (variable, term) in other.iter() {
            entries
                .entry(variable.clone())
                .or_insert_with(|| term.clone());
        }
        Some(Self {
            entries: Arc::new(entries),
        })
    }

    /// Hashes the values of `variables` (in the given order). Unbound variables contribute a
    /// marker, so a missing value never hashes like a bound one.
    ///
    /// Equal values always produce equal hashes. Different values may collide.
    pub fn hash_values(&self, variables: &[Variable]) -> u64 {
        let mut hasher = FxHasher::default();
        for variable in variables {
            self.get(variable).hash(&mut hasher);
        }
        hasher.finish()
    }
}

impl FromIterator<(Variable, Term)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (Variable, Term)>>(iter: T) -> Self {
        Self {
            entries: Arc::new(iter.into_iter().collect()),
        }
    }
}

impl Display for Bindings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, (variable, term)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{variable}={term}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{Literal, NamedNode};

    fn var(name: &str) -> Variable {
        Variable::new_unchecked(name)
    }

    fn lit(value: &str) -> Term {
        Literal::new_simple_literal(value).into()
    }

    fn bindings(pairs: &[(&str, &str)]) -> Bindings {
        pairs
            .iter()
            .map(|(variable, value)| (var(variable), lit(value)))
            .collect()
    }

    #[test]
    fn set_and_delete_do_not_modify_the_original() {
        let original = bindings(&[("a", "1")]);

        let extended = original.set(var("b"), lit("2"));
        let reduced = extended.delete(&var("a"));

        assert_eq!(original, bindings(&[("a", "1")]), "original must stay unchanged");
        assert_eq!(extended, bindings(&[("a", "1"), ("b", "2")]), "set must add b");
        assert_eq!(reduced, bindings(&[("b", "2")]), "delete must remove a");
    }

    #[test]
    fn delete_of_unbound_variable_is_identity() {
        let original = bindings(&[("a", "1")]);
        assert_eq!(original.delete(&var("z")), original, "nothing to delete");
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let lhs = Bindings::new().set(var("a"), lit("1")).set(var("b"), lit("2"));
        let rhs = Bindings::new().set(var("b"), lit("2")).set(var("a"), lit("1"));
        assert_eq!(lhs, rhs, "bindings are equal by pairs");
    }

    #[test]
    fn compatibility() {
        let lhs = bindings(&[("a", "a"), ("b", "b")]);

        assert!(
            lhs.is_compatible(&bindings(&[("a", "a"), ("c", "c")])),
            "agreeing on a"
        );
        assert!(
            !lhs.is_compatible(&bindings(&[("a", "d"), ("c", "c")])),
            "disagreeing on a"
        );
        assert!(
            lhs.is_compatible(&bindings(&[("c", "c")])),
            "no shared variables"
        );
    }

    #[test]
    fn merge_compatible() {
        let lhs = bindings(&[("a", "a"), ("b", "b")]);
        let rhs = bindings(&[("a", "a"), ("c", "c")]);

        assert_eq!(
            lhs.merge(&rhs),
            Some(bindings(&[("a", "a"), ("b", "b"), ("c", "c")])),
            "union of both sides"
        );
        assert_eq!(
            lhs.merge(&bindings(&[("a", "x")])),
            None,
            "incompatible bindings cannot be merged"
        );
    }

    #[test]
    fn hash_values_only_depends_on_selected_variables() {
        let variables = [var("a")];
        let lhs = bindings(&[("a", "a"), ("b", "b")]);
        let rhs = bindings(&[("a", "a"), ("c", "c")]);

        assert_eq!(
            lhs.hash_values(&variables),
            rhs.hash_values(&variables),
            "same value for a"
        );
        assert_ne!(
            lhs.hash_values(&variables),
            Bindings::new().hash_values(&variables),
            "unbound must differ from bound"
        );
    }

    #[test]
    fn display() {
        let bindings = Bindings::new()
            .set(var("s"), NamedNode::new_unchecked("http://example.com/s"))
            .set(var("o"), lit("o"));
        insta::assert_snapshot!(bindings, @r#"{?o="o", ?s=<http://example.com/s>}"#);
    }
}
