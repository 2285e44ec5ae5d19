use rustc_hash::FxHashSet;
use sparql_bus_model::{GraphPattern, Variable};

/// Returns a variable that does not occur in `pattern`.
///
/// The variable is named `{prefix}{n}` for the smallest `n` that yields an unused name.
pub fn fresh_variable(prefix: &str, pattern: &GraphPattern) -> Variable {
    let mut used = FxHashSet::default();
    pattern.on_in_scope_variable(|variable| {
        used.insert(variable.as_str().to_owned());
    });

    (0_u64..)
        .map(|i| format!("{prefix}{i}"))
        .find(|name| !used.contains(name))
        .map(Variable::new_unchecked)
        .unwrap_or_else(|| Variable::new_unchecked(prefix))
}
