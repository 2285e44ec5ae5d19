use sparql_bus_common::ActionContext;

/// An action that can be published on a [Bus](crate::Bus).
///
/// Every action carries the [ActionContext] of the query it belongs to.
pub trait Action: Send + Sync + 'static {
    /// Returns the context of this action.
    fn context(&self) -> &ActionContext;
}
