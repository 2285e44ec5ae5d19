use crate::error::QueryError;
use crate::operation::{
    OperationType, QueryOperationAction, QueryOperationMediator, TypedOperationActor,
};
use crate::results::QueryOutput;
use crate::variables::fresh_variable;
use async_trait::async_trait;
use futures::{future, StreamExt, TryStreamExt};
use sparql_bus_common::{ActionContext, ActorResult};
use sparql_bus_model::{
    GraphPattern, NamedNodePattern, PropertyPathExpression, Term, TriplePattern,
};

/// Evaluates a negated property set (`?s !(p1|p2) ?o`).
///
/// The path is evaluated as a triple pattern with a generated predicate variable. Solutions whose
/// predicate is one of the negated IRIs are dropped and the generated variable is removed.
#[derive(Debug)]
pub struct PathNpsActor {
    mediator_query_operation: QueryOperationMediator,
}

impl PathNpsActor {
    /// Creates a new [PathNpsActor].
    pub fn new(mediator_query_operation: QueryOperationMediator) -> Self {
        Self {
            mediator_query_operation,
        }
    }
}

#[async_trait]
impl TypedOperationActor for PathNpsActor {
    fn name(&self) -> &str {
        "actor-query-operation-path-nps"
    }

    fn operation_type(&self) -> OperationType {
        OperationType::PathNps
    }

    async fn run_operation(
        &self,
        operation: GraphPattern,
        context: ActionContext,
    ) -> ActorResult<QueryOutput> {
        let predicate = fresh_variable("nps_p", &operation);
        let (subject, negated, object) = match operation {
            GraphPattern::Path {
                subject,
                path: PropertyPathExpression::NegatedPropertySet(negated),
                object,
            } => (subject, negated, object),
            operation => {
                return Err(QueryError::InvalidOperation(format!(
                    "Expected a negated property set, got {operation}"
                ))
                .into())
            }
        };

        let pattern = GraphPattern::Bgp {
            patterns: vec![TriplePattern {
                subject,
                predicate: NamedNodePattern::Variable(predicate.clone()),
                object,
            }],
        };
        let output = self
            .mediator_query_operation
            .mediate(QueryOperationAction::new(pattern, context))
            .await?
            .into_bindings()?;

        let variables = output
            .variables()
            .iter()
            .filter(|variable| **variable != predicate)
            .cloned()
            .collect();
        let result = output.map_stream(variables, move |stream| {
            let filtered = predicate.clone();
            stream
                .try_filter(move |bindings| {
                    let is_negated = match bindings.get(&filtered) {
                        Some(Term::NamedNode(node)) => negated.contains(node),
                        _ => false,
                    };
                    future::ready(!is_negated)
                })
                .map_ok(move |bindings| bindings.delete(&predicate))
                .boxed()
        })?;
        Ok(result.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::TypedOperationAdapter;
    use crate::test_utils::{iri, mediators, rendered, var};
    use sparql_bus_model::TermPattern;

    #[tokio::test]
    async fn drops_negated_predicates() {
        let (mediator, _bus) = mediators(
            &[
                ("a", "knows", "b"),
                ("a", "likes", "c"),
                ("a", "hates", "d"),
                ("e", "likes", "f"),
            ],
            |operation, _| vec![TypedOperationAdapter::shared(PathNpsActor::new(operation))],
        );
        let path = GraphPattern::Path {
            subject: TermPattern::NamedNode(iri("a")),
            path: PropertyPathExpression::NegatedPropertySet(vec![iri("knows"), iri("hates")]),
            object: TermPattern::Variable(var("o")),
        };

        let output = mediator
            .mediate(QueryOperationAction::new(path, ActionContext::new()))
            .await
            .unwrap()
            .into_bindings()
            .unwrap();

        assert_eq!(output.variables(), &[var("o")]);
        assert_eq!(output.metadata().await.unwrap().cardinality, 3);
        assert_eq!(
            rendered(output).await,
            vec!["{?o=<http://example.com/c>}"]
        );
    }
}
