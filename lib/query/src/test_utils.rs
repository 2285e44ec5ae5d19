use crate::join::{JoinAction, JoinBus, JoinCoefficients, JoinMediator, JoinType};
use crate::operation::{
    query_operation_mediator, OperationTest, QueryOperationAction, QueryOperationBus,
    QueryOperationMediator,
};
use crate::results::{Metadata, QueryOutput, QueryResultBindings};
use async_trait::async_trait;
use futures::StreamExt;
use sparql_bus_common::{ActorError, ActorResult};
use sparql_bus_core::{Actor, PickBest};
use sparql_bus_model::{
    Bindings, GraphPattern, NamedNode, NamedNodePattern, PropertyPathExpression, Term,
    TermPattern, Variable,
};
use std::sync::Arc;

pub fn iri(name: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.com/{name}"))
}

pub fn var(name: &str) -> Variable {
    Variable::new_unchecked(name)
}

/// Evaluates triple patterns and single-predicate paths against a fixed set of triples.
#[derive(Debug)]
pub struct TriplesActor {
    triples: Vec<(NamedNode, NamedNode, NamedNode)>,
}

impl TriplesActor {
    pub fn new(triples: &[(&str, &str, &str)]) -> Self {
        let triples = triples
            .iter()
            .map(|(s, p, o)| (iri(s), iri(p), iri(o)))
            .collect();
        Self { triples }
    }

    fn pattern(operation: &GraphPattern) -> Option<(TermPattern, NamedNodePattern, TermPattern)> {
        match operation {
            GraphPattern::Bgp { patterns } if patterns.len() == 1 => {
                let pattern = &patterns[0];
                Some((
                    pattern.subject.clone(),
                    pattern.predicate.clone(),
                    pattern.object.clone(),
                ))
            }
            GraphPattern::Path {
                subject,
                path: PropertyPathExpression::NamedNode(predicate),
                object,
            } => Some((
                subject.clone(),
                NamedNodePattern::NamedNode(predicate.clone()),
                object.clone(),
            )),
            _ => None,
        }
    }
}

fn bind(bindings: Option<Bindings>, pattern: TermPattern, value: &NamedNode) -> Option<Bindings> {
    let bindings = bindings?;
    match pattern {
        TermPattern::Variable(variable) => match bindings.get(&variable) {
            Some(bound) if bound != &Term::from(value.clone()) => None,
            _ => Some(bindings.set(variable, value.clone())),
        },
        TermPattern::NamedNode(node) if &node == value => Some(bindings),
        _ => None,
    }
}

#[async_trait]
impl Actor<QueryOperationAction, OperationTest, QueryOutput> for TriplesActor {
    fn name(&self) -> &str {
        "actor-query-operation-triples"
    }

    async fn test(&self, action: &QueryOperationAction) -> ActorResult<OperationTest> {
        Self::pattern(&action.operation)
            .map(|_| OperationTest)
            .ok_or_else(|| ActorError::rejected(self.name(), "Not a triple pattern"))
    }

    async fn run(&self, action: QueryOperationAction) -> ActorResult<QueryOutput> {
        let (subject, predicate, object) = Self::pattern(&action.operation)
            .ok_or_else(|| ActorError::rejected(self.name(), "Not a triple pattern"))?;
        let predicate = match predicate {
            NamedNodePattern::NamedNode(node) => TermPattern::NamedNode(node),
            NamedNodePattern::Variable(variable) => TermPattern::Variable(variable),
        };

        let mut variables = Vec::new();
        for pattern in [&subject, &predicate, &object] {
            if let TermPattern::Variable(variable) = pattern {
                if !variables.contains(variable) {
                    variables.push(variable.clone());
                }
            }
        }

        let solutions = self
            .triples
            .iter()
            .filter_map(|(s, p, o)| {
                let bindings = bind(Some(Bindings::new()), subject.clone(), s);
                let bindings = bind(bindings, predicate.clone(), p);
                bind(bindings, object.clone(), o)
            })
            .collect::<Vec<_>>();
        let metadata = Metadata::new(solutions.len() as u64, false);
        Ok(QueryResultBindings::from_bindings(solutions, variables, metadata).into())
    }
}

/// A nested loop inner join.
#[derive(Debug)]
pub struct NestedLoopJoinActor;

#[async_trait]
impl Actor<JoinAction, JoinCoefficients, QueryResultBindings> for NestedLoopJoinActor {
    fn name(&self) -> &str {
        "actor-rdf-join-nested-loop"
    }

    async fn test(&self, action: &JoinAction) -> ActorResult<JoinCoefficients> {
        if action.join_type != JoinType::Inner || action.entries.len() != 2 {
            return Err(ActorError::rejected(self.name(), "Unsupported join"));
        }
        Ok(JoinCoefficients::default())
    }

    async fn run(&self, action: JoinAction) -> ActorResult<QueryResultBindings> {
        let mut entries = action.entries.into_iter();
        let (Some(left), Some(right)) = (entries.next(), entries.next()) else {
            return Err(ActorError::rejected(self.name(), "Unsupported join"));
        };

        let mut variables = left.output.variables().to_vec();
        for variable in right.output.variables() {
            if !variables.contains(variable) {
                variables.push(variable.clone());
            }
        }
        let left = left.output.collect().await?;
        let right = right.output.collect().await?;
        let solutions = left
            .iter()
            .flat_map(|l| right.iter().filter_map(|r| l.merge(r)))
            .collect::<Vec<_>>();
        let metadata = Metadata::new(solutions.len() as u64, false);
        Ok(QueryResultBindings::from_bindings(
            solutions, variables, metadata,
        ))
    }
}

/// Creates the query operation and join mediators over `triples`. `actors` are subscribed before
/// the triples actor.
pub fn mediators(
    triples: &[(&str, &str, &str)],
    actors: impl FnOnce(QueryOperationMediator, JoinMediator) -> Vec<crate::QueryOperationActorRef>,
) -> (QueryOperationMediator, Arc<QueryOperationBus>) {
    let join_bus = JoinBus::new_shared("bus-rdf-join");
    join_bus.subscribe(Arc::new(NestedLoopJoinActor));
    let join_mediator: JoinMediator = Arc::new(PickBest::by_scalar(join_bus, |c| c.iterations));

    let bus = QueryOperationBus::new_shared("bus-query-operation");
    let mediator = query_operation_mediator(Arc::clone(&bus));
    for actor in actors(Arc::clone(&mediator), join_mediator) {
        bus.subscribe(actor);
    }
    bus.subscribe(Arc::new(TriplesActor::new(triples)));
    (mediator, bus)
}

/// Collects the solutions of `output`, rendered and sorted.
pub async fn rendered(output: QueryResultBindings) -> Vec<String> {
    let mut rendered = output
        .take_stream()
        .unwrap()
        .map(|bindings| bindings.unwrap().to_string())
        .collect::<Vec<_>>()
        .await;
    rendered.sort();
    rendered
}
