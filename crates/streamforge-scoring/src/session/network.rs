//! The runtime node network of one session and its propagation loop.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;
use streamforge_core::{Score, StreamForgeError};
use tracing::{debug, trace};

use super::inliner::{ConstraintTotal, ScoreInliner};
use super::node::{Ctx, NodeKind, SourceNode};
use super::tuple::{Event, TupleArena, TupleId};
use crate::api::analysis::{
    ConstraintAnalysis, ConstraintJustification, DetailedConstraintMatch, EntityRef,
};
use crate::graph::{DeclId, DeclarationGraph, Side};
use crate::value::{Key, Value};

pub(crate) type NodeId = usize;

pub(crate) struct RuntimeNode<Sc: Score> {
    pub(crate) decl: DeclId,
    pub(crate) rank: usize,
    pub(crate) children: SmallVec<[NodeId; 2]>,
    pub(crate) queue: Vec<TupleId>,
    pub(crate) kind: NodeKind<Sc>,
}

/// What a node was evaluating when it was last entered.
enum Subject {
    Tuple(TupleId),
    Fact(Value),
}

struct Cursor {
    node: NodeId,
    subject: Subject,
}

pub(crate) struct Network<Sc: Score> {
    graph: Arc<DeclarationGraph<Sc>>,
    nodes: Vec<RuntimeNode<Sc>>,
    // node ids by (rank, declaration id)
    order: Vec<NodeId>,
    sources: HashMap<TypeId, SmallVec<[NodeId; 2]>>,
    // (constraint index, score node), by constraint index
    score_nodes: Vec<(usize, NodeId)>,
    tuples: TupleArena,
    inliner: ScoreInliner<Sc>,
    cursor: Option<Cursor>,
}

impl<Sc: Score> Network<Sc> {
    pub(crate) fn new(graph: Arc<DeclarationGraph<Sc>>, nodes: Vec<RuntimeNode<Sc>>) -> Self {
        let mut order: Vec<NodeId> = (0..nodes.len()).collect();
        order.sort_by_key(|&id| (nodes[id].rank, nodes[id].decl));

        let mut sources: HashMap<TypeId, SmallVec<[NodeId; 2]>> = HashMap::new();
        let mut score_nodes = Vec::new();
        for (id, node) in nodes.iter().enumerate() {
            match &node.kind {
                NodeKind::Source(source) => sources.entry(source.type_id()).or_default().push(id),
                NodeKind::Score(score) => score_nodes.push((score.constraint(), id)),
                _ => {}
            }
        }
        score_nodes.sort_unstable();

        let inliner = ScoreInliner::new(
            (0..graph.constraint_count())
                .map(|c| graph.constraint(c).constraint_ref.clone())
                .collect(),
        );
        Self {
            graph,
            nodes,
            order,
            sources,
            score_nodes,
            tuples: TupleArena::default(),
            inliner,
            cursor: None,
        }
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn max_rank(&self) -> usize {
        self.nodes.iter().map(|node| node.rank).max().unwrap_or(0)
    }

    pub(crate) fn live_tuples(&self) -> usize {
        self.tuples.live()
    }

    pub(crate) fn score(&self) -> Sc {
        self.inliner.score()
    }

    pub(crate) fn insert_fact(&mut self, type_id: TypeId, key: &Key, value: &Value) {
        self.stage_fact(type_id, value, |source, ctx| source.insert(key, value, ctx));
    }

    pub(crate) fn update_fact(&mut self, type_id: TypeId, key: &Key, value: &Value) {
        self.stage_fact(type_id, value, |source, ctx| source.update(key, value, ctx));
    }

    pub(crate) fn retract_fact(&mut self, type_id: TypeId, key: &Key, value: &Value) {
        self.stage_fact(type_id, value, |source, ctx| source.retract(key, ctx));
    }

    fn stage_fact<F>(&mut self, type_id: TypeId, value: &Value, mut stage: F)
    where
        F: FnMut(&mut SourceNode, &mut Ctx<'_>),
    {
        let Some(sources) = self.sources.get(&type_id).cloned() else {
            return;
        };
        for node in sources {
            self.cursor = Some(Cursor {
                node,
                subject: Subject::Fact(value.clone()),
            });
            let Network { nodes, tuples, .. } = self;
            let RuntimeNode { queue, kind, .. } = &mut nodes[node];
            if let NodeKind::Source(source) = kind {
                let mut ctx = Ctx { tuples, queue };
                stage(source, &mut ctx);
                trace!(node, pending = ctx.queue.len(), "Staged fact at source");
            }
        }
        self.cursor = None;
    }

    /// Delivers every staged change, node by node in rank order, and
    /// returns the number of events propagated.
    pub(crate) fn settle(&mut self) -> usize {
        let mut propagated = 0;
        for position in 0..self.order.len() {
            let node = self.order[position];
            if self.nodes[node].queue.is_empty() {
                continue;
            }
            let mut queue = std::mem::take(&mut self.nodes[node].queue);
            for &tuple in &queue {
                let Some(event) = self.tuples.begin_propagation(tuple) else {
                    continue;
                };
                propagated += 1;
                self.forward(node, Side::Left, event, tuple);
                if event == Event::Retract {
                    self.tuples.free(tuple);
                }
            }
            queue.clear();
            if self.nodes[node].queue.is_empty() {
                self.nodes[node].queue = queue;
            }
        }
        self.cursor = None;
        debug!(
            propagated,
            live_tuples = self.tuples.live(),
            score = %self.inliner.score(),
            "Settled"
        );
        propagated
    }

    fn forward(&mut self, node: NodeId, side: Side, event: Event, tuple: TupleId) {
        for i in 0..self.nodes[node].children.len() {
            let child = self.nodes[node].children[i];
            self.deliver(child, side, event, tuple);
        }
    }

    fn deliver(&mut self, node: NodeId, side: Side, event: Event, tuple: TupleId) {
        match self.nodes[node].kind {
            NodeKind::ForeBridge {
                side: bridge_side,
                width,
            } => {
                debug_assert_eq!(self.tuples.row(tuple).len(), width, "fore bridge width");
                self.forward(node, bridge_side, event, tuple);
                return;
            }
            NodeKind::AftBridge { width } => {
                debug_assert_eq!(self.tuples.row(tuple).len(), width, "aft bridge width");
                self.forward(node, Side::Left, event, tuple);
                return;
            }
            _ => {}
        }

        self.cursor = Some(Cursor {
            node,
            subject: Subject::Tuple(tuple),
        });
        let Network {
            nodes,
            tuples,
            inliner,
            ..
        } = self;
        let RuntimeNode { queue, kind, .. } = &mut nodes[node];
        match kind {
            NodeKind::Filter(filter) => filter.on_event(event, tuple, &mut Ctx { tuples, queue }),
            NodeKind::Map(map) => map.on_event(event, tuple, &mut Ctx { tuples, queue }),
            NodeKind::Flatten(flatten) => {
                flatten.on_event(event, tuple, &mut Ctx { tuples, queue })
            }
            NodeKind::Group(group) => group.on_event(event, tuple, &mut Ctx { tuples, queue }),
            NodeKind::Concat(concat) => {
                concat.on_event(side, event, tuple, &mut Ctx { tuples, queue })
            }
            NodeKind::Join(join) => join.on_event(side, event, tuple, &mut Ctx { tuples, queue }),
            NodeKind::Exists(exists) => {
                exists.on_event(side, event, tuple, &mut Ctx { tuples, queue })
            }
            NodeKind::Score(score) => score.on_event(event, tuple, tuples, inliner),
            NodeKind::Source(_) | NodeKind::ForeBridge { .. } | NodeKind::AftBridge { .. } => {
                debug_assert!(false, "tuple delivered to a source or bridge handler");
            }
        }
    }

    /// Totals of the active constraints, by constraint index.
    pub(crate) fn constraint_totals(&self) -> Vec<ConstraintTotal<Sc>> {
        self.score_nodes
            .iter()
            .map(|&(constraint, _)| self.inliner.total(constraint).clone())
            .collect()
    }

    /// Every live match of every active constraint.
    pub(crate) fn constraint_analyses(&mut self) -> Vec<ConstraintAnalysis<Sc>> {
        let mut analyses = Vec::with_capacity(self.score_nodes.len());
        for i in 0..self.score_nodes.len() {
            let (constraint, node) = self.score_nodes[i];
            let NodeKind::Score(score) = &self.nodes[node].kind else {
                continue;
            };
            let mut live: Vec<(TupleId, Sc)> = score.matches().collect();
            live.sort_unstable_by_key(|(tuple, _)| *tuple);

            let def = self.graph.constraint(constraint);
            let mut matches = Vec::with_capacity(live.len());
            for (tuple, impact) in live {
                self.cursor = Some(Cursor {
                    node,
                    subject: Subject::Tuple(tuple),
                });
                let row = self.tuples.row(tuple);
                let justification = match &def.justifier {
                    Some(justify) => justify(row, &impact),
                    None => ConstraintJustification::from_row(row),
                };
                let indicted = match &def.indicter {
                    Some(indict) => indict(row),
                    None => row.iter().map(EntityRef::from_value).collect(),
                };
                matches.push(DetailedConstraintMatch::new(
                    def.constraint_ref.clone(),
                    impact,
                    justification,
                    indicted,
                ));
            }
            let total = self.inliner.total(constraint);
            analyses.push(ConstraintAnalysis::new(
                def.constraint_ref.clone(),
                def.weight,
                total.score,
                matches,
            ));
        }
        self.cursor = None;
        analyses
    }

    /// Builds the error reported for a panic raised inside the network.
    pub(crate) fn evaluation_error(
        &self,
        operation: &str,
        payload: Box<dyn Any + Send>,
    ) -> StreamForgeError {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        match &self.cursor {
            Some(cursor) => {
                let decl = self.nodes[cursor.node].decl;
                let fact = match &cursor.subject {
                    Subject::Tuple(tuple) => format!("{:?}", self.tuples.row(*tuple)),
                    Subject::Fact(value) => format!("{:?}", value),
                };
                StreamForgeError::Evaluation {
                    operation: format!(
                        "{} ({} node)",
                        operation,
                        self.graph.key(decl).kind().label()
                    ),
                    constraints: self.graph.owner_names(decl),
                    fact,
                    message,
                }
            }
            None => StreamForgeError::Evaluation {
                operation: operation.to_string(),
                constraints: Vec::new(),
                fact: "<none>".to_string(),
                message,
            },
        }
    }
}
