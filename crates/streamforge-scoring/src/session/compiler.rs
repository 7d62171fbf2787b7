//! Turns a frozen declaration graph into the runtime network of a session.

use std::sync::Arc;

use smallvec::SmallVec;
use streamforge_core::{DomainModel, Result, Score, StreamForgeError};
use tracing::debug;

use super::network::{Network, NodeId, RuntimeNode};
use super::node::{
    ConcatNode, ExistsNode, FilterNode, FlattenNode, GroupNode, JoinNode, MapNode, NodeKind,
    ScoreNode, SourceNode,
};
use crate::graph::{DeclId, Declaration, DeclarationGraph, Operation};

/// Builds one runtime node per active declaration.
///
/// Ranks are longest paths from a source, so every node settles after all
/// of its parents.
pub(crate) fn compile<Sc: Score>(
    graph: Arc<DeclarationGraph<Sc>>,
    domain: &DomainModel,
) -> Result<Network<Sc>> {
    let mut node_of: Vec<Option<NodeId>> = vec![None; graph.len()];
    let mut nodes: Vec<RuntimeNode<Sc>> = Vec::with_capacity(graph.active_count());

    // Declaration ids follow creation order, so parents are compiled first.
    for (index, declaration) in graph.declarations().iter().enumerate() {
        let decl = DeclId(index);
        if !graph.is_active(decl) {
            continue;
        }
        let mut rank = 0;
        for parent in declaration.parents() {
            let parent_node = node_of[parent.index()].ok_or_else(|| {
                StreamForgeError::Internal(format!(
                    "declaration {} depends on inactive declaration {}",
                    index,
                    parent.index()
                ))
            })?;
            rank = rank.max(nodes[parent_node].rank + 1);
        }
        node_of[index] = Some(nodes.len());
        nodes.push(RuntimeNode {
            decl,
            rank,
            children: SmallVec::new(),
            queue: Vec::new(),
            kind: node_kind(&graph, declaration, domain)?,
        });
    }

    for (index, declaration) in graph.declarations().iter().enumerate() {
        let Some(node) = node_of[index] else {
            continue;
        };
        nodes[node].children = declaration
            .children
            .iter()
            .filter_map(|child| node_of[child.index()])
            .collect();
    }

    let network = Network::new(Arc::clone(&graph), nodes);
    debug!(
        nodes = network.node_count(),
        max_rank = network.max_rank(),
        "Compiled constraint network"
    );
    Ok(network)
}

fn node_kind<Sc: Score>(
    graph: &DeclarationGraph<Sc>,
    declaration: &Declaration,
    domain: &DomainModel,
) -> Result<NodeKind<Sc>> {
    Ok(match &declaration.operation {
        Operation::Source {
            type_id,
            type_name,
            include_unassigned,
        } => {
            let class = domain.class(*type_id).ok_or_else(|| {
                StreamForgeError::DomainModel(format!(
                    "fact type {} is not part of the domain model",
                    type_name
                ))
            })?;
            let assigned_only = if *include_unassigned || !class.can_be_unassigned() {
                None
            } else {
                Some(class.clone())
            };
            NodeKind::Source(SourceNode::new(*type_id, assigned_only))
        }
        Operation::ForeBridge(side) => NodeKind::ForeBridge {
            side: *side,
            width: declaration.width,
        },
        Operation::AftBridge => NodeKind::AftBridge {
            width: declaration.width,
        },
        Operation::Filter(predicate) => NodeKind::Filter(FilterNode::new(Arc::clone(predicate))),
        Operation::Map(mappers) => NodeKind::Map(MapNode::new(mappers.clone())),
        Operation::FlattenLast(expander) => {
            NodeKind::Flatten(FlattenNode::new(Arc::clone(expander)))
        }
        Operation::Concat => NodeKind::Concat(ConcatNode::new()),
        Operation::Join(indexer) => NodeKind::Join(JoinNode::new(indexer.clone())),
        Operation::Exists {
            should_exist,
            indexer,
        } => NodeKind::Exists(ExistsNode::new(*should_exist, indexer.clone())),
        Operation::Group { keys, collectors } => {
            NodeKind::Group(GroupNode::new(keys.clone(), collectors.clone()))
        }
        Operation::Score { constraint } => {
            NodeKind::Score(ScoreNode::new(*constraint, graph.constraint(*constraint)))
        }
    })
}
