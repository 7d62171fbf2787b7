//! The declaration graph built by a constraint factory.
//!
//! Every stream operation creates a candidate [`Declaration`] and hands it
//! to [`GraphBuilder::share`]. Structurally equal candidates collapse onto
//! one canonical declaration, so common prefixes of different constraints
//! are computed once at runtime.

mod cache;
mod declaration;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use streamforge_core::{ConstraintRef, ImpactType, MatchWeight, Result, Score, StreamForgeError};
use tracing::{debug, info, trace};

use crate::api::analysis::{ConstraintJustification, EntityRef};
use crate::api::weight_overrides::WeightProvider;
use crate::value::Value;

use cache::SharingCache;
pub(crate) use declaration::{
    group_key, ClosureId, Declaration, GroupKeyFn, JoinIndexer, Operation, ParamId, RowExpander,
    RowMapper, RowPredicate,
};
pub(crate) use declaration::KeyPart;
pub use declaration::{DeclId, DeclarationKey, OpKind, Side};

pub(crate) type Weigher = Arc<dyn Fn(&[Value]) -> MatchWeight + Send + Sync>;
pub(crate) type Justifier<Sc> = Arc<dyn Fn(&[Value], &Sc) -> ConstraintJustification + Send + Sync>;
pub(crate) type Indicter = Arc<dyn Fn(&[Value]) -> Vec<EntityRef> + Send + Sync>;

/// A finished constraint: its identity, impact and match closures.
pub(crate) struct ConstraintDef<Sc: Score> {
    pub(crate) constraint_ref: ConstraintRef,
    pub(crate) impact_type: ImpactType,
    pub(crate) weight: Sc,
    pub(crate) weigher: Option<Weigher>,
    pub(crate) justifier: Option<Justifier<Sc>>,
    pub(crate) indicter: Option<Indicter>,
    pub(crate) score_decl: DeclId,
}

/// Mutable graph under construction, owned by one constraint factory.
pub(crate) struct GraphBuilder<Sc: Score> {
    declarations: Vec<Declaration>,
    cache: SharingCache,
    constraints: Vec<ConstraintDef<Sc>>,
}

impl<Sc: Score> GraphBuilder<Sc> {
    pub(crate) fn new() -> Self {
        Self {
            declarations: Vec::new(),
            cache: SharingCache::default(),
            constraints: Vec::new(),
        }
    }

    /// Returns the canonical declaration for `declaration`'s key.
    ///
    /// On first insertion the declaration is attached as a child of its
    /// parents and `on_first_insertion` runs with its new id.
    pub(crate) fn share<F>(
        &mut self,
        declaration: Declaration,
        on_first_insertion: F,
    ) -> Result<DeclId>
    where
        F: FnOnce(&mut Self, DeclId) -> Result<()>,
    {
        if !declaration.children.is_empty() {
            return Err(StreamForgeError::SharingViolation(format!(
                "candidate {} declaration already has children",
                declaration.kind().label()
            )));
        }
        if let Some(existing) = self.cache.get(&declaration.key) {
            trace!(
                op = declaration.kind().label(),
                declaration = existing.index(),
                "Reusing shared declaration"
            );
            return Ok(existing);
        }
        if let Some(parent) = declaration
            .parents()
            .iter()
            .find(|parent| parent.0 >= self.declarations.len())
        {
            return Err(StreamForgeError::SharingViolation(format!(
                "parent declaration {} does not exist",
                parent.index()
            )));
        }

        let id = DeclId(self.declarations.len());
        self.cache.install(declaration.key.clone(), id)?;
        let parents: Vec<DeclId> = declaration.parents().to_vec();
        self.declarations.push(declaration);
        for parent in parents {
            self.attach_child(parent, id)?;
        }
        on_first_insertion(self, id)?;
        Ok(id)
    }

    fn attach_child(&mut self, parent: DeclId, child: DeclId) -> Result<()> {
        let declaration = &self.declarations[parent.0];
        if !self.cache.is_canonical(&declaration.key, parent) {
            return Err(StreamForgeError::SharingViolation(format!(
                "{} declaration {} is not canonical",
                declaration.kind().label(),
                parent.index()
            )));
        }
        if declaration.children.contains(&child) {
            return Err(StreamForgeError::SharingViolation(format!(
                "declaration {} is already a child of {}",
                child.index(),
                parent.index()
            )));
        }
        self.declarations[parent.0].children.push(child);
        Ok(())
    }

    /// Shares a node whose output is consumed through an aft bridge and
    /// returns the bridge.
    pub(crate) fn share_bridged(&mut self, declaration: Declaration) -> Result<DeclId> {
        let width = declaration.width;
        let node = self.share(declaration, |graph, node| {
            let bridge = graph.share(Declaration::aft_bridge(node, width), |_, _| Ok(()))?;
            graph.declarations[node.0].aft_bridge = Some(bridge);
            Ok(())
        })?;
        self.declarations[node.0].aft_bridge.ok_or_else(|| {
            StreamForgeError::Internal(format!("declaration {} has no aft bridge", node.index()))
        })
    }

    pub(crate) fn share_plain(&mut self, declaration: Declaration) -> Result<DeclId> {
        self.share(declaration, |_, _| Ok(()))
    }

    pub(crate) fn fore_bridge(&mut self, parent: DeclId, side: Side) -> Result<DeclId> {
        let width = self.declarations[parent.0].width;
        self.share_plain(Declaration::fore_bridge(parent, side, width))
    }

    #[cfg(test)]
    pub(crate) fn declaration(&self, id: DeclId) -> &Declaration {
        &self.declarations[id.0]
    }

    pub(crate) fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Registers a constraint on top of `parent` and returns its index.
    pub(crate) fn add_constraint(
        &mut self,
        parent: DeclId,
        mut def: ConstraintDef<Sc>,
    ) -> Result<usize> {
        let full_name = def.constraint_ref.full_name();
        if self
            .constraints
            .iter()
            .any(|c| c.constraint_ref.full_name() == full_name)
        {
            return Err(StreamForgeError::Config(format!(
                "constraint '{}' is defined more than once",
                full_name
            )));
        }
        let index = self.constraints.len();
        let width = self.declarations[parent.0].width;
        def.score_decl = self.share_plain(Declaration::score(parent, index, width))?;
        self.constraints.push(def);
        Ok(index)
    }

    /// Freezes the graph for the selected constraints.
    ///
    /// Constraints not selected, or whose effective weight is zero, are
    /// inactive; only ancestors of active constraints get runtime nodes.
    pub(crate) fn freeze(
        self,
        selected: &[usize],
        weights: &dyn WeightProvider<Sc>,
    ) -> Result<DeclarationGraph<Sc>> {
        let GraphBuilder {
            declarations,
            cache,
            mut constraints,
        } = self;

        let mut active_constraints = Vec::new();
        for &index in selected {
            let def = constraints.get_mut(index).ok_or_else(|| {
                StreamForgeError::Internal(format!("unknown constraint index {}", index))
            })?;
            def.weight = weights.effective_weight(&def.constraint_ref, def.weight);
            if def.weight == Sc::zero() {
                debug!(constraint = %def.constraint_ref, "Constraint disabled by zero weight");
                continue;
            }
            if !active_constraints.contains(&index) {
                active_constraints.push(index);
            }
        }
        active_constraints.sort_unstable();

        let mut active = vec![false; declarations.len()];
        let mut owners: Vec<Vec<usize>> = vec![Vec::new(); declarations.len()];
        for &index in &active_constraints {
            let mut pending = vec![constraints[index].score_decl];
            while let Some(id) = pending.pop() {
                if owners[id.0].contains(&index) {
                    continue;
                }
                owners[id.0].push(index);
                active[id.0] = true;
                pending.extend(declarations[id.0].parents().iter().copied());
            }
        }

        let graph = DeclarationGraph {
            declarations,
            constraints,
            active,
            owners,
            active_constraints,
        };
        info!(
            declarations = graph.declarations.len(),
            shared_keys = cache.len(),
            active_declarations = graph.active_count(),
            constraints = graph.active_constraints.len(),
            "Constraint graph frozen"
        );
        Ok(graph)
    }
}

/// An immutable, shareable declaration graph.
pub struct DeclarationGraph<Sc: Score> {
    declarations: Vec<Declaration>,
    constraints: Vec<ConstraintDef<Sc>>,
    active: Vec<bool>,
    owners: Vec<Vec<usize>>,
    active_constraints: Vec<usize>,
}

impl<Sc: Score> DeclarationGraph<Sc> {
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    pub fn key(&self, id: DeclId) -> &DeclarationKey {
        &self.declarations[id.0].key
    }

    pub fn children(&self, id: DeclId) -> &[DeclId] {
        &self.declarations[id.0].children
    }

    pub fn is_active(&self, id: DeclId) -> bool {
        self.active[id.0]
    }

    /// Full names of the active constraints that depend on `id`.
    pub fn owner_names(&self, id: DeclId) -> Vec<String> {
        self.owners[id.0]
            .iter()
            .map(|&c| self.constraints[c].constraint_ref.full_name())
            .collect()
    }

    pub fn active_constraints(&self) -> impl Iterator<Item = &ConstraintRef> + '_ {
        self.active_constraints
            .iter()
            .map(|&c| &self.constraints[c].constraint_ref)
    }

    pub(crate) fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub(crate) fn constraint(&self, index: usize) -> &ConstraintDef<Sc> {
        &self.constraints[index]
    }

    pub(crate) fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub(crate) fn active_constraint_indices(&self) -> &[usize] {
        &self.active_constraints
    }
}

impl<Sc: Score> std::fmt::Debug for DeclarationGraph<Sc> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeclarationGraph")
            .field("declarations", &self.declarations.len())
            .field("active", &self.active_count())
            .field("constraints", &self.active_constraints.len())
            .finish()
    }
}
