//! Node declarations and their structural identity.

use std::any::TypeId;
use std::fmt;
use std::mem::size_of;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use smallvec::{smallvec, SmallVec};
use streamforge_core::{Result, StreamForgeError};

use crate::stream::collector::DynCollector;
use crate::stream::group_spec::ErasedPart;
use crate::stream::joiner::JoinerParts;
use crate::value::{GroupKey, IndexKey, Key, Value};

pub(crate) type RowPredicate = Arc<dyn Fn(&[Value]) -> bool + Send + Sync>;
pub(crate) type RowMapper = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;
pub(crate) type KeyPart = Arc<dyn Fn(&[Value]) -> Key + Send + Sync>;
pub(crate) type GroupKeyFn = Arc<dyn Fn(&[Value]) -> (Key, Value) + Send + Sync>;
pub(crate) type RowExpander = Arc<dyn Fn(&[Value]) -> Vec<Value> + Send + Sync>;

/// Position of a declaration in its factory's graph.
///
/// Ids are assigned in creation order, so parents always precede children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub(crate) usize);

impl DeclId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Input side of a two-input node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

static NEXT_CLOSURE_INSTANCE: AtomicUsize = AtomicUsize::new(0);

/// Identity of a user closure inside a declaration key.
///
/// Capture-free closures and function items are zero-sized: every value of
/// their type behaves the same, so the type identifies them. Anything else
/// gets a fresh identity and is never shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClosureId {
    Type(TypeId),
    Instance(usize),
}

impl ClosureId {
    pub fn of<F: 'static>() -> Self {
        if size_of::<F>() == 0 {
            ClosureId::Type(TypeId::of::<F>())
        } else {
            ClosureId::Instance(NEXT_CLOSURE_INSTANCE.fetch_add(1, Ordering::Relaxed))
        }
    }
}

/// One parameter of a declaration key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamId {
    Closure(ClosureId),
    Label(&'static str),
    Type(TypeId),
    Flag(bool),
    Index(usize),
    Side(Side),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Source,
    ForeBridge,
    AftBridge,
    Filter,
    Join,
    Exists,
    Group,
    Map,
    FlattenLast,
    Concat,
    Score,
}

impl OpKind {
    pub fn label(self) -> &'static str {
        match self {
            OpKind::Source => "for_each",
            OpKind::ForeBridge => "fore_bridge",
            OpKind::AftBridge => "aft_bridge",
            OpKind::Filter => "filter",
            OpKind::Join => "join",
            OpKind::Exists => "if_exists",
            OpKind::Group => "group_by",
            OpKind::Map => "map",
            OpKind::FlattenLast => "flatten_last",
            OpKind::Concat => "concat",
            OpKind::Score => "score",
        }
    }
}

/// Structural identity of a declaration.
///
/// Two declarations with equal keys compute the same tuples. Children are
/// not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclarationKey {
    pub(crate) kind: OpKind,
    pub(crate) parents: SmallVec<[DeclId; 2]>,
    pub(crate) params: Vec<ParamId>,
}

impl DeclarationKey {
    pub fn kind(&self) -> OpKind {
        self.kind
    }

    pub fn parents(&self) -> &[DeclId] {
        &self.parents
    }
}

/// Equality joiners compiled to index keys plus a residual predicate over
/// the combined left and right row.
#[derive(Clone)]
pub(crate) struct JoinIndexer {
    left: Vec<KeyPart>,
    right: Vec<KeyPart>,
    filter: Option<RowPredicate>,
}

impl JoinIndexer {
    pub(crate) fn new(parts: JoinerParts) -> Self {
        let JoinerParts {
            left,
            right,
            mut filters,
            ..
        } = parts;
        let filter: Option<RowPredicate> = match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Arc::new(move |row: &[Value]| filters.iter().all(|f| f(row)))),
        };
        Self {
            left,
            right,
            filter,
        }
    }

    pub(crate) fn left_key(&self, row: &[Value]) -> IndexKey {
        self.left.iter().map(|part| part(row)).collect()
    }

    pub(crate) fn right_key(&self, row: &[Value]) -> IndexKey {
        self.right.iter().map(|part| part(row)).collect()
    }

    /// Whether a left and right tuple with equal index keys match.
    pub(crate) fn matches(&self, left: &[Value], right: &[Value]) -> bool {
        match &self.filter {
            None => true,
            Some(filter) => {
                let combined: SmallVec<[Value; 4]> =
                    left.iter().chain(right.iter()).cloned().collect();
                filter(&combined)
            }
        }
    }
}

/// The evaluation payload of a declaration.
#[derive(Clone)]
pub(crate) enum Operation {
    Source {
        type_id: TypeId,
        type_name: &'static str,
        include_unassigned: bool,
    },
    ForeBridge(Side),
    AftBridge,
    Filter(RowPredicate),
    Join(JoinIndexer),
    Exists {
        should_exist: bool,
        indexer: JoinIndexer,
    },
    Group {
        keys: Vec<GroupKeyFn>,
        collectors: Vec<Arc<dyn DynCollector>>,
    },
    Map(Vec<RowMapper>),
    FlattenLast(RowExpander),
    Concat,
    Score {
        constraint: usize,
    },
}

pub(crate) struct Declaration {
    pub(crate) key: DeclarationKey,
    pub(crate) operation: Operation,
    pub(crate) width: usize,
    pub(crate) children: Vec<DeclId>,
    pub(crate) aft_bridge: Option<DeclId>,
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declaration")
            .field("kind", &self.key.kind)
            .field("parents", &self.key.parents)
            .field("width", &self.width)
            .field("children", &self.children)
            .finish()
    }
}

impl Declaration {
    fn new(
        kind: OpKind,
        parents: SmallVec<[DeclId; 2]>,
        params: Vec<ParamId>,
        operation: Operation,
        width: usize,
    ) -> Self {
        Self {
            key: DeclarationKey {
                kind,
                parents,
                params,
            },
            operation,
            width,
            children: Vec::new(),
            aft_bridge: None,
        }
    }

    pub(crate) fn kind(&self) -> OpKind {
        self.key.kind
    }

    pub(crate) fn parents(&self) -> &[DeclId] {
        &self.key.parents
    }

    pub(crate) fn source(
        type_id: TypeId,
        type_name: &'static str,
        include_unassigned: bool,
    ) -> Self {
        Self::new(
            OpKind::Source,
            SmallVec::new(),
            vec![ParamId::Type(type_id), ParamId::Flag(include_unassigned)],
            Operation::Source {
                type_id,
                type_name,
                include_unassigned,
            },
            1,
        )
    }

    pub(crate) fn fore_bridge(parent: DeclId, side: Side, width: usize) -> Self {
        Self::new(
            OpKind::ForeBridge,
            smallvec![parent],
            vec![ParamId::Side(side)],
            Operation::ForeBridge(side),
            width,
        )
    }

    pub(crate) fn aft_bridge(parent: DeclId, width: usize) -> Self {
        Self::new(
            OpKind::AftBridge,
            smallvec![parent],
            Vec::new(),
            Operation::AftBridge,
            width,
        )
    }

    pub(crate) fn filter(
        parent: DeclId,
        predicate: RowPredicate,
        closure: ClosureId,
        width: usize,
    ) -> Self {
        Self::new(
            OpKind::Filter,
            smallvec![parent],
            vec![ParamId::Closure(closure)],
            Operation::Filter(predicate),
            width,
        )
    }

    pub(crate) fn join(left: DeclId, right: DeclId, parts: JoinerParts, width: usize) -> Self {
        let params = parts.params.clone();
        Self::new(
            OpKind::Join,
            smallvec![left, right],
            params,
            Operation::Join(JoinIndexer::new(parts)),
            width,
        )
    }

    pub(crate) fn exists(
        left: DeclId,
        right: DeclId,
        should_exist: bool,
        parts: JoinerParts,
        width: usize,
    ) -> Self {
        let mut params = vec![ParamId::Flag(should_exist)];
        params.extend(parts.params.iter().cloned());
        Self::new(
            OpKind::Exists,
            smallvec![left, right],
            params,
            Operation::Exists {
                should_exist,
                indexer: JoinIndexer::new(parts),
            },
            width,
        )
    }

    /// A group-by over `parent`; keys must come before collectors.
    pub(crate) fn group(parent: DeclId, parts: Vec<ErasedPart>) -> Result<Self> {
        if parts.is_empty() || parts.len() > 4 {
            return Err(StreamForgeError::Config(format!(
                "group_by produces {} columns; a tuple holds 1 to 4",
                parts.len()
            )));
        }
        let mut keys = Vec::new();
        let mut collectors = Vec::new();
        let mut params = Vec::new();
        for part in parts {
            match part {
                ErasedPart::Key { mapper, params: p } => {
                    if !collectors.is_empty() {
                        return Err(StreamForgeError::Config(
                            "group_by keys must precede its collectors".to_string(),
                        ));
                    }
                    keys.push(mapper);
                    params.push(ParamId::Label("key"));
                    params.extend(p);
                }
                ErasedPart::Collector(part) => {
                    collectors.push(part.collector);
                    params.push(ParamId::Label("collector"));
                    params.extend(part.params);
                }
            }
        }
        let width = keys.len() + collectors.len();
        Ok(Self::new(
            OpKind::Group,
            smallvec![parent],
            params,
            Operation::Group { keys, collectors },
            width,
        ))
    }

    pub(crate) fn map(parent: DeclId, mappers: Vec<(RowMapper, ClosureId)>) -> Self {
        let width = mappers.len();
        let params = mappers
            .iter()
            .map(|(_, closure)| ParamId::Closure(*closure))
            .collect();
        let mappers = mappers.into_iter().map(|(mapper, _)| mapper).collect();
        Self::new(
            OpKind::Map,
            smallvec![parent],
            params,
            Operation::Map(mappers),
            width,
        )
    }

    pub(crate) fn flatten_last(
        parent: DeclId,
        expander: RowExpander,
        closure: ClosureId,
        width: usize,
    ) -> Self {
        Self::new(
            OpKind::FlattenLast,
            smallvec![parent],
            vec![ParamId::Closure(closure)],
            Operation::FlattenLast(expander),
            width,
        )
    }

    pub(crate) fn concat(left: DeclId, right: DeclId, width: usize) -> Self {
        Self::new(
            OpKind::Concat,
            smallvec![left, right],
            Vec::new(),
            Operation::Concat,
            width,
        )
    }

    /// Terminal node of one constraint; the index keeps it unshared.
    pub(crate) fn score(parent: DeclId, constraint: usize, width: usize) -> Self {
        Self::new(
            OpKind::Score,
            smallvec![parent],
            vec![ParamId::Index(constraint)],
            Operation::Score { constraint },
            width,
        )
    }
}

/// Key of a grouped tuple, used by group nodes at runtime.
pub(crate) fn group_key(keys: &[GroupKeyFn], row: &[Value]) -> (GroupKey, SmallVec<[Value; 4]>) {
    let mut key = GroupKey::new();
    let mut values = SmallVec::new();
    for mapper in keys {
        let (k, v) = mapper(row);
        key.push(k);
        values.push(v);
    }
    (key, values)
}
