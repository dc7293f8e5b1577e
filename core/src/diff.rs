//! Diff-graph nodes produced by comparing two corpora.
//!
//! The comparison engine that builds these nodes lives outside this
//! workspace; this module only models the vertices rule evaluation walks.
//! Nodes are tagged variants with owned first/second subjects, so traversal
//! needs no downcasting and peeling is total.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ir::{Corpus, DataMember, FunctionDecl, TypeDecl, VarDecl};

/// The ambient context of one comparison: the two binaries whose corpora are
/// being diffed. Rule binary-scope predicates read paths and SONAMEs here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffContext {
    pub first_corpus: Corpus,
    pub second_corpus: Corpus,
}

impl DiffContext {
    pub fn new(first_corpus: Corpus, second_corpus: Corpus) -> Self {
        Self {
            first_corpus,
            second_corpus,
        }
    }
}

/// One vertex of the comparison graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DiffNode {
    Type(TypeDiff),
    Function(FunctionDiff),
    Variable(VariableDiff),
}

impl DiffNode {
    /// The node as a type diff, if it is one.
    pub fn as_type_diff(&self) -> Option<&TypeDiff> {
        match self {
            DiffNode::Type(d) => Some(d),
            _ => None,
        }
    }
}

/// A diff between two types.
///
/// Pointer, reference, qualified, and typedef diffs wrap the diff of the
/// type they point at / alias. The wrapped diff is `None` when the two
/// underlying subjects were not of comparable kinds, so descending through
/// a wrapper can fail gracefully.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeDiff {
    /// A plain type change with no more specific shape.
    Basic {
        first: TypeDecl,
        second: TypeDecl,
    },
    Pointer {
        first: TypeDecl,
        second: TypeDecl,
        underlying: Option<Box<TypeDiff>>,
    },
    Reference {
        first: TypeDecl,
        second: TypeDecl,
        underlying: Option<Box<TypeDiff>>,
    },
    Qualified {
        first: TypeDecl,
        second: TypeDecl,
        underlying: Box<TypeDiff>,
    },
    Typedef {
        first: TypeDecl,
        second: TypeDecl,
        underlying: Option<Box<TypeDiff>>,
    },
    Class(ClassDiff),
    Enum(EnumDiff),
}

impl TypeDiff {
    /// The first (old) subject.
    pub fn first_type(&self) -> &TypeDecl {
        match self {
            TypeDiff::Basic { first, .. }
            | TypeDiff::Pointer { first, .. }
            | TypeDiff::Reference { first, .. }
            | TypeDiff::Qualified { first, .. }
            | TypeDiff::Typedef { first, .. } => first,
            TypeDiff::Class(d) => &d.first,
            TypeDiff::Enum(d) => &d.first,
        }
    }

    /// The second (new) subject.
    pub fn second_type(&self) -> &TypeDecl {
        match self {
            TypeDiff::Basic { second, .. }
            | TypeDiff::Pointer { second, .. }
            | TypeDiff::Reference { second, .. }
            | TypeDiff::Qualified { second, .. }
            | TypeDiff::Typedef { second, .. } => second,
            TypeDiff::Class(d) => &d.second,
            TypeDiff::Enum(d) => &d.second,
        }
    }

    /// Peel all outermost qualified-type diffs.
    pub fn peel_qualified(&self) -> &TypeDiff {
        let mut d = self;
        while let TypeDiff::Qualified { underlying, .. } = d {
            d = underlying;
        }
        d
    }

    /// Peel one level of typedef diff.
    ///
    /// Returns `self` for non-typedef diffs and for typedef diffs whose
    /// underlying diff is absent.
    pub fn peel_typedef(&self) -> &TypeDiff {
        match self {
            TypeDiff::Typedef {
                underlying: Some(u),
                ..
            } => u,
            _ => self,
        }
    }
}

/// A diff between two class or union types.
///
/// Member maps are keyed by member name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDiff {
    pub first: TypeDecl,
    pub second: TypeDecl,
    pub deleted_data_members: BTreeMap<String, DataMember>,
    pub inserted_data_members: BTreeMap<String, DataMember>,
}

impl ClassDiff {
    pub fn new(first: TypeDecl, second: TypeDecl) -> Self {
        Self {
            first,
            second,
            deleted_data_members: BTreeMap::new(),
            inserted_data_members: BTreeMap::new(),
        }
    }
}

/// The value change of one enumerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumeratorChange {
    pub old_value: i64,
    pub new_value: i64,
}

/// A diff between two enum types, keyed by enumerator name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDiff {
    pub first: TypeDecl,
    pub second: TypeDecl,
    pub deleted_enumerators: BTreeMap<String, i64>,
    pub changed_enumerators: BTreeMap<String, EnumeratorChange>,
}

impl EnumDiff {
    pub fn new(first: TypeDecl, second: TypeDecl) -> Self {
        Self {
            first,
            second,
            deleted_enumerators: BTreeMap::new(),
            changed_enumerators: BTreeMap::new(),
        }
    }
}

/// A diff between two function declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDiff {
    pub first: FunctionDecl,
    pub second: FunctionDecl,
    /// True when the change includes a virtual member function moving to a
    /// different vtable slot.
    pub has_virtual_member_index_change: bool,
    /// For member functions, the class the function belongs to. Type rules
    /// use this to suppress vtable-slot changes via the enclosing class.
    pub enclosing_class: Option<TypeDecl>,
}

impl FunctionDiff {
    pub fn new(first: FunctionDecl, second: FunctionDecl) -> Self {
        Self {
            first,
            second,
            has_virtual_member_index_change: false,
            enclosing_class: None,
        }
    }
}

/// A diff between two variable declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDiff {
    pub first: VarDecl,
    pub second: VarDecl,
}

impl VariableDiff {
    pub fn new(first: VarDecl, second: VarDecl) -> Self {
        Self { first, second }
    }
}
