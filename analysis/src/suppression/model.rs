//! Data model for suppression rules.
//!
//! Rule records are built by the parser and read-only afterwards. A rule
//! set is a plain ordered `Vec<Suppression>`; rules own their compiled
//! regexes, so a set can be shared across threads freely once built.

use std::collections::BTreeSet;
use std::ops::BitOr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::regexes::serde_pattern;

/// Label given to type rules synthesized to hide types that are not
/// declared in public headers. Rules carrying this label get special
/// treatment for opaque (declaration-only) types.
pub const PRIVATE_TYPES_SUPPR_LABEL: &str = "Artificial private types suppression rule";

/// Fields shared by every rule kind.
///
/// The four binary-scope regexes tie a rule to particular binaries; a rule
/// with none of them applies to every comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuppressionBase {
    /// Informative label, echoed in diagnostics.
    pub label: Option<String>,

    /// When true, matched artifacts are kept out of the IR at load time
    /// instead of merely being withheld from reports.
    pub drops_artifact: bool,

    /// True for rules synthesized by the tooling rather than parsed from a
    /// user's rule file.
    pub is_artificial: bool,

    #[serde(with = "serde_pattern")]
    pub file_name_regex: Option<Regex>,
    #[serde(with = "serde_pattern")]
    pub file_name_not_regex: Option<Regex>,
    #[serde(with = "serde_pattern")]
    pub soname_regex: Option<Regex>,
    #[serde(with = "serde_pattern")]
    pub soname_not_regex: Option<Regex>,
}

impl SuppressionBase {
    /// Whether the rule constrains the file names of the binaries compared.
    pub fn has_file_name_related_property(&self) -> bool {
        self.file_name_regex.is_some() || self.file_name_not_regex.is_some()
    }

    /// Whether the rule constrains the SONAMEs of the binaries compared.
    pub fn has_soname_related_property(&self) -> bool {
        self.soname_regex.is_some() || self.soname_not_regex.is_some()
    }

    /// Test the full path of a binary against the file-name regex pair.
    ///
    /// Returns false when the rule has no file-name predicate at all.
    pub fn matches_binary_name(&self, binary_name: &str) -> bool {
        let mut has_regex = false;

        if let Some(re) = &self.file_name_regex {
            has_regex = true;
            if !re.is_match(binary_name) {
                return false;
            }
        }
        if let Some(re) = &self.file_name_not_regex {
            has_regex = true;
            if re.is_match(binary_name) {
                return false;
            }
        }

        has_regex
    }

    /// Test a SONAME against the SONAME regex pair.
    ///
    /// Returns false when the rule has no SONAME predicate at all.
    pub fn matches_soname(&self, soname: &str) -> bool {
        let mut has_regex = false;

        if let Some(re) = &self.soname_regex {
            has_regex = true;
            if !re.is_match(soname) {
                return false;
            }
        }
        if let Some(re) = &self.soname_not_regex {
            has_regex = true;
            if re.is_match(soname) {
                return false;
            }
        }

        has_regex
    }

    /// Whether either the SONAME or the binary path matches this rule's
    /// binary-scope predicates.
    pub fn matches_soname_or_binary_name(&self, soname: &str, binary_name: &str) -> bool {
        self.matches_soname(soname) || self.matches_binary_name(binary_name)
    }
}

/// The type family a `[suppress_type]` rule is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeKindSpec {
    /// Any class type, struct or not.
    Class,
    /// A class type declared with `struct`.
    Struct,
    Union,
    Enum,
    Array,
    Typedef,
    Builtin,
}

/// The syntactic path through which a type must be reached at the diff
/// site for a `[suppress_type]` rule to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReachKind {
    Direct,
    Pointer,
    Reference,
    ReferenceOrPointer,
}

/// A boundary of a data-member insertion range.
///
/// `Integer(u64::MAX)` is the "end of the type" sentinel, spelled `end` in
/// rule files. The callee names of call offsets are validated at parse
/// time, so evaluation only ever sees these two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Offset {
    Integer(u64),
    /// `offset_of(member)`: the offset of the named laid-out member.
    OffsetOf(String),
    /// `offset_after(member)`: the first bit past the named member.
    OffsetAfter(String),
}

impl Offset {
    /// The "end of the type" sentinel.
    pub const END: Offset = Offset::Integer(u64::MAX);
}

/// An inclusive insertion range `[begin, end]` over member offsets.
///
/// A range whose bounds evaluate out of order is dead: it admits nothing
/// but does not invalidate the rule holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertionRange {
    pub begin: Offset,
    pub end: Offset,
}

impl InsertionRange {
    pub fn new(begin: Offset, end: Offset) -> Self {
        Self { begin, end }
    }
}

/// A constraint on one function parameter, by position.
///
/// Index 0 designates the first non-implicit parameter. The exact type
/// name, when present, wins over the regex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub index: usize,
    pub type_name: Option<String>,
    #[serde(with = "serde_pattern")]
    pub type_name_regex: Option<Regex>,
}

/// Bitset over the kinds of function change a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FnChangeKind(u8);

impl FnChangeKind {
    pub const NONE: Self = Self(0);
    /// A change to a sub-type of the function (return type, parameter…).
    pub const SUBTYPE: Self = Self(1);
    pub const ADDED: Self = Self(1 << 1);
    pub const DELETED: Self = Self(1 << 2);
    pub const ALL: Self = Self(1 | 1 << 1 | 1 << 2);

    pub fn contains(self, kind: FnChangeKind) -> bool {
        self.0 & kind.0 != 0
    }
}

impl Default for FnChangeKind {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for FnChangeKind {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Bitset over the kinds of variable change a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarChangeKind(u8);

impl VarChangeKind {
    pub const NONE: Self = Self(0);
    pub const SUBTYPE: Self = Self(1);
    pub const ADDED: Self = Self(1 << 1);
    pub const DELETED: Self = Self(1 << 2);
    pub const ALL: Self = Self(1 | 1 << 1 | 1 << 2);

    pub fn contains(self, kind: VarChangeKind) -> bool {
        self.0 & kind.0 != 0
    }
}

impl Default for VarChangeKind {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for VarChangeKind {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A `[suppress_type]` rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeSuppression {
    pub base: SuppressionBase,

    /// Exact fully-qualified type name; wins over the regex pair.
    pub type_name: Option<String>,
    #[serde(with = "serde_pattern")]
    pub type_name_regex: Option<Regex>,
    #[serde(with = "serde_pattern")]
    pub type_name_not_regex: Option<Regex>,

    /// Restrict the rule to one type family. `None` means any.
    pub type_kind: Option<TypeKindSpec>,

    /// Require the diff site to reach the type through this path.
    pub reach_kind: Option<ReachKind>,

    /// Data-member insertion ranges for `has_data_member(s)_inserted_*`.
    pub insertion_ranges: Vec<InsertionRange>,

    /// Source paths (full or base names) whose types must be kept.
    pub source_locations_to_keep: BTreeSet<String>,
    #[serde(with = "serde_pattern")]
    pub source_location_to_keep_regex: Option<Regex>,

    /// Enumerator names whose value changes are tolerated. Only meaningful
    /// with `type_kind = enum`.
    pub changed_enumerator_names: Vec<String>,
}

/// A `[suppress_function]` rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSuppression {
    pub base: SuppressionBase,

    pub change_kind: FnChangeKind,

    /// Exact qualified name; wins over the regex pair.
    pub name: Option<String>,
    #[serde(with = "serde_pattern")]
    pub name_regex: Option<Regex>,
    #[serde(with = "serde_pattern")]
    pub name_not_regex: Option<Regex>,

    pub return_type_name: Option<String>,
    #[serde(with = "serde_pattern")]
    pub return_type_regex: Option<Regex>,

    pub symbol_name: Option<String>,
    #[serde(with = "serde_pattern")]
    pub symbol_name_regex: Option<Regex>,
    #[serde(with = "serde_pattern")]
    pub symbol_name_not_regex: Option<Regex>,

    pub symbol_version: Option<String>,
    #[serde(with = "serde_pattern")]
    pub symbol_version_regex: Option<Regex>,

    pub parameter_specs: Vec<ParameterSpec>,

    /// When true, a name or symbol-name predicate must hold for every
    /// alias of a matched symbol, not just the main one.
    pub allow_other_aliases: bool,
}

impl Default for FunctionSuppression {
    fn default() -> Self {
        Self {
            base: SuppressionBase::default(),
            change_kind: FnChangeKind::ALL,
            name: None,
            name_regex: None,
            name_not_regex: None,
            return_type_name: None,
            return_type_regex: None,
            symbol_name: None,
            symbol_name_regex: None,
            symbol_name_not_regex: None,
            symbol_version: None,
            symbol_version_regex: None,
            parameter_specs: Vec::new(),
            allow_other_aliases: true,
        }
    }
}

/// A `[suppress_variable]` rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableSuppression {
    pub base: SuppressionBase,

    pub change_kind: VarChangeKind,

    pub name: Option<String>,
    #[serde(with = "serde_pattern")]
    pub name_regex: Option<Regex>,
    #[serde(with = "serde_pattern")]
    pub name_not_regex: Option<Regex>,

    pub symbol_name: Option<String>,
    #[serde(with = "serde_pattern")]
    pub symbol_name_regex: Option<Regex>,
    #[serde(with = "serde_pattern")]
    pub symbol_name_not_regex: Option<Regex>,

    pub symbol_version: Option<String>,
    #[serde(with = "serde_pattern")]
    pub symbol_version_regex: Option<Regex>,

    pub type_name: Option<String>,
    #[serde(with = "serde_pattern")]
    pub type_name_regex: Option<Regex>,
}

/// A `[suppress_file]` rule: refuses to load whole binaries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileSuppression {
    pub base: SuppressionBase,
}

/// A suppression rule of any kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Suppression {
    Type(TypeSuppression),
    Function(FunctionSuppression),
    Variable(VariableSuppression),
    File(FileSuppression),
}

impl Suppression {
    /// The shared base fields of the rule.
    pub fn base(&self) -> &SuppressionBase {
        match self {
            Suppression::Type(s) => &s.base,
            Suppression::Function(s) => &s.base,
            Suppression::Variable(s) => &s.base,
            Suppression::File(s) => &s.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut SuppressionBase {
        match self {
            Suppression::Type(s) => &mut s.base,
            Suppression::Function(s) => &mut s.base,
            Suppression::Variable(s) => &mut s.base,
            Suppression::File(s) => &mut s.base,
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.base().label.as_deref()
    }

    pub fn drops_artifact(&self) -> bool {
        self.base().drops_artifact
    }

    pub fn as_type(&self) -> Option<&TypeSuppression> {
        match self {
            Suppression::Type(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionSuppression> {
        match self {
            Suppression::Function(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableSuppression> {
        match self {
            Suppression::Variable(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileSuppression> {
        match self {
            Suppression::File(s) => Some(s),
            _ => None,
        }
    }
}

/// Whether a type rule is an auto-generated private-types rule.
pub fn is_private_type_suppression(s: &TypeSuppression) -> bool {
    s.base.label.as_deref() == Some(PRIVATE_TYPES_SUPPR_LABEL)
}
