//! Language-level intermediate representation of a binary's public surface.
//!
//! This is the slice of the IR that rule evaluation inspects: qualified
//! names, source locations, type shape (kind, data members, layout), ELF
//! symbol identity (name, version, aliases), and the identity of the binary
//! a corpus was extracted from. The readers that populate this model from
//! DWARF, CTF, or a serialized representation live outside this workspace.

use serde::{Deserialize, Serialize};

/// A source location recorded in debug information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Path as recorded by the producer, usually absolute.
    pub path: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column, 0 when the producer did not record one.
    pub column: u32,
}

impl SourceLocation {
    pub fn new(path: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            path: path.into(),
            line,
            column,
        }
    }

    /// The base name of the recorded path.
    pub fn base_name(&self) -> &str {
        base_name(&self.path)
    }
}

/// The base name of a path-like string.
///
/// Returns the input unchanged when it contains no `/` separator.
pub fn base_name(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some((_, base)) => base,
        None => path,
    }
}

/// The family a type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeKind {
    /// Class or struct; `TypeDecl::is_struct` separates the two.
    Class,
    Union,
    Enum,
    Array,
    Typedef,
    /// A builtin (fundamental) type such as `int`.
    Builtin,
}

/// A data member of a class or union type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataMember {
    pub name: String,
    /// Offset within the enclosing type, in bits. Only meaningful when
    /// `is_laid_out` is true.
    pub offset_in_bits: u64,
    pub size_in_bits: u64,
    /// False for members with no recorded in-class offset (e.g. static
    /// members carried along by the producer).
    pub is_laid_out: bool,
}

impl DataMember {
    pub fn laid_out(name: impl Into<String>, offset_in_bits: u64, size_in_bits: u64) -> Self {
        Self {
            name: name.into(),
            offset_in_bits,
            size_in_bits,
            is_laid_out: true,
        }
    }
}

/// A type as seen by rule evaluation.
///
/// `underlying` is populated for typedefs only and holds the aliased type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    /// Fully qualified name.
    pub name: String,
    pub kind: TypeKind,
    pub location: Option<SourceLocation>,
    /// Meaningful for `TypeKind::Class`: true for `struct`, false for `class`.
    pub is_struct: bool,
    /// True when only a forward declaration was seen.
    pub is_declaration_only: bool,
    pub size_in_bits: u64,
    /// Ordered as laid out by the producer.
    pub data_members: Vec<DataMember>,
    pub underlying: Option<Box<TypeDecl>>,
}

impl TypeDecl {
    /// A minimal type of the given kind, for building richer values from.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            location: None,
            is_struct: false,
            is_declaration_only: false,
            size_in_bits: 0,
            data_members: Vec::new(),
            underlying: None,
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Peel one level of typedef, if any.
    ///
    /// Returns `self` for non-typedefs and for typedefs whose target is
    /// unknown.
    pub fn peel_typedef(&self) -> &TypeDecl {
        match (&self.kind, &self.underlying) {
            (TypeKind::Typedef, Some(target)) => target,
            _ => self,
        }
    }

    /// The data members that have a recorded in-class offset, in layout order.
    pub fn laid_out_members(&self) -> impl Iterator<Item = &DataMember> {
        self.data_members.iter().filter(|m| m.is_laid_out)
    }

    /// The last laid-out data member, if the type has any.
    pub fn last_laid_out_member(&self) -> Option<&DataMember> {
        self.laid_out_members().last()
    }

    /// The offset of the laid-out member that follows `name`, if both exist.
    pub fn next_laid_out_member_offset(&self, name: &str) -> Option<u64> {
        let mut members = self.laid_out_members();
        members.find(|m| m.name == name)?;
        members.next().map(|m| m.offset_in_bits)
    }
}

/// Whether an ELF symbol names a function or a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Function,
    Variable,
}

/// An ELF symbol, together with the names of its co-addressed aliases.
///
/// `aliases` holds the names of the other symbols in the alias cluster; the
/// main symbol's own name is not repeated there, so walking the aliases is
/// structurally finite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElfSymbol {
    pub name: String,
    /// Symbol version, empty for unversioned symbols.
    pub version: String,
    pub kind: SymbolKind,
    pub is_main_symbol: bool,
    pub aliases: Vec<String>,
}

impl ElfSymbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            version: String::new(),
            kind,
            is_main_symbol: true,
            aliases: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_aliases(&self) -> bool {
        !self.aliases.is_empty()
    }

    /// Whether `name` names this symbol or one of its aliases.
    ///
    /// In languages where functions are exported under their own name this
    /// is how a declaration name is recognized as an ELF-level name.
    pub fn has_alias_named(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }
}

/// A function parameter; implicit parameters (e.g. `this`) are carried but
/// skipped by index-based lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionParameter {
    /// Qualified name of the parameter's type.
    pub type_name: String,
    pub is_implicit: bool,
}

impl FunctionParameter {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            is_implicit: false,
        }
    }

    pub fn implicit(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            is_implicit: true,
        }
    }
}

/// A function declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// Fully qualified name.
    pub name: String,
    /// Qualified name of the return type; `None` for functions with no
    /// recorded return type.
    pub return_type_name: Option<String>,
    pub parameters: Vec<FunctionParameter>,
    pub symbol: Option<ElfSymbol>,
}

impl FunctionDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type_name: None,
            parameters: Vec::new(),
            symbol: None,
        }
    }

    /// The parameter at `index`, counting non-implicit parameters only.
    /// Index 0 is the first non-implicit parameter.
    pub fn parameter_at(&self, index: usize) -> Option<&FunctionParameter> {
        self.parameters.iter().filter(|p| !p.is_implicit).nth(index)
    }
}

/// A variable declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarDecl {
    /// Fully qualified name.
    pub name: String,
    /// Qualified name of the declared type.
    pub type_name: String,
    pub symbol: Option<ElfSymbol>,
}

impl VarDecl {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            symbol: None,
        }
    }
}

/// The identity of one binary under analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    /// Full path to the binary.
    pub path: String,
    /// The DT_SONAME entry, empty when the binary has none.
    pub soname: String,
}

impl Corpus {
    pub fn new(path: impl Into<String>, soname: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            soname: soname.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_with_members() -> TypeDecl {
        let mut t = TypeDecl::new("S", TypeKind::Class);
        t.size_in_bits = 96;
        t.data_members = vec![
            DataMember::laid_out("a", 0, 32),
            DataMember {
                name: "static_tag".to_string(),
                offset_in_bits: 0,
                size_in_bits: 32,
                is_laid_out: false,
            },
            DataMember::laid_out("b", 32, 32),
            DataMember::laid_out("c", 64, 32),
        ];
        t
    }

    // ==================== base_name Tests ====================

    #[test]
    fn base_name_of_absolute_path() {
        assert_eq!(base_name("/usr/lib/libfoo.so.3"), "libfoo.so.3");
    }

    #[test]
    fn base_name_of_bare_name() {
        assert_eq!(base_name("foo.h"), "foo.h");
    }

    #[test]
    fn base_name_of_trailing_slash_is_empty() {
        assert_eq!(base_name("/usr/lib/"), "");
    }

    // ==================== TypeDecl Tests ====================

    #[test]
    fn peel_typedef_returns_target() {
        let mut td = TypeDecl::new("my_int", TypeKind::Typedef);
        td.underlying = Some(Box::new(TypeDecl::new("int", TypeKind::Builtin)));
        assert_eq!(td.peel_typedef().name, "int");
    }

    #[test]
    fn peel_typedef_is_identity_for_non_typedefs() {
        let t = TypeDecl::new("S", TypeKind::Class);
        assert_eq!(t.peel_typedef().name, "S");
    }

    #[test]
    fn peel_typedef_without_target_is_identity() {
        let td = TypeDecl::new("opaque_t", TypeKind::Typedef);
        assert_eq!(td.peel_typedef().name, "opaque_t");
    }

    #[test]
    fn laid_out_members_skip_unlaid_members() {
        let t = class_with_members();
        let names: Vec<&str> = t.laid_out_members().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn last_laid_out_member() {
        let t = class_with_members();
        assert_eq!(t.last_laid_out_member().unwrap().name, "c");
    }

    #[test]
    fn next_laid_out_member_offset_for_inner_member() {
        let t = class_with_members();
        assert_eq!(t.next_laid_out_member_offset("a"), Some(32));
        assert_eq!(t.next_laid_out_member_offset("b"), Some(64));
    }

    #[test]
    fn next_laid_out_member_offset_for_last_member_is_none() {
        let t = class_with_members();
        assert_eq!(t.next_laid_out_member_offset("c"), None);
    }

    #[test]
    fn next_laid_out_member_offset_for_unknown_member_is_none() {
        let t = class_with_members();
        assert_eq!(t.next_laid_out_member_offset("zz"), None);
    }

    // ==================== ElfSymbol Tests ====================

    #[test]
    fn symbol_alias_lookup() {
        let sym = ElfSymbol::new("_ZN3foo3barEv", SymbolKind::Function)
            .with_aliases(["_ZN3foo3bazEv"]);
        assert!(sym.has_aliases());
        assert!(sym.has_alias_named("_ZN3foo3barEv"));
        assert!(sym.has_alias_named("_ZN3foo3bazEv"));
        assert!(!sym.has_alias_named("_ZN4quux3barEv"));
    }

    #[test]
    fn symbol_without_aliases() {
        let sym = ElfSymbol::new("f", SymbolKind::Function);
        assert!(!sym.has_aliases());
        assert!(sym.has_alias_named("f"));
    }

    // ==================== FunctionDecl Tests ====================

    #[test]
    fn parameter_at_skips_implicit_parameters() {
        let mut f = FunctionDecl::new("S::method");
        f.parameters = vec![
            FunctionParameter::implicit("S*"),
            FunctionParameter::new("int"),
            FunctionParameter::new("char"),
        ];
        assert_eq!(f.parameter_at(0).unwrap().type_name, "int");
        assert_eq!(f.parameter_at(1).unwrap().type_name, "char");
        assert!(f.parameter_at(2).is_none());
    }

    // ==================== Serde Tests ====================

    #[test]
    fn type_decl_round_trips_through_json() {
        let t = class_with_members().with_location(SourceLocation::new("inc/s.h", 12, 3));
        let json = serde_json::to_string(&t).unwrap();
        let back: TypeDecl = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }

    #[test]
    fn corpus_round_trips_through_json() {
        let c = Corpus::new("/usr/lib/libfoo.so.3", "libfoo.so.3");
        let json = serde_json::to_string(&c).unwrap();
        let back: Corpus = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
