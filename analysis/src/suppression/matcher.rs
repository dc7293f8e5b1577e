//! Diff-time evaluation of suppression rules.
//!
//! Every public entry point here is a total function: matching never
//! errors, it only answers yes or no. The caller tests a diff node against
//! each rule of a set in order and withholds the node if any rule matches.

use abiscope_core::diff::{DiffContext, DiffNode, TypeDiff};
use abiscope_core::ir::{base_name, ElfSymbol, FunctionDecl, SourceLocation, SymbolKind, TypeDecl, TypeKind, VarDecl};

use crate::suppression::model::{
    is_private_type_suppression, FileSuppression, FnChangeKind, FunctionSuppression, ReachKind,
    Suppression, SuppressionBase, TypeKindSpec, TypeSuppression, VarChangeKind,
    VariableSuppression,
};
use crate::suppression::offsets::{eval_offset, is_end_boundary};

/// Check the rule's binary-scope predicates against the two corpora.
///
/// A rule with file-name predicates must match at least one of the two
/// binary paths; a rule with SONAME predicates must match at least one of
/// the two SONAMEs. Without a context the scope is vacuously satisfied.
fn binary_scope_admits(base: &SuppressionBase, ctx: Option<&DiffContext>) -> bool {
    let Some(ctx) = ctx else { return true };

    if base.has_file_name_related_property()
        && !base.matches_binary_name(&ctx.first_corpus.path)
        && !base.matches_binary_name(&ctx.second_corpus.path)
    {
        return false;
    }

    if base.has_soname_related_property()
        && !base.matches_soname(&ctx.first_corpus.soname)
        && !base.matches_soname(&ctx.second_corpus.soname)
    {
        return false;
    }

    true
}

impl Suppression {
    /// Evaluate this rule against a diff node.
    pub fn suppresses_diff(&self, node: &DiffNode, ctx: Option<&DiffContext>) -> bool {
        let suppressed = match self {
            Suppression::Type(s) => s.suppresses_diff(node, ctx),
            Suppression::Function(s) => s.suppresses_diff(node, ctx),
            Suppression::Variable(s) => s.suppresses_diff(node, ctx),
            // File rules act on file paths at load time, never on diffs.
            Suppression::File(_) => false,
        };
        if suppressed {
            tracing::debug!(label = self.label(), "diff node suppressed");
        }
        suppressed
    }
}

// ==================== type rules ====================

impl TypeSuppression {
    /// Evaluate this rule against a diff node.
    pub fn suppresses_diff(&self, node: &DiffNode, ctx: Option<&DiffContext>) -> bool {
        let d = match node.as_type_diff() {
            Some(d) => d,
            None => {
                // A type rule can still silence a vtable-slot change on a
                // member function, via the function's enclosing class.
                if let DiffNode::Function(fd) = node {
                    if fd.has_virtual_member_index_change {
                        if let Some(class_type) = &fd.enclosing_class {
                            return self.suppresses_type(class_type, ctx);
                        }
                    }
                }
                return false;
            }
        };

        let d = match self.shape_by_reach_kind(d) {
            Some(d) => d,
            None => return false,
        };

        let first = d.first_type();
        let second = d.second_type();

        let mut matched = d;
        if !self.suppresses_type(first, ctx) && !self.suppresses_type(second, ctx) {
            // A private-types rule must preserve the typedef/opaque
            // distinction: a typedef of a private type may itself be
            // public, so no peeling is allowed for it.
            if is_private_type_suppression(self) {
                return false;
            }
            if !self.suppresses_type(first.peel_typedef(), ctx)
                && !self.suppresses_type(second.peel_typedef(), ctx)
            {
                return false;
            }
            matched = d.peel_typedef();
        }

        if let TypeDiff::Class(class_diff) = matched {
            if !self.insertion_ranges.is_empty() {
                // Deleted members or a shrinking class can never be a pure
                // insertion.
                if !class_diff.deleted_data_members.is_empty()
                    || class_diff.first.size_in_bits > class_diff.second.size_in_bits
                {
                    return false;
                }
                for member in class_diff.inserted_data_members.values() {
                    if !self.insertion_ranges_admit(member.offset_in_bits, &class_diff.first) {
                        return false;
                    }
                }
            }
        }

        if let TypeDiff::Enum(enum_diff) = matched {
            if enum_diff.deleted_enumerators.is_empty()
                && enum_diff.first.size_in_bits == enum_diff.second.size_in_bits
                && !enum_diff.changed_enumerators.is_empty()
            {
                for name in enum_diff.changed_enumerators.keys() {
                    if !self.changed_enumerator_names.contains(name) {
                        return false;
                    }
                }
            }
        }

        true
    }

    /// Rewrite the examined node according to `accessed_through`.
    ///
    /// Returns `None` when the node does not have the required shape, or
    /// when descending through the pointer or reference does not land on a
    /// type diff.
    fn shape_by_reach_kind<'a>(&self, d: &'a TypeDiff) -> Option<&'a TypeDiff> {
        let Some(reach) = self.reach_kind else {
            return Some(d);
        };
        match (reach, d) {
            (ReachKind::Direct, d) => Some(d),
            (ReachKind::Pointer | ReachKind::ReferenceOrPointer, TypeDiff::Pointer { underlying, .. })
            | (ReachKind::Reference | ReachKind::ReferenceOrPointer, TypeDiff::Reference { underlying, .. }) => {
                underlying.as_deref().map(TypeDiff::peel_qualified)
            }
            _ => None,
        }
    }

    /// Test whether this rule suppresses change reports about `ty`.
    pub fn suppresses_type(&self, ty: &TypeDecl, ctx: Option<&DiffContext>) -> bool {
        if !binary_scope_admits(&self.base, ctx) {
            return false;
        }
        self.matches_type_kind(ty) && self.matches_type_location_of(ty) && self.matches_type_name(&ty.name)
    }

    /// The `type_kind` family check.
    fn matches_type_kind(&self, ty: &TypeDecl) -> bool {
        let Some(kind) = self.type_kind else {
            return true;
        };
        match kind {
            TypeKindSpec::Class => ty.kind == TypeKind::Class,
            TypeKindSpec::Struct => ty.kind == TypeKind::Class && ty.is_struct,
            TypeKindSpec::Union => ty.kind == TypeKind::Union,
            TypeKindSpec::Enum => ty.kind == TypeKind::Enum,
            TypeKindSpec::Array => ty.kind == TypeKind::Array,
            TypeKindSpec::Typedef => ty.kind == TypeKind::Typedef,
            TypeKindSpec::Builtin => ty.kind == TypeKind::Builtin,
        }
    }

    /// The source-location keep check, given the full type.
    ///
    /// A type with no recorded location fails any location filter, with
    /// one exception: an artificial private-types rule treats an opaque
    /// (declaration-only) class as matching, since a type with no location
    /// cannot have been defined in a public header.
    fn matches_type_location_of(&self, ty: &TypeDecl) -> bool {
        if ty.location.is_none()
            && self.base.is_artificial
            && is_private_type_suppression(self)
            && ty.kind == TypeKind::Class
            && ty.is_declaration_only
        {
            return true;
        }
        self.matches_location(ty.location.as_ref())
    }

    /// The source-location keep check, given just a location.
    pub fn matches_location(&self, location: Option<&SourceLocation>) -> bool {
        match location {
            Some(loc) => {
                if let Some(re) = &self.source_location_to_keep_regex {
                    if re.is_match(&loc.path) {
                        return false;
                    }
                }
                if self.source_locations_to_keep.contains(loc.base_name())
                    || self.source_locations_to_keep.contains(&loc.path)
                {
                    return false;
                }
                true
            }
            None => {
                // A location filter that cannot be consulted keeps the type.
                self.source_locations_to_keep.is_empty()
                    && self.source_location_to_keep_regex.is_none()
            }
        }
    }

    /// The name triple check: exact name wins over the regex pair.
    pub fn matches_type_name(&self, type_name: &str) -> bool {
        if self.type_name.is_none()
            && self.type_name_regex.is_none()
            && self.type_name_not_regex.is_none()
        {
            return true;
        }
        if let Some(name) = &self.type_name {
            return name == type_name;
        }
        if let Some(re) = &self.type_name_regex {
            if !re.is_match(type_name) {
                return false;
            }
        }
        if let Some(re) = &self.type_name_not_regex {
            if re.is_match(type_name) {
                return false;
            }
        }
        true
    }

    /// Whether some insertion range of this rule admits a member inserted
    /// at `member_offset`, evaluating bounds against the first (old) type.
    fn insertion_ranges_admit(&self, member_offset: u64, first_type: &TypeDecl) -> bool {
        for range in &self.insertion_ranges {
            let Some(begin) = eval_offset(&range.begin, first_type) else {
                break;
            };
            let Some(end) = eval_offset(&range.end, first_type) else {
                break;
            };

            if is_end_boundary(begin) && is_end_boundary(end) {
                // The "[end, end]" idiom: inserted strictly past the last
                // laid-out member of the old type.
                if let Some(last) = first_type.last_laid_out_member() {
                    if member_offset > last.offset_in_bits {
                        return true;
                    }
                }
                continue;
            }

            if begin > end {
                // Out-of-order range: dead, skip it.
                continue;
            }
            if member_offset < begin || member_offset > end {
                continue;
            }
            return true;
        }
        false
    }
}

// ==================== function rules ====================

impl FunctionSuppression {
    /// Evaluate this rule against a diff node.
    ///
    /// Both sides of a function diff are tried; the rule matches if either
    /// side matches as a function-subtype change.
    pub fn suppresses_diff(&self, node: &DiffNode, ctx: Option<&DiffContext>) -> bool {
        let DiffNode::Function(d) = node else {
            return false;
        };
        self.suppresses_function(&d.first, FnChangeKind::SUBTYPE, ctx)
            || self.suppresses_function(&d.second, FnChangeKind::SUBTYPE, ctx)
    }

    /// Evaluate this rule against one function declaration, reported as a
    /// change of kind `kind`.
    pub fn suppresses_function(
        &self,
        function: &FunctionDecl,
        kind: FnChangeKind,
        ctx: Option<&DiffContext>,
    ) -> bool {
        if !self.change_kind.contains(kind) {
            return false;
        }
        if !binary_scope_admits(&self.base, ctx) {
            return false;
        }

        let fname = function.name.as_str();
        let sym = function.symbol.as_ref();

        // With allow_other_aliases, the name predicates only bind every
        // alias when the function's own name doubles as a symbol name
        // (C-style aliasing).
        let name_aliases: &[String] = match sym {
            Some(sym) if self.allow_other_aliases && sym.has_alias_named(fname) => &sym.aliases,
            _ => &[],
        };

        if let Some(name) = &self.name {
            if name != fname {
                return false;
            }
            if let Some(sym) = sym {
                if !name_aliases.is_empty() && sym.aliases.iter().any(|a| a != &sym.name) {
                    return false;
                }
            }
        }
        if let Some(re) = &self.name_regex {
            if !re.is_match(fname) {
                return false;
            }
            if name_aliases.iter().any(|a| !re.is_match(a)) {
                return false;
            }
        }
        if let Some(re) = &self.name_not_regex {
            if re.is_match(fname) {
                return false;
            }
            if name_aliases.iter().any(|a| re.is_match(a)) {
                return false;
            }
        }

        let return_type = function.return_type_name.as_deref().unwrap_or("");
        if let Some(name) = &self.return_type_name {
            if name != return_type {
                return false;
            }
        } else if let Some(re) = &self.return_type_regex {
            if !re.is_match(return_type) {
                return false;
            }
        }

        if let Some(sym) = sym {
            if let Some(expected) = &self.symbol_name {
                if expected != &sym.name {
                    return false;
                }
                if self.allow_other_aliases && sym.aliases.iter().any(|a| a != &sym.name) {
                    return false;
                }
            } else {
                if let Some(re) = &self.symbol_name_regex {
                    if !re.is_match(&sym.name) {
                        return false;
                    }
                }
                if let Some(re) = &self.symbol_name_not_regex {
                    if re.is_match(&sym.name) {
                        return false;
                    }
                }
                if self.allow_other_aliases {
                    for alias in &sym.aliases {
                        if let Some(re) = &self.symbol_name_regex {
                            if !re.is_match(alias) {
                                return false;
                            }
                        }
                        if let Some(re) = &self.symbol_name_not_regex {
                            if re.is_match(alias) {
                                return false;
                            }
                        }
                    }
                }
            }

            if let Some(expected) = &self.symbol_version {
                if expected != &sym.version {
                    return false;
                }
            } else if let Some(re) = &self.symbol_version_regex {
                if !re.is_match(&sym.version) {
                    return false;
                }
            }
        }

        for spec in &self.parameter_specs {
            let Some(parameter) = function.parameter_at(spec.index) else {
                return false;
            };
            if let Some(type_name) = &spec.type_name {
                if type_name != &parameter.type_name {
                    return false;
                }
            } else if let Some(re) = &spec.type_name_regex {
                if !re.is_match(&parameter.type_name) {
                    return false;
                }
            }
        }

        true
    }

    /// Evaluate this rule against a bare ELF symbol (an added or deleted
    /// function reported without a declaration).
    ///
    /// A rule with neither a symbol-name nor a symbol-version predicate
    /// can never match here: that guards against rules written for
    /// declarations silently swallowing every symbol-only report.
    pub fn suppresses_function_symbol(
        &self,
        sym: &ElfSymbol,
        kind: FnChangeKind,
        ctx: Option<&DiffContext>,
    ) -> bool {
        if !self.change_kind.contains(kind) {
            return false;
        }
        if sym.kind != SymbolKind::Function {
            return false;
        }
        if !binary_scope_admits(&self.base, ctx) {
            return false;
        }

        let mut no_symbol_name = false;
        let mut no_symbol_version = false;

        if let Some(expected) = &self.symbol_name {
            if expected != &sym.name {
                return false;
            }
            if self.allow_other_aliases && sym.aliases.iter().any(|a| a != &sym.name) {
                return false;
            }
        } else if let Some(re) = &self.symbol_name_regex {
            if !re.is_match(&sym.name) {
                return false;
            }
            if self.allow_other_aliases && sym.aliases.iter().any(|a| !re.is_match(a)) {
                return false;
            }
        } else {
            no_symbol_name = true;
        }

        if let Some(expected) = &self.symbol_version {
            if expected != &sym.version {
                return false;
            }
        } else if let Some(re) = &self.symbol_version_regex {
            if !re.is_match(&sym.version) {
                return false;
            }
        } else {
            no_symbol_version = true;
        }

        !(no_symbol_name && no_symbol_version)
    }
}

// ==================== variable rules ====================

impl VariableSuppression {
    /// Evaluate this rule against a diff node.
    pub fn suppresses_diff(&self, node: &DiffNode, ctx: Option<&DiffContext>) -> bool {
        let DiffNode::Variable(d) = node else {
            return false;
        };
        self.suppresses_variable(&d.first, VarChangeKind::SUBTYPE, ctx)
            || self.suppresses_variable(&d.second, VarChangeKind::SUBTYPE, ctx)
    }

    /// Evaluate this rule against one variable declaration.
    pub fn suppresses_variable(
        &self,
        var: &VarDecl,
        kind: VarChangeKind,
        ctx: Option<&DiffContext>,
    ) -> bool {
        if !self.change_kind.contains(kind) {
            return false;
        }
        if !binary_scope_admits(&self.base, ctx) {
            return false;
        }

        if let Some(expected) = &self.name {
            if expected != &var.name {
                return false;
            }
        } else {
            if let Some(re) = &self.name_regex {
                if !re.is_match(&var.name) {
                    return false;
                }
            }
            if let Some(re) = &self.name_not_regex {
                if re.is_match(&var.name) {
                    return false;
                }
            }
        }

        let symbol_name = var.symbol.as_ref().map(|s| s.name.as_str()).unwrap_or("");
        if let Some(expected) = &self.symbol_name {
            if expected != symbol_name {
                return false;
            }
        } else {
            if let Some(re) = &self.symbol_name_regex {
                if !re.is_match(symbol_name) {
                    return false;
                }
            }
            if let Some(re) = &self.symbol_name_not_regex {
                if re.is_match(symbol_name) {
                    return false;
                }
            }
        }

        let symbol_version = var
            .symbol
            .as_ref()
            .map(|s| s.version.as_str())
            .unwrap_or("");
        if let Some(expected) = &self.symbol_version {
            if expected != symbol_version {
                return false;
            }
        } else if let Some(re) = &self.symbol_version_regex {
            if !re.is_match(symbol_version) {
                return false;
            }
        }

        if let Some(expected) = &self.type_name {
            if expected != &var.type_name {
                return false;
            }
        } else if let Some(re) = &self.type_name_regex {
            if !re.is_match(&var.type_name) {
                return false;
            }
        }

        true
    }

    /// Evaluate this rule against a bare ELF symbol (an added or deleted
    /// variable reported without a declaration).
    ///
    /// The rule's qualified-name predicate is also consulted against the
    /// symbol name here, since for variables the two usually coincide.
    pub fn suppresses_variable_symbol(
        &self,
        sym: &ElfSymbol,
        kind: VarChangeKind,
        ctx: Option<&DiffContext>,
    ) -> bool {
        if !self.change_kind.contains(kind) {
            return false;
        }
        if sym.kind != SymbolKind::Variable {
            return false;
        }
        if !binary_scope_admits(&self.base, ctx) {
            return false;
        }

        let mut no_symbol_name = false;
        let mut no_symbol_version = false;

        if let Some(expected) = &self.name {
            if expected != &sym.name {
                return false;
            }
        } else if let Some(expected) = &self.symbol_name {
            if expected != &sym.name {
                return false;
            }
        } else if let Some(re) = &self.symbol_name_regex {
            if !re.is_match(&sym.name) {
                return false;
            }
        } else {
            no_symbol_name = true;
        }

        if let Some(expected) = &self.symbol_version {
            if expected != &sym.version {
                return false;
            }
        } else if let Some(re) = &self.symbol_version_regex {
            if !re.is_match(&sym.version) {
                return false;
            }
        } else {
            no_symbol_version = true;
        }

        !(no_symbol_name && no_symbol_version)
    }
}

// ==================== file rules ====================

impl FileSuppression {
    /// Test whether this rule refuses to load `file_path`.
    ///
    /// Both regex pairs are applied to the *base name* of the path; for
    /// shared libraries the base name is conventionally the SONAME, which
    /// lets SONAME-bound rules refuse files before any ELF data is read.
    pub fn suppresses_file(&self, file_path: &str) -> bool {
        if file_path.is_empty() {
            return false;
        }
        let file_name = base_name(file_path);
        let mut has_predicate = false;

        if self.base.has_file_name_related_property() {
            has_predicate = true;
            if !self.base.matches_binary_name(file_name) {
                return false;
            }
        }
        if self.base.has_soname_related_property() {
            has_predicate = true;
            if !self.base.matches_soname(file_name) {
                return false;
            }
        }

        has_predicate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abiscope_core::diff::{ClassDiff, EnumDiff, EnumeratorChange, FunctionDiff, VariableDiff};
    use abiscope_core::ir::{Corpus, DataMember};
    use regex::Regex;

    use crate::suppression::model::{InsertionRange, Offset, ParameterSpec};
    use crate::suppression::model::PRIVATE_TYPES_SUPPR_LABEL;

    fn re(pattern: &str) -> Option<Regex> {
        Some(Regex::new(pattern).unwrap())
    }

    fn ctx() -> DiffContext {
        DiffContext::new(
            Corpus::new("/usr/lib/libfoo.so.3", "libfoo.so.3"),
            Corpus::new("/usr/lib/libfoo.so.4", "libfoo.so.4"),
        )
    }

    fn class(name: &str) -> TypeDecl {
        TypeDecl::new(name, TypeKind::Class)
    }

    fn type_node(name: &str) -> DiffNode {
        DiffNode::Type(TypeDiff::Basic {
            first: class(name),
            second: class(name),
        })
    }

    fn class_with(name: &str, members: &[(&str, u64, u64)], size: u64) -> TypeDecl {
        let mut t = class(name);
        t.is_struct = true;
        t.size_in_bits = size;
        t.data_members = members
            .iter()
            .map(|(n, off, sz)| DataMember::laid_out(*n, *off, *sz))
            .collect();
        t
    }

    // ==================== Binary-Scope Tests ====================

    #[test]
    fn unbound_rule_ignores_context() {
        let rule = TypeSuppression {
            type_name: Some("S".to_string()),
            ..Default::default()
        };
        assert!(rule.suppresses_diff(&type_node("S"), Some(&ctx())));
        assert!(rule.suppresses_diff(&type_node("S"), None));
    }

    #[test]
    fn file_name_scope_must_match_one_binary() {
        let mut rule = TypeSuppression {
            type_name: Some("S".to_string()),
            ..Default::default()
        };
        rule.base.file_name_regex = re("libfoo");
        assert!(rule.suppresses_diff(&type_node("S"), Some(&ctx())));

        // A scope matching neither binary defeats the rule no matter what
        // the other predicates say.
        rule.base.file_name_regex = re("libzzz");
        assert!(!rule.suppresses_diff(&type_node("S"), Some(&ctx())));
    }

    #[test]
    fn soname_scope_must_match_one_binary() {
        let mut rule = TypeSuppression {
            type_name: Some("S".to_string()),
            ..Default::default()
        };
        rule.base.soname_regex = re("^libfoo\\.so\\.");
        assert!(rule.suppresses_diff(&type_node("S"), Some(&ctx())));

        rule.base.soname_regex = re("^libbar");
        assert!(!rule.suppresses_diff(&type_node("S"), Some(&ctx())));
    }

    #[test]
    fn soname_not_regex_alone_excludes_matching_binaries() {
        let mut rule = TypeSuppression {
            type_name: Some("S".to_string()),
            ..Default::default()
        };
        rule.base.soname_not_regex = re("^libfoo");
        // Both SONAMEs hit the not-regex, so neither is admitted.
        assert!(!rule.suppresses_diff(&type_node("S"), Some(&ctx())));

        rule.base.soname_not_regex = re("^libbar");
        assert!(rule.suppresses_diff(&type_node("S"), Some(&ctx())));
    }

    // ==================== Type Name Tests ====================

    #[test]
    fn exact_name_wins_over_regexes() {
        let rule = TypeSuppression {
            type_name: Some("S".to_string()),
            // Contradictory regexes are ignored in the presence of an
            // exact name.
            type_name_regex: re("^T$"),
            type_name_not_regex: re("^S$"),
            ..Default::default()
        };
        assert!(rule.matches_type_name("S"));
        assert!(!rule.matches_type_name("T"));
    }

    #[test]
    fn regex_pair_must_agree() {
        let rule = TypeSuppression {
            type_name_regex: re("^std::"),
            type_name_not_regex: re("string"),
            ..Default::default()
        };
        assert!(rule.matches_type_name("std::vector"));
        assert!(!rule.matches_type_name("std::string"));
        assert!(!rule.matches_type_name("boost::any"));
    }

    #[test]
    fn nameless_rule_matches_any_name() {
        let rule = TypeSuppression::default();
        assert!(rule.matches_type_name("whatever"));
    }

    // ==================== Matching Is Pure ====================

    #[test]
    fn matching_is_idempotent() {
        let rule = TypeSuppression {
            type_name_regex: re("^std::"),
            ..Default::default()
        };
        let node = type_node("std::widget");
        let first = rule.suppresses_diff(&node, Some(&ctx()));
        let second = rule.suppresses_diff(&node, Some(&ctx()));
        assert_eq!(first, second);
        assert!(first);
    }

    // ==================== Type Kind Tests ====================

    #[test]
    fn struct_kind_requires_struct_classes() {
        let rule = TypeSuppression {
            type_kind: Some(TypeKindSpec::Struct),
            ..Default::default()
        };
        let mut s = class("S");
        s.is_struct = true;
        assert!(rule.suppresses_type(&s, None));

        let c = class("C");
        assert!(!rule.suppresses_type(&c, None));
    }

    #[test]
    fn class_kind_accepts_structs_too() {
        let rule = TypeSuppression {
            type_kind: Some(TypeKindSpec::Class),
            ..Default::default()
        };
        let mut s = class("S");
        s.is_struct = true;
        assert!(rule.suppresses_type(&s, None));
        assert!(!rule.suppresses_type(&TypeDecl::new("E", TypeKind::Enum), None));
    }

    #[test]
    fn enum_kind_rejects_classes() {
        let rule = TypeSuppression {
            type_kind: Some(TypeKindSpec::Enum),
            ..Default::default()
        };
        assert!(rule.suppresses_type(&TypeDecl::new("E", TypeKind::Enum), None));
        assert!(!rule.suppresses_type(&class("S"), None));
    }

    // ==================== Source Location Tests (S1) ====================

    #[test]
    fn location_keep_list_wins_over_name_match() {
        let mut rule = TypeSuppression {
            type_name_regex: re("^std::.*"),
            ..Default::default()
        };
        rule.source_locations_to_keep.insert("foo.h".to_string());

        let kept = class("std::widget")
            .with_location(SourceLocation::new("include/foo.h", 10, 1));
        let node = DiffNode::Type(TypeDiff::Basic {
            first: kept.clone(),
            second: kept,
        });
        assert!(!rule.suppresses_diff(&node, Some(&ctx())));

        let elsewhere = class("std::widget")
            .with_location(SourceLocation::new("include/bar.h", 10, 1));
        let node = DiffNode::Type(TypeDiff::Basic {
            first: elsewhere.clone(),
            second: elsewhere,
        });
        assert!(rule.suppresses_diff(&node, Some(&ctx())));
    }

    #[test]
    fn location_keep_list_matches_full_paths_too() {
        let mut rule = TypeSuppression::default();
        rule.source_locations_to_keep
            .insert("include/foo.h".to_string());
        let kept = class("S").with_location(SourceLocation::new("include/foo.h", 1, 1));
        assert!(!rule.suppresses_type(&kept, None));
    }

    #[test]
    fn location_keep_regex_wins_over_name_match() {
        let rule = TypeSuppression {
            type_name_regex: re(".*"),
            source_location_to_keep_regex: re("public/"),
            ..Default::default()
        };
        let kept = class("S").with_location(SourceLocation::new("public/api.h", 1, 1));
        assert!(!rule.suppresses_type(&kept, None));

        let private = class("S").with_location(SourceLocation::new("src/impl.h", 1, 1));
        assert!(rule.suppresses_type(&private, None));
    }

    #[test]
    fn missing_location_fails_rules_with_location_filters() {
        let mut rule = TypeSuppression::default();
        rule.source_locations_to_keep.insert("foo.h".to_string());
        assert!(!rule.suppresses_type(&class("S"), None));
    }

    #[test]
    fn missing_location_is_fine_without_location_filters() {
        let rule = TypeSuppression {
            type_name: Some("S".to_string()),
            ..Default::default()
        };
        assert!(rule.suppresses_type(&class("S"), None));
    }

    // ==================== Private-Type Rule Tests ====================

    fn private_rule() -> TypeSuppression {
        let mut rule = TypeSuppression::default();
        rule.base.label = Some(PRIVATE_TYPES_SUPPR_LABEL.to_string());
        rule.base.is_artificial = true;
        rule.source_locations_to_keep.insert("public.h".to_string());
        rule
    }

    #[test]
    fn private_rule_matches_opaque_declaration_only_class() {
        let rule = private_rule();
        let mut opaque = class("internal_state");
        opaque.is_declaration_only = true;
        assert!(rule.suppresses_type(&opaque, None));
    }

    #[test]
    fn private_rule_does_not_match_defined_class_without_location() {
        let rule = private_rule();
        // Defined (not declaration-only) but with no location: the keep
        // filter cannot be consulted, so the rule does not apply.
        let defined = class("internal_state");
        assert!(!rule.suppresses_type(&defined, None));
    }

    #[test]
    fn private_rule_does_not_peel_typedefs() {
        let rule = private_rule();

        let mut hidden = class("impl");
        hidden.is_declaration_only = true;
        let mut public_alias = TypeDecl::new("impl_t", TypeKind::Typedef);
        public_alias.location = Some(SourceLocation::new("public.h", 3, 1));
        public_alias.underlying = Some(Box::new(hidden.clone()));

        // Directly, the opaque class is suppressed...
        assert!(rule.suppresses_type(&hidden, None));

        // ...but a public typedef of it must survive: the typedef itself
        // sits in a kept header, and no peeling may reach the private
        // target.
        let node = DiffNode::Type(TypeDiff::Typedef {
            first: public_alias.clone(),
            second: public_alias,
            underlying: Some(Box::new(TypeDiff::Basic {
                first: hidden.clone(),
                second: hidden,
            })),
        });
        assert!(!rule.suppresses_diff(&node, None));
    }

    // ==================== Typedef Peeling Tests ====================

    #[test]
    fn one_level_of_typedef_is_peeled_for_ordinary_rules() {
        let rule = TypeSuppression {
            type_name: Some("S".to_string()),
            ..Default::default()
        };

        let mut alias = TypeDecl::new("alias_t", TypeKind::Typedef);
        alias.underlying = Some(Box::new(class("S")));
        let node = DiffNode::Type(TypeDiff::Typedef {
            first: alias.clone(),
            second: alias,
            underlying: Some(Box::new(TypeDiff::Basic {
                first: class("S"),
                second: class("S"),
            })),
        });
        assert!(rule.suppresses_diff(&node, None));
    }

    // ==================== Reach-Kind Tests ====================

    fn pointer_node(target: &str) -> DiffNode {
        DiffNode::Type(TypeDiff::Pointer {
            first: class(&format!("{target}*")),
            second: class(&format!("{target}*")),
            underlying: Some(Box::new(TypeDiff::Basic {
                first: class(target),
                second: class(target),
            })),
        })
    }

    fn reference_node(target: &str) -> DiffNode {
        DiffNode::Type(TypeDiff::Reference {
            first: class(&format!("{target}&")),
            second: class(&format!("{target}&")),
            underlying: Some(Box::new(TypeDiff::Basic {
                first: class(target),
                second: class(target),
            })),
        })
    }

    #[test]
    fn pointer_reach_requires_pointer_diff() {
        let rule = TypeSuppression {
            type_name: Some("S".to_string()),
            reach_kind: Some(ReachKind::Pointer),
            ..Default::default()
        };
        assert!(rule.suppresses_diff(&pointer_node("S"), None));
        assert!(!rule.suppresses_diff(&reference_node("S"), None));
        assert!(!rule.suppresses_diff(&type_node("S"), None));
    }

    #[test]
    fn reference_reach_requires_reference_diff() {
        let rule = TypeSuppression {
            type_name: Some("S".to_string()),
            reach_kind: Some(ReachKind::Reference),
            ..Default::default()
        };
        assert!(rule.suppresses_diff(&reference_node("S"), None));
        assert!(!rule.suppresses_diff(&pointer_node("S"), None));
    }

    #[test]
    fn reference_or_pointer_reach_accepts_both() {
        let rule = TypeSuppression {
            type_name: Some("S".to_string()),
            reach_kind: Some(ReachKind::ReferenceOrPointer),
            ..Default::default()
        };
        assert!(rule.suppresses_diff(&pointer_node("S"), None));
        assert!(rule.suppresses_diff(&reference_node("S"), None));
        assert!(!rule.suppresses_diff(&type_node("S"), None));
    }

    #[test]
    fn reach_shaping_peels_qualifiers_after_descending() {
        let rule = TypeSuppression {
            type_name: Some("S".to_string()),
            reach_kind: Some(ReachKind::Pointer),
            ..Default::default()
        };
        let node = DiffNode::Type(TypeDiff::Pointer {
            first: class("const S*"),
            second: class("const S*"),
            underlying: Some(Box::new(TypeDiff::Qualified {
                first: class("const S"),
                second: class("const S"),
                underlying: Box::new(TypeDiff::Basic {
                    first: class("S"),
                    second: class("S"),
                }),
            })),
        });
        assert!(rule.suppresses_diff(&node, None));
    }

    #[test]
    fn absent_underlying_diff_fails_gracefully() {
        let rule = TypeSuppression {
            type_name: Some("S".to_string()),
            reach_kind: Some(ReachKind::ReferenceOrPointer),
            ..Default::default()
        };
        let node = DiffNode::Type(TypeDiff::Pointer {
            first: class("S*"),
            second: class("S*"),
            underlying: None,
        });
        assert!(!rule.suppresses_diff(&node, None));
    }

    // ==================== Virtual Member Fallback Tests ====================

    #[test]
    fn vtable_slot_change_is_matched_via_enclosing_class() {
        let rule = TypeSuppression {
            type_name: Some("widget".to_string()),
            ..Default::default()
        };

        let mut d = FunctionDiff::new(
            FunctionDecl::new("widget::paint"),
            FunctionDecl::new("widget::paint"),
        );
        d.has_virtual_member_index_change = true;
        d.enclosing_class = Some(class("widget"));
        assert!(rule.suppresses_diff(&DiffNode::Function(d), None));
    }

    #[test]
    fn non_virtual_function_diff_is_not_matched_by_type_rules() {
        let rule = TypeSuppression {
            type_name: Some("widget".to_string()),
            ..Default::default()
        };
        let mut d = FunctionDiff::new(
            FunctionDecl::new("widget::paint"),
            FunctionDecl::new("widget::paint"),
        );
        d.enclosing_class = Some(class("widget"));
        assert!(!rule.suppresses_diff(&DiffNode::Function(d), None));
    }

    // ==================== Data-Member Insertion Tests (S2, property 7) ====================

    fn insertion_rule(name: &str, ranges: Vec<InsertionRange>) -> TypeSuppression {
        TypeSuppression {
            type_name: Some(name.to_string()),
            insertion_ranges: ranges,
            ..Default::default()
        }
    }

    fn class_diff_with_insertion(inserted: &[(&str, u64, u64)]) -> DiffNode {
        let first = class_with("S", &[("a", 0, 32), ("b", 32, 32)], 64);
        let mut second_members = vec![("a", 0u64, 32u64), ("b", 32, 32)];
        second_members.extend_from_slice(inserted);
        let second = class_with("S", &second_members, 64 + 32 * inserted.len() as u64);
        let mut d = ClassDiff::new(first, second);
        for (n, off, sz) in inserted {
            d.inserted_data_members
                .insert(n.to_string(), DataMember::laid_out(*n, *off, *sz));
        }
        DiffNode::Type(TypeDiff::Class(d))
    }

    #[test]
    fn insertion_at_end_suppresses_members_past_the_old_tail() {
        let rule = insertion_rule("S", vec![InsertionRange::new(Offset::END, Offset::END)]);
        assert!(rule.suppresses_diff(&class_diff_with_insertion(&[("c", 64, 32)]), None));
    }

    #[test]
    fn insertion_at_end_rejects_members_inside_the_old_layout() {
        let rule = insertion_rule("S", vec![InsertionRange::new(Offset::END, Offset::END)]);
        assert!(!rule.suppresses_diff(&class_diff_with_insertion(&[("c", 16, 32)]), None));
        // At exactly the old tail offset the insertion is not strictly
        // past the last member.
        assert!(!rule.suppresses_diff(&class_diff_with_insertion(&[("c", 32, 32)]), None));
    }

    #[test]
    fn integer_range_admits_member_offsets_inclusively() {
        let rule = insertion_rule(
            "S",
            vec![InsertionRange::new(Offset::Integer(64), Offset::Integer(96))],
        );
        assert!(rule.suppresses_diff(&class_diff_with_insertion(&[("c", 64, 32)]), None));
        assert!(rule.suppresses_diff(&class_diff_with_insertion(&[("c", 96, 32)]), None));
        assert!(!rule.suppresses_diff(&class_diff_with_insertion(&[("c", 100, 32)]), None));
    }

    #[test]
    fn every_inserted_member_must_be_admitted() {
        let rule = insertion_rule(
            "S",
            vec![InsertionRange::new(Offset::Integer(64), Offset::Integer(64))],
        );
        assert!(!rule.suppresses_diff(
            &class_diff_with_insertion(&[("c", 64, 32), ("d", 96, 32)]),
            None
        ));
    }

    #[test]
    fn out_of_order_range_is_dead_but_not_fatal() {
        let rule = insertion_rule(
            "S",
            vec![
                InsertionRange::new(Offset::Integer(96), Offset::Integer(64)),
                InsertionRange::new(Offset::Integer(0), Offset::Integer(128)),
            ],
        );
        assert!(rule.suppresses_diff(&class_diff_with_insertion(&[("c", 64, 32)]), None));

        let dead_only = insertion_rule(
            "S",
            vec![InsertionRange::new(Offset::Integer(96), Offset::Integer(64))],
        );
        assert!(!dead_only.suppresses_diff(&class_diff_with_insertion(&[("c", 64, 32)]), None));
    }

    #[test]
    fn symbolic_range_bounds_follow_the_old_layout() {
        let rule = insertion_rule(
            "S",
            vec![InsertionRange::new(
                Offset::OffsetAfter("b".to_string()),
                Offset::END,
            )],
        );
        // offset_after(b) = 64 in the old S
        assert!(rule.suppresses_diff(&class_diff_with_insertion(&[("c", 64, 32)]), None));
        assert!(!rule.suppresses_diff(&class_diff_with_insertion(&[("c", 16, 32)]), None));
    }

    #[test]
    fn unknown_member_in_range_bound_fails_the_predicate_silently() {
        let rule = insertion_rule(
            "S",
            vec![InsertionRange::new(
                Offset::OffsetOf("ghost".to_string()),
                Offset::END,
            )],
        );
        assert!(!rule.suppresses_diff(&class_diff_with_insertion(&[("c", 64, 32)]), None));
    }

    #[test]
    fn deleted_members_defeat_insertion_rules() {
        let rule = insertion_rule("S", vec![InsertionRange::new(Offset::END, Offset::END)]);

        let first = class_with("S", &[("a", 0, 32), ("b", 32, 32)], 64);
        let second = class_with("S", &[("a", 0, 32), ("c", 32, 32)], 64);
        let mut d = ClassDiff::new(first, second);
        d.deleted_data_members
            .insert("b".to_string(), DataMember::laid_out("b", 32, 32));
        d.inserted_data_members
            .insert("c".to_string(), DataMember::laid_out("c", 32, 32));
        assert!(!rule.suppresses_diff(&DiffNode::Type(TypeDiff::Class(d)), None));
    }

    #[test]
    fn shrinking_class_defeats_insertion_rules() {
        let rule = insertion_rule("S", vec![InsertionRange::new(Offset::END, Offset::END)]);

        let first = class_with("S", &[("a", 0, 32), ("b", 32, 32)], 96);
        let second = class_with("S", &[("a", 0, 32), ("b", 32, 32), ("c", 64, 32)], 64);
        let mut d = ClassDiff::new(first, second);
        d.inserted_data_members
            .insert("c".to_string(), DataMember::laid_out("c", 64, 32));
        assert!(!rule.suppresses_diff(&DiffNode::Type(TypeDiff::Class(d)), None));
    }

    // ==================== Changed Enumerator Tests (S3) ====================

    fn enum_decl(name: &str) -> TypeDecl {
        let mut t = TypeDecl::new(name, TypeKind::Enum);
        t.size_in_bits = 32;
        t
    }

    fn enum_node(changed: &[&str]) -> DiffNode {
        let mut d = EnumDiff::new(enum_decl("color"), enum_decl("color"));
        for name in changed {
            d.changed_enumerators.insert(
                name.to_string(),
                EnumeratorChange {
                    old_value: 1,
                    new_value: 2,
                },
            );
        }
        DiffNode::Type(TypeDiff::Enum(d))
    }

    fn enum_rule(allowed: &[&str]) -> TypeSuppression {
        TypeSuppression {
            type_name: Some("color".to_string()),
            type_kind: Some(TypeKindSpec::Enum),
            changed_enumerator_names: allowed.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn allow_listed_enumerator_changes_are_suppressed() {
        let rule = enum_rule(&["red", "blue"]);
        assert!(rule.suppresses_diff(&enum_node(&["red"]), None));
        assert!(rule.suppresses_diff(&enum_node(&["red", "blue"]), None));
    }

    #[test]
    fn unlisted_enumerator_change_defeats_the_rule() {
        let rule = enum_rule(&["red", "blue"]);
        assert!(!rule.suppresses_diff(&enum_node(&["red", "green"]), None));
        assert!(!rule.suppresses_diff(&enum_node(&["green"]), None));
    }

    #[test]
    fn deleted_enumerators_bypass_the_allow_list() {
        let rule = enum_rule(&["red"]);
        let mut d = EnumDiff::new(enum_decl("color"), enum_decl("color"));
        d.changed_enumerators.insert(
            "red".to_string(),
            EnumeratorChange {
                old_value: 1,
                new_value: 2,
            },
        );
        d.deleted_enumerators.insert("blue".to_string(), 3);
        // With a deletion in play the enumerator clause is vacuous; the
        // rule still matches the enum by name and kind.
        assert!(rule.suppresses_diff(&DiffNode::Type(TypeDiff::Enum(d)), None));
    }

    #[test]
    fn size_change_bypasses_the_allow_list() {
        let rule = enum_rule(&["red"]);
        let mut bigger = enum_decl("color");
        bigger.size_in_bits = 64;
        let mut d = EnumDiff::new(enum_decl("color"), bigger);
        d.changed_enumerators.insert(
            "green".to_string(),
            EnumeratorChange {
                old_value: 1,
                new_value: 2,
            },
        );
        assert!(rule.suppresses_diff(&DiffNode::Type(TypeDiff::Enum(d)), None));
    }

    // ==================== Function Rule Tests ====================

    fn fn_with_symbol(name: &str, sym: &str, aliases: &[&str]) -> FunctionDecl {
        let mut f = FunctionDecl::new(name);
        f.symbol = Some(
            ElfSymbol::new(sym, SymbolKind::Function).with_aliases(aliases.iter().copied()),
        );
        f
    }

    #[test]
    fn function_diff_matches_on_either_side() {
        let rule = FunctionSuppression {
            name: Some("foo::bar".to_string()),
            ..Default::default()
        };
        let d = FunctionDiff::new(FunctionDecl::new("foo::bar"), FunctionDecl::new("foo::bar2"));
        assert!(rule.suppresses_diff(&DiffNode::Function(d), None));

        let d = FunctionDiff::new(FunctionDecl::new("foo::baz"), FunctionDecl::new("foo::qux"));
        assert!(!rule.suppresses_diff(&DiffNode::Function(d), None));
    }

    #[test]
    fn change_kind_gates_decl_matching() {
        let rule = FunctionSuppression {
            change_kind: FnChangeKind::ADDED,
            name: Some("foo::bar".to_string()),
            ..Default::default()
        };
        // A subtype change is not an added function.
        let d = FunctionDiff::new(FunctionDecl::new("foo::bar"), FunctionDecl::new("foo::bar"));
        assert!(!rule.suppresses_diff(&DiffNode::Function(d), None));

        assert!(rule.suppresses_function(
            &FunctionDecl::new("foo::bar"),
            FnChangeKind::ADDED,
            None
        ));
    }

    #[test]
    fn name_regex_with_aliases_is_all_or_nothing() {
        let rule = FunctionSuppression {
            name_regex: re("^foo_"),
            ..Default::default()
        };

        // The declaration name doubles as the symbol name, C-style, with
        // one alias also matching the predicate.
        let good = fn_with_symbol("foo_new", "foo_new", &["foo_create"]);
        assert!(rule.suppresses_function(&good, FnChangeKind::SUBTYPE, None));

        // One alias escapes the predicate: the rule must not fire.
        let bad = fn_with_symbol("foo_new", "foo_new", &["bar_create"]);
        assert!(!rule.suppresses_function(&bad, FnChangeKind::SUBTYPE, None));
    }

    #[test]
    fn alias_rule_is_skipped_when_disabled() {
        let rule = FunctionSuppression {
            name_regex: re("^foo_"),
            allow_other_aliases: false,
            ..Default::default()
        };
        let f = fn_with_symbol("foo_new", "foo_new", &["bar_create"]);
        assert!(rule.suppresses_function(&f, FnChangeKind::SUBTYPE, None));
    }

    #[test]
    fn alias_rule_is_skipped_for_mangled_names() {
        // The declaration name is not one of the symbol names, so the
        // language does not use symbol==name aliasing and the alias walk
        // does not apply to the name predicate.
        let rule = FunctionSuppression {
            name_regex: re("^foo::"),
            ..Default::default()
        };
        let f = fn_with_symbol("foo::bar", "_ZN3foo3barEv", &["_ZN9elsewhereEv"]);
        assert!(rule.suppresses_function(&f, FnChangeKind::SUBTYPE, None));
    }

    #[test]
    fn return_type_predicates() {
        let mut f = FunctionDecl::new("f");
        f.return_type_name = Some("int".to_string());

        let exact = FunctionSuppression {
            return_type_name: Some("int".to_string()),
            ..Default::default()
        };
        assert!(exact.suppresses_function(&f, FnChangeKind::SUBTYPE, None));

        let wrong = FunctionSuppression {
            return_type_name: Some("long".to_string()),
            ..Default::default()
        };
        assert!(!wrong.suppresses_function(&f, FnChangeKind::SUBTYPE, None));

        let by_regex = FunctionSuppression {
            return_type_regex: re("^(int|long)$"),
            ..Default::default()
        };
        assert!(by_regex.suppresses_function(&f, FnChangeKind::SUBTYPE, None));
    }

    #[test]
    fn symbol_version_predicates() {
        let mut f = fn_with_symbol("f", "f", &[]);
        f.symbol.as_mut().unwrap().version = "GLIBC_2.2.5".to_string();

        let exact = FunctionSuppression {
            symbol_version: Some("GLIBC_2.2.5".to_string()),
            ..Default::default()
        };
        assert!(exact.suppresses_function(&f, FnChangeKind::SUBTYPE, None));

        let by_regex = FunctionSuppression {
            symbol_version_regex: re("^GLIBC_2\\..*"),
            ..Default::default()
        };
        assert!(by_regex.suppresses_function(&f, FnChangeKind::SUBTYPE, None));

        let wrong = FunctionSuppression {
            symbol_version: Some("GLIBC_2.30".to_string()),
            ..Default::default()
        };
        assert!(!wrong.suppresses_function(&f, FnChangeKind::SUBTYPE, None));
    }

    #[test]
    fn parameter_specs_resolve_across_non_implicit_parameters() {
        use abiscope_core::ir::FunctionParameter;

        let mut f = FunctionDecl::new("S::method");
        f.parameters = vec![
            FunctionParameter::implicit("S*"),
            FunctionParameter::new("int"),
            FunctionParameter::new("const char*"),
        ];

        let rule = FunctionSuppression {
            name: Some("S::method".to_string()),
            parameter_specs: vec![
                ParameterSpec {
                    index: 0,
                    type_name: Some("int".to_string()),
                    type_name_regex: None,
                },
                ParameterSpec {
                    index: 1,
                    type_name: None,
                    type_name_regex: re("char"),
                },
            ],
            ..Default::default()
        };
        assert!(rule.suppresses_function(&f, FnChangeKind::SUBTYPE, None));

        let missing_index = FunctionSuppression {
            parameter_specs: vec![ParameterSpec {
                index: 5,
                type_name: Some("int".to_string()),
                type_name_regex: None,
            }],
            ..Default::default()
        };
        assert!(!missing_index.suppresses_function(&f, FnChangeKind::SUBTYPE, None));

        let wrong_type = FunctionSuppression {
            parameter_specs: vec![ParameterSpec {
                index: 0,
                type_name: Some("long".to_string()),
                type_name_regex: None,
            }],
            ..Default::default()
        };
        assert!(!wrong_type.suppresses_function(&f, FnChangeKind::SUBTYPE, None));
    }

    // ==================== Symbol-Only Function Tests (S4) ====================

    #[test]
    fn added_symbol_with_conforming_aliases_is_suppressed() {
        let rule = FunctionSuppression {
            change_kind: FnChangeKind::ADDED,
            symbol_name_regex: re("^_ZN3foo.*"),
            ..Default::default()
        };
        let sym = ElfSymbol::new("_ZN3foo3barEv", SymbolKind::Function)
            .with_aliases(["_ZN3foo3bazEv"]);
        assert!(rule.suppresses_function_symbol(&sym, FnChangeKind::ADDED, None));
    }

    #[test]
    fn added_symbol_with_nonconforming_alias_is_kept() {
        let rule = FunctionSuppression {
            change_kind: FnChangeKind::ADDED,
            symbol_name_regex: re("^_ZN3foo.*"),
            ..Default::default()
        };
        let sym = ElfSymbol::new("_ZN3foo3barEv", SymbolKind::Function)
            .with_aliases(["_ZN4quux3barEv"]);
        assert!(!rule.suppresses_function_symbol(&sym, FnChangeKind::ADDED, None));
    }

    #[test]
    fn symbol_rule_without_symbol_predicates_is_vacuous() {
        let rule = FunctionSuppression {
            name_regex: re(".*"),
            ..Default::default()
        };
        let sym = ElfSymbol::new("anything", SymbolKind::Function);
        assert!(!rule.suppresses_function_symbol(&sym, FnChangeKind::ADDED, None));
    }

    #[test]
    fn symbol_version_alone_can_match_symbols() {
        let rule = FunctionSuppression {
            symbol_version_regex: re("^PRIVATE_"),
            ..Default::default()
        };
        let sym = ElfSymbol::new("f", SymbolKind::Function).with_version("PRIVATE_1.0");
        assert!(rule.suppresses_function_symbol(&sym, FnChangeKind::DELETED, None));
    }

    #[test]
    fn variable_symbols_are_not_matched_by_function_rules() {
        let rule = FunctionSuppression {
            symbol_name_regex: re(".*"),
            ..Default::default()
        };
        let sym = ElfSymbol::new("data", SymbolKind::Variable);
        assert!(!rule.suppresses_function_symbol(&sym, FnChangeKind::ADDED, None));
    }

    // ==================== Variable Rule Tests ====================

    fn var_with_symbol(name: &str, sym: &str, type_name: &str) -> VarDecl {
        let mut v = VarDecl::new(name, type_name);
        v.symbol = Some(ElfSymbol::new(sym, SymbolKind::Variable));
        v
    }

    #[test]
    fn variable_diff_matches_by_name_and_type() {
        let rule = VariableSuppression {
            name: Some("global_table".to_string()),
            type_name: Some("table_t".to_string()),
            ..Default::default()
        };
        let d = VariableDiff::new(
            var_with_symbol("global_table", "global_table", "table_t"),
            var_with_symbol("global_table", "global_table", "table_t"),
        );
        assert!(rule.suppresses_diff(&DiffNode::Variable(d), None));

        let wrong_type = VariableDiff::new(
            var_with_symbol("global_table", "global_table", "other_t"),
            var_with_symbol("global_table", "global_table", "other_t"),
        );
        assert!(!rule.suppresses_diff(&DiffNode::Variable(wrong_type), None));
    }

    #[test]
    fn variable_name_regex_pair() {
        let rule = VariableSuppression {
            name_regex: re("^internal_"),
            name_not_regex: re("_keep$"),
            ..Default::default()
        };
        let d = VariableDiff::new(
            VarDecl::new("internal_cache", "cache_t"),
            VarDecl::new("internal_cache", "cache_t"),
        );
        assert!(rule.suppresses_diff(&DiffNode::Variable(d), None));

        let kept = VariableDiff::new(
            VarDecl::new("internal_cache_keep", "cache_t"),
            VarDecl::new("internal_cache_keep", "cache_t"),
        );
        assert!(!rule.suppresses_diff(&DiffNode::Variable(kept), None));
    }

    #[test]
    fn variable_symbol_only_matching_consults_decl_name_predicate() {
        let rule = VariableSuppression {
            name: Some("global_table".to_string()),
            ..Default::default()
        };
        let sym = ElfSymbol::new("global_table", SymbolKind::Variable);
        assert!(rule.suppresses_variable_symbol(&sym, VarChangeKind::DELETED, None));

        let other = ElfSymbol::new("other", SymbolKind::Variable);
        assert!(!rule.suppresses_variable_symbol(&other, VarChangeKind::DELETED, None));
    }

    #[test]
    fn variable_symbol_only_guard_against_vacuous_rules() {
        let rule = VariableSuppression {
            type_name: Some("t".to_string()),
            ..Default::default()
        };
        let sym = ElfSymbol::new("v", SymbolKind::Variable);
        assert!(!rule.suppresses_variable_symbol(&sym, VarChangeKind::ADDED, None));
    }

    #[test]
    fn variable_change_kind_gates_symbol_matching() {
        let rule = VariableSuppression {
            change_kind: VarChangeKind::DELETED,
            symbol_name: Some("v".to_string()),
            ..Default::default()
        };
        let sym = ElfSymbol::new("v", SymbolKind::Variable);
        assert!(rule.suppresses_variable_symbol(&sym, VarChangeKind::DELETED, None));
        assert!(!rule.suppresses_variable_symbol(&sym, VarChangeKind::ADDED, None));
    }

    // ==================== File Rule Tests (S6) ====================

    #[test]
    fn file_rule_matches_base_name_against_regex_pair() {
        let mut rule = FileSuppression::default();
        rule.base.file_name_regex = re("^libfoo\\.so\\..*");
        assert!(rule.suppresses_file("/usr/lib/libfoo.so.3"));
        assert!(!rule.suppresses_file("/usr/lib/libbar.so.1"));
        // The directory part never participates.
        assert!(!rule.suppresses_file("/libfoo.so.3/libbar.so.1"));
    }

    #[test]
    fn file_rule_with_no_predicates_matches_nothing() {
        let rule = FileSuppression::default();
        assert!(!rule.suppresses_file("/usr/lib/libfoo.so.3"));
        assert!(!rule.suppresses_file(""));
    }

    #[test]
    fn file_rule_never_suppresses_diff_nodes() {
        let mut rule = FileSuppression::default();
        rule.base.file_name_regex = re(".*");
        let rule = Suppression::File(rule);
        assert!(!rule.suppresses_diff(&type_node("S"), Some(&ctx())));
    }

    // ==================== Composition Tests (property 2) ====================

    #[test]
    fn rule_sets_compose_as_unions() {
        let a = Suppression::Type(TypeSuppression {
            type_name: Some("A".to_string()),
            ..Default::default()
        });
        let b = Suppression::Type(TypeSuppression {
            type_name: Some("B".to_string()),
            ..Default::default()
        });

        let nodes = [type_node("A"), type_node("B"), type_node("C")];
        let suppressed_by = |rules: &[&Suppression]| -> Vec<bool> {
            nodes
                .iter()
                .map(|n| rules.iter().any(|r| r.suppresses_diff(n, None)))
                .collect()
        };

        let only_a = suppressed_by(&[&a]);
        let only_b = suppressed_by(&[&b]);
        let both = suppressed_by(&[&a, &b]);
        let expected: Vec<bool> = only_a
            .iter()
            .zip(&only_b)
            .map(|(x, y)| *x || *y)
            .collect();
        assert_eq!(both, expected);
        assert_eq!(both, vec![true, true, false]);
    }
}
