//! Evaluation of symbolic offsets against a class's laid-out members.
//!
//! Insertion-range bounds are either integer literals or the member-relative
//! expressions `offset_of(m)` and `offset_after(m)`. Evaluation needs the
//! first (old) class as context and can fail — an unknown member name makes
//! the enclosing predicate fail silently, never the whole rule.

use abiscope_core::ir::TypeDecl;

use crate::suppression::model::Offset;

/// Whether an evaluated boundary is the "end of the type" sentinel.
pub fn is_end_boundary(value: u64) -> bool {
    value == u64::MAX
}

/// Evaluate an offset in the context of `class_type`.
///
/// Integer literals evaluate to themselves (with `u64::MAX` meaning "end").
/// `offset_of(m)` is the recorded offset of the first laid-out member named
/// `m`; `offset_after(m)` is the offset of the member following `m`, or
/// `offset_of(m) + size_in_bits(m)` when `m` is the last laid-out member.
///
/// Returns `None` when the named member is not laid out in `class_type`.
pub fn eval_offset(offset: &Offset, class_type: &TypeDecl) -> Option<u64> {
    match offset {
        Offset::Integer(value) => Some(*value),
        Offset::OffsetOf(member) => {
            let m = class_type.laid_out_members().find(|m| m.name == *member)?;
            Some(m.offset_in_bits)
        }
        Offset::OffsetAfter(member) => {
            let m = class_type.laid_out_members().find(|m| m.name == *member)?;
            match class_type.next_laid_out_member_offset(member) {
                Some(next) => Some(next),
                None => Some(m.offset_in_bits + m.size_in_bits),
            }
        }
    }
}
