//! Centralized recursion limits.
//!
//! Recursive type graphs (`type Tree = { kids: Tree[] }`) terminate at
//! construction via thunking (see `structural_types::descriptor::Box`), but
//! `unwrap`/`accepts`/`collectErrors` still recurse structurally over a
//! value and its descriptor in lock-step. These limits bound that recursion
//! so a pathological value (or a host bug that produced a truly-infinite
//! value graph) fails fast instead of overflowing the stack.

/// Maximum nesting depth for `accepts`/`collectErrors` recursion into
/// nested arrays, tuples, objects, unions, and intersections.
pub const MAX_CHECK_DEPTH: u32 = 512;

/// Maximum nesting depth when resolving `ref`/`box`/`Application` chains
/// during `unwrap`.
pub const MAX_UNWRAP_DEPTH: u32 = 256;
