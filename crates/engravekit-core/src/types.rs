//! Type aliases for commonly used callback types.

// =============================================================================
// CALLBACK TYPES
// =============================================================================

/// A progress callback receiving a completion percentage (0-100).
///
/// Returning `false` asks the running operation to stop at its next
/// checkpoint. Runs synchronously on the caller's stack, so a slow callback
/// stalls the operation that reports through it.
pub type ProgressCallback<'a> = Box<dyn FnMut(u8) -> bool + 'a>;
