//! Purpose: Internal JSON parsing boundary shared by the format layer.
//! Exports: `parse` module with decode helpers and failure categorization.
//! Role: Single seam for parser details so callsites avoid ad hoc error inspection.
//! Invariants: Runtime JSON decoding of input blobs goes through this module.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

pub(crate) mod parse;
