//! Utility helpers shared across the store and the view.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns from store and
//! component logic so the latter stay testable natively.

pub mod avatar;
pub mod icons;
pub mod navigate;
