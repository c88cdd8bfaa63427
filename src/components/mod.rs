//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render header chrome from store state and turn clicks back into
//! store actions.

pub mod user_menu;
