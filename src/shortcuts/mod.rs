//! Layered keyboard shortcut routing.
//!
//! This module provides:
//! - Key combo encoding from raw terminal events and canonical normalization
//! - Four ordered layers (`global` < `screen` < `dialog` < `input`)
//! - A registry that decides which handlers see a keystroke
//! - Same-layer conflict detection
//!
//! # Capture model
//!
//! Matching bindings are tried from the highest layer down. A binding below
//! the active layer never fires, except `global` bindings, which are always
//! eligible. The first handler returning `Ok(true)` consumes the key.
//!
//! # Example
//!
//! ```
//! use toolgate::shortcuts::{KeyFlags, ShortcutBinding, ShortcutLayer, ShortcutRegistry};
//!
//! let registry = ShortcutRegistry::new();
//! registry.register(ShortcutBinding::new("ctrl+c", ShortcutLayer::Global, || Ok(true)));
//! assert!(registry.dispatch("c", &KeyFlags::ctrl()));
//! ```

mod layer;
mod registry;
mod types;



pub use layer::{ShortcutLayer, UnknownLayer};
pub use registry::{
    BindingInfo, EnabledPredicate, LayerState, RegistryOptions, ShortcutBinding, ShortcutConflict,
    ShortcutHandler, ShortcutRegistry,
};
pub use types::{
    canonicalize_key, encode, format_for_display, normalize, KeyCombo, KeyFlags, Modifiers,
};
