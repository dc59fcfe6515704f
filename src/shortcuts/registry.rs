//! Layered shortcut registry.
//!
//! Bindings are kept in a Vec so dispatch order among equal priorities is
//! registration order. A keystroke is offered to matching bindings from the
//! highest layer down; the first handler that reports "consumed" stops the
//! walk. Bindings below the active layer are skipped, except `global` ones.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, warn};

use super::layer::ShortcutLayer;
use super::types::{encode, normalize, KeyCombo, KeyFlags};
use crate::logging;

/// Callback run when a binding fires. `Ok(true)` means the key was consumed.
pub type ShortcutHandler = Arc<dyn Fn() -> anyhow::Result<bool> + Send + Sync>;

/// Predicate re-evaluated on every dispatch; a `false` skips the binding.
pub type EnabledPredicate = Arc<dyn Fn() -> bool + Send + Sync>;

/// A shortcut binding handed to [`ShortcutRegistry::register`].
#[derive(Clone)]
pub struct ShortcutBinding {
    pub id: Option<String>,
    pub combo: String,
    pub layer: ShortcutLayer,
    pub priority: i32,
    pub description: Option<String>,
    pub source: Option<String>,
    handler: ShortcutHandler,
    enabled: Option<EnabledPredicate>,
}

impl ShortcutBinding {
    pub fn new<F>(combo: impl Into<String>, layer: ShortcutLayer, handler: F) -> Self
    where
        F: Fn() -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Self {
            id: None,
            combo: combo.into(),
            layer,
            priority: 0,
            description: None,
            source: None,
            handler: Arc::new(handler),
            enabled: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn enabled_when<P>(mut self, predicate: P) -> Self
    where
        P: Fn() -> bool + Send + Sync + 'static,
    {
        self.enabled = Some(Arc::new(predicate));
        self
    }

    fn is_enabled(&self) -> bool {
        self.enabled.as_ref().map_or(true, |predicate| predicate())
    }
}

impl std::fmt::Debug for ShortcutBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShortcutBinding")
            .field("id", &self.id)
            .field("combo", &self.combo)
            .field("layer", &self.layer)
            .field("priority", &self.priority)
            .field("description", &self.description)
            .field("source", &self.source)
            .field("has_enabled_predicate", &self.enabled.is_some())
            .finish()
    }
}

/// Read-only snapshot of a registered binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingInfo {
    pub id: String,
    pub combo: String,
    pub layer: ShortcutLayer,
    pub priority: i32,
    pub description: Option<String>,
    pub source: Option<String>,
    pub enabled: bool,
}

/// Two or more bindings sharing a normalized combo within one layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortcutConflict {
    pub combo: String,
    pub layer: ShortcutLayer,
    /// Conflicting binding ids in registration order.
    pub binding_ids: Vec<String>,
}

/// Diagnostic view of one layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerState {
    pub layer: ShortcutLayer,
    pub active: bool,
    /// Whether bindings on this layer can fire under the current active layer.
    pub eligible: bool,
    pub binding_count: usize,
}

/// Construction options for [`ShortcutRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryOptions {
    pub detect_conflicts: bool,
    pub initial_layer: ShortcutLayer,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            detect_conflicts: true,
            initial_layer: ShortcutLayer::Screen,
        }
    }
}

struct Entry {
    id: String,
    binding: ShortcutBinding,
}

impl Entry {
    fn info(&self) -> BindingInfo {
        BindingInfo {
            id: self.id.clone(),
            combo: self.binding.combo.clone(),
            layer: self.binding.layer,
            priority: self.binding.priority,
            description: self.binding.description.clone(),
            source: self.binding.source.clone(),
            enabled: self.binding.is_enabled(),
        }
    }
}

struct RegistryState {
    entries: Vec<Entry>,
    active_layer: ShortcutLayer,
}

/// Central registry of keyboard shortcuts across all layers.
///
/// All methods take `&self`; the registry can be shared behind an `Arc` and
/// handlers may register, unregister or switch layers while a dispatch is in
/// flight. Handlers must not call [`dispatch`](Self::dispatch) themselves.
pub struct ShortcutRegistry {
    state: RwLock<RegistryState>,
    detect_conflicts: bool,
}

impl Default for ShortcutRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            state: RwLock::new(RegistryState {
                entries: Vec::new(),
                active_layer: options.initial_layer,
            }),
            detect_conflicts: options.detect_conflicts,
        }
    }

    /// Store a binding and return its id.
    ///
    /// The combo is normalized first. Re-registering an existing id replaces
    /// that binding in place. A same-layer duplicate combo only warns.
    pub fn register(&self, mut binding: ShortcutBinding) -> String {
        if KeyCombo::parse(&binding.combo).is_err() {
            warn!(
                event_type = "shortcut_register",
                combo = %binding.combo,
                "Shortcut combo could not be parsed; it will only match verbatim"
            );
        }
        binding.combo = normalize(&binding.combo);
        let id = binding
            .id
            .clone()
            .unwrap_or_else(|| format!("shortcut-{}", uuid::Uuid::new_v4()));
        binding.id = Some(id.clone());

        let mut state = self.state.write();

        if self.detect_conflicts {
            let clashing: Vec<&str> = state
                .entries
                .iter()
                .filter(|e| {
                    e.id != id
                        && e.binding.layer == binding.layer
                        && e.binding.combo == binding.combo
                })
                .map(|e| e.id.as_str())
                .collect();
            if !clashing.is_empty() {
                warn!(
                    event_type = "shortcut_conflict",
                    binding_id = %id,
                    combo = %binding.combo,
                    layer = %binding.layer,
                    existing = ?clashing,
                    "Shortcut conflicts with an existing binding in the same layer"
                );
            }
        }

        let entry = Entry {
            id: id.clone(),
            binding,
        };
        match state.entries.iter().position(|e| e.id == id) {
            Some(index) => {
                debug!(binding_id = %id, "Replacing existing shortcut binding");
                state.entries[index] = entry;
            }
            None => state.entries.push(entry),
        }
        id
    }

    /// Remove a binding. Returns `false` if the id is unknown.
    pub fn unregister(&self, id: &str) -> bool {
        let mut state = self.state.write();
        let before = state.entries.len();
        state.entries.retain(|e| e.id != id);
        state.entries.len() != before
    }

    pub fn clear(&self) {
        self.state.write().entries.clear();
    }

    pub fn active_layer(&self) -> ShortcutLayer {
        self.state.read().active_layer
    }

    pub fn set_active_layer(&self, layer: ShortcutLayer) {
        let mut state = self.state.write();
        if state.active_layer == layer {
            return;
        }
        debug!(
            event_type = "shortcut_layer",
            from = %state.active_layer,
            to = %layer,
            "Active shortcut layer changed"
        );
        state.active_layer = layer;
    }

    /// Route one raw key event. Returns whether a handler consumed it.
    pub fn dispatch(&self, input: &str, flags: &KeyFlags) -> bool {
        let Some(combo) = encode(input, flags) else {
            return false;
        };
        let combo = combo.to_canonical_string();

        // Snapshot candidates so handlers run without the lock held.
        let (active, candidates) = {
            let state = self.state.read();
            let mut candidates: Vec<(String, ShortcutBinding)> = state
                .entries
                .iter()
                .filter(|e| e.binding.combo == combo)
                .map(|e| (e.id.clone(), e.binding.clone()))
                .collect();
            // Stable sort: ties keep registration order.
            candidates.sort_by(|(_, a), (_, b)| {
                b.layer
                    .priority()
                    .cmp(&a.layer.priority())
                    .then(b.priority.cmp(&a.priority))
            });
            (state.active_layer, candidates)
        };

        for (id, binding) in candidates {
            if !binding.layer.is_eligible_under(active) || !binding.is_enabled() {
                continue;
            }
            // An earlier handler may have unregistered this one.
            if !self.contains(&id) {
                continue;
            }
            match (binding.handler)() {
                Ok(true) => {
                    logging::log_shortcut_event(&id, &combo, binding.layer, "consumed");
                    return true;
                }
                Ok(false) => {
                    logging::log_shortcut_event(&id, &combo, binding.layer, "passed");
                }
                Err(err) => {
                    error!(
                        event_type = "shortcut_handler_error",
                        binding_id = %id,
                        combo = %combo,
                        error = %err,
                        "Shortcut handler failed"
                    );
                }
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.read().entries.iter().any(|e| e.id == id)
    }

    pub fn describe(&self, id: &str) -> Option<BindingInfo> {
        self.state
            .read()
            .entries
            .iter()
            .find(|e| e.id == id)
            .map(Entry::info)
    }

    /// Bindings that would be offered a key right now, in dispatch order.
    pub fn active_bindings(&self) -> Vec<BindingInfo> {
        let state = self.state.read();
        let mut infos: Vec<BindingInfo> = state
            .entries
            .iter()
            .filter(|e| e.binding.layer.is_eligible_under(state.active_layer))
            .map(Entry::info)
            .filter(|info| info.enabled)
            .collect();
        infos.sort_by(|a, b| {
            b.layer
                .priority()
                .cmp(&a.layer.priority())
                .then(b.priority.cmp(&a.priority))
        });
        infos
    }

    pub fn bindings_for_layer(&self, layer: ShortcutLayer) -> Vec<BindingInfo> {
        self.state
            .read()
            .entries
            .iter()
            .filter(|e| e.binding.layer == layer)
            .map(Entry::info)
            .collect()
    }

    /// Same-layer duplicate combos, in order of first registration.
    pub fn conflicts(&self) -> Vec<ShortcutConflict> {
        let state = self.state.read();
        let mut conflicts: Vec<ShortcutConflict> = Vec::new();
        let mut index: HashMap<(ShortcutLayer, &str), usize> = HashMap::new();

        for entry in &state.entries {
            let key = (entry.binding.layer, entry.binding.combo.as_str());
            match index.get(&key) {
                Some(&i) => conflicts[i].binding_ids.push(entry.id.clone()),
                None => {
                    index.insert(key, conflicts.len());
                    conflicts.push(ShortcutConflict {
                        combo: entry.binding.combo.clone(),
                        layer: entry.binding.layer,
                        binding_ids: vec![entry.id.clone()],
                    });
                }
            }
        }

        conflicts.retain(|c| c.binding_ids.len() > 1);
        conflicts
    }

    pub fn layer_states(&self) -> Vec<LayerState> {
        let state = self.state.read();
        ShortcutLayer::ALL
            .iter()
            .map(|&layer| LayerState {
                layer,
                active: layer == state.active_layer,
                eligible: layer.is_eligible_under(state.active_layer),
                binding_count: state
                    .entries
                    .iter()
                    .filter(|e| e.binding.layer == layer)
                    .count(),
            })
            .collect()
    }
}
