use crate::texture::{ContextListener, ListenerId, Texture};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Weak};

#[derive(Default)]
struct RegistryState {
    textures: BTreeMap<i64, Arc<dyn Texture>>,
    listener_order: HashMap<ListenerId, u64>,
    listeners: BTreeMap<u64, (ListenerId, Weak<dyn ContextListener>)>,
    next_order: u64,
}

/// Directory of external textures and GPU-context listeners.
///
/// Textures are owned by the registry. Listeners are held weakly and notified in the order
/// they were last (re-)registered; listeners that have been dropped are pruned while
/// notifying. Callbacks run without the registry lock held, so they may call back into it.
#[derive(Default)]
pub struct TextureRegistry {
    state: Mutex<RegistryState>,
}

impl std::fmt::Debug for TextureRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TextureRegistry")
            .field("textures", &state.textures.len())
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl TextureRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `texture` under its own id, replacing any texture with the same id.
    pub fn register_texture(&self, texture: Arc<dyn Texture>) {
        let id = texture.id();
        let replaced = self.state.lock().textures.insert(id, texture);
        tracing::debug!(texture_id = id, replaced = replaced.is_some(), "texture registered");
    }

    /// Remove the texture with `id`, running its unregistration hook. Unknown ids are ignored.
    pub fn unregister_texture(&self, id: i64) {
        let removed = self.state.lock().textures.remove(&id);
        if let Some(texture) = removed {
            texture.on_texture_unregistered();
            tracing::debug!(texture_id = id, "texture unregistered");
        }
    }

    /// Look up a texture.
    pub fn get_texture(&self, id: i64) -> Option<Arc<dyn Texture>> {
        self.state.lock().textures.get(&id).cloned()
    }

    /// Number of registered textures.
    pub fn texture_count(&self) -> usize {
        self.state.lock().textures.len()
    }

    /// Tell the texture with `id` that its producer has a new frame.
    pub fn on_texture_frame_available(&self, id: i64) {
        if let Some(texture) = self.get_texture(id) {
            texture.mark_new_frame_available();
        }
    }

    /// Register (or move to the back of the notification order) a weakly held listener.
    pub fn register_context_listener(&self, id: ListenerId, listener: Weak<dyn ContextListener>) {
        let mut state = self.state.lock();
        let order = state.next_order;
        state.next_order += 1;
        if let Some(old) = state.listener_order.insert(id, order) {
            state.listeners.remove(&old);
        }
        state.listeners.insert(order, (id, listener));
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn unregister_context_listener(&self, id: ListenerId) {
        let mut state = self.state.lock();
        if let Some(order) = state.listener_order.remove(&id) {
            state.listeners.remove(&order);
        }
    }

    /// Number of registered listeners, including ones not yet pruned.
    pub fn context_listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }

    /// Broadcast GPU-context creation to textures, then listeners in order.
    pub fn on_gr_context_created(&self) {
        let (textures, listeners) = self.snapshot();
        tracing::debug!(
            textures = textures.len(),
            listeners = listeners.len(),
            "gpu context created"
        );
        for texture in &textures {
            texture.on_gr_context_created();
        }
        for listener in &listeners {
            listener.on_gr_context_created();
        }
    }

    /// Broadcast GPU-context destruction to textures, then listeners in order.
    pub fn on_gr_context_destroyed(&self) {
        let (textures, listeners) = self.snapshot();
        tracing::debug!(
            textures = textures.len(),
            listeners = listeners.len(),
            "gpu context destroyed"
        );
        for texture in &textures {
            texture.on_gr_context_destroyed();
        }
        for listener in &listeners {
            listener.on_gr_context_destroyed();
        }
    }

    /// Clone out the live textures and listeners, pruning expired listeners.
    fn snapshot(&self) -> (Vec<Arc<dyn Texture>>, Vec<Arc<dyn ContextListener>>) {
        let mut state = self.state.lock();
        let textures = state.textures.values().cloned().collect();

        let mut live = Vec::with_capacity(state.listeners.len());
        let mut expired = Vec::new();
        for (&order, (id, weak)) in &state.listeners {
            match weak.upgrade() {
                Some(listener) => live.push(listener),
                None => expired.push((order, *id)),
            }
        }
        for (order, id) in expired {
            state.listeners.remove(&order);
            if state.listener_order.get(&id) == Some(&order) {
                state.listener_order.remove(&id);
            }
        }
        (textures, live)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/texture/registry.rs"]
mod tests;
