use super::*;
use crate::foundation::core::Rect;
use crate::paint::canvas::Canvas;

type Log = Arc<Mutex<Vec<String>>>;

struct Recorder {
    name: &'static str,
    log: Log,
}

impl Recorder {
    fn new(name: &'static str, log: &Log) -> Arc<Self> {
        Arc::new(Self {
            name,
            log: Arc::clone(log),
        })
    }
}

impl ContextListener for Recorder {
    fn on_gr_context_created(&self) {
        self.log.lock().push(format!("{}:created", self.name));
    }

    fn on_gr_context_destroyed(&self) {
        self.log.lock().push(format!("{}:destroyed", self.name));
    }
}

struct FakeTexture {
    id: i64,
    log: Log,
}

impl ContextListener for FakeTexture {
    fn on_gr_context_created(&self) {
        self.log.lock().push(format!("tex{}:created", self.id));
    }

    fn on_gr_context_destroyed(&self) {
        self.log.lock().push(format!("tex{}:destroyed", self.id));
    }
}

impl Texture for FakeTexture {
    fn id(&self) -> i64 {
        self.id
    }

    fn paint(&self, _canvas: &mut dyn Canvas, _bounds: Rect, _freeze: bool) {}

    fn mark_new_frame_available(&self) {
        self.log.lock().push(format!("tex{}:frame", self.id));
    }

    fn on_texture_unregistered(&self) {
        self.log.lock().push(format!("tex{}:unregistered", self.id));
    }
}

fn weak(listener: &Arc<Recorder>) -> Weak<dyn ContextListener> {
    let strong: Arc<dyn ContextListener> = Arc::clone(listener) as _;
    Arc::downgrade(&strong)
}

fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.lock())
}

#[test]
fn register_get_and_replace_textures() {
    let log = Log::default();
    let registry = TextureRegistry::new();
    assert!(registry.get_texture(1).is_none());

    registry.register_texture(Arc::new(FakeTexture {
        id: 1,
        log: Arc::clone(&log),
    }));
    assert_eq!(registry.texture_count(), 1);
    assert_eq!(registry.get_texture(1).map(|t| t.id()), Some(1));

    let replacement: Arc<dyn Texture> = Arc::new(FakeTexture {
        id: 1,
        log: Arc::clone(&log),
    });
    registry.register_texture(Arc::clone(&replacement));
    assert_eq!(registry.texture_count(), 1);
    let found = registry.get_texture(1).unwrap();
    assert!(Arc::ptr_eq(&found, &replacement));
}

#[test]
fn unregister_runs_hook_once_and_ignores_unknown_ids() {
    let log = Log::default();
    let registry = TextureRegistry::new();
    registry.register_texture(Arc::new(FakeTexture {
        id: 4,
        log: Arc::clone(&log),
    }));
    registry.unregister_texture(4);
    registry.unregister_texture(4);
    registry.unregister_texture(99);
    assert_eq!(take(&log), vec!["tex4:unregistered"]);
    assert_eq!(registry.texture_count(), 0);
}

#[test]
fn frame_available_reaches_the_texture() {
    let log = Log::default();
    let registry = TextureRegistry::new();
    registry.register_texture(Arc::new(FakeTexture {
        id: 2,
        log: Arc::clone(&log),
    }));
    registry.on_texture_frame_available(2);
    registry.on_texture_frame_available(3);
    assert_eq!(take(&log), vec!["tex2:frame"]);
}

#[test]
fn textures_are_notified_before_listeners() {
    let log = Log::default();
    let registry = TextureRegistry::new();
    let a = Recorder::new("a", &log);
    registry.register_context_listener(ListenerId(1), weak(&a));
    registry.register_texture(Arc::new(FakeTexture {
        id: 3,
        log: Arc::clone(&log),
    }));

    registry.on_gr_context_created();
    assert_eq!(take(&log), vec!["tex3:created", "a:created"]);
    registry.on_gr_context_destroyed();
    assert_eq!(take(&log), vec!["tex3:destroyed", "a:destroyed"]);
}

#[test]
fn reregistering_moves_listener_to_the_back() {
    let log = Log::default();
    let registry = TextureRegistry::new();
    let a = Recorder::new("a", &log);
    let b = Recorder::new("b", &log);
    registry.register_context_listener(ListenerId(1), weak(&a));
    registry.register_context_listener(ListenerId(2), weak(&b));
    registry.register_context_listener(ListenerId(1), weak(&a));
    assert_eq!(registry.context_listener_count(), 2);

    registry.on_gr_context_destroyed();
    assert_eq!(take(&log), vec!["b:destroyed", "a:destroyed"]);
}

#[test]
fn dropped_listeners_are_skipped_and_pruned() {
    let log = Log::default();
    let registry = TextureRegistry::new();
    let a = Recorder::new("a", &log);
    let b = Recorder::new("b", &log);
    registry.register_context_listener(ListenerId(1), weak(&a));
    registry.register_context_listener(ListenerId(2), weak(&b));
    drop(a);

    registry.on_gr_context_created();
    assert_eq!(take(&log), vec!["b:created"]);
    assert_eq!(registry.context_listener_count(), 1);
}

#[test]
fn unregistered_listener_is_not_notified() {
    let log = Log::default();
    let registry = TextureRegistry::new();
    let a = Recorder::new("a", &log);
    registry.register_context_listener(ListenerId(1), weak(&a));
    registry.unregister_context_listener(ListenerId(1));
    registry.unregister_context_listener(ListenerId(42));
    registry.on_gr_context_created();
    assert!(take(&log).is_empty());
    assert_eq!(registry.context_listener_count(), 0);
}

struct SelfRemoving {
    id: ListenerId,
    registry: Arc<TextureRegistry>,
    log: Log,
}

impl ContextListener for SelfRemoving {
    fn on_gr_context_created(&self) {}

    fn on_gr_context_destroyed(&self) {
        self.registry.unregister_context_listener(self.id);
        self.log.lock().push("self:destroyed".to_owned());
    }
}

#[test]
fn listener_may_call_back_into_the_registry() {
    let log = Log::default();
    let registry = Arc::new(TextureRegistry::new());
    let listener: Arc<dyn ContextListener> = Arc::new(SelfRemoving {
        id: ListenerId(7),
        registry: Arc::clone(&registry),
        log: Arc::clone(&log),
    });
    registry.register_context_listener(ListenerId(7), Arc::downgrade(&listener));

    registry.on_gr_context_destroyed();
    assert_eq!(take(&log), vec!["self:destroyed"]);
    assert_eq!(registry.context_listener_count(), 0);

    registry.on_gr_context_destroyed();
    assert!(take(&log).is_empty());
}

#[test]
fn unique_listener_ids_differ() {
    assert_ne!(ListenerId::unique(), ListenerId::unique());
}
