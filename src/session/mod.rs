//! Render sessions
//!
//! A [`RenderSession`] binds one tree to one output surface for its whole
//! lifetime. It owns the [`Root`], exposes the derived views a
//! synchronization layer reads, dispatches change notifications and holds the
//! [`Handoff`] for the surface's resource.
//!
//! # Example
//!
//! ```ignore
//! let session = RenderSession::new(channel);
//! session.on_change(|| println!("tree changed"));
//!
//! session.commit(|batch| batch.append_child_to_container(Node::message("count: 0")))?;
//! assert_eq!(session.contents(), ["count: 0"]);
//! ```

mod commit;
mod config;
mod current;

pub use commit::Commit;
pub use config::RenderConfig;
pub use current::ActiveGuard;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::attr::{Attrs, Emoji};
use crate::error::RenderResult;
use crate::handoff::{Handoff, ResourceFuture};
use crate::mutation;
use crate::node::{Node, Root};
use crate::payload::{Draft, EmbedPayload};

// =============================================================================
// Surface
// =============================================================================

/// Output environment a session renders into, such as a chat channel.
pub trait Surface: Send + Sync + 'static {
    /// Artifact created on the surface the first time the tree is sent
    type Resource: Clone + Send + Sync + 'static;
}

// =============================================================================
// Listeners
// =============================================================================

/// Handle returned by [`RenderSession::on_change`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn() + Send + Sync>;

// =============================================================================
// RenderSession
// =============================================================================

/// Per-surface context owning one tree and its change and resource lifecycle.
///
/// Sessions are always held in an [`Arc`]. The tree is locked for the length
/// of a batch: calling a derived view from inside a batch on the same thread
/// deadlocks, read [`Commit::root`] instead.
pub struct RenderSession<S: Surface> {
    surface: S,
    config: RenderConfig,
    root: Mutex<Root>,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
    handoff: Handoff<S::Resource>,
    this: Weak<Self>,
}

impl<S: Surface> RenderSession<S> {
    /// Session with the default configuration
    pub fn new(surface: S) -> Arc<Self> {
        Self::with_config(surface, RenderConfig::DEFAULT)
    }

    pub fn with_config(surface: S, config: RenderConfig) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            surface,
            config,
            root: Mutex::new(Root::new()),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(0),
            handoff: Handoff::new(),
            this: this.clone(),
        })
    }

    #[inline]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived views (recomputed on every call)
    // ─────────────────────────────────────────────────────────────────────────

    /// Text of every message block, in order
    pub fn contents(&self) -> Vec<String> {
        self.root.lock().contents()
    }

    /// Folded payload of every embed, in order
    pub fn embeds(&self) -> Vec<EmbedPayload> {
        self.root.lock().embed_payloads()
    }

    /// Emoji of every reaction, in order
    pub fn reactions(&self) -> Vec<Emoji> {
        self.root.lock().reaction_list()
    }

    /// Outbound message built from the current tree
    pub fn draft(&self) -> Draft {
        Draft::from_root(&self.root.lock(), &self.config)
    }

    /// Read the tree outside of a batch
    pub fn with_root<T>(&self, f: impl FnOnce(&Root) -> T) -> T {
        f(&self.root.lock())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Change notification
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a listener, called once per batch that changed the tree.
    ///
    /// Listeners run synchronously in registration order and receive nothing;
    /// they re-read the views they need.
    pub fn on_change(&self, listener: impl Fn() + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    /// Unregister a listener; returns whether it was registered
    pub fn off_change(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        listeners.len() != before
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Run every listener registered when dispatch starts.
    fn notify(&self) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        debug!(listeners = listeners.len(), "dispatching change");
        for listener in listeners {
            listener();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Resource handoff
    // ─────────────────────────────────────────────────────────────────────────

    /// The surface resource, if already created
    pub fn resource(&self) -> Option<&S::Resource> {
        self.handoff.current()
    }

    /// Hand the created resource back; only the first call has an effect.
    pub fn provide_resource(&self, resource: S::Resource) -> bool {
        let provided = self.handoff.provide(resource);
        if provided {
            debug!("resource provided");
        } else {
            warn!("resource already provided, ignoring");
        }
        provided
    }

    /// Wait for the surface resource
    pub fn wait_for_resource(&self) -> ResourceFuture<S::Resource> {
        self.handoff.wait()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutation entry points
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a detached node from a host tag, resolved through the config
    pub fn create_instance(&self, tag: &str, attrs: &Attrs) -> RenderResult<Node> {
        let kind = self.config.resolve_tag(tag)?;
        mutation::create_instance(kind, attrs)
    }

    /// Bind this session as the active one on this thread until the guard drops
    pub fn enter(&self) -> ActiveGuard {
        let binding = self.this.upgrade().map(|this| this as Arc<dyn std::any::Any + Send + Sync>);
        current::activate(binding)
    }

    /// The session bound on this thread, if it is a `RenderSession<S>`
    pub fn current() -> Option<Arc<Self>> {
        current::current::<Self>()
    }

    /// Open a batch: lock the tree, snapshot it and bind this session.
    ///
    /// The binding is made once the lock is held, so a thread waiting on
    /// another thread's batch is not yet inside this session.
    pub fn begin_commit(&self) -> Commit<'_, S> {
        let root = self.root.lock();
        let active = self.enter();
        let snapshot = root.clone();
        Commit {
            session: self,
            root,
            snapshot,
            _active: active,
        }
    }

    /// Run `f` as one batch.
    ///
    /// On error the batch is aborted: no notification fires and the operations
    /// that already succeeded are kept.
    pub fn commit<T>(&self, f: impl FnOnce(&mut Commit<'_, S>) -> RenderResult<T>) -> RenderResult<T> {
        let mut batch = self.begin_commit();
        match f(&mut batch) {
            Ok(value) => {
                batch.end_commit();
                Ok(value)
            }
            Err(err) => {
                warn!(error = %err, "batch aborted");
                Err(err)
            }
        }
    }
}

impl<S: Surface + std::fmt::Debug> std::fmt::Debug for RenderSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("surface", &self.surface)
            .field("config", &self.config)
            .field("listeners", &self.listeners.lock().len())
            .field("provided", &self.handoff.is_provided())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::attr::{AttrKey, AttrsExt};
    use crate::error::RenderError;
    use crate::node::{NodeKind, ParentNode};
    use futures_util::FutureExt;

    #[derive(Debug)]
    struct Channel;

    impl Surface for Channel {
        type Resource = String;
    }

    static_assertions::assert_impl_all!(RenderSession<Channel>: Send, Sync);

    #[test]
    fn test_listeners_run_in_order() {
        let session = RenderSession::new(Channel);
        let log = Arc::new(Mutex::new(Vec::new()));
        for n in 0..3 {
            let log = Arc::clone(&log);
            session.on_change(move || log.lock().push(n));
        }
        session.commit(|batch| batch.append_child_to_container(Node::message("x"))).unwrap();
        assert_eq!(*log.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_off_change() {
        let session = RenderSession::new(Channel);
        let count = Arc::new(AtomicUsize::new(0));
        let hits = Arc::clone(&count);
        let id = session.on_change(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        assert!(session.off_change(id));
        assert!(!session.off_change(id));
        session.commit(|batch| batch.append_child_to_container(Node::message("x"))).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_listener_registered_during_dispatch_waits_for_next_batch() {
        let session = RenderSession::new(Channel);
        let late_hits = Arc::new(AtomicUsize::new(0));
        {
            let weak = Arc::downgrade(&session);
            let late_hits = Arc::clone(&late_hits);
            let registered = AtomicUsize::new(0);
            session.on_change(move || {
                if registered.fetch_add(1, Ordering::SeqCst) > 0 {
                    return;
                }
                if let Some(session) = weak.upgrade() {
                    let late_hits = Arc::clone(&late_hits);
                    session.on_change(move || {
                        late_hits.fetch_add(1, Ordering::SeqCst);
                    });
                }
            });
        }

        session.commit(|batch| batch.append_child_to_container(Node::message("1"))).unwrap();
        assert_eq!(late_hits.load(Ordering::SeqCst), 0);
        session.commit(|batch| batch.append_child_to_container(Node::message("2"))).unwrap();
        assert_eq!(late_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listeners_may_read_views() {
        let session = RenderSession::new(Channel);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let weak = Arc::downgrade(&session);
        let sink = Arc::clone(&seen);
        session.on_change(move || {
            if let Some(session) = weak.upgrade() {
                sink.lock().push(session.draft().content);
            }
        });
        session.commit(|batch| batch.append_child_to_container(Node::message("hello"))).unwrap();
        assert_eq!(*seen.lock(), vec!["hello".to_string()]);
    }

    #[test]
    fn test_create_instance_resolves_tags() {
        let config = RenderConfig::DEFAULT.with_tag_prefix("gungnir-");
        let session = RenderSession::with_config(Channel, config);
        let mut attrs = Attrs::new();
        attrs.set_attr(AttrKey::Emoji, "🎉");
        let node = session.create_instance("gungnir-reaction", &attrs).unwrap();
        assert_eq!(node.kind(), NodeKind::Reaction);

        let err = session.create_instance("gungnir-root", &Attrs::new()).unwrap_err();
        assert!(matches!(err, RenderError::NotCreatable(NodeKind::Root)));
    }

    #[test]
    fn test_resource_handoff() {
        let session = RenderSession::new(Channel);
        let waiter = session.wait_for_resource();
        assert!(session.resource().is_none());
        assert!(session.provide_resource("R1".into()));
        assert!(!session.provide_resource("R2".into()));
        assert_eq!(session.resource().map(String::as_str), Some("R1"));
        assert_eq!(waiter.now_or_never().unwrap().unwrap(), "R1");
        assert_eq!(session.wait_for_resource().now_or_never().unwrap().unwrap(), "R1");
    }

    #[test]
    fn test_batches_on_two_threads_bind_in_turn() {
        let session = RenderSession::new(Channel);
        let (opened_tx, opened_rx) = std::sync::mpsc::channel();

        let mut batch = session.begin_commit();
        let worker = {
            let session = Arc::clone(&session);
            std::thread::spawn(move || {
                opened_tx.send(()).unwrap();
                session
                    .commit(|batch| {
                        let current = RenderSession::<Channel>::current().unwrap();
                        assert!(Arc::ptr_eq(&current, &session));
                        assert_eq!(batch.root().children().len(), 1);
                        batch.append_child_to_container(Node::message("second"))
                    })
                    .unwrap();
                RenderSession::<Channel>::current().is_none()
            })
        };

        opened_rx.recv().unwrap();
        batch.append_child_to_container(Node::message("first")).unwrap();
        assert!(batch.end_commit());
        assert!(worker.join().unwrap());
        assert_eq!(session.contents(), ["first", "second"]);
    }

    #[test]
    fn test_enter_scopes_current() {
        let session = RenderSession::new(Channel);
        {
            let _guard = session.enter();
            let current = RenderSession::<Channel>::current().unwrap();
            assert!(Arc::ptr_eq(&current, &session));
            assert_eq!(*current.config(), RenderConfig::DEFAULT);
        }
        assert!(RenderSession::<Channel>::current().is_none());
    }
}
