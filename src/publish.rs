//! Publication driver
//!
//! Keeps one surface resource in sync with a session's tree: the first draft
//! is sent, the resulting resource handed back to the session, reactions
//! added, and every later change edits the resource in place.
//!
//! Platform clients only implement [`Publish`]. Failures of a single
//! reaction or edit are logged and skipped; they never stop the driver.
//!
//! # Example
//!
//! ```ignore
//! let publication = publish(&session).await?;
//! tokio::spawn(publication.run());
//! ```

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Weak};

use futures_channel::mpsc;
use futures_util::{FutureExt, StreamExt};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::attr::Emoji;
use crate::payload::Draft;
use crate::session::{ListenerId, RenderSession, Surface};

/// A surface that can carry a published draft.
pub trait Publish: Surface {
    /// Error returned by the platform client
    type Error: fmt::Display + Send + 'static;

    /// Post a new message built from `draft`
    fn send(&self, draft: &Draft) -> impl Future<Output = Result<Self::Resource, Self::Error>> + Send;

    /// Replace the content of an already posted message
    fn edit(
        &self,
        resource: &Self::Resource,
        draft: &Draft,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Add one reaction to a posted message
    fn react(
        &self,
        resource: &Self::Resource,
        emoji: &Emoji,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Send the session's current draft and start tracking its changes.
///
/// Fails only if the initial send fails; the session is left without a
/// resource in that case.
pub async fn publish<S: Publish>(session: &Arc<RenderSession<S>>) -> Result<Publication<S>, S::Error> {
    // registered first so changes made while the send is in flight reach the first edit
    let (notify, changes) = mpsc::channel(0);
    let notify = Mutex::new(notify);
    let listener = session.on_change(move || {
        // full means a change is already pending
        let _ = notify.lock().try_send(());
    });

    let draft = session.draft();
    let resource = match session.surface().send(&draft).await {
        Ok(resource) => resource,
        Err(err) => {
            session.off_change(listener);
            return Err(err);
        }
    };
    session.provide_resource(resource.clone());

    for emoji in &draft.reactions {
        if let Err(err) = session.surface().react(&resource, emoji).await {
            warn!(%emoji, error = %err, "failed to add reaction");
        }
    }
    debug!(reactions = draft.reactions.len(), "draft published");

    Ok(Publication {
        session: Arc::downgrade(session),
        resource,
        listener,
        changes,
    })
}

/// A published draft, kept in sync by [`Publication::run`].
///
/// Dropping it unregisters its change listener.
pub struct Publication<S: Publish> {
    session: Weak<RenderSession<S>>,
    resource: S::Resource,
    listener: ListenerId,
    changes: mpsc::Receiver<()>,
}

impl<S: Publish> Publication<S> {
    /// The resource the draft was published as
    pub fn resource(&self) -> &S::Resource {
        &self.resource
    }

    /// Edit the resource after every change until the session is dropped.
    ///
    /// Notifications that pile up while an edit is in flight collapse into
    /// one edit of the latest draft.
    pub async fn run(mut self) {
        while self.changes.next().await.is_some() {
            while let Some(Some(())) = self.changes.next().now_or_never() {}

            let Some(session) = self.session.upgrade() else {
                break;
            };
            let draft = session.draft();
            match session.surface().edit(&self.resource, &draft).await {
                Ok(()) => debug!("publication edited"),
                Err(err) => warn!(error = %err, "failed to edit publication"),
            }
        }
        debug!("session dropped, publication finished");
    }
}

impl<S: Publish> Drop for Publication<S> {
    fn drop(&mut self) {
        if let Some(session) = self.session.upgrade() {
            session.off_change(self.listener);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[derive(Debug)]
    struct Refused(&'static str);

    impl fmt::Display for Refused {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "refused: {}", self.0)
        }
    }

    /// Chat channel double recording every call
    #[derive(Clone, Default)]
    struct Channel {
        log: Arc<Mutex<Vec<String>>>,
        edits: Option<mpsc::UnboundedSender<String>>,
        refuse_send: bool,
    }

    impl Surface for Channel {
        type Resource = u64;
    }

    impl Publish for Channel {
        type Error = Refused;

        async fn send(&self, draft: &Draft) -> Result<u64, Refused> {
            if self.refuse_send {
                return Err(Refused("send"));
            }
            self.log.lock().push(format!("send {}", draft.content));
            Ok(42)
        }

        async fn edit(&self, resource: &u64, draft: &Draft) -> Result<(), Refused> {
            self.log.lock().push(format!("edit {resource} {}", draft.content));
            if let Some(edits) = &self.edits {
                let _ = edits.unbounded_send(draft.content.clone());
            }
            Ok(())
        }

        async fn react(&self, _resource: &u64, emoji: &Emoji) -> Result<(), Refused> {
            self.log.lock().push(format!("react {emoji}"));
            if emoji.as_str() == "bad" {
                return Err(Refused("unknown emoji"));
            }
            Ok(())
        }
    }

    fn seed(session: &RenderSession<Channel>) -> crate::node::NodeId {
        let message = Node::message("count: 0");
        let text_id = message.children()[0].id();
        session
            .commit(|batch| {
                batch.append_child_to_container(message)?;
                batch.append_child_to_container(Node::reaction("👍"))?;
                batch.append_child_to_container(Node::reaction("bad"))?;
                batch.append_child_to_container(Node::reaction("🔥"))
            })
            .unwrap();
        text_id
    }

    #[tokio::test]
    async fn test_publish_sends_and_reacts() {
        let channel = Channel::default();
        let log = Arc::clone(&channel.log);
        let session = RenderSession::new(channel);
        seed(&session);

        let publication = publish(&session).await.unwrap();
        assert_eq!(*publication.resource(), 42);
        assert_eq!(session.resource(), Some(&42));
        // the failing reaction does not stop the following one
        assert_eq!(
            *log.lock(),
            vec!["send count: 0", "react 👍", "react bad", "react 🔥"]
        );
    }

    #[tokio::test]
    async fn test_run_coalesces_changes() {
        let (edits_tx, mut edits) = mpsc::unbounded();
        let channel = Channel {
            edits: Some(edits_tx),
            ..Channel::default()
        };
        let log = Arc::clone(&channel.log);
        let session = RenderSession::new(channel);
        let text_id = seed(&session);

        let publication = publish(&session).await.unwrap();
        let task = tokio::spawn(publication.run());

        // both batches land before the driver gets to run
        session.commit(|batch| batch.commit_text_update(text_id, "count: 1")).unwrap();
        session.commit(|batch| batch.commit_text_update(text_id, "count: 2")).unwrap();
        assert_eq!(edits.next().await.as_deref(), Some("count: 2"));

        session.commit(|batch| batch.commit_text_update(text_id, "count: 3")).unwrap();
        assert_eq!(edits.next().await.as_deref(), Some("count: 3"));

        drop(session);
        task.await.unwrap();
        let edit_calls: Vec<_> = log.lock().iter().filter(|c| c.starts_with("edit")).cloned().collect();
        assert_eq!(edit_calls, vec!["edit 42 count: 2", "edit 42 count: 3"]);
    }

    #[tokio::test]
    async fn test_idle_publication_holds_one_pending_change() {
        let session = RenderSession::new(Channel::default());
        let text_id = seed(&session);
        let mut publication = publish(&session).await.unwrap();

        for n in 1..=10 {
            session
                .commit(|batch| batch.commit_text_update(text_id, format!("count: {n}")))
                .unwrap();
        }
        let mut pending = 0;
        while let Some(Some(())) = publication.changes.next().now_or_never() {
            pending += 1;
        }
        assert_eq!(pending, 1);
    }

    #[tokio::test]
    async fn test_failed_send_leaves_no_listener() {
        let channel = Channel {
            refuse_send: true,
            ..Channel::default()
        };
        let session = RenderSession::new(channel);
        seed(&session);

        let err = publish(&session).await.err().unwrap();
        assert_eq!(err.to_string(), "refused: send");
        assert!(session.resource().is_none());
        assert_eq!(session.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_dropping_publication_unregisters() {
        let session = RenderSession::new(Channel::default());
        seed(&session);
        let publication = publish(&session).await.unwrap();
        assert_eq!(session.listener_count(), 1);
        drop(publication);
        assert_eq!(session.listener_count(), 0);
    }
}
