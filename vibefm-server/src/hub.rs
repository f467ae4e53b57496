use std::{
    collections::VecDeque,
    pin::Pin,
    sync::{Arc, Weak},
    task::{Context, Poll, Waker},
    thread::{self, JoinHandle},
};

use crossbeam::{
    atomic::AtomicCell,
    channel::{bounded, select, Receiver, Sender},
};
use futures_util::Stream;
use log::{debug, info};
use parking_lot::Mutex;
use vibefm_collab::{EventReceiver, RoomId, UserId};

use crate::events::{Dispatch, ServerEvent};

type SubscriptionId = u64;

/// Fans out room events to every connected event stream and socket
pub struct EventHub {
    me: Weak<Self>,
    next_id: AtomicCell<SubscriptionId>,
    subscriptions: Mutex<Vec<Subscription>>,
    /// Never sent on, dropping the hub disconnects it and stops the dispatcher
    _shutdown: Sender<()>,
    shutdown_signal: Receiver<()>,
}

struct Subscription {
    id: SubscriptionId,
    room_id: RoomId,
    user_id: Option<UserId>,
    inbox: Arc<Mutex<Inbox>>,
}

#[derive(Default)]
struct Inbox {
    events: VecDeque<ServerEvent>,
    waker: Option<Waker>,
}

/// A stream of the events of one room. Unsubscribes when dropped.
pub struct SubscriptionHandle {
    id: SubscriptionId,
    /// A reference to [Subscription]'s inbox
    inbox: Arc<Mutex<Inbox>>,
    /// Required to remove the subscription when dropped
    hub: Weak<EventHub>,
}

impl EventHub {
    pub fn new() -> Arc<Self> {
        let (shutdown, shutdown_signal) = bounded(0);

        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            next_id: AtomicCell::new(1),
            subscriptions: Default::default(),
            _shutdown: shutdown,
            shutdown_signal,
        })
    }

    /// Delivers an event to every subscriber of its room, except the user that caused it
    pub fn broadcast(&self, dispatch: Dispatch) {
        let subscriptions = self.subscriptions.lock();

        let recipients = subscriptions.iter().filter(|s| {
            s.room_id == dispatch.room_id
                && (s.user_id.is_none() || s.user_id != dispatch.except)
        });

        for subscription in recipients {
            subscription.send(dispatch.event.clone())
        }
    }

    /// Subscribes to a room. Events caused by `user_id` are not delivered.
    pub fn subscribe(&self, room_id: &str, user_id: Option<UserId>) -> SubscriptionHandle {
        let subscription = Subscription {
            id: self.next_id.fetch_add(1),
            room_id: room_id.to_string(),
            user_id,
            inbox: Default::default(),
        };

        let handle = SubscriptionHandle {
            id: subscription.id,
            inbox: subscription.inbox.clone(),
            hub: self.me.clone(),
        };

        debug!("Subscription {} opened for room {}", subscription.id, room_id);

        self.subscriptions.lock().push(subscription);
        handle
    }

    /// How many subscribers a room has
    pub fn subscriber_count(&self, room_id: &str) -> usize {
        self.subscriptions
            .lock()
            .iter()
            .filter(|s| s.room_id == room_id)
            .count()
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        debug!("Subscription {} closed", id);
        self.subscriptions.lock().retain(|s| s.id != id)
    }
}

impl Subscription {
    fn send(&self, event: ServerEvent) {
        let mut inbox = self.inbox.lock();
        inbox.events.push_back(event);

        if let Some(waker) = inbox.waker.take() {
            waker.wake()
        }
    }
}

impl Stream for SubscriptionHandle {
    type Item = ServerEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut inbox = self.inbox.lock();

        if let Some(event) = inbox.events.pop_front() {
            return Poll::Ready(Some(event));
        }

        inbox.waker = Some(cx.waker().clone());
        Poll::Pending
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.unsubscribe(self.id)
        }
    }
}

/// Forwards collab events to the hub on a dedicated thread, until the hub is dropped
pub fn spawn_dispatcher(hub: &Arc<EventHub>, receiver: EventReceiver) -> JoinHandle<()> {
    let shutdown_signal = hub.shutdown_signal.clone();
    let hub = Arc::downgrade(hub);

    let run = move || {
        loop {
            select! {
                recv(receiver) -> event => {
                    let (Ok(event), Some(hub)) = (event, hub.upgrade()) else {
                        break;
                    };

                    hub.broadcast(event.into());
                }
                recv(shutdown_signal) -> _ => break,
            }
        }

        info!("Event dispatcher stopped");
    };

    thread::spawn(run)
}

#[cfg(test)]
mod test {
    use futures_util::{FutureExt, StreamExt};
    use vibefm_collab::Collab;

    use super::{spawn_dispatcher, EventHub};
    use crate::events::{Dispatch, ServerEvent};

    fn dispatch(room_id: &str, except: Option<&str>, votes: usize) -> Dispatch {
        Dispatch {
            room_id: room_id.to_string(),
            except: except.map(str::to_string),
            event: ServerEvent::SkipVoteUpdate { votes, required: 2 },
        }
    }

    fn votes(event: Option<ServerEvent>) -> Option<usize> {
        match event {
            Some(ServerEvent::SkipVoteUpdate { votes, .. }) => Some(votes),
            _ => None,
        }
    }

    #[test]
    fn events_only_reach_their_room_in_order() {
        let hub = EventHub::new();
        let mut lofi = hub.subscribe("lofi", None);
        let mut jazz = hub.subscribe("jazz", None);

        hub.broadcast(dispatch("lofi", None, 1));
        hub.broadcast(dispatch("lofi", None, 2));

        assert_eq!(votes(lofi.next().now_or_never().flatten()), Some(1));
        assert_eq!(votes(lofi.next().now_or_never().flatten()), Some(2));
        assert!(jazz.next().now_or_never().is_none());
    }

    #[test]
    fn the_cause_of_an_event_is_skipped() {
        let hub = EventHub::new();
        let mut john = hub.subscribe("lofi", Some("john".to_string()));
        let mut mary = hub.subscribe("lofi", Some("mary".to_string()));

        hub.broadcast(dispatch("lofi", Some("john"), 1));

        assert!(john.next().now_or_never().is_none());
        assert_eq!(votes(mary.next().now_or_never().flatten()), Some(1));
    }

    #[test]
    fn dropping_a_handle_unsubscribes() {
        let hub = EventHub::new();
        let handle = hub.subscribe("lofi", None);

        assert_eq!(hub.subscriber_count("lofi"), 1);
        drop(handle);
        assert_eq!(hub.subscriber_count("lofi"), 0);
    }

    #[tokio::test]
    async fn pending_streams_are_woken() {
        let hub = EventHub::new();
        let mut handle = hub.subscribe("lofi", None);

        let sender = hub.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            sender.broadcast(dispatch("lofi", None, 3));
        });

        assert_eq!(votes(handle.next().await), Some(3));
    }

    #[tokio::test]
    async fn dispatcher_forwards_until_the_hub_is_dropped() {
        let collab = Collab::default();
        let hub = EventHub::new();
        let dispatcher = spawn_dispatcher(&hub, collab.events());

        let mut events = hub.subscribe("lofi", None);
        collab.rooms.get_or_create("lofi").unwrap().join("john").unwrap();

        let received = events.next().await;
        assert!(matches!(received, Some(ServerEvent::UserJoined { .. })));

        drop(events);
        drop(hub);

        dispatcher.join().unwrap();
        assert!(!collab.rooms.list_all().is_empty());
    }
}
