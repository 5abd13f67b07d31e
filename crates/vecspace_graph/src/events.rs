// SPDX-License-Identifier: MIT OR Apache-2.0
//! Change notifications for collaborators observing a context.
//!
//! Subscribers are plain callbacks held by the [`Context`](crate::Context).
//! They run synchronously, in registration order, before the mutating call
//! that caused the event returns.

use crate::connection::ConnectionId;
use crate::node::NodeId;
use crate::port::{PortDirection, PortId};
use crate::value::Value;

/// Identifier returned by [`Context::subscribe`](crate::Context::subscribe)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Something that changed in a context
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    /// A node entered the context
    NodeAdded(NodeId),
    /// A node left the context
    NodeRemoved(NodeId),
    /// A connection was registered
    ConnectionAdded(ConnectionId),
    /// A connection was destroyed
    ConnectionRemoved(ConnectionId),
    /// A port was written
    ValueChanged {
        /// Owning node
        node: NodeId,
        /// Written port
        port: PortId,
        /// Port direction
        direction: PortDirection,
        /// New value
        value: Value,
    },
}

impl GraphEvent {
    /// Node this event belongs to, if any
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::NodeAdded(id) | Self::NodeRemoved(id) => Some(*id),
            Self::ValueChanged { node, .. } => Some(*node),
            Self::ConnectionAdded(_) | Self::ConnectionRemoved(_) => None,
        }
    }

    /// Port this event belongs to, if any
    pub fn port(&self) -> Option<PortId> {
        match self {
            Self::ValueChanged { port, .. } => Some(*port),
            _ => None,
        }
    }
}

/// What a subscriber listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionTarget {
    /// Every event
    All,
    /// Events of one node and its ports
    Node(NodeId),
    /// Writes to one port
    Port(PortId),
}

impl SubscriptionTarget {
    fn matches(&self, event: &GraphEvent) -> bool {
        match self {
            Self::All => true,
            Self::Node(id) => event.node() == Some(*id),
            Self::Port(id) => event.port() == Some(*id),
        }
    }
}

type Callback = Box<dyn FnMut(&GraphEvent)>;

struct Subscriber {
    id: SubscriptionId,
    target: SubscriptionTarget,
    callback: Callback,
}

/// Ordered list of subscribers
#[derive(Default)]
pub(crate) struct EventBus {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl EventBus {
    pub(crate) fn subscribe(
        &mut self,
        target: SubscriptionTarget,
        callback: impl FnMut(&GraphEvent) + 'static,
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push(Subscriber {
            id,
            target,
            callback: Box::new(callback),
        });
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Drop subscriptions that can no longer fire
    pub(crate) fn forget_node(&mut self, node: NodeId, ports: &[PortId]) {
        self.subscribers.retain(|s| match s.target {
            SubscriptionTarget::Node(id) => id != node,
            SubscriptionTarget::Port(id) => !ports.contains(&id),
            SubscriptionTarget::All => true,
        });
    }

    pub(crate) fn emit(&mut self, event: &GraphEvent) {
        for subscriber in &mut self.subscribers {
            if subscriber.target.matches(event) {
                (subscriber.callback)(event);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }
}
