use std::collections::VecDeque;

use log::trace;

use crate::common::{error::GameError, message::Notification};

/// Notifications received but not yet applied, for one room.
///
/// The transport pushes whenever a message lands; the tick loop pops at most
/// one per tick.
#[derive(Clone, Debug, Default)]
pub struct Inbox {
    room_id: String,
    queue: VecDeque<Notification>,
}

impl Inbox {
    pub fn new(room_id: impl Into<String>) -> Self {
        Self { room_id: room_id.into(), queue: VecDeque::new() }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Parse and enqueue a raw server message.
    pub fn push_raw(&mut self, raw: &str) -> Result<(), GameError> {
        let notification = Notification::parse(raw)?;
        trace!("queued {notification:?}");
        self.queue.push_back(notification);
        Ok(())
    }

    pub fn push(&mut self, notification: Notification) {
        self.queue.push_back(notification);
    }

    /// Oldest pending notification. One addressed to another room is dropped
    /// and reported.
    pub fn pop(&mut self) -> Result<Option<Notification>, GameError> {
        let Some(notification) = self.queue.pop_front() else { return Ok(None) };
        if notification.room_id() != self.room_id {
            return Err(GameError::WrongRoom {
                expected: self.room_id.clone(),
                received: notification.room_id().to_owned(),
            });
        }
        Ok(Some(notification))
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
