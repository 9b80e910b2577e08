//! Bounded message queue
//!
//! A fixed-capacity ring buffer of verified [`Message`]s over a
//! caller-supplied backing store. The receive path is the only producer and
//! the application the only consumer: the producer only moves the write
//! index and the consumer only moves the read index.
//!
//! When the read and write indices meet the queue is either empty or full;
//! the `full` flag alone tells the two apart.
//!
//! Pushing onto a full queue drops the new message. The producer runs in
//! interrupt context and must never wait for the consumer.

use crate::message::Message;

/// Errors returned by the consumer side of the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueueError {
    /// No message is available
    Empty,
}

/// Fixed-capacity FIFO of messages
#[derive(Debug)]
pub struct FrameQueue<'a> {
    slots: &'a mut [Message],
    read_index: usize,
    write_index: usize,
    full: bool,
}

impl<'a> FrameQueue<'a> {
    /// Bind a queue to its backing store
    ///
    /// The capacity is the length of `slots`. Existing slot contents are
    /// ignored; the queue starts empty.
    ///
    /// # Panics
    /// If `slots` is empty. A zero-capacity queue is a programming error.
    pub fn new(slots: &'a mut [Message]) -> Self {
        assert!(!slots.is_empty(), "FrameQueue requires a non-zero capacity");

        Self {
            slots,
            read_index: 0,
            write_index: 0,
            full: false,
        }
    }

    /// Maximum number of queued messages
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Check whether no message is queued
    pub fn is_empty(&self) -> bool {
        !self.full && self.read_index == self.write_index
    }

    /// Check whether a message is ready to pop
    pub fn is_available(&self) -> bool {
        !self.is_empty()
    }

    /// Check whether the next push will be dropped
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Number of queued messages
    pub fn used_space(&self) -> usize {
        if self.full {
            self.capacity()
        } else if self.read_index <= self.write_index {
            self.write_index - self.read_index
        } else {
            self.capacity() - (self.read_index - self.write_index)
        }
    }

    /// Number of messages that can still be pushed
    pub fn free_space(&self) -> usize {
        self.capacity() - self.used_space()
    }

    /// Copy a message into the queue
    ///
    /// Returns `false` if the queue was full and the message was dropped.
    pub fn push(&mut self, message: &Message) -> bool {
        self.push_with(|slot| slot.clone_from(message))
    }

    /// Fill the next free slot in place
    ///
    /// `fill` receives the slot's previous contents and must overwrite every
    /// field it cares about. It is not called when the queue is full.
    /// Returns `false` if the queue was full.
    pub fn push_with<F>(&mut self, fill: F) -> bool
    where
        F: FnOnce(&mut Message),
    {
        if self.full {
            return false;
        }

        fill(&mut self.slots[self.write_index]);

        self.write_index = (self.write_index + 1) % self.capacity();
        self.full = self.read_index == self.write_index;
        true
    }

    /// Take the oldest message out of the queue
    pub fn pop(&mut self) -> Result<Message, QueueError> {
        if self.is_empty() {
            return Err(QueueError::Empty);
        }

        let message = core::mem::take(&mut self.slots[self.read_index]);
        self.advance_read();
        Ok(message)
    }

    /// Copy the oldest message into `out` and remove it from the queue
    ///
    /// `out` is left untouched on error.
    pub fn pop_into(&mut self, out: &mut Message) -> Result<(), QueueError> {
        if self.is_empty() {
            return Err(QueueError::Empty);
        }

        out.clone_from(&self.slots[self.read_index]);
        self.advance_read();
        Ok(())
    }

    /// Oldest message, without removing it
    pub fn peek(&self) -> Option<&Message> {
        if self.is_empty() {
            None
        } else {
            Some(&self.slots[self.read_index])
        }
    }

    /// Discard every queued message
    pub fn clear(&mut self) {
        while self.pop().is_ok() {}
    }

    fn advance_read(&mut self) {
        self.read_index = (self.read_index + 1) % self.capacity();
        self.full = false;
    }
}
