//! Interrupt hand-off
//!
//! [`SharedLink`] puts a [`Link`] behind a critical-section mutex so the
//! receive interrupt and the application can both reach it. Each access
//! holds the critical section only for the duration of one operation: one
//! byte fed, one message popped.
//!
//! ```ignore
//! static SLOTS: StaticCell<[Message; 8]> = StaticCell::new();
//! static LINK: StaticCell<SharedLink<'static>> = StaticCell::new();
//!
//! let slots = SLOTS.init([Message::EMPTY; 8]);
//! let link = LINK.init(SharedLink::new(Link::new(&config, slots)));
//!
//! // in the UART RX interrupt
//! link.on_byte_received(byte);
//!
//! // in the application
//! if let Ok(message) = link.pop_message() { /* ... */ }
//! ```

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use framelink_protocol::{FeedStatus, Message, Preamble, QueueError};

use crate::link::{Link, LinkStats};

/// A [`Link`] shared between the receive interrupt and the application
pub struct SharedLink<'a> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Link<'a>>>,
}

impl<'a> SharedLink<'a> {
    /// Share a link
    pub fn new(link: Link<'a>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(link)),
        }
    }

    /// Run `f` with exclusive access to the link
    ///
    /// # Panics
    /// If called from inside another `lock` closure on the same link.
    pub fn lock<R>(&self, f: impl FnOnce(&mut Link<'a>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Receive interrupt entry point: feed one byte
    pub fn on_byte_received(&self, byte: u8) -> FeedStatus {
        self.lock(|link| link.feed(byte))
    }

    /// Advance the idle timer, see [`Link::tick`]
    pub fn tick(&self, elapsed_ms: u32) -> bool {
        self.lock(|link| link.tick(elapsed_ms))
    }

    /// Check whether a message is ready to pop
    pub fn is_message_available(&self) -> bool {
        self.lock(|link| link.is_message_available())
    }

    /// Take the oldest message
    pub fn pop_message(&self) -> Result<Message, QueueError> {
        self.lock(|link| link.pop_message())
    }

    /// Copy the oldest message into `out`
    pub fn pop_message_into(&self, out: &mut Message) -> Result<(), QueueError> {
        self.lock(|link| link.pop_message_into(out))
    }

    /// Change the preamble to look for
    pub fn set_preamble(&self, preamble: Preamble) {
        self.lock(|link| link.set_preamble(preamble));
    }

    /// Discard every queued message
    pub fn clear(&self) {
        self.lock(|link| link.clear());
    }

    /// Queue capacity
    pub fn capacity(&self) -> usize {
        self.lock(|link| link.capacity())
    }

    /// Number of queued messages
    pub fn used_space(&self) -> usize {
        self.lock(|link| link.used_space())
    }

    /// Number of messages that can still be queued
    pub fn free_space(&self) -> usize {
        self.lock(|link| link.free_space())
    }

    /// Receive statistics so far
    pub fn stats(&self) -> LinkStats {
        self.lock(|link| link.stats())
    }

    /// Take the link back
    pub fn into_inner(self) -> Link<'a> {
        self.inner.into_inner().into_inner()
    }
}
