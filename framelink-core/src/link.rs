//! Receive-side link context
//!
//! A [`Link`] owns everything the receive path mutates: the frame parser,
//! the message queue and the link statistics. The receive interrupt gets
//! exclusive access for one byte at a time (see [`crate::shared`]); the
//! application pops messages between interrupts.

use framelink_hal::UartRx;
use framelink_protocol::{
    FeedStatus, FrameParser, FrameQueue, Message, ParseState, Preamble, QueueError,
};

use crate::config::LinkConfig;

/// Receive statistics
///
/// Counters saturate instead of wrapping. None of these conditions is an
/// error; they are here so the application can tell a quiet link from a
/// noisy one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Frames that passed their checksum, queued or not
    pub frames_received: u32,
    /// Frames discarded for a checksum mismatch
    pub checksum_errors: u32,
    /// Verified frames dropped because the queue was full
    pub dropped_full: u32,
    /// Partial frames abandoned by the idle timeout
    pub idle_resets: u32,
}

impl LinkStats {
    fn record(&mut self, status: FeedStatus) {
        match status {
            FeedStatus::Pending => {}
            FeedStatus::Delivered => {
                self.frames_received = self.frames_received.saturating_add(1);
            }
            FeedStatus::Dropped => {
                self.frames_received = self.frames_received.saturating_add(1);
                self.dropped_full = self.dropped_full.saturating_add(1);
            }
            FeedStatus::Rejected => {
                self.checksum_errors = self.checksum_errors.saturating_add(1);
            }
        }
    }
}

/// Receive context of one serial link
#[derive(Debug)]
pub struct Link<'a> {
    parser: FrameParser,
    queue: FrameQueue<'a>,
    stats: LinkStats,
    idle_timeout_ms: Option<u32>,
    /// Time since the last byte while a frame is in progress
    idle_ms: u32,
}

impl<'a> Link<'a> {
    /// Create a link over a caller-owned queue backing store
    ///
    /// # Panics
    /// If `slots` is empty.
    pub fn new(config: &LinkConfig, slots: &'a mut [Message]) -> Self {
        let queue = FrameQueue::new(slots);
        info!(
            "Link created: capacity {}, preamble {=[u8]:#x}",
            queue.capacity(),
            &config.preamble.as_bytes()[..]
        );

        Self {
            parser: FrameParser::new(config.preamble),
            queue,
            stats: LinkStats::default(),
            idle_timeout_ms: config.idle_timeout_ms,
            idle_ms: 0,
        }
    }

    /// Handle one received byte
    ///
    /// Call once per byte, in arrival order, from the receive interrupt.
    /// Never blocks and never fails.
    pub fn feed(&mut self, byte: u8) -> FeedStatus {
        self.idle_ms = 0;
        let status = self.parser.feed(byte, &mut self.queue);
        if status == FeedStatus::Rejected {
            debug!("Frame discarded: checksum mismatch");
        }
        self.stats.record(status);
        status
    }

    /// Handle a run of received bytes
    ///
    /// Returns the number of messages queued.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> usize {
        let mut delivered = 0;
        for &byte in bytes {
            if self.feed(byte) == FeedStatus::Delivered {
                delivered += 1;
            }
        }
        delivered
    }

    /// Drain a polled receiver into the parser
    ///
    /// For environments without a receive interrupt. Reads until the
    /// receiver has nothing pending and returns the number of messages
    /// queued.
    pub fn poll<R: UartRx>(&mut self, rx: &mut R) -> Result<usize, R::Error> {
        let mut delivered = 0;
        while let Some(byte) = rx.try_read_byte()? {
            if self.feed(byte) == FeedStatus::Delivered {
                delivered += 1;
            }
        }
        Ok(delivered)
    }

    /// Advance the idle timer
    ///
    /// With an idle timeout configured, a frame that has seen no byte for
    /// that long is abandoned and the parser goes back to preamble search.
    /// Returns `true` if that happened.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        let Some(timeout_ms) = self.idle_timeout_ms else {
            return false;
        };

        if self.parser.is_idle() {
            self.idle_ms = 0;
            return false;
        }

        self.idle_ms = self.idle_ms.saturating_add(elapsed_ms);
        if self.idle_ms < timeout_ms {
            return false;
        }

        debug!(
            "Idle timeout in {:?} after {} ms, resetting parser",
            self.parser.state(),
            self.idle_ms
        );
        self.parser.reset();
        self.idle_ms = 0;
        self.stats.idle_resets = self.stats.idle_resets.saturating_add(1);
        true
    }

    /// Change the preamble to look for
    pub fn set_preamble(&mut self, preamble: Preamble) {
        info!("Preamble set to {=[u8]:#x}", &preamble.as_bytes()[..]);
        self.parser.set_preamble(preamble);
    }

    /// Preamble the parser is looking for
    pub fn preamble(&self) -> Preamble {
        self.parser.preamble()
    }

    /// Current parser stage
    pub fn parser_state(&self) -> ParseState {
        self.parser.state()
    }

    /// Check whether a message is ready to pop
    pub fn is_message_available(&self) -> bool {
        self.queue.is_available()
    }

    /// Take the oldest message
    pub fn pop_message(&mut self) -> Result<Message, QueueError> {
        self.queue.pop()
    }

    /// Copy the oldest message into `out`
    ///
    /// `out` is left untouched on error.
    pub fn pop_message_into(&mut self, out: &mut Message) -> Result<(), QueueError> {
        self.queue.pop_into(out)
    }

    /// Discard every queued message
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Queue capacity
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Number of queued messages
    pub fn used_space(&self) -> usize {
        self.queue.used_space()
    }

    /// Number of messages that can still be queued
    pub fn free_space(&self) -> usize {
        self.queue.free_space()
    }

    /// Check whether the next verified frame will be dropped
    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    /// Receive statistics so far
    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Zero the receive statistics
    pub fn reset_stats(&mut self) {
        self.stats = LinkStats::default();
    }
}
