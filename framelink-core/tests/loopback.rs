//! End-to-end tests over a host loopback UART
//!
//! Everything written by the transmitter comes back out of the receiver,
//! standing in for a wire between two nodes.

use std::collections::VecDeque;

use framelink_core::{
    FeedStatus, Frame, Link, LinkConfig, Message, Preamble, QueueError, SharedLink, Transmitter,
};
use framelink_hal::{UartConfig, UartRx, UartTx};
use proptest::prelude::*;

#[derive(Default)]
struct Loopback {
    config: Option<UartConfig>,
    wire: VecDeque<u8>,
}

impl UartTx for Loopback {
    type Error = ();

    fn open(&mut self, config: &UartConfig) -> Result<(), ()> {
        self.config = Some(*config);
        Ok(())
    }

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
        self.wire.extend(data.iter().copied());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}

impl UartRx for Loopback {
    type Error = ();

    fn try_read_byte(&mut self) -> Result<Option<u8>, ()> {
        Ok(self.wire.pop_front())
    }
}

fn transmitter(config: &LinkConfig) -> Transmitter<Loopback> {
    Transmitter::open(Loopback::default(), config).unwrap()
}

#[test]
fn send_then_receive() {
    let config = LinkConfig::default();
    let mut tx = transmitter(&config);
    let mut slots = [Message::EMPTY; 4];
    let mut link = Link::new(&config, &mut slots);

    tx.send(0x02, 0x01, b"hello").unwrap();
    assert_eq!(link.poll(tx.uart_mut()), Ok(1));

    let message = link.pop_message().unwrap();
    assert_eq!(message.destination, 0x02);
    assert_eq!(message.source_address(), 0x01);
    assert_eq!(message.payload_size(), 5);
    assert_eq!(message.payload(), b"hello");
    assert_eq!(link.pop_message(), Err(QueueError::Empty));
}

#[test]
fn open_uses_configured_baudrate() {
    let config = LinkConfig::new().with_baudrate(19200);
    let uart = transmitter(&config).release();
    assert_eq!(uart.config.map(|c| c.baudrate), Some(19200));
}

#[test]
fn spurious_leading_byte_does_not_desync() {
    let config = LinkConfig::default();
    let mut tx = transmitter(&config);
    let mut slots = [Message::EMPTY; 4];
    let mut link = Link::new(&config, &mut slots);

    tx.uart_mut().write_byte(0xAA).unwrap();
    tx.send(0x02, 0x01, b"after noise").unwrap();

    assert_eq!(link.poll(tx.uart_mut()), Ok(1));
    assert_eq!(link.pop_message().unwrap().payload(), b"after noise");
}

#[test]
fn corrupted_frame_is_dropped_between_good_ones() {
    let config = LinkConfig::default();
    let mut tx = transmitter(&config);
    let mut slots = [Message::EMPTY; 4];
    let mut link = Link::new(&config, &mut slots);

    tx.send(0x02, 0x01, b"first").unwrap();
    tx.send(0x02, 0x01, b"second").unwrap();
    tx.send(0x02, 0x01, b"third").unwrap();

    // flip a payload bit in the second frame: 16 bytes of "first", then
    // preamble + header of "second"
    let index = 16 + 7 + 2;
    tx.uart_mut().wire[index] ^= 0x10;

    assert_eq!(link.poll(tx.uart_mut()), Ok(2));
    assert_eq!(link.pop_message().unwrap().payload(), b"first");
    assert_eq!(link.pop_message().unwrap().payload(), b"third");

    let stats = link.stats();
    assert_eq!(stats.frames_received, 2);
    assert_eq!(stats.checksum_errors, 1);
}

#[test]
fn full_queue_keeps_oldest() {
    let config = LinkConfig::default();
    let mut tx = transmitter(&config);
    let mut slots = [Message::EMPTY; 2];
    let mut link = Link::new(&config, &mut slots);

    for i in 0..5u8 {
        tx.send(0x02, i, &[i]).unwrap();
    }

    assert_eq!(link.poll(tx.uart_mut()), Ok(2));
    assert!(link.is_full());
    assert_eq!(link.stats().dropped_full, 3);
    assert_eq!(link.pop_message().unwrap().source_address(), 0);
    assert_eq!(link.pop_message().unwrap().source_address(), 1);
    assert!(!link.is_message_available());
}

#[test]
fn persisted_config_drives_both_ends() {
    let original = LinkConfig::new()
        .with_preamble(Preamble::new(0x55, 0x66, 0x77, 0x88))
        .with_baudrate(38400);

    let mut buffer = [0u8; framelink_core::config::MAX_CONFIG_SIZE];
    let stored = original.to_slice(&mut buffer).unwrap();
    let config = LinkConfig::from_bytes(stored).unwrap();

    let mut tx = transmitter(&config);
    let mut slots = [Message::EMPTY; 2];
    let mut link = Link::new(&config, &mut slots);

    tx.send(0x09, 0x0A, b"custom preamble").unwrap();
    assert_eq!(link.poll(tx.uart_mut()), Ok(1));
}

#[test]
fn mismatched_preamble_delivers_nothing() {
    let mut tx = transmitter(&LinkConfig::default());
    let config = LinkConfig::new().with_preamble(Preamble::new(1, 2, 3, 4));
    let mut slots = [Message::EMPTY; 2];
    let mut link = Link::new(&config, &mut slots);

    tx.send(0x02, 0x01, b"wrong sync").unwrap();
    assert_eq!(link.poll(tx.uart_mut()), Ok(0));
    assert_eq!(link.stats().frames_received, 0);
}

#[test]
fn interrupt_and_application_contexts() {
    const FRAMES: u8 = 32;

    let config = LinkConfig::default();
    let mut slots = [Message::EMPTY; 4];
    let shared = SharedLink::new(Link::new(&config, &mut slots));

    std::thread::scope(|scope| {
        // receive interrupt
        scope.spawn(|| {
            for seq in 0..FRAMES {
                while shared.free_space() == 0 {
                    std::thread::yield_now();
                }
                let bytes = Frame::new(0x02, 0x01, &[seq]).encode_to_vec(&config.preamble);
                for &byte in bytes.iter() {
                    shared.on_byte_received(byte);
                }
            }
        });

        // application
        let mut expected = 0u8;
        while expected < FRAMES {
            match shared.pop_message() {
                Ok(message) => {
                    assert_eq!(message.payload(), &[expected]);
                    expected += 1;
                }
                Err(QueueError::Empty) => std::thread::yield_now(),
            }
        }
    });

    let stats = shared.stats();
    assert_eq!(stats.frames_received, u32::from(FRAMES));
    assert_eq!(stats.dropped_full, 0);
}

#[test]
fn feed_status_reports_completion_on_last_byte() {
    let config = LinkConfig::default();
    let mut slots = [Message::EMPTY; 2];
    let shared = SharedLink::new(Link::new(&config, &mut slots));

    let bytes = Frame::new(0x02, 0x01, b"x").encode_to_vec(&config.preamble);
    let statuses: Vec<FeedStatus> = bytes.iter().map(|&b| shared.on_byte_received(b)).collect();

    let (last, rest) = statuses.split_last().unwrap();
    assert!(rest.iter().all(|s| *s == FeedStatus::Pending));
    assert_eq!(*last, FeedStatus::Delivered);
}

proptest! {
    #[test]
    fn prop_payloads_arrive_in_order(
        payloads in proptest::collection::vec(
            proptest::collection::vec(any::<u8>(), 0..=framelink_protocol::MAX_PAYLOAD_SIZE),
            1..8,
        ),
    ) {
        let config = LinkConfig::default();
        let mut tx = transmitter(&config);
        let mut slots = [Message::EMPTY; 8];
        let mut link = Link::new(&config, &mut slots);

        for (i, payload) in payloads.iter().enumerate() {
            tx.send(0x01, i as u8, payload).unwrap();
        }
        prop_assert_eq!(link.poll(tx.uart_mut()), Ok(payloads.len()));

        for (i, payload) in payloads.iter().enumerate() {
            let message = link.pop_message().unwrap();
            prop_assert_eq!(message.source_address(), i as u8);
            prop_assert_eq!(message.payload(), &payload[..]);
        }
        prop_assert!(!link.is_message_available());
    }
}
