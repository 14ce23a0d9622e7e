//! Tests for the latest-wins frame handoff

use bytes::Bytes;
use proptest::prelude::*;
use proxima_eye::{Frame, FrameHandoff};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn frame(sequence: u64) -> Frame {
    Frame::new(sequence, 2, 2, Bytes::from_static(&[0; 4]))
}

proptest! {
    #[test]
    fn prop_take_returns_most_recent(sequences in proptest::collection::vec(any::<u64>(), 0..32)) {
        let handoff = FrameHandoff::new();
        for &sequence in &sequences {
            handoff.put(frame(sequence));
        }

        prop_assert_eq!(handoff.take().map(|f| f.sequence()), sequences.last().copied());
        prop_assert!(handoff.take().is_none());
    }
}

#[test]
fn test_interleaved_put_take() {
    let handoff = FrameHandoff::new();
    handoff.put(frame(1));
    assert_eq!(handoff.take().map(|f| f.sequence()), Some(1));
    handoff.put(frame(2));
    handoff.put(frame(3));
    assert_eq!(handoff.take().map(|f| f.sequence()), Some(3));
    assert!(handoff.take().is_none());
}

#[test]
fn test_concurrent_producer_consumer() {
    const FRAMES: u64 = 20_000;

    let handoff = Arc::new(FrameHandoff::new());
    let done = Arc::new(AtomicBool::new(false));

    let producer = {
        let handoff = handoff.clone();
        let done = done.clone();
        thread::spawn(move || {
            for sequence in 1..=FRAMES {
                handoff.put(frame(sequence));
            }
            done.store(true, Ordering::Release);
        })
    };

    let consumer = {
        let handoff = handoff.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut seen = Vec::new();
            loop {
                let finished = done.load(Ordering::Acquire);
                if let Some(frame) = handoff.take() {
                    seen.push(frame.sequence());
                } else if finished {
                    break;
                }
            }
            seen
        })
    };

    producer.join().unwrap();
    let seen = consumer.join().unwrap();

    // Never returned twice, always newer than the previous take.
    let unique: HashSet<_> = seen.iter().copied().collect();
    assert_eq!(unique.len(), seen.len());
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
    // The final frame is never lost.
    assert_eq!(seen.last().copied(), Some(FRAMES));
    assert_eq!(handoff.delivered(), FRAMES);
    assert_eq!(handoff.overwritten() + seen.len() as u64, FRAMES);
}
