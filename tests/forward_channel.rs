//! Forward control channel scenarios driven through the public pull API

mod common;

use amps_control::focc::words::{CONTROL_FILLER, mobile_word1, mobile_word2_general};
use amps_control::focc::{FRAME_BITS, ForwardControlChannel, Frame, SuperframeLayout};
use amps_control::{ChannelStatus, OutboundWords, StationConfig, StreamSelector};
use common::{capture_frames, frame_words, init_tracing};

fn channel(config: &StationConfig) -> ForwardControlChannel {
    ForwardControlChannel::new(config, ChannelStatus::new()).expect("valid station")
}

#[test]
fn injected_frame_replaces_exactly_one_filler() -> anyhow::Result<()> {
    init_tracing();
    let config = StationConfig::default();
    let mut focc = channel(&config);

    // Run into the filler section of the first cycle.
    capture_frames(&mut focc, 6);
    // Step over the closing marker of frame 5 into slot 6.
    assert_eq!(focc.pull(&mut [0i8; 1]), 0);
    assert_eq!(focc.stats().frames_transmitted, 6);

    let page = mobile_word1(true, 0, 0x12_3456);
    focc.inject(Frame::ephemeral(&page, &page, 1)?)?;
    assert_eq!(focc.pending(), 1);

    let cycle = capture_frames(&mut focc, 18);
    let slots: Vec<usize> = cycle
        .iter()
        .enumerate()
        .filter(|(_, frame)| frame_words(frame, 1) == (page, page))
        .map(|(i, _)| i)
        .collect();
    // Slot 6 was entered before the frame was queued; slot 7 takes it.
    assert_eq!(slots, vec![1]);
    assert_eq!(focc.pending(), 0);
    assert_eq!(focc.stats().injected_sent, 1);

    // The next cycle is back to plain fillers.
    let next = capture_frames(&mut focc, 18);
    assert!(next.iter().all(|frame| frame_words(frame, 1) != (page, page)));
    assert_eq!(frame_words(&next[1], 1), (CONTROL_FILLER, CONTROL_FILLER));
    Ok(())
}

#[test]
fn page_words_use_consecutive_fillers() -> anyhow::Result<()> {
    let config = StationConfig::default();
    let mut focc = channel(&config);
    let word1 = mobile_word1(true, 0, 42);
    let word2 = mobile_word2_general(7, 0, 0, 0);
    focc.injector().inject_words(&OutboundWords::new(StreamSelector::Both, vec![word1, word2]))?;

    let cycle = capture_frames(&mut focc, 18);
    assert_eq!(frame_words(&cycle[4], 1), (word1, word1));
    assert_eq!(frame_words(&cycle[5], 1), (word2, word2));
    assert_eq!(frame_words(&cycle[6], 1), (CONTROL_FILLER, CONTROL_FILLER));
    Ok(())
}

#[test]
fn stream_selection_keeps_filler_on_the_other_stream() -> anyhow::Result<()> {
    let config = StationConfig::default();
    let mut focc = channel(&config);
    let word = mobile_word1(false, 0, 99);
    focc.injector().inject_words(&OutboundWords::new(StreamSelector::B, vec![word]))?;

    let cycle = capture_frames(&mut focc, 5);
    assert_eq!(frame_words(&cycle[4], 1), (CONTROL_FILLER, word));
    Ok(())
}

#[test]
fn overhead_frames_are_never_replaced() -> anyhow::Result<()> {
    let config = StationConfig::default();
    let mut focc = channel(&config);
    let baseline: Vec<_> = capture_frames(&mut channel(&config), 4).iter().map(|f| frame_words(f, 1)).collect();

    let word = mobile_word1(true, 0, 1);
    for _ in 0..3 {
        focc.inject(Frame::ephemeral(&word, &word, 1)?)?;
    }
    let cycle = capture_frames(&mut focc, 18);
    for (slot, expected) in baseline.iter().enumerate() {
        assert_eq!(&frame_words(&cycle[slot], 1), expected, "overhead slot {}", slot);
    }
    assert_eq!(focc.stats().injected_sent, 3);
    Ok(())
}

#[test]
fn cycle_length_matches_layout() {
    for (layout, frames) in [(SuperframeLayout::Standard, 18), (SuperframeLayout::AggressiveRegistration, 38)] {
        for symbol_rate in [20_000u32, 40_000, 80_000] {
            let config = StationConfig { superframe: layout, symbol_rate, ..StationConfig::default() };
            let focc = channel(&config);
            let oversampling = (symbol_rate / 20_000) as usize;
            assert_eq!(focc.superframe().len(), frames);
            assert_eq!(focc.superframe().cycle_samples(), frames * FRAME_BITS * 2 * oversampling);
        }
    }
}

#[test]
fn oversampled_frames_decode() -> anyhow::Result<()> {
    let config = StationConfig { symbol_rate: 60_000, ..StationConfig::default() };
    let mut focc = channel(&config);
    let word = mobile_word1(true, 1, 0xabcdef);
    focc.injector().inject_words(&OutboundWords::new(StreamSelector::A, vec![word]))?;
    let cycle = capture_frames(&mut focc, 5);
    assert_eq!(frame_words(&cycle[4], 3), (word, CONTROL_FILLER));
    Ok(())
}

#[test]
fn busy_indicator_follows_status() {
    let status = ChannelStatus::new();
    let mut focc = ForwardControlChannel::new(&StationConfig::default(), status.clone()).expect("valid station");
    let mut sample = [0i8; 2];

    focc.pull(&mut sample);
    assert_eq!(sample, [-1, 1], "idle");

    status.set_busy();
    // Finish the dotting and reach the second indicator.
    let mut dotting = [0i8; 20];
    assert_eq!(focc.pull(&mut dotting), 20);
    focc.pull(&mut sample);
    assert_eq!(sample, [1, -1], "busy");
}
