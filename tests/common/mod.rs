//! Shared helpers for the integration tests

#![allow(dead_code)] // Each test binary uses a different subset.

use amps_control::codec::{BchCode, encode_chips};
use amps_control::focc::{FRAME_BITS, ForwardControlChannel};
use amps_control::recc::burst::{CODED_DCC, WORD_COPIES, sync_chips};
use amps_control::recc::{CalledAddress, SerialWord, WordA, WordB, WordHeader};
use amps_control::{ForwardWord, MinCode};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn word_a(min: &str, nawc: u8, t: bool, s: bool) -> WordA {
    let code = MinCode::parse(min).expect("valid MIN");
    WordA { header: WordHeader { first: true, nawc }, t, s, e: true, er: false, scm: 0b1000, min1: code.min1 }
}

pub fn word_b(min: &str, nawc: u8, order: u8) -> WordB {
    let code = MinCode::parse(min).expect("valid MIN");
    WordB {
        header: WordHeader { first: false, nawc },
        msg_type: 0,
        ordq: 0,
        order,
        lt: false,
        ep: false,
        scm4: false,
        mpci: 0,
        sdcc1: 0,
        sdcc2: 0,
        min2: code.min2,
    }
}

pub fn serial_word(nawc: u8, serial: u32) -> Vec<u8> {
    SerialWord { header: WordHeader { first: false, nawc }, serial }.to_bits()
}

pub fn called_word(nawc: u8, digits: &str) -> Vec<u8> {
    CalledAddress::from_digits(WordHeader { first: false, nawc }, digits).to_bits()
}

/// Sync pattern, coded DCC and five copies of each word, Manchester coded.
/// Positions past `words` carry all-zero words. Copies listed in `damaged`
/// as `(word, copy)` get three bit errors.
pub fn burst_chips(words: &[Vec<u8>], positions: usize, dcc: u8, damaged: &[(usize, usize)]) -> Vec<u8> {
    let zero = vec![0u8; 36];
    let mut bits = CODED_DCC[usize::from(dcc)].to_vec();
    for index in 0..positions {
        let info = words.get(index).unwrap_or(&zero);
        let codeword = BchCode::REVERSE.encode(info).expect("36-bit word");
        for copy in 0..WORD_COPIES {
            let mut sent = codeword.clone();
            if damaged.contains(&(index, copy)) {
                for flip in [0, 1, 2] {
                    sent[flip] ^= 1;
                }
            }
            bits.extend(sent);
        }
    }
    let mut chips = sync_chips();
    chips.extend(encode_chips(&bits));
    chips
}

/// Pull whole frames: each returned vector holds exactly one frame.
pub fn capture_frames(focc: &mut ForwardControlChannel, count: usize) -> Vec<Vec<i8>> {
    let oversampling = focc.superframe().oversampling();
    let frame_len = FRAME_BITS * 2 * oversampling;
    let mut samples = Vec::with_capacity(count * frame_len);
    let mut buf = vec![0i8; frame_len];
    while samples.len() < count * frame_len {
        let want = (count * frame_len - samples.len()).min(buf.len());
        let n = focc.pull(&mut buf[..want]);
        samples.extend_from_slice(&buf[..n]);
    }
    samples.chunks_exact(frame_len).map(<[i8]>::to_vec).collect()
}

/// Line bits of one frame with the busy/idle bits removed.
pub fn message_bits(frame: &[i8], oversampling: usize) -> Vec<u8> {
    let bits: Vec<u8> = frame.chunks_exact(2 * oversampling).map(|b| if b[0] > 0 { 0 } else { 1 }).collect();
    assert_eq!(bits.len(), FRAME_BITS);
    bits.iter()
        .enumerate()
        .filter(|&(i, _)| !is_busy_idle_position(i))
        .map(|(_, &bit)| bit)
        .collect()
}

fn is_busy_idle_position(i: usize) -> bool {
    match i {
        0 | 11 => true,
        i if i >= 23 => (i - 23) % 11 == 0,
        _ => false,
    }
}

/// First copy of words A and B in a frame, BCH-decoded.
pub fn frame_words(frame: &[i8], oversampling: usize) -> (ForwardWord, ForwardWord) {
    let bits = message_bits(frame, oversampling);
    let decode = |range: std::ops::Range<usize>| -> ForwardWord {
        let decoded = BchCode::FORWARD.decode(&bits[range]).expect("40-bit codeword").expect("clean codeword");
        decoded.data.try_into().expect("28 bits")
    };
    (decode(21..61), decode(61..101))
}
