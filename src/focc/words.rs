//! Forward control word layouts (EIA-553 3.7.1)
//!
//! Every builder is a pure function from field values to a 28-bit word.
//! Values wider than their field are truncated; [`crate::StationConfig::validate`]
//! keeps configured values inside their widths.

use crate::types::{FORWARD_WORD_BITS, ForwardWord, bitfield};

/// Fixed control filler word, sent when there is nothing else to say.
pub const CONTROL_FILLER: ForwardWord =
    [1, 1, 0, 0, 0, 1, 0, 1, 1, 1, 0, 0, 0, 0, 0, 1, 1, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0, 1];

/// Supervisory audio tone code that marks word 2 as a general message.
const SCC_GENERAL: u64 = 0b11;

// Pack (width, value) fields back to back from bit 0.
fn assemble(fields: &[(usize, u64)]) -> ForwardWord {
    let mut word = [0u8; FORWARD_WORD_BITS];
    let mut at = 0;
    for &(width, value) in fields {
        bitfield::pack(&mut word, at, width, value);
        at += width;
    }
    debug_assert_eq!(at, FORWARD_WORD_BITS, "word layout does not fill 28 bits");
    word
}

/// Mobile station control message word 1 (abbreviated address word).
///
/// `multiword` is set when further words of the same message follow.
pub fn mobile_word1(multiword: bool, dcc: u8, min1: u32) -> ForwardWord {
    assemble(&[(1, 0), (1, u64::from(multiword)), (2, u64::from(dcc)), (24, u64::from(min1))])
}

/// Mobile station control message word 2, general form (SCC = 11).
pub fn mobile_word2_general(min2: u16, msg_type: u8, ordq: u8, order: u8) -> ForwardWord {
    assemble(&[
        (2, 0b10),
        (2, SCC_GENERAL),
        (10, u64::from(min2)),
        (1, 0),
        (5, u64::from(msg_type)),
        (3, u64::from(ordq)),
        (5, u64::from(order)),
    ])
}

/// Mobile station control message word 2, initial voice channel designation.
pub fn mobile_word2_voice_channel(scc: u8, min2: u16, vmac: u8, chan: u16) -> ForwardWord {
    assemble(&[
        (2, 0b10),
        (2, u64::from(scc)),
        (10, u64::from(min2)),
        (3, u64::from(vmac)),
        (11, u64::from(chan)),
    ])
}

/// System parameter overhead message, word 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverheadWord1 {
    pub dcc: u8,
    pub sid: u16,
    pub ep: bool,
    pub auth: bool,
    pub pci: bool,
    /// Overhead words that follow in this train.
    pub nawc: u8,
}

impl OverheadWord1 {
    pub fn encode(&self) -> ForwardWord {
        assemble(&[
            (2, 0b11),
            (2, u64::from(self.dcc)),
            (14, u64::from(self.sid >> 1)),
            (1, u64::from(self.ep)),
            (1, u64::from(self.auth)),
            (1, u64::from(self.pci)),
            (4, u64::from(self.nawc)),
            (3, 0b110),
        ])
    }
}

/// System parameter overhead message, word 2.
///
/// `n_minus_one` and `cmax_minus_one` carry the field values as sent on the
/// air (paging channel count and access channel count, each minus one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverheadWord2 {
    pub dcc: u8,
    pub s: bool,
    pub e: bool,
    pub regh: bool,
    pub regr: bool,
    pub dtx: u8,
    pub n_minus_one: u8,
    pub rcf: bool,
    pub cpa: bool,
    pub cmax_minus_one: u8,
    pub end: bool,
}

impl OverheadWord2 {
    /// Parameters this station advertises: serial number and extended address
    /// requested, home and roaming registration enabled, 24 paging and 24
    /// access channels, combined paging/access.
    pub fn station_default(dcc: u8) -> Self {
        Self {
            dcc,
            s: true,
            e: true,
            regh: true,
            regr: true,
            dtx: 0,
            n_minus_one: 23,
            rcf: true,
            cpa: true,
            cmax_minus_one: 23,
            end: false,
        }
    }

    pub fn encode(&self) -> ForwardWord {
        assemble(&[
            (2, 0b11),
            (2, u64::from(self.dcc)),
            (1, u64::from(self.s)),
            (1, u64::from(self.e)),
            (1, u64::from(self.regh)),
            (1, u64::from(self.regr)),
            (2, u64::from(self.dtx)),
            (5, u64::from(self.n_minus_one)),
            (1, u64::from(self.rcf)),
            (1, u64::from(self.cpa)),
            (7, u64::from(self.cmax_minus_one)),
            (1, u64::from(self.end)),
            (3, 0b111),
        ])
    }
}

/// Access type parameters global action message (ACT = 1001).
///
/// Busy/idle status checking and the power class and capability fields are
/// all sent as zero.
pub fn access_type_parameters(dcc: u8, end: bool) -> ForwardWord {
    assemble(&[
        (2, 0b11),
        (2, u64::from(dcc)),
        (4, 0b1001),
        (1, 0), // BIS
        (1, 0), // PCI_HOME
        (1, 0), // PCI_ROAM
        (4, 0), // BSPC
        (3, 0), // BSCAP
        (6, 0),
        (1, u64::from(end)),
        (3, 0b100),
    ])
}

/// Registration increment global action message (ACT = 0010).
pub fn registration_increment(dcc: u8, regincr: u16, end: bool) -> ForwardWord {
    assemble(&[
        (2, 0b11),
        (2, u64::from(dcc)),
        (4, 0b0010),
        (12, u64::from(regincr)),
        (4, 0),
        (1, u64::from(end)),
        (3, 0b100),
    ])
}

/// Registration ID message.
pub fn registration_id(dcc: u8, regid: u32, end: bool) -> ForwardWord {
    assemble(&[(2, 0b11), (2, u64::from(dcc)), (20, u64::from(regid)), (1, u64::from(end)), (3, 0)])
}

/// Forward voice channel mobile station control message (SCC = 11).
pub fn voice_control_order(pscc: u8, msg_type: u8, ordq: u8, order: u8) -> ForwardWord {
    assemble(&[
        (2, 0b10),
        (2, SCC_GENERAL),
        (2, u64::from(pscc)),
        (1, 0), // EF
        (8, 0),
        (5, u64::from(msg_type)),
        (3, u64::from(ordq)),
        (5, u64::from(order)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::bitfield::{flag, unpack};
    use crate::types::order;

    #[test]
    fn word1_layout() {
        let word = mobile_word1(true, 0b10, 0xabcdef);
        assert!(!flag(&word, 0));
        assert!(flag(&word, 1));
        assert_eq!(unpack(&word, 2, 2), 0b10);
        assert_eq!(unpack(&word, 4, 24), 0xabcdef);
    }

    #[test]
    fn word2_general_layout() {
        let word = mobile_word2_general(0x2aa, 0, 0, order::PAGE);
        assert_eq!(unpack(&word, 0, 4), 0b1011);
        assert_eq!(unpack(&word, 4, 10), 0x2aa);
        assert_eq!(unpack(&word, 14, 14), 0);
    }

    #[test]
    fn word2_voice_channel_layout() {
        let word = mobile_word2_voice_channel(1, 0x155, 0b101, 334);
        assert_eq!(unpack(&word, 0, 2), 0b10);
        assert_eq!(unpack(&word, 2, 2), 1);
        assert_eq!(unpack(&word, 4, 10), 0x155);
        assert_eq!(unpack(&word, 14, 3), 0b101);
        assert_eq!(unpack(&word, 17, 11), 334);
    }

    #[test]
    fn overhead_word1_layout() {
        let word = OverheadWord1 { dcc: 1, sid: 0x2b67, ep: true, auth: false, pci: false, nawc: 3 }
            .encode();
        assert_eq!(unpack(&word, 0, 2), 0b11);
        assert_eq!(unpack(&word, 2, 2), 1);
        assert_eq!(unpack(&word, 4, 14), u64::from(0x2b67u16 >> 1));
        assert!(flag(&word, 18));
        assert_eq!(unpack(&word, 21, 4), 3);
        assert_eq!(unpack(&word, 25, 3), 0b110);
    }

    #[test]
    fn overhead_word2_layout() {
        let word = OverheadWord2 { end: true, ..OverheadWord2::station_default(0) }.encode();
        assert_eq!(unpack(&word, 4, 6), 0b111100);
        assert_eq!(unpack(&word, 10, 5), 23);
        assert_eq!(unpack(&word, 15, 2), 0b11);
        assert_eq!(unpack(&word, 17, 7), 23);
        assert!(flag(&word, 24));
        assert_eq!(unpack(&word, 25, 3), 0b111);
    }

    #[test]
    fn global_action_layouts() {
        let access = access_type_parameters(2, false);
        assert_eq!(unpack(&access, 0, 8), 0b1110_1001);
        assert_eq!(unpack(&access, 8, 16), 0);
        assert!(!flag(&access, 24));
        assert_eq!(unpack(&access, 25, 3), 0b100);

        let incr = registration_increment(0, 100, true);
        assert_eq!(unpack(&incr, 4, 4), 0b0010);
        assert_eq!(unpack(&incr, 8, 12), 100);
        assert!(flag(&incr, 24));
    }

    #[test]
    fn registration_id_layout() {
        let word = registration_id(3, 500, true);
        assert_eq!(unpack(&word, 2, 2), 3);
        assert_eq!(unpack(&word, 4, 20), 500);
        assert!(flag(&word, 24));
        assert_eq!(unpack(&word, 25, 3), 0);
    }

    #[test]
    fn voice_alert_layout() {
        let word = voice_control_order(0, 0, 0, order::ALERT);
        assert_eq!(unpack(&word, 0, 4), 0b1011);
        assert_eq!(unpack(&word, 23, 5), 1);
        assert_eq!(unpack(&word, 4, 19), 0);
    }

    #[test]
    fn filler_starts_as_overhead() {
        assert_eq!(unpack(&CONTROL_FILLER, 0, 2), 0b11);
        assert!(CONTROL_FILLER.iter().all(|&b| b <= 1));
    }
}
