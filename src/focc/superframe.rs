//! The cyclic frame schedule
//!
//! Overhead words must repeat every 0.8 ± 0.3 s. At 10 kbit/s one 463-bit frame
//! takes 46.3 ms, so the schedule repeats overhead every 18 or 19 frames.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::StationConfig;
use crate::{AmpsError, Result};

use super::frame::{FRAME_BITS, Frame, Segment};
use super::words::{
    OverheadWord1, OverheadWord2, access_type_parameters, registration_id, registration_increment,
};

/// Filler frames following the overhead train.
const FILLER_FRAMES: usize = 14;

/// Registration ID sent in the second half of the aggressive schedule.
const SECOND_REGISTRATION_ID: u32 = 500;

/// Which overhead schedule to transmit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuperframeLayout {
    /// 18 frames: system parameters, access type, registration ID, fillers.
    #[default]
    Standard,
    /// 38 frames: two 19-frame halves that also carry a registration increment,
    /// prompting mobiles to register frequently.
    AggressiveRegistration,
}

impl SuperframeLayout {
    pub fn frame_count(self) -> usize {
        match self {
            SuperframeLayout::Standard => 4 + FILLER_FRAMES,
            SuperframeLayout::AggressiveRegistration => 2 * (5 + FILLER_FRAMES),
        }
    }
}

/// A validated cyclic sequence of frames.
#[derive(Debug, Clone)]
pub struct Superframe {
    frames: Vec<Frame>,
    oversampling: usize,
}

impl Superframe {
    /// Build the schedule for a station configuration.
    pub fn build(config: &StationConfig) -> Result<Self> {
        let oversampling = config.oversampling()?;
        let frames = match config.superframe {
            SuperframeLayout::Standard => standard_frames(config, oversampling)?,
            SuperframeLayout::AggressiveRegistration => {
                let mut frames = registration_half(config, 0, oversampling)?;
                frames.extend(registration_half(config, SECOND_REGISTRATION_ID, oversampling)?);
                frames
            }
        };
        let superframe = Self::from_frames(frames, oversampling)?;
        info!(
            layout = ?config.superframe,
            frames = superframe.len(),
            oversampling,
            "Built forward control superframe"
        );
        Ok(superframe)
    }

    /// Wrap an arbitrary frame list, enforcing the symbol count invariant.
    pub fn from_frames(frames: Vec<Frame>, oversampling: usize) -> Result<Self> {
        let superframe = Self { frames, oversampling };
        superframe.validate()?;
        Ok(superframe)
    }

    /// Check that one full cycle emits exactly `frames × 463` bits.
    ///
    /// Busy/idle segments count as one bit; message segments must be
    /// non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.oversampling == 0 {
            return Err(AmpsError::invariant("superframe", "oversampling factor is zero"));
        }
        if self.frames.is_empty() {
            return Err(AmpsError::invariant("superframe", "no frames"));
        }
        let per_bit = 2 * self.oversampling;
        let mut total = 0usize;
        for (index, frame) in self.frames.iter().enumerate() {
            for segment in frame.segments() {
                match segment {
                    Segment::Message(samples) if samples.is_empty() || samples.len() % per_bit != 0 => {
                        return Err(AmpsError::invariant(
                            "superframe",
                            format!("frame {} has a message segment of {} samples", index, samples.len()),
                        ));
                    }
                    _ => total += segment.sample_len(self.oversampling),
                }
            }
        }
        let expected = self.frames.len() * FRAME_BITS * per_bit;
        if total != expected {
            return Err(AmpsError::invariant(
                "superframe",
                format!(
                    "{} samples per cycle, expected {} ({} frames × {} bits × {})",
                    total,
                    expected,
                    self.frames.len(),
                    FRAME_BITS,
                    per_bit
                ),
            ));
        }
        debug!(samples = total, bits = total / per_bit, "Superframe validated");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn oversampling(&self) -> usize {
        self.oversampling
    }

    pub fn frame(&self, index: usize) -> &Frame {
        &self.frames[index]
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Samples emitted over one full cycle.
    pub fn cycle_samples(&self) -> usize {
        self.frames.iter().map(|f| f.sample_len(self.oversampling)).sum()
    }
}

fn both(word: &crate::types::ForwardWord, oversampling: usize) -> Result<Frame> {
    Frame::scheduled(word, word, oversampling)
}

fn fillers(oversampling: usize) -> Result<Vec<Frame>> {
    (0..FILLER_FRAMES).map(|_| Frame::filler(oversampling)).collect()
}

fn system_parameters(config: &StationConfig, nawc: u8) -> OverheadWord1 {
    OverheadWord1 { dcc: config.dcc, sid: config.sid, ep: true, auth: false, pci: false, nawc }
}

fn standard_frames(config: &StationConfig, oversampling: usize) -> Result<Vec<Frame>> {
    let mut frames = vec![
        both(&system_parameters(config, 3).encode(), oversampling)?,
        both(&OverheadWord2::station_default(config.dcc).encode(), oversampling)?,
        both(&access_type_parameters(config.dcc, false), oversampling)?,
        both(&registration_id(config.dcc, 0, true), oversampling)?,
    ];
    frames.extend(fillers(oversampling)?);
    Ok(frames)
}

fn registration_half(config: &StationConfig, regid: u32, oversampling: usize) -> Result<Vec<Frame>> {
    let mut frames = vec![
        both(&system_parameters(config, 4).encode(), oversampling)?,
        both(&OverheadWord2::station_default(config.dcc).encode(), oversampling)?,
        both(&access_type_parameters(config.dcc, false), oversampling)?,
        both(&registration_increment(config.dcc, config.registration_increment, false), oversampling)?,
        both(&registration_id(config.dcc, regid, true), oversampling)?,
    ];
    frames.extend(fillers(oversampling)?);
    Ok(frames)
}
