//! Frame-source seam for the capture worker
//!
//! A source hands out frames on demand and gets an explicit `release` once
//! the worker threads have joined, mirroring a camera handle's open/close
//! discipline. The synthetic source renders a moving block over a flat
//! background so the pipeline can run end to end without hardware.

use crate::error::Result;
use crate::types::Frame;

/// Produces camera frames on demand.
///
/// `next_frame` returns `Ok(None)` when the source is exhausted (end of a
/// clip); a live camera never does. `release` is called exactly once, after
/// every worker holding frames has stopped.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Release the underlying handle. Default: nothing to release.
    fn release(&mut self) {}

    fn name(&self) -> &str {
        "source"
    }
}

/// Synthetic source: a dark background with a bright block sweeping
/// horizontally, wrapping at the right edge. Frame count is optional;
/// unlimited sources run until the engine stops.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    frames_left: Option<u64>,
    tick: u64,
    released: bool,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frames_left: None,
            tick: 0,
            released: false,
        }
    }

    /// Limit the source to `count` frames, after which it reports exhaustion
    pub fn with_frame_limit(mut self, count: u64) -> Self {
        self.frames_left = Some(count);
        self
    }

    /// Pixel x of the moving block's left edge for the current tick
    fn block_x(&self) -> u32 {
        (self.tick * 4 % self.width as u64) as u32
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if let Some(left) = &mut self.frames_left {
            if *left == 0 {
                return Ok(None);
            }
            *left -= 1;
        }

        let block_x = self.block_x();
        let block_w = self.width / 8;
        let block_top = self.height / 2;
        let frame = Frame::from_fn(self.width, self.height, |x, y| {
            if y >= block_top && x >= block_x && x < block_x.saturating_add(block_w) {
                image::Rgb([230, 230, 230])
            } else {
                image::Rgb([24, 28, 32])
            }
        });
        self.tick += 1;
        Ok(Some(frame))
    }

    fn release(&mut self) {
        self.released = true;
        log::debug!("synthetic source released after {} frames", self.tick);
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_have_requested_dimensions() {
        let mut source = SyntheticSource::new(64, 48);
        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!((frame.width(), frame.height()), (64, 48));
    }

    #[test]
    fn block_moves_between_frames() {
        let mut source = SyntheticSource::new(64, 48);
        let a = source.next_frame().unwrap().unwrap();
        let b = source.next_frame().unwrap().unwrap();
        assert_ne!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn frame_limit_exhausts() {
        let mut source = SyntheticSource::new(16, 16).with_frame_limit(2);
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_none());

        source.release();
        assert!(source.is_released());
    }
}
