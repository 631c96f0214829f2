//! Fixed-size analysis frame accumulation across host callbacks.

use crate::compat::Vec;

/// Accumulates mono samples into non-overlapping analysis frames.
///
/// The write cursor persists across calls, so frame boundaries depend only on
/// the total number of samples pushed, never on how the host chunked them.
#[derive(Debug, Default)]
pub struct FrameAggregator {
    frame: Vec<f64>,
    cursor: usize,
    frames_completed: u64,
}

impl FrameAggregator {
    /// Create an aggregator with an allocated frame. Not real-time safe.
    pub fn new(frame_size: usize) -> Self {
        let mut aggregator = Self::default();
        aggregator.prepare(frame_size);
        aggregator
    }

    /// (Re)allocate the frame and reset the cursor. Not real-time safe.
    pub fn prepare(&mut self, frame_size: usize) {
        self.frame = vec![0.0; frame_size];
        self.cursor = 0;
        self.frames_completed = 0;
    }

    /// Free the frame buffer. Not real-time safe.
    pub fn release(&mut self) {
        self.frame = Vec::new();
        self.cursor = 0;
    }

    /// Rewind to the start of a frame without touching the buffer contents.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    #[inline]
    pub fn frame_size(&self) -> usize {
        self.frame.len()
    }

    /// Next unfilled slot, always in `[0, frame_size)`.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Frames completed since the last `prepare`.
    #[inline]
    pub fn frames_completed(&self) -> u64 {
        self.frames_completed
    }

    /// Append `samples`, calling `on_frame` in-line for every frame filled.
    ///
    /// Returns the number of frames completed by this call. With no frame
    /// allocated the samples are dropped.
    pub fn push<F>(&mut self, samples: &[f32], mut on_frame: F) -> usize
    where
        F: FnMut(&[f64]),
    {
        let frame_size = self.frame.len();
        if frame_size == 0 {
            return 0;
        }

        let mut completed = 0;
        let mut remaining = samples;

        while !remaining.is_empty() {
            let space = frame_size - self.cursor;
            let take = space.min(remaining.len());
            let (head, tail) = remaining.split_at(take);

            for (slot, &s) in self.frame[self.cursor..self.cursor + take]
                .iter_mut()
                .zip(head)
            {
                *slot = f64::from(s);
            }
            self.cursor += take;
            remaining = tail;

            if self.cursor == frame_size {
                self.cursor = 0;
                self.frames_completed += 1;
                completed += 1;
                on_frame(&self.frame);
            }
        }

        completed
    }
}
