//! Channel downmixing into the mono analysis signal.

use crate::compat::Vec;
use dasp_sample::{Sample, ToSample};

/// One host callback worth of planar audio.
///
/// Borrowed for the duration of a single `process_block` call.
#[derive(Debug, Clone, Copy)]
pub struct AudioBlock<'a, S> {
    channels: &'a [&'a [S]],
    frames: usize,
}

impl<'a, S> AudioBlock<'a, S> {
    /// Frame count is the shortest channel length (0 for no channels).
    pub fn new(channels: &'a [&'a [S]]) -> Self {
        let frames = channels.iter().map(|ch| ch.len()).min().unwrap_or(0);
        Self { channels, frames }
    }

    /// Explicit frame count, needed for blocks with zero channels.
    ///
    /// With channels present the count is capped at the shortest channel.
    pub fn with_frames(channels: &'a [&'a [S]], frames: usize) -> Self {
        let frames = channels
            .iter()
            .map(|ch| ch.len())
            .min()
            .map_or(frames, |shortest| shortest.min(frames));
        Self { channels, frames }
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.frames
    }

    #[inline]
    pub fn channels(&self) -> &'a [&'a [S]] {
        self.channels
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }
}

/// Averages all input channels into a pre-sized mono buffer.
///
/// The buffer is sized once by [`prepare`](Self::prepare); the downmix calls
/// only overwrite it.
#[derive(Debug, Default)]
pub struct ChannelDownmixer {
    mono: Vec<f32>,
    len: usize,
}

impl ChannelDownmixer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_block_size: usize) -> Self {
        let mut downmixer = Self::new();
        downmixer.prepare(max_block_size);
        downmixer
    }

    /// Allocate the mono buffer. Not real-time safe.
    pub fn prepare(&mut self, max_block_size: usize) {
        self.mono = vec![0.0; max_block_size];
        self.len = 0;
    }

    /// Free the mono buffer. Not real-time safe.
    pub fn release(&mut self) {
        self.mono = Vec::new();
        self.len = 0;
    }

    /// Largest number of frames a single downmix call can produce.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.mono.len()
    }

    /// Mono output of the most recent downmix call.
    #[inline]
    pub fn mono(&self) -> &[f32] {
        &self.mono[..self.len]
    }

    /// Downmix `frames` frames of `block` starting at frame `start`.
    ///
    /// `frames` is capped at [`capacity`](Self::capacity); callers split larger
    /// blocks into several calls.
    pub fn downmix<S>(&mut self, block: &AudioBlock<'_, S>, start: usize, frames: usize) -> &[f32]
    where
        S: Sample + ToSample<f32>,
    {
        let n = frames
            .min(self.capacity())
            .min(block.num_frames().saturating_sub(start));
        debug_assert!(frames <= self.capacity(), "block exceeds prepared size");

        let out = &mut self.mono[..n];
        self.len = n;

        let channels = block.channels();
        let Some((first, rest)) = channels.split_first() else {
            out.fill(0.0);
            return out;
        };

        for (o, &s) in out.iter_mut().zip(&first[start..start + n]) {
            *o = s.to_sample::<f32>();
        }
        for channel in rest {
            for (o, &s) in out.iter_mut().zip(&channel[start..start + n]) {
                *o += s.to_sample::<f32>();
            }
        }

        if !rest.is_empty() {
            let scale = 1.0 / channels.len() as f32;
            out.iter_mut().for_each(|o| *o *= scale);
        }

        out
    }

    /// Downmix interleaved samples (`[L0, R0, L1, R1, ...]`).
    ///
    /// `start` and `frames` count frames, not samples. A zero channel count
    /// yields `frames` zero samples.
    pub fn downmix_interleaved<S>(
        &mut self,
        data: &[S],
        channels: usize,
        start: usize,
        frames: usize,
    ) -> &[f32]
    where
        S: Sample + ToSample<f32>,
    {
        let available = if channels == 0 {
            frames
        } else {
            (data.len() / channels).saturating_sub(start)
        };
        let n = frames.min(self.capacity()).min(available);
        debug_assert!(frames <= self.capacity(), "block exceeds prepared size");

        let out = &mut self.mono[..n];
        self.len = n;

        if channels == 0 {
            out.fill(0.0);
            return out;
        }

        let scale = 1.0 / channels as f32;
        let samples = &data[start * channels..(start + n) * channels];
        for (o, frame) in out.iter_mut().zip(samples.chunks_exact(channels)) {
            let sum: f32 = frame.iter().map(|&s| s.to_sample::<f32>()).sum();
            *o = sum * scale;
        }

        out
    }
}
