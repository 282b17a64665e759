//! Render bridge: float engine output to interleaved 16-bit stereo.

use crate::selector::BankSelector;

/// Scratch buffers for one instance, allocated once at creation.
pub(crate) struct RenderBridge {
    left: Vec<f32>,
    right: Vec<f32>,
}

impl RenderBridge {
    pub fn new(frames_per_block: usize) -> Self {
        let frames = frames_per_block.max(1);
        Self {
            left: vec![0.0; frames],
            right: vec![0.0; frames],
        }
    }

    pub fn frames_per_block(&self) -> usize {
        self.left.len()
    }

    /// Fill `out` (interleaved L/R) completely.
    ///
    /// Requests larger than the agreed block are rendered in block-sized chunks
    /// so nothing is allocated here.
    pub fn render(&mut self, selector: &mut BankSelector, out: &mut [i16]) {
        if !selector.is_loaded() {
            out.fill(0);
            return;
        }

        let block = self.left.len();
        let mut chunks = out.chunks_exact_mut(2 * block);
        for chunk in chunks.by_ref() {
            self.render_chunk(selector, chunk);
        }
        let tail = chunks.into_remainder();
        if !tail.is_empty() {
            self.render_chunk(selector, tail);
        }
    }

    fn render_chunk(&mut self, selector: &mut BankSelector, out: &mut [i16]) {
        let frames = out.len() / 2;
        let left = &mut self.left[..frames];
        let right = &mut self.right[..frames];
        left.fill(0.0);
        right.fill(0.0);
        selector.render(left, right);

        for (i, frame) in out.chunks_exact_mut(2).enumerate() {
            frame[0] = float_to_i16(left[i]);
            frame[1] = float_to_i16(right[i]);
        }
        // Odd trailing sample
        if out.len() % 2 == 1 {
            out[out.len() - 1] = 0;
        }
    }
}

/// Hard-clip to [-1, 1] and scale to the 16-bit range.
#[inline]
pub(crate) fn float_to_i16(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    (clamped * 32767.0) as i16
}
