use crate::dsp::convert::SampleFormat;

/// Upstream queue of raw sample bytes for one block input.
#[derive(Debug, Clone)]
pub struct InputPort {
    format: SampleFormat,
    data: Vec<u8>,
    reserve: usize,
}

impl InputPort {
    pub fn new(format: SampleFormat) -> Self {
        Self {
            format,
            data: Vec::new(),
            reserve: 0,
        }
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    /// Queues raw native-endian bytes; partial trailing elements wait for the rest.
    pub fn push(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Whole elements currently queued.
    pub fn elements(&self) -> usize {
        self.data.len() / self.format.element_size().max(1)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn consume(&mut self, elements: usize) {
        let elements = elements.min(self.elements());
        self.data.drain(..elements * self.format.element_size());
    }

    /// Minimum elements the producer should queue before running the block.
    pub fn reserve(&self) -> usize {
        self.reserve
    }

    pub fn set_reserve(&mut self, elements: usize) {
        self.reserve = elements;
    }

    pub fn is_ready(&self) -> bool {
        self.elements() >= self.reserve.max(1)
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}
