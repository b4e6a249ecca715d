/// Which image of a multi-image artwork a gallery card is showing.
///
/// Both directions wrap around, so a card never runs off either end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageCursor {
    index: usize,
    len: usize,
}

impl ImageCursor {
    /// Start at the first of `len` images
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Advance one image, wrapping from the last to the first
    pub fn next(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    /// Step back one image, wrapping from the first to the last
    pub fn previous(&mut self) {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
    }
}
