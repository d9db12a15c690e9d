//! Per-set block storage and LRU ordering.
//!
//! A [`Set`] is an ordered sequence of `assoc` blocks and is the sole
//! replacement-policy state: position 0 is always the least-recently-used
//! block and the last position the most-recently-used. There is no separate
//! recency timestamp. Reordering is expressed as adjacent element moves.

/// One cache block. A block with `valid == false` carries no meaningful
/// tag or dirty state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Block {
    /// Whether the slot holds a resident block.
    pub valid: bool,
    /// Modified since it was last written back to the next level.
    pub dirty: bool,
    /// High-order address bits identifying the block within its set.
    pub tag: u32,
}

/// An ordered sequence of blocks under LRU discipline.
///
/// Invariant: the front (position 0) is the eviction candidate, the back is
/// the most recently used slot. Never-filled slots are invalid blocks in
/// arbitrary positions and lose LRU races naturally.
#[derive(Debug, Clone)]
pub struct Set {
    blocks: Vec<Block>,
}

impl Set {
    /// Allocates a set of `assoc` invalid blocks.
    pub fn new(assoc: u32) -> Self {
        Self {
            blocks: vec![Block::default(); assoc as usize],
        }
    }

    /// Scans for a valid block with the given tag.
    ///
    /// # Returns
    ///
    /// The block's position, or `None` when the tag is not resident.
    pub fn probe(&self, tag: u32) -> Option<usize> {
        self.blocks.iter().position(|b| b.valid && b.tag == tag)
    }

    /// Rotates the block at `position` to the front by successive adjacent
    /// exchanges; everything strictly between shifts one slot toward
    /// `position`. No-op when `position == 0`.
    pub fn promote(&mut self, position: usize) {
        for i in (1..=position).rev() {
            self.blocks.swap(i, i - 1);
        }
    }

    /// Overwrites the front block with `{valid: true, dirty, tag}`.
    pub fn install_front(&mut self, tag: u32, dirty: bool) {
        self.blocks[0] = Block {
            valid: true,
            dirty,
            tag,
        };
    }

    /// Moves the front block to the last position by successive adjacent
    /// exchanges; all other blocks shift one slot toward the front. This is
    /// the universal "just used" step.
    pub fn rotate_to_back(&mut self) {
        for i in 1..self.blocks.len() {
            self.blocks.swap(i - 1, i);
        }
    }

    /// Combined access/fill step.
    ///
    /// A resident tag is first promoted to the front; otherwise the front
    /// block is the true LRU and is the one about to be overwritten. Either
    /// way the block is installed at the front and rotated to the back, so
    /// the accessed block ends at the MRU position and whichever block was
    /// previously at the front is displaced exactly once per update.
    pub fn update(&mut self, tag: u32, dirty: bool) {
        if let Some(position) = self.probe(tag) {
            self.promote(position);
        }
        self.install_front(tag, dirty);
        self.rotate_to_back();
    }

    /// The current eviction candidate (front slot).
    pub fn lru(&self) -> &Block {
        &self.blocks[0]
    }

    /// All blocks in LRU-to-MRU order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}
