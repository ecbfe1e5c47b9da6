//! Side table of per-style world-transform overrides.
//!
//! The per-object transform texel stores a 1-based slot index into this
//! table; 0 means "no override". Slots freed by removed styles are reused
//! so the table stays bounded by the number of live overrides.

use glam::Mat4;
use rustc_hash::FxHashMap;

/// Transform override slot table.
#[derive(Debug, Clone, Default)]
pub struct TransformOverrides {
    slots: Vec<Mat4>,
    by_style: FxHashMap<u64, usize>,
    free: Vec<usize>,
}

impl TransformOverrides {
    /// The 3-byte texel meaning "no transform override".
    pub const NO_OVERRIDE: [u8; 3] = [0, 0, 0];

    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `transform` for `style_id`, reusing the style's existing slot
    /// or a freed one. Returns the slot index.
    pub fn set(&mut self, style_id: u64, transform: Mat4) -> usize {
        if let Some(&slot) = self.by_style.get(&style_id) {
            self.slots[slot] = transform;
            return slot;
        }
        let slot = if let Some(slot) = self.free.pop() {
            self.slots[slot] = transform;
            slot
        } else {
            self.slots.push(transform);
            self.slots.len() - 1
        };
        let _ = self.by_style.insert(style_id, slot);
        slot
    }

    /// Release the slot held by `style_id`, if any. The slot's matrix is
    /// reset to identity so stale data never reaches the GPU.
    pub fn remove(&mut self, style_id: u64) {
        if let Some(slot) = self.by_style.remove(&style_id) {
            self.slots[slot] = Mat4::IDENTITY;
            self.free.push(slot);
        }
    }

    /// Encode a slot index as the 3-byte, 1-based lookup texel
    /// (big-endian byte order).
    #[must_use]
    pub fn lookup_texel(slot: usize) -> [u8; 3] {
        let index = slot + 1;
        [
            ((index >> 16) & 0xff) as u8,
            ((index >> 8) & 0xff) as u8,
            (index & 0xff) as u8,
        ]
    }

    /// The transform table, indexed by slot.
    #[must_use]
    pub fn transforms(&self) -> &[Mat4] {
        &self.slots
    }

    /// Raw little-endian float32 view of the table for texture upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.slots)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn test_lookup_texel_is_one_based() {
        assert_eq!(TransformOverrides::lookup_texel(0), [0, 0, 0x01]);
        assert_eq!(TransformOverrides::lookup_texel(255), [0, 0x01, 0x00]);
        assert_eq!(
            TransformOverrides::lookup_texel(0x0001_0001),
            [0x01, 0x00, 0x02]
        );
    }

    #[test]
    fn test_set_reuses_the_style_slot() {
        let mut table = TransformOverrides::new();
        let first = table.set(7, Mat4::from_translation(Vec3::X));
        let second = table.set(7, Mat4::from_translation(Vec3::Y));
        assert_eq!(first, second);
        assert_eq!(table.transforms().len(), 1);
    }

    #[test]
    fn test_remove_frees_slot_for_reuse() {
        let mut table = TransformOverrides::new();
        let a = table.set(1, Mat4::IDENTITY);
        let _ = table.set(2, Mat4::IDENTITY);
        table.remove(1);
        let c = table.set(3, Mat4::from_translation(Vec3::Z));
        assert_eq!(c, a, "freed slot must be reused");
        assert_eq!(table.transforms().len(), 2);
    }
}
