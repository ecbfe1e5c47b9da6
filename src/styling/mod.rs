//! Per-object style and transform override texels.
//!
//! Renderers sample two per-object data textures: a 4-byte color+flags
//! texel and a 3-byte transform-lookup texel pointing into a side table of
//! world transforms. This module owns the bit-packing contract for those
//! texels and keeps updates incremental - a style change rewrites only the
//! object ids it actually affects.

mod texture_builder;
mod transforms;

use glam::Mat4;
use serde::{Deserialize, Serialize};
pub use texture_builder::{StyleTextureBuilder, TreeIndexSet};
pub use transforms::TransformOverrides;

/// Outline color selector stored in flag bits 3-5.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum OutlineColor {
    /// No outline.
    #[default]
    NoOutline = 0,
    /// White outline.
    White = 1,
    /// Black outline.
    Black = 2,
    /// Cyan outline.
    Cyan = 3,
    /// Blue outline.
    Blue = 4,
    /// Green outline.
    Green = 5,
    /// Red outline.
    Red = 6,
    /// Orange outline.
    Orange = 7,
}

/// Visual style of one object (addressed by tree index).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeAppearance {
    /// Whether the object is rendered at all.
    pub visible: bool,
    /// RGB color override; `None` keeps the modelled color.
    pub color: Option<[u8; 3]>,
    /// Render in front of all other objects.
    pub render_in_front: bool,
    /// Render ghosted (translucent, desaturated).
    pub render_ghosted: bool,
    /// Outline toggle and color.
    pub outline_color: OutlineColor,
    /// World transform override; `None` keeps the modelled placement.
    pub world_transform: Option<Mat4>,
}

impl Default for NodeAppearance {
    fn default() -> Self {
        Self {
            visible: true,
            color: None,
            render_in_front: false,
            render_ghosted: false,
            outline_color: OutlineColor::NoOutline,
            world_transform: None,
        }
    }
}

impl NodeAppearance {
    /// The 4-byte color+flags texel for this appearance.
    ///
    /// RGB carries the color override (zero when none); the alpha byte
    /// packs the style toggles:
    /// - bit 0: visible
    /// - bit 1: render in front
    /// - bit 2: render ghosted
    /// - bits 3-5: outline color
    /// - bits 6-7: unused
    #[must_use]
    pub fn texel(&self) -> [u8; 4] {
        let [r, g, b] = self.color.unwrap_or([0, 0, 0]);
        let flags = u8::from(self.visible)
            | (u8::from(self.render_in_front) << 1)
            | (u8::from(self.render_ghosted) << 2)
            | ((self.outline_color as u8) << 3);
        [r, g, b, flags]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_appearance_texel_is_visible_only() {
        assert_eq!(NodeAppearance::default().texel(), [0, 0, 0, 1]);
    }

    #[test]
    fn test_flag_bit_packing() {
        let appearance = NodeAppearance {
            visible: true,
            render_in_front: true,
            outline_color: OutlineColor::Cyan,
            ..NodeAppearance::default()
        };
        // 1 (visible) + 2 (in front) + 3 << 3 (outline).
        assert_eq!(appearance.texel()[3], 27);
    }

    #[test]
    fn test_hidden_object_clears_the_visible_bit() {
        let appearance = NodeAppearance {
            visible: false,
            color: Some([10, 20, 30]),
            ..NodeAppearance::default()
        };
        assert_eq!(appearance.texel(), [10, 20, 30, 0]);
    }
}
