//! Incremental builder for the per-object style data textures.

use rustc_hash::{FxHashMap, FxHashSet};

use super::transforms::TransformOverrides;
use super::NodeAppearance;
use crate::error::CadreError;

/// Set of object tree indices a style applies to.
pub type TreeIndexSet = FxHashSet<u32>;

#[derive(Debug, Clone)]
struct AppliedStyle {
    revision: u64,
    tree_indices: TreeIndexSet,
}

/// Builds the two per-object texel buffers consumed by the renderer: a
/// 4-byte color+flags texel and a 3-byte transform-lookup texel per object.
///
/// Updates are incremental: re-applying a style writes only the symmetric
/// difference of its id set against the previous application - added ids
/// get the style's records, removed ids revert to the default records - so
/// the cost of an update is bounded by the size of the change, not the
/// model.
///
/// Updates take `&mut self`; interleaving them with a concurrent texture
/// upload is the caller's responsibility (single-writer discipline).
#[derive(Debug, Clone)]
pub struct StyleTextureBuilder {
    object_count: usize,
    default_texel: [u8; 4],
    color_texels: Vec<u8>,
    transform_texels: Vec<u8>,
    transforms: TransformOverrides,
    applied: FxHashMap<u64, AppliedStyle>,
}

impl StyleTextureBuilder {
    /// Allocate texel buffers for `object_count` objects, all filled with
    /// the default appearance's records.
    ///
    /// # Errors
    ///
    /// [`CadreError::DefaultStyleTransform`] when the default appearance
    /// carries a world transform - the "no override" texel cannot express
    /// one.
    pub fn new(
        object_count: usize,
        default_style: &NodeAppearance,
    ) -> Result<Self, CadreError> {
        if default_style.world_transform.is_some() {
            return Err(CadreError::DefaultStyleTransform);
        }

        let default_texel = default_style.texel();
        let mut color_texels = Vec::with_capacity(4 * object_count);
        for _ in 0..object_count {
            color_texels.extend_from_slice(&default_texel);
        }

        Ok(Self {
            object_count,
            default_texel,
            color_texels,
            transform_texels: vec![0; 3 * object_count],
            transforms: TransformOverrides::new(),
            applied: FxHashMap::default(),
        })
    }

    /// Number of objects the texel buffers cover.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.object_count
    }

    /// The 4-byte-per-object color+flags buffer.
    #[must_use]
    pub fn color_texels(&self) -> &[u8] {
        &self.color_texels
    }

    /// The 3-byte-per-object transform-lookup buffer.
    #[must_use]
    pub fn transform_index_texels(&self) -> &[u8] {
        &self.transform_texels
    }

    /// The transform side table the lookup texels point into.
    #[must_use]
    pub fn transforms(&self) -> &TransformOverrides {
        &self.transforms
    }

    /// Apply (or re-apply) a style to a set of objects.
    ///
    /// An unchanged `revision` for an already-applied `style_id` is a
    /// no-op. Otherwise only the ids added to or removed from the style's
    /// previous application are rewritten.
    pub fn apply_style(
        &mut self,
        style_id: u64,
        revision: u64,
        tree_indices: &TreeIndexSet,
        style: &NodeAppearance,
    ) {
        if let Some(applied) = self.applied.get(&style_id) {
            if applied.revision == revision {
                return;
            }
        }

        let texel = style.texel();
        let transform_texel = match style.world_transform {
            Some(transform) => TransformOverrides::lookup_texel(
                self.transforms.set(style_id, transform),
            ),
            None => {
                self.transforms.remove(style_id);
                TransformOverrides::NO_OVERRIDE
            }
        };

        if let Some(previous) = self.applied.remove(&style_id) {
            let mut added = 0usize;
            let mut removed = 0usize;
            for &index in tree_indices.difference(&previous.tree_indices) {
                self.write_texels(index, texel, transform_texel);
                added += 1;
            }
            for &index in previous.tree_indices.difference(tree_indices) {
                self.write_texels(
                    index,
                    self.default_texel,
                    TransformOverrides::NO_OVERRIDE,
                );
                removed += 1;
            }
            log::debug!(
                "style {style_id} rev {revision}: +{added} -{removed} objects"
            );
        } else {
            for &index in tree_indices {
                self.write_texels(index, texel, transform_texel);
            }
            log::debug!(
                "style {style_id} rev {revision}: applied to {} objects",
                tree_indices.len()
            );
        }

        let _ = self.applied.insert(
            style_id,
            AppliedStyle {
                revision,
                tree_indices: tree_indices.clone(),
            },
        );
    }

    /// Remove a style entirely, reverting its objects to the default
    /// records and releasing its transform slot.
    pub fn remove_style(&mut self, style_id: u64) {
        if let Some(previous) = self.applied.remove(&style_id) {
            for &index in &previous.tree_indices {
                self.write_texels(
                    index,
                    self.default_texel,
                    TransformOverrides::NO_OVERRIDE,
                );
            }
            self.transforms.remove(style_id);
            log::debug!(
                "style {style_id} removed: {} objects reverted",
                previous.tree_indices.len()
            );
        }
    }

    /// Write both texels of one object. Ids beyond the allocated range are
    /// ignored.
    fn write_texels(
        &mut self,
        index: u32,
        color: [u8; 4],
        transform: [u8; 3],
    ) {
        let index = index as usize;
        if let Some(slot) = self.color_texels.get_mut(4 * index..4 * index + 4)
        {
            slot.copy_from_slice(&color);
        }
        if let Some(slot) =
            self.transform_texels.get_mut(3 * index..3 * index + 3)
        {
            slot.copy_from_slice(&transform);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;
    use crate::styling::OutlineColor;

    fn ids(values: &[u32]) -> TreeIndexSet {
        values.iter().copied().collect()
    }

    fn flags_byte(builder: &StyleTextureBuilder, index: usize) -> u8 {
        builder.color_texels()[4 * index + 3]
    }

    #[test]
    fn test_new_fills_default_records() {
        let builder =
            StyleTextureBuilder::new(3, &NodeAppearance::default()).unwrap();
        assert_eq!(builder.color_texels(), &[0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1]);
        assert_eq!(builder.transform_index_texels(), &[0u8; 9]);
    }

    #[test]
    fn test_default_style_with_transform_is_rejected() {
        let style = NodeAppearance {
            world_transform: Some(Mat4::IDENTITY),
            ..NodeAppearance::default()
        };
        assert_eq!(
            StyleTextureBuilder::new(1, &style).unwrap_err(),
            CadreError::DefaultStyleTransform
        );
    }

    #[test]
    fn test_apply_and_revert_restores_default_flags() {
        let mut builder =
            StyleTextureBuilder::new(4, &NodeAppearance::default()).unwrap();
        let style = NodeAppearance {
            visible: true,
            render_in_front: true,
            outline_color: OutlineColor::Cyan,
            ..NodeAppearance::default()
        };

        builder.apply_style(1, 0, &ids(&[2]), &style);
        assert_eq!(flags_byte(&builder, 2), 27);

        builder.remove_style(1);
        assert_eq!(flags_byte(&builder, 2), 1, "default byte must return");
    }

    #[test]
    fn test_unchanged_revision_is_a_noop() {
        let mut builder =
            StyleTextureBuilder::new(2, &NodeAppearance::default()).unwrap();
        let style = NodeAppearance {
            color: Some([9, 9, 9]),
            ..NodeAppearance::default()
        };
        builder.apply_style(1, 5, &ids(&[0]), &style);

        // Same revision with a different id set must not rewrite anything.
        builder.apply_style(1, 5, &ids(&[1]), &style);
        assert_eq!(&builder.color_texels()[4..8], &[0, 0, 0, 1]);
    }

    #[test]
    fn test_revision_bump_rewrites_only_the_difference() {
        let mut builder =
            StyleTextureBuilder::new(3, &NodeAppearance::default()).unwrap();
        let style = NodeAppearance {
            render_ghosted: true,
            ..NodeAppearance::default()
        };

        builder.apply_style(1, 0, &ids(&[0, 1]), &style);
        builder.apply_style(1, 1, &ids(&[1, 2]), &style);

        assert_eq!(flags_byte(&builder, 0), 1, "removed id reverts");
        assert_eq!(flags_byte(&builder, 1), 1 + 4, "kept id keeps style");
        assert_eq!(flags_byte(&builder, 2), 1 + 4, "added id gets style");
    }

    #[test]
    fn test_world_transform_sets_lookup_texel() {
        let mut builder =
            StyleTextureBuilder::new(2, &NodeAppearance::default()).unwrap();
        let style = NodeAppearance {
            world_transform: Some(Mat4::from_translation(Vec3::X)),
            ..NodeAppearance::default()
        };

        builder.apply_style(1, 0, &ids(&[1]), &style);
        assert_eq!(&builder.transform_index_texels()[3..6], &[0, 0, 1]);
        assert_eq!(builder.transforms().transforms().len(), 1);

        builder.remove_style(1);
        assert_eq!(&builder.transform_index_texels()[3..6], &[0, 0, 0]);
    }

    #[test]
    fn test_out_of_range_ids_are_ignored() {
        let mut builder =
            StyleTextureBuilder::new(1, &NodeAppearance::default()).unwrap();
        let style = NodeAppearance {
            visible: false,
            ..NodeAppearance::default()
        };
        builder.apply_style(1, 0, &ids(&[0, 99]), &style);
        assert_eq!(builder.color_texels().len(), 4);
        assert_eq!(flags_byte(&builder, 0), 0);
    }
}
