//! Little-endian field access over fixed-size wire records.
//!
//! The read side walks one record slice with an advancing cursor; the write
//! side puts values at resolved attribute offsets with bounds checking, so a
//! bad offset map surfaces as an error instead of a silent overrun.

use glam::{Mat4, Vec3, Vec4};

/// Advancing little-endian reader over one fixed-size input record.
///
/// Field offsets are implied by read order; the caller guarantees the record
/// slice is exactly one variant stride long, which makes every fixed-field
/// read in range by construction.
pub(crate) struct FieldReader<'a> {
    record: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(record: &'a [u8]) -> Self {
        Self { record, pos: 0 }
    }

    pub(crate) fn f32(&mut self) -> f32 {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.record[self.pos..self.pos + 4]);
        self.pos += 4;
        f32::from_le_bytes(bytes)
    }

    pub(crate) fn vec3(&mut self) -> Vec3 {
        let x = self.f32();
        let y = self.f32();
        let z = self.f32();
        Vec3::new(x, y, z)
    }

    /// Raw color bytes in stored order (R, G, B, A).
    pub(crate) fn color(&mut self) -> [u8; 4] {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.record[self.pos..self.pos + 4]);
        self.pos += 4;
        bytes
    }

    pub(crate) fn skip(&mut self, bytes: usize) {
        self.pos += bytes;
    }
}

/// A write that would land outside the destination slot.
#[derive(Debug)]
pub(crate) struct Overflow;

pub(crate) fn put_f32(
    slot: &mut [u8],
    at: usize,
    value: f32,
) -> Result<(), Overflow> {
    let Some(dst) = slot.get_mut(at..at + 4) else {
        return Err(Overflow);
    };
    dst.copy_from_slice(&value.to_le_bytes());
    Ok(())
}

pub(crate) fn put_vec3(
    slot: &mut [u8],
    at: usize,
    value: Vec3,
) -> Result<(), Overflow> {
    put_f32(slot, at, value.x)?;
    put_f32(slot, at + 4, value.y)?;
    put_f32(slot, at + 8, value.z)
}

pub(crate) fn put_vec4(
    slot: &mut [u8],
    at: usize,
    value: Vec4,
) -> Result<(), Overflow> {
    put_vec3(slot, at, value.truncate())?;
    put_f32(slot, at + 12, value.w)
}

/// 16 column-major float32s.
pub(crate) fn put_mat4(
    slot: &mut [u8],
    at: usize,
    value: &Mat4,
) -> Result<(), Overflow> {
    for (i, element) in value.to_cols_array().iter().enumerate() {
        put_f32(slot, at + i * 4, *element)?;
    }
    Ok(())
}

/// Color bytes are stored B, G, R, A on the output side regardless of the
/// R, G, B, A tuple order used during computation - the wire swap consuming
/// shaders rely on.
pub(crate) fn put_color(
    slot: &mut [u8],
    at: usize,
    rgba: [u8; 4],
) -> Result<(), Overflow> {
    let Some(dst) = slot.get_mut(at..at + 4) else {
        return Err(Overflow);
    };
    dst.copy_from_slice(&[rgba[2], rgba[1], rgba[0], rgba[3]]);
    Ok(())
}
