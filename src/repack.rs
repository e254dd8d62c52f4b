use std::ops::Range;

use crate::error::{SortError, SortResult};
use crate::record::RecordBuffer;

pub const QUAT_COMPONENTS: usize = 4;
pub const SCALE_COMPONENTS: usize = 3;
pub const CENTER_COMPONENTS: usize = 3;
pub const COLOR_COMPONENTS: usize = 4;
pub const FLOATS_PER_SPLAT: usize =
    QUAT_COMPONENTS + SCALE_COMPONENTS + CENTER_COMPONENTS + COLOR_COMPONENTS;

#[inline]
pub fn dequantize_quat(byte: u8) -> f32 {
    (f32::from(byte) - 128.0) / 128.0
}

#[inline]
pub fn normalize_color(byte: u8) -> f32 {
    f32::from(byte) / 255.0
}

/// Combined buffer length for `vertex_count` splats, `None` on overflow.
pub fn combined_len(vertex_count: usize) -> Option<usize> {
    vertex_count.checked_mul(FLOATS_PER_SPLAT)
}

/// Offsets of the quat | scale | center | color sub-ranges of a combined
/// buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinedLayout {
    vertex_count: usize,
}

impl CombinedLayout {
    pub fn new(vertex_count: usize) -> Self {
        Self { vertex_count }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn len(&self) -> usize {
        self.vertex_count * FLOATS_PER_SPLAT
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    pub fn byte_len(&self) -> usize {
        self.len() * std::mem::size_of::<f32>()
    }

    pub fn quat_range(&self) -> Range<usize> {
        0..QUAT_COMPONENTS * self.vertex_count
    }

    pub fn scale_range(&self) -> Range<usize> {
        let start = self.quat_range().end;
        start..start + SCALE_COMPONENTS * self.vertex_count
    }

    pub fn center_range(&self) -> Range<usize> {
        let start = self.scale_range().end;
        start..start + CENTER_COMPONENTS * self.vertex_count
    }

    pub fn color_range(&self) -> Range<usize> {
        let start = self.center_range().end;
        start..start + COLOR_COMPONENTS * self.vertex_count
    }

    fn check_len(&self, actual: usize) -> SortResult<()> {
        let expected = combined_len(self.vertex_count).unwrap_or(usize::MAX);
        if actual != expected {
            return Err(SortError::OutputLengthMismatch {
                vertex_count: self.vertex_count,
                expected,
                actual,
            });
        }
        Ok(())
    }

    pub fn split<'a>(&self, combined: &'a [f32]) -> SortResult<AttributeViews<'a>> {
        self.check_len(combined.len())?;
        let (quat, rest) = combined.split_at(self.quat_range().len());
        let (scale, rest) = rest.split_at(self.scale_range().len());
        let (center, color) = rest.split_at(self.center_range().len());
        Ok(AttributeViews {
            quat,
            scale,
            center,
            color,
        })
    }

    pub fn split_mut<'a>(&self, combined: &'a mut [f32]) -> SortResult<AttributeViewsMut<'a>> {
        self.check_len(combined.len())?;
        let (quat, rest) = combined.split_at_mut(self.quat_range().len());
        let (scale, rest) = rest.split_at_mut(self.scale_range().len());
        let (center, color) = rest.split_at_mut(self.center_range().len());
        Ok(AttributeViewsMut {
            quat,
            scale,
            center,
            color,
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AttributeViews<'a> {
    pub quat: &'a [f32],
    pub scale: &'a [f32],
    pub center: &'a [f32],
    pub color: &'a [f32],
}

#[derive(Debug)]
pub struct AttributeViewsMut<'a> {
    pub quat: &'a mut [f32],
    pub scale: &'a mut [f32],
    pub center: &'a mut [f32],
    pub color: &'a mut [f32],
}

/// Writes every attribute of `records[permutation[i]]` at rank `i`.
/// `permutation` must be a bijection on `[0, records.vertex_count())`.
pub fn repack(permutation: &[u32], records: RecordBuffer<'_>, out: AttributeViewsMut<'_>) {
    debug_assert_eq!(permutation.len(), records.vertex_count());

    let ranks = permutation
        .iter()
        .zip(out.quat.chunks_exact_mut(QUAT_COMPONENTS))
        .zip(out.scale.chunks_exact_mut(SCALE_COMPONENTS))
        .zip(out.center.chunks_exact_mut(CENTER_COMPONENTS))
        .zip(out.color.chunks_exact_mut(COLOR_COMPONENTS));

    for ((((&source, quat), scale), center), color) in ranks {
        let record = records.record(source as usize);

        for (dst, byte) in quat.iter_mut().zip(record.quat()) {
            *dst = dequantize_quat(byte);
        }
        center.copy_from_slice(&record.center());
        for (dst, byte) in color.iter_mut().zip(record.color()) {
            *dst = normalize_color(byte);
        }
        scale.copy_from_slice(&record.scale());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::encode_record;

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-5, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn layout_partitions_in_field_order() {
        let layout = CombinedLayout::new(10);
        assert_eq!(layout.len(), 140);
        assert_eq!(layout.byte_len(), 560);
        assert_eq!(layout.quat_range(), 0..40);
        assert_eq!(layout.scale_range(), 40..70);
        assert_eq!(layout.center_range(), 70..100);
        assert_eq!(layout.color_range(), 100..140);
        assert_eq!(combined_len(10), Some(140));
        assert_eq!(combined_len(usize::MAX), None);
    }

    #[test]
    fn split_rejects_wrong_lengths() {
        let layout = CombinedLayout::new(2);
        let buffer = vec![0.0; 27];
        let err = layout.split(&buffer).expect_err("short");
        assert!(matches!(
            err,
            SortError::OutputLengthMismatch {
                vertex_count: 2,
                expected: 28,
                actual: 27
            }
        ));
    }

    #[test]
    fn single_record_is_dequantized_and_copied() {
        let center = [1.5, -2.25, f32::MIN_POSITIVE];
        let scale = [0.01, 3.0e7, -0.0];
        let bytes = encode_record(center, scale, [255, 0, 128, 64], [128, 0, 255, 64]);
        let records = RecordBuffer::new(&bytes, 1).expect("record");

        let layout = CombinedLayout::new(1);
        let mut combined = vec![f32::NAN; layout.len()];
        repack(&[0], records, layout.split_mut(&mut combined).expect("layout"));

        let views = layout.split(&combined).expect("layout");
        assert_close(views.color, &[1.0, 0.0, 0.50196, 0.25098]);
        assert_close(views.quat, &[0.0, -1.0, 0.99219, -0.5]);

        let center_bits: Vec<u32> = views.center.iter().map(|v| v.to_bits()).collect();
        let scale_bits: Vec<u32> = views.scale.iter().map(|v| v.to_bits()).collect();
        assert_eq!(center_bits, center.map(f32::to_bits).to_vec());
        assert_eq!(scale_bits, scale.map(f32::to_bits).to_vec());
    }

    #[test]
    fn ranks_follow_the_permutation() {
        let bytes: Vec<u8> = (0..3)
            .flat_map(|i| {
                let v = i as f32;
                encode_record([v, v, v], [v + 10.0; 3], [i as u8; 4], [128; 4])
            })
            .collect();
        let records = RecordBuffer::new(&bytes, 3).expect("records");

        let layout = CombinedLayout::new(3);
        let mut combined = vec![0.0; layout.len()];
        repack(&[2, 0, 1], records, layout.split_mut(&mut combined).expect("layout"));

        let views = layout.split(&combined).expect("layout");
        assert_eq!(views.center, &[2.0, 2.0, 2.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        assert_eq!(views.scale[..3], [12.0, 12.0, 12.0]);
        assert_eq!(views.color[4..8], [0.0; 4]);
        assert!(views.quat.iter().all(|&q| q == 0.0));
    }
}
