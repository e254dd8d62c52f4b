use crate::record::RecordBuffer;

/// Margin added to the projected distance so realistic scenes produce
/// positive keys.
pub const DEFAULT_DEPTH_OFFSET: f32 = 10_000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DepthKey {
    pub depth: f32,
    pub index: u32,
}

/// Third row of a column-major view-projection matrix (entries 2, 6, 10).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthAxis {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl DepthAxis {
    pub fn from_view_proj(view_proj: &[f32; 16]) -> Self {
        Self {
            a: view_proj[2],
            b: view_proj[6],
            c: view_proj[10],
        }
    }

    /// `offset - (a*x + b*y + c*z)`: farther points get smaller keys.
    #[inline]
    pub fn depth(&self, center: [f32; 3], offset: f32) -> f32 {
        offset - (self.a * center[0] + self.b * center[1] + self.c * center[2])
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRange {
    pub min: f32,
    pub max: f32,
    pub non_finite: Option<u32>,
}

impl DepthRange {
    /// Whether every key is finite and non-negative.
    pub fn is_within_margin(&self) -> bool {
        self.non_finite.is_none() && self.min >= 0.0
    }
}

pub fn extract_keys(axis: DepthAxis, records: RecordBuffer<'_>, depth_offset: f32) -> Vec<DepthKey> {
    (0u32..)
        .zip(records.iter())
        .map(|(index, record)| DepthKey {
            depth: axis.depth(record.center(), depth_offset),
            index,
        })
        .collect()
}

/// Min/max over the keys plus the first non-finite one, if any. `None` for an
/// empty key set.
pub fn depth_range(keys: &[DepthKey]) -> Option<DepthRange> {
    if keys.is_empty() {
        return None;
    }
    let mut range = DepthRange {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
        non_finite: None,
    };
    for key in keys {
        if !key.depth.is_finite() {
            range.non_finite.get_or_insert(key.index);
            continue;
        }
        range.min = range.min.min(key.depth);
        range.max = range.max.max(key.depth);
    }
    Some(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::encode_record;

    fn records_at(centers: &[[f32; 3]]) -> Vec<u8> {
        centers
            .iter()
            .flat_map(|&c| encode_record(c, [1.0; 3], [0; 4], [128; 4]))
            .collect()
    }

    #[test]
    fn axis_reads_third_row_of_column_major_matrix() {
        let mut m = [0.0_f32; 16];
        for (i, v) in m.iter_mut().enumerate() {
            *v = i as f32;
        }
        let axis = DepthAxis::from_view_proj(&m);
        assert_eq!(axis, DepthAxis { a: 2.0, b: 6.0, c: 10.0 });
    }

    #[test]
    fn depth_is_offset_minus_dot() {
        let axis = DepthAxis { a: 1.0, b: 2.0, c: 3.0 };
        let d = axis.depth([1.0, 1.0, 1.0], DEFAULT_DEPTH_OFFSET);
        assert_eq!(d, 10_000.0 - 6.0);
    }

    #[test]
    fn keys_carry_original_indices() {
        let bytes = records_at(&[[0.0, 0.0, 1.0], [0.0, 0.0, 5.0], [0.0, 0.0, -2.0]]);
        let records = RecordBuffer::new(&bytes, 3).expect("records");
        let axis = DepthAxis { a: 0.0, b: 0.0, c: 1.0 };
        let keys = extract_keys(axis, records, 100.0);

        let indices: Vec<u32> = keys.iter().map(|k| k.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(keys[1].depth, 95.0);
        assert_eq!(keys[2].depth, 102.0);
    }

    #[test]
    fn range_flags_negative_and_non_finite_keys() {
        let keys = [
            DepthKey { depth: 3.0, index: 0 },
            DepthKey { depth: -1.0, index: 1 },
            DepthKey { depth: f32::NAN, index: 2 },
            DepthKey { depth: 8.0, index: 3 },
        ];
        let range = depth_range(&keys).expect("non-empty");
        assert_eq!(range.min, -1.0);
        assert_eq!(range.max, 8.0);
        assert_eq!(range.non_finite, Some(2));
        assert!(!range.is_within_margin());

        assert!(depth_range(&[]).is_none());
        let ok = depth_range(&keys[..1]).expect("one key");
        assert!(ok.is_within_margin());
    }
}
