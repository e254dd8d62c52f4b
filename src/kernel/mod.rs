//! The extract -> sort -> repack pipeline behind a single validated entry
//! point. Nothing here keeps state between calls.


use crate::config::{DepthCheck, SortConfig};
use crate::error::{SortError, SortResult};
use crate::key::{depth_range, extract_keys, DepthAxis, DepthKey, DepthRange};
use crate::record::RecordBuffer;
use crate::repack::{repack, CombinedLayout};
use crate::sort::sort_by_depth;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortStats {
    pub vertex_count: usize,
    pub min_depth: f32,
    pub max_depth: f32,
    pub skipped_passes: u32,
}

fn validate_view_proj(view_proj: &[f32; 16]) -> SortResult<()> {
    match view_proj.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(SortError::NonFiniteMatrix {
            index,
            value: view_proj[index],
        }),
        None => Ok(()),
    }
}

fn validate_inputs<'a>(
    view_proj: &[f32; 16],
    records: &'a [u8],
    vertex_count: usize,
    config: &SortConfig,
) -> SortResult<RecordBuffer<'a>> {
    config.validate()?;
    validate_view_proj(view_proj)?;
    if u32::try_from(vertex_count).is_err() {
        return Err(SortError::TooManyRecords(vertex_count));
    }
    RecordBuffer::new(records, vertex_count)
}

fn check_depth_range(range: &DepthRange, config: &SortConfig) -> SortResult<()> {
    if range.is_within_margin() {
        return Ok(());
    }
    match config.depth_check {
        DepthCheck::Ignore => Ok(()),
        DepthCheck::Warn => {
            if let Some(index) = range.non_finite {
                log::warn!("depth key for record {index} is not finite; its placement is unspecified");
            }
            if range.min < 0.0 {
                log::warn!(
                    "depth keys reach {} with offset {}; scene extends past the configured margin",
                    range.min,
                    config.depth_offset
                );
            }
            Ok(())
        }
        DepthCheck::Reject => match range.non_finite {
            Some(index) => Err(SortError::NonFiniteDepth { index }),
            None => Err(SortError::DepthOutOfRange {
                min: range.min,
                max: range.max,
                offset: config.depth_offset,
            }),
        },
    }
}

fn sorted_keys(
    view_proj: &[f32; 16],
    records: RecordBuffer<'_>,
    config: &SortConfig,
) -> SortResult<(Vec<DepthKey>, SortStats)> {
    let axis = DepthAxis::from_view_proj(view_proj);
    let mut keys = extract_keys(axis, records, config.depth_offset);

    let mut stats = SortStats {
        vertex_count: records.vertex_count(),
        min_depth: 0.0,
        max_depth: 0.0,
        skipped_passes: 0,
    };
    if let Some(range) = depth_range(&keys) {
        check_depth_range(&range, config)?;
        stats.min_depth = range.min;
        stats.max_depth = range.max;
    }

    stats.skipped_passes = sort_by_depth(&mut keys);
    Ok((keys, stats))
}

/// Sorts `records` back-to-front for `view_proj` and writes the combined
/// quat | scale | center | color buffer. On error `combined` is untouched.
pub fn run_sort(
    view_proj: &[f32; 16],
    records: &[u8],
    vertex_count: usize,
    combined: &mut [f32],
    config: &SortConfig,
) -> SortResult<SortStats> {
    let records = validate_inputs(view_proj, records, vertex_count, config)?;
    let layout = CombinedLayout::new(vertex_count);
    let out = layout.split_mut(combined)?;

    let (keys, stats) = sorted_keys(view_proj, records, config)?;
    let permutation: Vec<u32> = keys.into_iter().map(|k| k.index).collect();
    repack(&permutation, records, out);

    log::debug!(
        "sorted {} splats, depth keys [{}, {}], {} radix passes skipped",
        stats.vertex_count,
        stats.min_depth,
        stats.max_depth,
        stats.skipped_passes
    );
    Ok(stats)
}

/// Same validation and ordering as [`run_sort`], returning only the gather
/// permutation.
pub fn sort_indices(
    view_proj: &[f32; 16],
    records: &[u8],
    vertex_count: usize,
    config: &SortConfig,
) -> SortResult<Vec<u32>> {
    let records = validate_inputs(view_proj, records, vertex_count, config)?;
    let (keys, _) = sorted_keys(view_proj, records, config)?;
    Ok(keys.into_iter().map(|k| k.index).collect())
}
