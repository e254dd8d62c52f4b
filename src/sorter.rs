use crate::config::SortConfig;
use crate::error::SortResult;
use crate::kernel::{run_sort, SortStats};
use crate::pool::BufferPool;
use crate::record::RECORD_SIZE;
use crate::repack::{AttributeViews, CombinedLayout};

/// One combined buffer produced by [`SplatSorter::run_sort`].
#[derive(Debug)]
pub struct SortedSplats {
    combined: Vec<f32>,
    layout: CombinedLayout,
    stats: SortStats,
}

impl SortedSplats {
    pub fn layout(&self) -> CombinedLayout {
        self.layout
    }

    pub fn stats(&self) -> SortStats {
        self.stats
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.combined
    }

    pub fn views(&self) -> AttributeViews<'_> {
        let layout = self.layout;
        AttributeViews {
            quat: &self.combined[layout.quat_range()],
            scale: &self.combined[layout.scale_range()],
            center: &self.combined[layout.center_range()],
            color: &self.combined[layout.color_range()],
        }
    }

    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.combined.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.combined
    }
}

/// Owns one uploaded record buffer and re-sorts it for each new camera.
#[derive(Debug)]
pub struct SplatSorter {
    records: Vec<u8>,
    layout: CombinedLayout,
    config: SortConfig,
    pool: BufferPool,
    sort_count: u64,
}

impl SplatSorter {
    /// Takes `floor(len / 32)` records, capped at `config.max_splats`.
    pub fn new(mut data: Vec<u8>, config: SortConfig) -> SortResult<Self> {
        config.validate()?;

        let trailing = data.len() % RECORD_SIZE;
        if trailing != 0 {
            log::warn!("ignoring {trailing} trailing bytes after the last complete record");
        }
        let available = data.len() / RECORD_SIZE;
        let vertex_count = available.min(config.max_splats);
        if vertex_count < available {
            log::warn!(
                "trimming {available} splats to the configured maximum of {}",
                config.max_splats
            );
        }
        data.truncate(vertex_count * RECORD_SIZE);

        let layout = CombinedLayout::new(vertex_count);
        let pool = BufferPool::new(layout.len(), config.pool_buffers);
        Ok(Self {
            records: data,
            layout,
            config,
            pool,
            sort_count: 0,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.layout.vertex_count()
    }

    pub fn layout(&self) -> CombinedLayout {
        self.layout
    }

    pub fn record_bytes(&self) -> &[u8] {
        &self.records
    }

    pub fn sort_count(&self) -> u64 {
        self.sort_count
    }

    pub fn pooled_buffers(&self) -> usize {
        self.pool.available()
    }

    pub fn run_sort(&mut self, view_proj: &[f32; 16]) -> SortResult<SortedSplats> {
        let mut combined = self.pool.acquire();
        let result = run_sort(
            view_proj,
            &self.records,
            self.layout.vertex_count(),
            &mut combined,
            &self.config,
        );
        match result {
            Ok(stats) => {
                self.sort_count += 1;
                Ok(SortedSplats {
                    combined,
                    layout: self.layout,
                    stats,
                })
            }
            Err(err) => {
                if err.is_validation() {
                    log::debug!("sort rejected at the boundary: {err}");
                } else {
                    log::warn!("sort failed: {err}");
                }
                self.pool.release(combined)?;
                Err(err)
            }
        }
    }

    pub fn return_buffer(&mut self, sorted: SortedSplats) -> SortResult<()> {
        self.pool.release(sorted.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SortError;
    use crate::math::MAT4_IDENTITY;
    use crate::record::encode_record;

    fn records(count: usize) -> Vec<u8> {
        (0..count)
            .flat_map(|i| encode_record([0.0, 0.0, i as f32], [1.0; 3], [255; 4], [128; 4]))
            .collect()
    }

    #[test]
    fn trailing_bytes_and_excess_splats_are_dropped() {
        let mut data = records(5);
        data.extend_from_slice(&[1, 2, 3]);
        let config = SortConfig {
            max_splats: 3,
            ..SortConfig::default()
        };
        let sorter = SplatSorter::new(data, config).expect("sorter");
        assert_eq!(sorter.vertex_count(), 3);
        assert_eq!(sorter.record_bytes().len(), 3 * RECORD_SIZE);
        assert_eq!(sorter.layout().len(), 42);
    }

    #[test]
    fn sorted_output_is_back_to_front() {
        let mut sorter = SplatSorter::new(records(4), SortConfig::default()).expect("sorter");
        // Identity: the depth row is (0, 0, 1), so larger z is farther.
        let sorted = sorter.run_sort(&MAT4_IDENTITY).expect("sort");
        let z: Vec<f32> = sorted.views().center.chunks_exact(3).map(|c| c[2]).collect();
        assert_eq!(z, vec![3.0, 2.0, 1.0, 0.0]);
        assert_eq!(sorted.stats().vertex_count, 4);
        assert_eq!(sorted.to_le_bytes().len(), sorted.layout().byte_len());
        assert_eq!(sorter.sort_count(), 1);
    }

    #[test]
    fn buffers_cycle_through_the_pool() {
        let mut sorter = SplatSorter::new(records(2), SortConfig::default()).expect("sorter");
        assert_eq!(sorter.pooled_buffers(), 2);

        let first = sorter.run_sort(&MAT4_IDENTITY).expect("first");
        let second = sorter.run_sort(&MAT4_IDENTITY).expect("second");
        assert_eq!(sorter.pooled_buffers(), 0);
        assert_eq!(first.as_slice(), second.as_slice());

        sorter.return_buffer(first).expect("return first");
        sorter.return_buffer(second).expect("return second");
        assert_eq!(sorter.pooled_buffers(), 2);
    }

    #[test]
    fn failed_sort_returns_its_buffer() {
        let mut sorter = SplatSorter::new(records(2), SortConfig::default()).expect("sorter");
        let mut bad = MAT4_IDENTITY;
        bad[5] = f32::INFINITY;
        let err = sorter.run_sort(&bad).expect_err("non-finite matrix");
        assert!(matches!(err, SortError::NonFiniteMatrix { index: 5, .. }));
        assert_eq!(sorter.pooled_buffers(), 2);
        assert_eq!(sorter.sort_count(), 0);
    }

    #[test]
    fn empty_input_sorts_to_empty_output() {
        let mut sorter = SplatSorter::new(Vec::new(), SortConfig::default()).expect("sorter");
        let sorted = sorter.run_sort(&MAT4_IDENTITY).expect("sort");
        assert!(sorted.as_slice().is_empty());
        assert!(sorted.views().quat.is_empty());
    }
}
