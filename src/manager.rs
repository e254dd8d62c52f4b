use rayon::prelude::*;

use crate::config::SortConfig;
use crate::error::{SortError, SortResult};
use crate::record::RECORD_SIZE;
use crate::sorter::{SortedSplats, SplatSorter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SorterId(usize);

impl SorterId {
    pub fn get(self) -> usize {
        self.0
    }
}

/// Bounded set of independent sorters, one per loaded splat scene.
#[derive(Debug)]
pub struct SorterManager {
    config: SortConfig,
    sorters: Vec<(SorterId, SplatSorter)>,
    next_id: usize,
}

impl SorterManager {
    pub fn new(config: SortConfig) -> SortResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            sorters: Vec::new(),
            next_id: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.sorters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorters.is_empty()
    }

    pub fn max_sorters(&self) -> usize {
        self.config.max_sorters
    }

    /// Keeps at most `max_splats` whole records of `data`.
    pub fn create_sorter(&mut self, data: Vec<u8>, max_splats: usize) -> SortResult<SorterId> {
        if self.sorters.len() >= self.config.max_sorters {
            log::error!("sorter limit of {} reached", self.config.max_sorters);
            return Err(SortError::SorterLimit(self.config.max_sorters));
        }

        let mut data = data;
        let vertex_count = (data.len() / RECORD_SIZE).min(max_splats);
        data.truncate(vertex_count * RECORD_SIZE);

        let config = SortConfig {
            max_splats,
            ..self.config
        };
        let sorter = SplatSorter::new(data, config)?;

        let id = SorterId(self.next_id);
        self.next_id += 1;
        log::debug!("created sorter {} for {vertex_count} splats", id.0);
        self.sorters.push((id, sorter));
        Ok(id)
    }

    pub fn sorter_mut(&mut self, id: SorterId) -> SortResult<&mut SplatSorter> {
        self.sorters
            .iter_mut()
            .find(|(sid, _)| *sid == id)
            .map(|(_, sorter)| sorter)
            .ok_or(SortError::UnknownSorter(id.0))
    }

    pub fn dispose(&mut self, id: SorterId) -> bool {
        match self.sorters.iter().position(|(sid, _)| *sid == id) {
            Some(pos) => {
                drop(self.sorters.remove(pos));
                true
            }
            None => false,
        }
    }

    /// Sorts every scene for the same camera, in parallel. Results come back
    /// in creation order.
    pub fn sort_all(&mut self, view_proj: &[f32; 16]) -> Vec<(SorterId, SortResult<SortedSplats>)> {
        self.sorters
            .par_iter_mut()
            .map(|(id, sorter)| (*id, sorter.run_sort(view_proj)))
            .collect()
    }
}
