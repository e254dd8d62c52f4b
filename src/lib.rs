//! Back-to-front depth sorting for Gaussian splat scenes.
//!
//! Given raw 32-byte `.splat` records and a column-major view-projection
//! matrix, [`kernel::run_sort`] orders the splats farthest-first with a stable
//! four-pass radix sort and repacks them into one combined `f32` buffer laid
//! out as quaternions | scales | centers | colors, ready for instanced
//! rendering.

pub mod camera;
pub mod config;
pub mod demo;
pub mod error;
pub mod kernel;
pub mod key;
pub mod manager;
pub mod math;
pub mod parser;
pub mod pool;
pub mod record;
pub mod repack;
pub mod sort;
pub mod sorter;

pub use config::{DepthCheck, SortConfig};
pub use error::{SortError, SortResult};
pub use kernel::{run_sort, sort_indices, SortStats};
pub use manager::{SorterId, SorterManager};
pub use repack::{combined_len, AttributeViews, CombinedLayout};
pub use sorter::{SortedSplats, SplatSorter};
