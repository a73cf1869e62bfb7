/// Age-swept raster cache.
pub mod cache;
/// Cache keys.
pub mod key;

pub use cache::{RasterCache, RasterCacheMetrics, RasterCacheResult};
pub use key::{RasterCacheKey, RasterCacheKeyId, RasterCacheKeyKind};
