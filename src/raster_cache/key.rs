use crate::foundation::config::DEFAULT_SCALE_QUANTIZATION;
use crate::foundation::core::Affine;
use crate::foundation::math::{Fnv1a64, quantize_coeff};

/// What kind of content a cache id refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RasterCacheKeyKind {
    /// A display list, keyed by its unique id.
    DisplayList,
    /// A whole layer, keyed by the layer's unique id.
    Layer,
    /// The children of a layer, keyed by a hash of the child ids.
    LayerChildren,
}

/// Identity of cacheable content, independent of the transform it is drawn under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RasterCacheKeyId {
    unique_id: u64,
    kind: RasterCacheKeyKind,
}

impl RasterCacheKeyId {
    /// Build an id for `kind` content with `unique_id`.
    pub fn new(unique_id: u64, kind: RasterCacheKeyKind) -> Self {
        Self { unique_id, kind }
    }

    /// Id for the ordered set of `child_ids` painted together.
    ///
    /// The same children in the same order always produce the same id.
    pub fn from_children(child_ids: impl IntoIterator<Item = u64>) -> Self {
        let mut h = Fnv1a64::new_default();
        let mut n = 0u64;
        for id in child_ids {
            h.write_u64(id);
            n += 1;
        }
        h.write_u64(n);
        h.write_u8(RasterCacheKeyKind::LayerChildren as u8);
        Self::new(h.finish(), RasterCacheKeyKind::LayerChildren)
    }

    /// Content id.
    pub fn unique_id(&self) -> u64 {
        self.unique_id
    }

    /// Content kind.
    pub fn kind(&self) -> RasterCacheKeyKind {
        self.kind
    }
}

/// Cache key: content id plus the scale/skew part of the device transform, bucketed.
///
/// Translation is dropped so that scrolling content keeps hitting the same entry, and the
/// remaining coefficients are fixed-point quantized so float noise between preroll passes does
/// not cause misses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RasterCacheKey {
    id: RasterCacheKeyId,
    matrix: [i64; 4],
}

impl RasterCacheKey {
    /// Build a key with the default quantization factor.
    pub fn new(id: RasterCacheKeyId, matrix: Affine) -> Self {
        Self::with_quantization(id, matrix, DEFAULT_SCALE_QUANTIZATION)
    }

    /// Build a key bucketing matrix coefficients by `factor`.
    pub fn with_quantization(id: RasterCacheKeyId, matrix: Affine, factor: f64) -> Self {
        let [a, b, c, d, _, _] = matrix.as_coeffs();
        Self {
            id,
            matrix: [
                quantize_coeff(a, factor),
                quantize_coeff(b, factor),
                quantize_coeff(c, factor),
                quantize_coeff(d, factor),
            ],
        }
    }

    /// Content id of this key.
    pub fn id(&self) -> RasterCacheKeyId {
        self.id
    }

    /// Quantized `[a, b, c, d]` coefficients.
    pub fn scale_bucket(&self) -> [i64; 4] {
        self.matrix
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster_cache/key.rs"]
mod tests;
