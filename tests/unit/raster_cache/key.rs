use super::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn hash_of(key: &RasterCacheKey) -> u64 {
    let mut h = DefaultHasher::new();
    key.hash(&mut h);
    h.finish()
}

fn dl(id: u64) -> RasterCacheKeyId {
    RasterCacheKeyId::new(id, RasterCacheKeyKind::DisplayList)
}

#[test]
fn same_bucket_keys_are_equal_and_hash_equal() {
    let a = RasterCacheKey::new(dl(7), Affine::scale(1.0));
    let b = RasterCacheKey::new(dl(7), Affine::scale(1.000_000_1));
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn one_ulp_below_a_bucket_edge_shares_the_key() {
    let a = RasterCacheKey::new(dl(7), Affine::scale(1.0));
    let b = RasterCacheKey::new(dl(7), Affine::scale(1.0 - f64::EPSILON));
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn translation_does_not_affect_the_key() {
    let a = RasterCacheKey::new(dl(7), Affine::scale(2.0));
    let b = RasterCacheKey::new(dl(7), Affine::translate((13.5, -4.0)) * Affine::scale(2.0));
    assert_eq!(a, b);
    assert_eq!(a.scale_bucket(), [2000, 0, 0, 2000]);
}

#[test]
fn different_scale_buckets_are_unequal() {
    let a = RasterCacheKey::new(dl(7), Affine::scale(1.0));
    let b = RasterCacheKey::new(dl(7), Affine::scale(1.5));
    assert_ne!(a, b);
    let rotated = RasterCacheKey::new(dl(7), Affine::rotate(0.1));
    assert_ne!(a, rotated);
}

#[test]
fn identity_and_kind_participate_in_equality() {
    let m = Affine::scale(1.0);
    assert_ne!(RasterCacheKey::new(dl(1), m), RasterCacheKey::new(dl(2), m));
    assert_ne!(
        RasterCacheKey::new(dl(1), m),
        RasterCacheKey::new(RasterCacheKeyId::new(1, RasterCacheKeyKind::Layer), m)
    );
}

#[test]
fn quantization_factor_controls_bucket_width() {
    let id = dl(3);
    let coarse_a = RasterCacheKey::with_quantization(id, Affine::scale(1.02), 10.0);
    let coarse_b = RasterCacheKey::with_quantization(id, Affine::scale(1.04), 10.0);
    assert_eq!(coarse_a, coarse_b);
    let fine_a = RasterCacheKey::with_quantization(id, Affine::scale(1.02), 1000.0);
    let fine_b = RasterCacheKey::with_quantization(id, Affine::scale(1.04), 1000.0);
    assert_ne!(fine_a, fine_b);
}

#[test]
fn children_ids_are_stable_and_order_sensitive() {
    let a = RasterCacheKeyId::from_children([1, 2, 3]);
    let b = RasterCacheKeyId::from_children(vec![1, 2, 3]);
    let c = RasterCacheKeyId::from_children([3, 2, 1]);
    let d = RasterCacheKeyId::from_children([1, 2]);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, d);
    assert_eq!(a.kind(), RasterCacheKeyKind::LayerChildren);
}
