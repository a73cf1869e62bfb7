use super::*;

#[test]
fn fnv1a64_matches_reference_vectors() {
    assert_eq!(Fnv1a64::new_default().finish(), Fnv1a64::OFFSET_BASIS);

    let mut h = Fnv1a64::new_default();
    h.write_bytes(b"a");
    assert_eq!(h.finish(), 0xaf63_dc4c_8601_ec8c);

    let mut h = Fnv1a64::new_default();
    h.write_bytes(b"foobar");
    assert_eq!(h.finish(), 0x8594_4171_f739_67e8);
}

#[test]
fn fnv1a64_is_order_sensitive() {
    let mut a = Fnv1a64::new_default();
    a.write_u64(1);
    a.write_u64(2);
    let mut b = Fnv1a64::new_default();
    b.write_u64(2);
    b.write_u64(1);
    assert_ne!(a.finish(), b.finish());
}

#[test]
fn quantize_rounds_to_nearest_bucket() {
    assert_eq!(quantize_coeff(1.0, 1000.0), 1000);
    assert_eq!(quantize_coeff(1.00049, 1000.0), 1000);
    assert_eq!(quantize_coeff(1.0011, 1000.0), 1001);
    assert_eq!(quantize_coeff(-0.5004, 1000.0), -500);
    assert_eq!(quantize_coeff(0.0, 1000.0), 0);
    assert_eq!(quantize_coeff(0.999_999_9, 1000.0), 1000);
    assert_eq!(quantize_coeff(1.0006, 1000.0), 1001);
    assert_eq!(quantize_coeff(1.0 - f64::EPSILON, 1000.0), 1000);
}
