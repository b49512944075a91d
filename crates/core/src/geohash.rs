//! Geohash encoding of GPS coordinates.
//!
//! Routes are keyed by the precision-5 geohash pair of their endpoints, so
//! the output is an equality key and must match the standard encoding
//! byte-for-byte: alternating longitude/latitude bisection (longitude
//! first), upper half appends a 1-bit, five bits per base-32 character.

/// Base-32 alphabet of the standard geohash encoding.
const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Precision used for route endpoint keys (cells of roughly 5 km).
pub const ROUTE_PRECISION: usize = 5;

/// Encode a latitude/longitude pair as a geohash of `precision` characters.
pub fn encode(lat: f64, lng: f64, precision: usize) -> String {
    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lng_range = (-180.0_f64, 180.0_f64);

    let mut hash = String::with_capacity(precision);
    let mut bits: u8 = 0;
    let mut bit_count: u8 = 0;
    let mut even_bit = true; // longitude first

    while hash.len() < precision {
        let (value, range) = if even_bit {
            (lng, &mut lng_range)
        } else {
            (lat, &mut lat_range)
        };

        let mid = (range.0 + range.1) / 2.0;
        bits <<= 1;
        if value >= mid {
            bits |= 1;
            range.0 = mid;
        } else {
            range.1 = mid;
        }

        even_bit = !even_bit;
        bit_count += 1;
        if bit_count == 5 {
            hash.push(BASE32[bits as usize] as char);
            bits = 0;
            bit_count = 0;
        }
    }

    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_s0000() {
        assert_eq!(encode(0.0, 0.0, 5), "s0000");
    }

    #[test]
    fn matches_published_vector() {
        // The classic reference vector for the standard encoding.
        assert_eq!(encode(57.64911, 10.40744, 11), "u4pruydqqvj");
    }

    #[test]
    fn output_is_length_exact() {
        for precision in 1..=12 {
            assert_eq!(encode(45.0, -120.0, precision).len(), precision);
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let a = encode(37.7749, -122.4194, 5);
        let b = encode(37.7749, -122.4194, 5);
        assert_eq!(a, b);
    }

    #[test]
    fn nearby_points_share_a_cell() {
        // Both points sit well inside the precision-5 cell at the origin
        // (cell edges are ~0.044 degrees).
        assert_eq!(encode(0.001, 0.001, 5), "s0000");
        assert_eq!(encode(0.02, 0.02, 5), "s0000");
    }

    #[test]
    fn longer_prefix_extends_shorter() {
        let short = encode(57.64911, 10.40744, 5);
        let long = encode(57.64911, 10.40744, 9);
        assert!(long.starts_with(&short));
    }
}
