//! Seeded integer grid noise.

/// Range of every hash and noise value.
pub const NOISE_RANGE: i64 = 128;

/// Integer hash reduced to `0..NOISE_RANGE`.
///
/// Computed in 128 bits so no intermediate step overflows for any `i64`
/// key.
pub fn hash_32_shift(key: i64) -> i64 {
    let mut key = key as i128;
    key = !key + (key << 15);
    key ^= key >> 12;
    key += key << 2;
    key ^= key >> 4;
    key *= 2057;
    key ^= key >> 16;
    key.rem_euclid(NOISE_RANGE as i128) as i64
}

/// Noise value of the grid cell `(x, y)` for a world seed.
pub fn noise(seed: i64, x: i64, y: i64) -> i64 {
    let y_hash = hash_32_shift(y);
    let x_hash = hash_32_shift(x.wrapping_add(y_hash));
    hash_32_shift(seed.wrapping_add(x_hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_values() {
        assert_eq!(hash_32_shift(0), 0);
        assert_eq!(hash_32_shift(1), 118);
        assert_eq!(hash_32_shift(2), 101);
        assert_eq!(hash_32_shift(-1), 27);
        assert_eq!(hash_32_shift(12345), 8);
        assert_eq!(hash_32_shift(-98765), 40);
        assert_eq!(hash_32_shift(1 << 40), 0);
    }

    #[test]
    fn test_noise_values() {
        assert_eq!(noise(7, 0, 0), 8);
        assert_eq!(noise(7, 1, 0), 50);
        assert_eq!(noise(7, 0, 1), 51);
        assert_eq!(noise(7, -5, 3), 67);
        assert_eq!(noise(7, 100, -100), 113);
    }

    #[test]
    fn test_noise_stays_in_range() {
        for x in -50..50 {
            for y in -50..50 {
                let n = noise(1234, x, y);
                assert!((0..NOISE_RANGE).contains(&n));
            }
        }
    }
}
