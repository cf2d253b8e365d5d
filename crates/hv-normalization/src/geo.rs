//! Deterministic hospital placement and region buckets.
//!
//! The dataset carries no coordinates, so each hospital name is hashed to a
//! stable point inside the contiguous-US bounding box and the region is read
//! off that point. The hash runs over UTF-16 code units so that placements
//! match those computed by browser front-ends for the same names.

use hv_model::{Region, UNKNOWN_HOSPITAL};

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

const LON_MIN: f64 = -124.7;
const LON_MAX: f64 = -66.9;
const LAT_MIN: f64 = 25.0;
const LAT_MAX: f64 = 49.2;

/// Maps a string to `[0, 1)` with 32-bit FNV-1a.
pub fn hash_to_unit(s: &str) -> f64 {
    let hash = s.encode_utf16().fold(FNV_OFFSET_BASIS, |h, unit| {
        (h ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    });
    f64::from(hash) / 4_294_967_296.0
}

/// Stable `(lon, lat)` for a hospital name, kept away from the box edges.
pub fn hospital_to_lon_lat(name: &str) -> (f64, f64) {
    let t = hash_to_unit(name);
    let t2 = hash_to_unit(&format!("{name}::b"));

    let lon = LON_MIN + (LON_MAX - LON_MIN) * (0.06 + 0.88 * t);
    let lat = LAT_MIN + (LAT_MAX - LAT_MIN) * (0.08 + 0.84 * t2);
    (lon, lat)
}

/// Coarse region of a point.
pub fn region_for(lon: f64, lat: f64) -> Region {
    if lon <= -110.0 {
        Region::West
    } else if lon >= -90.0 && lat >= 37.0 {
        Region::Northeast
    } else if lon >= -90.0 {
        Region::South
    } else {
        Region::Midwest
    }
}

/// Region of a (cleaned) hospital name; a missing name hashes `Unknown`.
pub fn region_for_hospital(hospital: Option<&str>) -> Region {
    let (lon, lat) = hospital_to_lon_lat(hospital.unwrap_or(UNKNOWN_HOSPITAL));
    region_for(lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_reference_values() {
        assert_eq!(hash_to_unit(""), 2_166_136_261.0 / 4_294_967_296.0);
        // FNV-1a("a") = 0xe40c292c
        assert_eq!(hash_to_unit("a"), f64::from(0xe40c_292c_u32) / 4_294_967_296.0);
    }

    #[test]
    fn test_hash_range() {
        for name in ["", "a", "Mercy General", "Sons and Miller", "Ωmega ☤"] {
            let t = hash_to_unit(name);
            assert!((0.0..1.0).contains(&t), "{name}: {t}");
        }
    }

    #[test]
    fn test_lon_lat_within_inset_box() {
        for name in ["Kim Inc", "Cook PLC", "Unknown", "Hernandez Rogers and Vang"] {
            let (lon, lat) = hospital_to_lon_lat(name);
            assert!(lon >= LON_MIN + (LON_MAX - LON_MIN) * 0.06);
            assert!(lon < LON_MIN + (LON_MAX - LON_MIN) * 0.94);
            assert!(lat >= LAT_MIN + (LAT_MAX - LAT_MIN) * 0.08);
            assert!(lat < LAT_MIN + (LAT_MAX - LAT_MIN) * 0.92);
        }
    }

    #[test]
    fn test_region_buckets() {
        assert_eq!(region_for(-120.0, 40.0), Region::West);
        assert_eq!(region_for(-110.0, 30.0), Region::West);
        assert_eq!(region_for(-80.0, 40.0), Region::Northeast);
        assert_eq!(region_for(-90.0, 37.0), Region::Northeast);
        assert_eq!(region_for(-80.0, 30.0), Region::South);
        assert_eq!(region_for(-100.0, 45.0), Region::Midwest);
        assert_eq!(region_for(-100.0, 30.0), Region::Midwest);
    }

    #[test]
    fn test_missing_hospital_uses_placeholder() {
        assert_eq!(
            region_for_hospital(None),
            region_for_hospital(Some(UNKNOWN_HOSPITAL))
        );
    }

    #[test]
    fn test_placement_is_deterministic() {
        assert_eq!(hospital_to_lon_lat("Kim Inc"), hospital_to_lon_lat("Kim Inc"));
    }
}
