use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Bbox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Bbox {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self, String> {
        if !(-180.0..=180.0).contains(&xmin) || !(-180.0..=180.0).contains(&xmax) {
            return Err("Longitude values must be between -180 and 180".to_string());
        }

        if !(-90.0..=90.0).contains(&ymin) || !(-90.0..=90.0).contains(&ymax) {
            return Err("Latitude values must be between -90 and 90".to_string());
        }

        if xmin > xmax || ymin > ymax {
            return Err("Min values must be <= max values".to_string());
        }

        Ok(Bbox {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    /// Extent of every (longitude, latitude) point in `rings`.
    ///
    /// Returns `Ok(None)` when there are no points. Footprints crossing the
    /// antimeridian produce a box spanning the whole longitude range between
    /// their extremes.
    pub fn from_rings(rings: &[Vec<(f64, f64)>]) -> Result<Option<Self>, String> {
        let mut points = rings.iter().flatten().peekable();
        if points.peek().is_none() {
            return Ok(None);
        }

        let (mut xmin, mut xmax) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut ymin, mut ymax) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(x, y) in points {
            xmin = xmin.min(x);
            xmax = xmax.max(x);
            ymin = ymin.min(y);
            ymax = ymax.max(y);
        }

        Bbox::new(xmin, xmax, ymin, ymax).map(Some)
    }
}

#[cfg(test)]
mod test {
    use crate::bbox::Bbox;
    #[test]
    fn test_bbox_coords_are_within_ranges() {
        // Test valid coordinates
        let valid_bbox = Bbox::new(-67.2, -58.7, 70.9, 73.3);
        assert!(valid_bbox.is_ok());

        // Test longitude out of range
        let invalid_lon = Bbox::new(-200.0, 0.0, 0.0, 10.0);
        assert!(invalid_lon.is_err());

        // Test latitude out of range
        let invalid_lat = Bbox::new(0.0, 10.0, -100.0, 0.0);
        assert!(invalid_lat.is_err());

        // Test min > max
        let invalid_order = Bbox::new(10.0, 0.0, 0.0, 10.0);
        assert!(invalid_order.is_err());
    }

    #[test]
    fn test_bbox_from_rings() {
        let rings = vec![
            vec![(-108.5, 38.1), (-108.2, 38.1), (-108.2, 59.9), (-108.5, 38.1)],
            vec![(-109.0, 60.0), (-108.0, 61.5)],
        ];

        let bbox = Bbox::from_rings(&rings).unwrap().unwrap();

        assert_eq!(bbox, Bbox::new(-109.0, -108.0, 38.1, 61.5).unwrap());
    }

    #[test]
    fn test_bbox_from_no_points() {
        assert_eq!(Bbox::from_rings(&[]).unwrap(), None);
        assert_eq!(Bbox::from_rings(&[Vec::new()]).unwrap(), None);
    }

    #[test]
    fn test_bbox_from_rings_rejects_projected_coordinates() {
        let rings = vec![vec![(500_000.0, 4_000_000.0)]];
        assert!(Bbox::from_rings(&rings).is_err());
    }
}
