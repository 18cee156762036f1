use shared::{domain::GeoLocated, protocol::Coordinate};

/// Flattens map points into `[lat, lng]` pairs, keeping their order.
/// A missing collection packs to an empty list.
pub fn package_coordinates<P: GeoLocated>(points: Option<&[P]>) -> Vec<Coordinate> {
    points
        .unwrap_or(&[])
        .iter()
        .map(|point| [point.lat(), point.lng()])
        .collect()
}

#[cfg(test)]
mod tests {
    use shared::domain::GeoPoint;

    use super::*;

    struct Marker {
        position: (f64, f64),
    }

    impl GeoLocated for Marker {
        fn lat(&self) -> f64 {
            self.position.0
        }

        fn lng(&self) -> f64 {
            self.position.1
        }
    }

    #[test]
    fn absent_points_pack_to_empty_list() {
        assert!(package_coordinates::<GeoPoint>(None).is_empty());
        assert!(package_coordinates::<GeoPoint>(Some(&[][..])).is_empty());
    }

    #[test]
    fn pairs_follow_input_order() {
        let points = [
            GeoPoint::new(-31.98, 115.82),
            GeoPoint::new(-31.97, 115.81),
            GeoPoint::new(-31.96, 115.83),
        ];
        assert_eq!(
            package_coordinates(Some(&points[..])),
            vec![[-31.98, 115.82], [-31.97, 115.81], [-31.96, 115.83]]
        );
    }

    #[test]
    fn accepts_any_geolocated_point() {
        let markers = [Marker { position: (1.5, 2.5) }];
        assert_eq!(package_coordinates(Some(&markers[..])), vec![[1.5, 2.5]]);
    }
}
