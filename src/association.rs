//! Assignment of ground-truth plates to the ground-truth cars that carry them.
//!
//! Plates are always nested inside their car, so a plate belongs to a car when
//! the plate's centre lies inside the car box. This is first-fit, not
//! best-fit: cars are visited in order and each takes the first unclaimed
//! plate whose centre it contains.

use crate::annotation::GroundTruthPlate;
use crate::geometry::BBox;

/// For each car (in input order), the text of the plate associated with it.
///
/// `None` means no plate was associated. A plate without a text attribute
/// associates as `Some("")`. Each plate is claimed by at most one car.
pub fn associate_plates_to_cars(plates: &[GroundTruthPlate], cars: &[BBox]) -> Vec<Option<String>> {
    let mut claimed = vec![false; plates.len()];

    cars.iter()
        .map(|car| {
            for (idx, plate) in plates.iter().enumerate() {
                if claimed[idx] {
                    continue;
                }
                let (cx, cy) = plate.bbox.center();
                if car.contains_point(cx, cy) {
                    claimed[idx] = true;
                    return Some(plate.text.clone().unwrap_or_default());
                }
            }
            None
        })
        .collect()
}
