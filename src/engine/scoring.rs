use std::fmt;

use crate::geo::{nearest, planar_distance};
use crate::models::location::GeoPoint;
use crate::models::order::Order;
use crate::models::route::{ParkingAssessment, RiskLabel, ZoneRef};
use crate::models::site::ParkingZone;
use crate::models::vehicle::Vehicle;

const HIGH_RISK_BELOW: f64 = 30.0;

const FIT_BASELINE: f64 = 100.0;
const FIT_DISTANCE_SCALE: f64 = 1000.0;
const LARGE_VEHICLE_BONUS: f64 = 10.0;
const BONUS_MIN_PRIORITY: i32 = 3;

/// How the parking zone for a stop is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoneScoring {
    /// Closest zone by planar distance.
    #[default]
    Nearest,
    /// Highest combined distance, availability and vehicle fit.
    Weighted,
}

impl ZoneScoring {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "" | "nearest" => Some(ZoneScoring::Nearest),
            "weighted" | "4d" => Some(ZoneScoring::Weighted),
            _ => None,
        }
    }
}

impl fmt::Display for ZoneScoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneScoring::Nearest => f.write_str("nearest"),
            ZoneScoring::Weighted => f.write_str("weighted"),
        }
    }
}

pub fn best_zone<'a>(point: &GeoPoint, zones: &'a [ParkingZone]) -> Option<&'a ParkingZone> {
    nearest(point, zones).map(|(zone, _)| zone)
}

pub fn risk(zone: Option<&ParkingZone>) -> RiskLabel {
    match zone {
        None => RiskLabel::Critical,
        Some(zone) if zone.availability_score < HIGH_RISK_BELOW => RiskLabel::HighRisk,
        Some(_) => RiskLabel::Safe,
    }
}

pub fn suggested_action(risk: RiskLabel) -> &'static str {
    match risk {
        RiskLabel::Safe => "Proceed",
        RiskLabel::HighRisk => "Re-route to nearest loading zone",
        RiskLabel::Critical => "No parking available: arrange kerbside hand-off",
    }
}

pub fn weighted_fit(order: &Order, zone: &ParkingZone, vehicle: Option<&Vehicle>) -> f64 {
    let distance = planar_distance(&order.location, &zone.location);
    (FIT_BASELINE - distance * FIT_DISTANCE_SCALE)
        + zone.availability_score
        + vehicle_bonus(order, vehicle)
}

fn vehicle_bonus(order: &Order, vehicle: Option<&Vehicle>) -> f64 {
    let qualifies = vehicle.is_some_and(Vehicle::is_large_capacity)
        && order.priority_score > BONUS_MIN_PRIORITY;

    if qualifies { LARGE_VEHICLE_BONUS } else { 0.0 }
}

/// Zone with the strictly highest fit; the earliest zone wins ties.
pub fn best_weighted_zone<'a>(
    order: &Order,
    zones: &'a [ParkingZone],
    vehicle: Option<&Vehicle>,
) -> Option<(&'a ParkingZone, f64)> {
    let mut best: Option<(&ParkingZone, f64)> = None;

    for zone in zones {
        let fit = weighted_fit(order, zone, vehicle);
        match best {
            Some((_, best_fit)) if fit <= best_fit => {}
            _ => best = Some((zone, fit)),
        }
    }

    best
}

pub fn assess(
    order: &Order,
    zones: &[ParkingZone],
    vehicle: Option<&Vehicle>,
    scoring: ZoneScoring,
) -> ParkingAssessment {
    let (zone, fit_score) = match scoring {
        ZoneScoring::Nearest => (best_zone(&order.location, zones), None),
        ZoneScoring::Weighted => match best_weighted_zone(order, zones, vehicle) {
            Some((zone, fit)) => (Some(zone), Some(fit)),
            None => (None, None),
        },
    };

    let risk = risk(zone);

    ParkingAssessment {
        zone: zone.map(|zone| ZoneRef {
            id: zone.id,
            name: zone.name.clone(),
            availability_score: zone.availability_score,
            distance: planar_distance(&order.location, &zone.location),
        }),
        fit_score,
        risk,
        suggested_action: suggested_action(risk).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::{assess, best_weighted_zone, best_zone, risk, weighted_fit, ZoneScoring};
    use crate::models::location::GeoPoint;
    use crate::models::order::{Order, OrderStatus};
    use crate::models::route::RiskLabel;
    use crate::models::site::ParkingZone;
    use crate::models::vehicle::{Vehicle, VehicleStatus};

    fn zone(id: i64, lat: f64, lng: f64, availability_score: f64) -> ParkingZone {
        ParkingZone {
            id,
            name: format!("zone-{id}"),
            location: GeoPoint { lat, lng },
            availability_score,
        }
    }

    fn order(lat: f64, lng: f64, priority_score: i32) -> Order {
        Order {
            id: 1,
            customer_name: "test-customer".to_string(),
            address: "1 Test Street".to_string(),
            location: GeoPoint { lat, lng },
            priority_score,
            time_window: Some("09:00-11:00".to_string()),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }

    fn vehicle(kind: &str) -> Vehicle {
        Vehicle {
            id: 1,
            name: "test-vehicle".to_string(),
            vehicle_type: kind.to_string(),
            capacity: 40,
            status: VehicleStatus::Available,
        }
    }

    #[test]
    fn single_zone_is_always_chosen() {
        let zones = vec![zone(1, 80.0, 170.0, 5.0)];
        let chosen = best_zone(&GeoPoint::new(-45.0, -120.0), &zones).unwrap();
        assert_eq!(chosen.id, 1);
    }

    #[test]
    fn closest_zone_wins() {
        let zones = vec![zone(1, 53.60, 10.00, 90.0), zone(2, 53.551, 9.994, 10.0)];
        let chosen = best_zone(&GeoPoint::new(53.5511, 9.9937), &zones).unwrap();
        assert_eq!(chosen.id, 2);
    }

    #[test]
    fn equidistant_zones_keep_input_order() {
        let zones = vec![zone(1, 1.0, 0.0, 10.0), zone(2, -1.0, 0.0, 50.0)];
        let chosen = best_zone(&GeoPoint::new(0.0, 0.0), &zones).unwrap();
        assert_eq!(chosen.id, 1);
    }

    #[test]
    fn no_zones_means_no_choice() {
        assert!(best_zone(&GeoPoint::new(0.0, 0.0), &[]).is_none());
    }

    #[rstest]
    #[case(0.0, RiskLabel::HighRisk)]
    #[case(29.9, RiskLabel::HighRisk)]
    #[case(30.0, RiskLabel::Safe)]
    #[case(95.0, RiskLabel::Safe)]
    fn risk_follows_availability_threshold(#[case] score: f64, #[case] expected: RiskLabel) {
        assert_eq!(risk(Some(&zone(1, 0.0, 0.0, score))), expected);
    }

    #[test]
    fn missing_zone_is_critical() {
        assert_eq!(risk(None), RiskLabel::Critical);
    }

    #[test]
    fn large_vehicle_bonus_needs_high_priority() {
        let z = zone(1, 0.0, 0.0, 50.0);
        let van = vehicle("Electric Van");

        assert_eq!(weighted_fit(&order(0.0, 0.0, 4), &z, Some(&van)), 160.0);
        assert_eq!(weighted_fit(&order(0.0, 0.0, 3), &z, Some(&van)), 150.0);
        assert_eq!(weighted_fit(&order(0.0, 0.0, 4), &z, Some(&vehicle("Bike"))), 150.0);
        assert_eq!(weighted_fit(&order(0.0, 0.0, 4), &z, None), 150.0);
    }

    #[test]
    fn weighted_scoring_trades_distance_for_availability() {
        // 0.01 degrees costs 10 points, which 60 extra availability outweighs.
        let zones = vec![zone(1, 0.0, 0.0, 10.0), zone(2, 0.01, 0.0, 70.0)];
        let (chosen, fit) = best_weighted_zone(&order(0.0, 0.0, 1), &zones, None).unwrap();
        assert_eq!(chosen.id, 2);
        assert!((fit - 160.0).abs() < 1e-9);

        let nearest = best_zone(&GeoPoint::new(0.0, 0.0), &zones).unwrap();
        assert_eq!(nearest.id, 1);
    }

    #[test]
    fn assessment_reports_zone_risk_and_action() {
        let zones = vec![zone(7, 0.0, 0.0, 12.0)];
        let assessment = assess(&order(0.0, 0.0, 2), &zones, None, ZoneScoring::Nearest);

        let zone = assessment.zone.unwrap();
        assert_eq!(zone.id, 7);
        assert_eq!(zone.distance, 0.0);
        assert_eq!(assessment.risk, RiskLabel::HighRisk);
        assert_eq!(assessment.suggested_action, "Re-route to nearest loading zone");
        assert!(assessment.fit_score.is_none());
    }

    #[test]
    fn weighted_assessment_carries_fit_score() {
        let zones = vec![zone(1, 0.0, 0.0, 40.0)];
        let assessment = assess(&order(0.0, 0.0, 2), &zones, None, ZoneScoring::Weighted);
        assert_eq!(assessment.fit_score, Some(140.0));
        assert_eq!(assessment.risk, RiskLabel::Safe);
    }

    #[test]
    fn assessment_without_zones_is_critical() {
        let assessment = assess(&order(0.0, 0.0, 2), &[], None, ZoneScoring::Weighted);
        assert!(assessment.zone.is_none());
        assert_eq!(assessment.risk, RiskLabel::Critical);
    }

    #[test]
    fn scoring_labels_parse() {
        assert_eq!(ZoneScoring::from_label("Weighted"), Some(ZoneScoring::Weighted));
        assert_eq!(ZoneScoring::from_label(""), Some(ZoneScoring::Nearest));
        assert_eq!(ZoneScoring::from_label("random"), None);
    }
}
