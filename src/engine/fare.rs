use crate::models::ride::Pricing;

// Straight-line estimate: assumed average speed, flat 10-minute fare basis
// for a zero-distance trip. Not road-network ground truth.
const AVERAGE_SPEED_KMH: f64 = 30.0;
const ZERO_DISTANCE_DURATION_MIN: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct FareSchedule {
    pub base_fare: f64,
    pub per_km_rate: f64,
    pub per_min_rate: f64,
    pub default_surge: f64,
}

impl Default for FareSchedule {
    fn default() -> Self {
        Self {
            base_fare: 50.0,
            per_km_rate: 10.0,
            per_min_rate: 2.0,
            default_surge: 1.0,
        }
    }
}

pub fn quote(schedule: &FareSchedule, distance_km: f64, duration_min: f64, surge: f64) -> Pricing {
    let total = (schedule.base_fare
        + distance_km * schedule.per_km_rate
        + duration_min * schedule.per_min_rate)
        * surge;

    Pricing {
        base_fare: schedule.base_fare,
        per_km: schedule.per_km_rate,
        per_minute: schedule.per_min_rate,
        surge_multiplier: surge,
        total_fare: round2(total),
    }
}

pub fn estimate_duration_min(distance_km: f64) -> f64 {
    if distance_km > 0.0 {
        (distance_km / AVERAGE_SPEED_KMH) * 60.0
    } else {
        ZERO_DISTANCE_DURATION_MIN
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::{estimate_duration_min, quote, round1, round2, FareSchedule};

    #[test]
    fn minimum_fare_is_the_base_fare() {
        let pricing = quote(&FareSchedule::default(), 0.0, 0.0, 1.0);
        assert_eq!(pricing.total_fare, 50.0);
    }

    #[test]
    fn fare_for_ten_km_twenty_min() {
        let pricing = quote(&FareSchedule::default(), 10.0, 20.0, 1.0);
        assert_eq!(pricing.total_fare, 190.0);
        assert_eq!(pricing.base_fare, 50.0);
        assert_eq!(pricing.per_km, 10.0);
        assert_eq!(pricing.per_minute, 2.0);
        assert_eq!(pricing.surge_multiplier, 1.0);
    }

    #[test]
    fn surge_scales_the_whole_fare() {
        let pricing = quote(&FareSchedule::default(), 10.0, 20.0, 2.0);
        assert_eq!(pricing.total_fare, 380.0);
    }

    #[test]
    fn overridden_schedule_changes_the_rates() {
        let schedule = FareSchedule {
            base_fare: 30.0,
            per_km_rate: 8.0,
            per_min_rate: 1.5,
            default_surge: 1.0,
        };
        let pricing = quote(&schedule, 10.0, 20.0, 1.0);
        assert_eq!(pricing.total_fare, 140.0);
    }

    #[test]
    fn fare_is_rounded_to_two_decimals() {
        let pricing = quote(&FareSchedule::default(), 0.333, 0.0, 1.0);
        assert_eq!(pricing.total_fare, 53.33);
    }

    #[test]
    fn duration_assumes_thirty_kmh() {
        assert_eq!(estimate_duration_min(15.0), 30.0);
        assert_eq!(estimate_duration_min(30.0), 60.0);
    }

    #[test]
    fn zero_distance_gets_the_flat_duration() {
        assert_eq!(estimate_duration_min(0.0), 10.0);
    }

    #[test]
    fn rounding_helpers() {
        assert_eq!(round2(1606.7289730238222), 1606.73);
        assert_eq!(round1(222.38985328911746), 222.4);
    }
}
