//! Rule-of-thumb fire-risk heuristics
//!
//! These are the simplified indices the prediction service reports alongside
//! its model output. They need nothing but the weather, so the local fallback
//! computes them too.

use crate::prediction::types::{EnvironmentalData, RiskFactors, RiskLevel};

/// Simplified Fire Weather Index, normalised to 0-1
///
/// ```text
/// FFMC = clamp(85 + 0.4(T - 20) - 0.5 H, 0, 101)
/// DMC  = max(1, 50 - 0.5 H)
/// DC   = max(1, 2 T - 0.8 H)
/// ISI  = 0.208 × FFMC × (0.05 + 0.1 W)
/// FWI  = 2 ln(ISI + 1) + 0.45 ln(DMC + 1) + 0.15 ln(DC + 1)
/// ```
pub fn fire_weather_index(temperature_c: f64, humidity_pct: f64, wind_kmh: f64) -> f64 {
    let ffmc = (85.0 + 0.4 * (temperature_c - 20.0) - 0.5 * humidity_pct).clamp(0.0, 101.0);
    let dmc = (50.0 - humidity_pct * 0.5).max(1.0);
    let dc = (temperature_c * 2.0 - humidity_pct * 0.8).max(1.0);
    // Negative wind would drive ISI below -1 and the log to NaN
    let isi = (0.208 * ffmc * (0.05 + 0.1 * wind_kmh)).max(0.0);
    let fwi = 2.0 * (isi + 1.0).ln() + 0.45 * (dmc + 1.0).ln() + 0.15 * (dc + 1.0).ln();
    (fwi / 50.0).clamp(0.0, 1.0)
}

/// Grade temperature, humidity and wind individually
pub fn analyze_risk_factors(env: &EnvironmentalData) -> RiskFactors {
    let temperature = if env.temperature > 35.0 {
        RiskLevel::High
    } else if env.temperature > 25.0 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    };

    let humidity = if env.humidity < 30.0 {
        RiskLevel::High
    } else if env.humidity < 50.0 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    };

    let wind = if env.wind_speed > 25.0 {
        RiskLevel::High
    } else if env.wind_speed > 15.0 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    };

    RiskFactors {
        temperature,
        humidity,
        wind,
    }
}

/// Actions for a risk score, plus weather-specific advisories
pub fn recommendations(risk_score: f64, env: &EnvironmentalData) -> Vec<String> {
    let tiered: &[&str] = if risk_score > 0.8 {
        &[
            "Implement immediate fire prevention measures",
            "Consider evacuation planning for high-risk areas",
            "Deploy additional fire monitoring resources",
            "Issue red flag warning to public",
        ]
    } else if risk_score > 0.6 {
        &[
            "Increase fire patrol frequency",
            "Restrict outdoor burning activities",
            "Prepare firefighting resources for rapid deployment",
            "Issue fire weather watch",
        ]
    } else if risk_score > 0.4 {
        &[
            "Monitor weather conditions closely",
            "Maintain standard fire prevention protocols",
            "Educate public about fire safety",
        ]
    } else {
        &["Continue routine fire monitoring"]
    };

    let mut out: Vec<String> = tiered.iter().map(|s| (*s).to_string()).collect();
    if env.wind_speed > 20.0 {
        out.push("High wind speeds detected - extra caution with any ignition sources".to_string());
    }
    if env.humidity < 30.0 {
        out.push("Very low humidity - vegetation extremely dry and flammable".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::EnvironmentalSnapshot;
    use crate::core_types::WindDirection;

    fn env(temp: f64, humidity: f64, wind: f64) -> EnvironmentalData {
        EnvironmentalData::from_snapshot(
            &EnvironmentalSnapshot::new(wind, WindDirection::NE, temp, humidity),
            0.6,
            1500.0,
            15.0,
        )
    }

    #[test]
    fn test_fwi_bounded() {
        for t in [-20.0, 0.0, 25.0, 45.0, 60.0] {
            for h in [0.0, 30.0, 100.0] {
                for w in [-5.0, 0.0, 15.0, 80.0] {
                    let fwi = fire_weather_index(t, h, w);
                    assert!((0.0..=1.0).contains(&fwi), "fwi {fwi} for {t}/{h}/{w}");
                }
            }
        }
    }

    #[test]
    fn test_fwi_rises_with_wind_and_dryness() {
        let calm = fire_weather_index(32.0, 45.0, 5.0);
        let windy = fire_weather_index(32.0, 45.0, 30.0);
        let dry = fire_weather_index(32.0, 15.0, 5.0);
        assert!(windy > calm);
        assert!(dry > calm);
    }

    #[test]
    fn test_risk_factor_grades() {
        let factors = analyze_risk_factors(&env(36.0, 29.0, 26.0));
        assert_eq!(factors.temperature, RiskLevel::High);
        assert_eq!(factors.humidity, RiskLevel::High);
        assert_eq!(factors.wind, RiskLevel::High);

        let factors = analyze_risk_factors(&env(32.0, 45.0, 15.0));
        assert_eq!(factors.temperature, RiskLevel::Moderate);
        assert_eq!(factors.humidity, RiskLevel::Moderate);
        assert_eq!(factors.wind, RiskLevel::Low);

        let factors = analyze_risk_factors(&env(25.0, 50.0, 10.0));
        assert_eq!(factors.temperature, RiskLevel::Low);
        assert_eq!(factors.humidity, RiskLevel::Low);
    }

    #[test]
    fn test_recommendation_tiers() {
        let mild = env(20.0, 60.0, 5.0);
        assert_eq!(recommendations(0.1, &mild), vec!["Continue routine fire monitoring"]);
        assert_eq!(recommendations(0.5, &mild).len(), 3);
        assert_eq!(recommendations(0.7, &mild).len(), 4);
        assert!(recommendations(0.9, &mild)[3].contains("red flag"));

        let harsh = env(40.0, 10.0, 35.0);
        let recs = recommendations(0.1, &harsh);
        assert_eq!(recs.len(), 3);
        assert!(recs[1].starts_with("High wind"));
        assert!(recs[2].starts_with("Very low humidity"));
    }
}
