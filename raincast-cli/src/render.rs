//! Terminal rendering of a weather report.

use raincast_core::{AlertTier, HourlySample, WeatherReport};

const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub fn print_report(report: &WeatherReport) {
    println!("Weather at {}", report.coordinates);
    println!("{:.1}°C | {}", report.temperature_c, report.condition);
    println!();

    // Predicted values are printed as-is: the model has no clamp, so a
    // slightly negative amount shows up as such rather than being rounded
    // to a reassuring zero.
    if report.rain_expected {
        println!("Rain expected. Predicted: {:.2} mm", report.precipitation_mm);
    } else {
        println!(
            "No rain expected. Predicted: {:.2} mm",
            report.precipitation_mm
        );
    }
    if let Some(alert) = alert_line(report.alert) {
        println!("{alert}");
    }
    println!();

    println!("Humidity     {:.0}%", report.humidity_pct);
    println!("Wind         {:.1} km/h", report.wind_kmh);
    println!("Visibility   {}", report.visibility_km);
    println!("Dew point    {:.1}°C", report.dew_point_c);
    println!("Pressure     {:.0} hPa", report.pressure_msl_hpa);
    println!("Sunrise      {}", report.sunrise);
    println!("Sunset       {}", report.sunset);
    println!();

    print_rain_chart(&report.hourly_rain);
}

fn alert_line(alert: AlertTier) -> Option<&'static str> {
    match alert {
        AlertTier::HeavyRain => Some("Alert: heavy rain ongoing"),
        AlertTier::LightRain => Some("Alert: light rain ongoing"),
        AlertTier::None => None,
    }
}

fn print_rain_chart(samples: &[HourlySample]) {
    if samples.is_empty() {
        return;
    }
    let values: Vec<f64> = samples.iter().map(|s| s.rain_mm).collect();
    let max = values.iter().cloned().fold(0.0_f64, f64::max);
    println!("Hourly rain (mm, peak {max:.1})");
    println!("{}", sparkline(&values));
    println!("{}", hour_axis(samples));
}

/// Scale values against their maximum and render one block character each.
fn sparkline(values: &[f64]) -> String {
    let max = values.iter().cloned().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return BLOCKS[0].to_string().repeat(values.len());
    }
    values
        .iter()
        .map(|v| {
            let level = ((v / max) * 7.0).round().clamp(0.0, 7.0) as usize;
            BLOCKS[level]
        })
        .collect()
}

/// Hour labels every six samples, aligned under the sparkline.
fn hour_axis(samples: &[HourlySample]) -> String {
    let mut axis = String::new();
    for (i, sample) in samples.iter().enumerate() {
        if i % 6 == 0 {
            // ISO local time "YYYY-MM-DDTHH:MM"; fall back to a blank slot
            // if the source ever changes shape.
            let hour = sample.time.get(11..13).unwrap_or("  ");
            axis.push_str(hour);
        } else if axis.len() < i + 1 {
            axis.push(' ');
        }
    }
    axis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparkline_scales_to_peak() {
        // Half the peak rounds up to level 4 of 7.
        let line = sparkline(&[0.0, 5.0, 10.0]);
        assert_eq!(line, "▁▅█");
    }

    #[test]
    fn sparkline_all_dry_is_flat() {
        assert_eq!(sparkline(&[0.0, 0.0, 0.0]), "▁▁▁");
    }

    #[test]
    fn sparkline_negative_values_clamp_to_floor() {
        assert_eq!(sparkline(&[-1.0, 2.0]), "▁█");
    }

    #[test]
    fn alert_lines_per_tier() {
        assert!(alert_line(AlertTier::HeavyRain).unwrap().contains("heavy"));
        assert!(alert_line(AlertTier::LightRain).unwrap().contains("light"));
        assert!(alert_line(AlertTier::None).is_none());
    }

    #[test]
    fn hour_axis_labels_every_sixth_sample() {
        let samples: Vec<HourlySample> = (0..12)
            .map(|i| HourlySample {
                time: format!("2026-08-29T{i:02}:00"),
                rain_mm: 0.0,
            })
            .collect();
        let axis = hour_axis(&samples);
        assert!(axis.starts_with("00"));
        assert!(axis.contains("06"));
    }
}
