use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Rain,
    Snow,
    Storm,
    Windy,
    Fog,
}

impl WeatherCondition {
    pub fn is_wet(self) -> bool {
        matches!(self, Self::Rain | Self::Snow | Self::Storm)
    }
}

/// Read-only weather snapshot from an external provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub temperature_c: f64,
    pub condition: WeatherCondition,
    /// Probability in `[0, 1]`.
    #[serde(default)]
    pub precipitation_probability: f64,
    /// Relative humidity in `[0, 1]`.
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub wind_speed_kmh: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemperatureBand {
    VeryCold,
    Cold,
    Cool,
    Mild,
    Warm,
    Hot,
}

impl TemperatureBand {
    pub fn from_celsius(temperature_c: f64) -> Self {
        if temperature_c < 0.0 {
            Self::VeryCold
        } else if temperature_c < 10.0 {
            Self::Cold
        } else if temperature_c < 18.0 {
            Self::Cool
        } else if temperature_c < 24.0 {
            Self::Mild
        } else if temperature_c < 30.0 {
            Self::Warm
        } else {
            Self::Hot
        }
    }
}

impl WeatherData {
    pub fn band(&self) -> TemperatureBand {
        TemperatureBand::from_celsius(self.temperature_c)
    }

    pub fn expects_precipitation(&self) -> bool {
        self.condition.is_wet() || self.precipitation_probability >= 0.5
    }

    pub fn is_chilly(&self) -> bool {
        self.temperature_c < 15.0
    }
}

#[cfg(test)]
mod tests {
    use super::{TemperatureBand, WeatherCondition, WeatherData};

    #[test]
    fn bands_cover_the_full_temperature_scale() {
        assert_eq!(TemperatureBand::from_celsius(-5.0), TemperatureBand::VeryCold);
        assert_eq!(TemperatureBand::from_celsius(0.0), TemperatureBand::Cold);
        assert_eq!(TemperatureBand::from_celsius(12.0), TemperatureBand::Cool);
        assert_eq!(TemperatureBand::from_celsius(20.0), TemperatureBand::Mild);
        assert_eq!(TemperatureBand::from_celsius(27.0), TemperatureBand::Warm);
        assert_eq!(TemperatureBand::from_celsius(35.0), TemperatureBand::Hot);
    }

    #[test]
    fn wet_conditions_imply_precipitation() {
        let weather = WeatherData {
            temperature_c: 8.0,
            condition: WeatherCondition::Snow,
            precipitation_probability: 0.1,
            humidity: 0.8,
            wind_speed_kmh: 5.0,
        };
        assert!(weather.expects_precipitation());
        assert!(weather.is_chilly());
    }
}
