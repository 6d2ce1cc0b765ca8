use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::errors::LandError;
use super::models::LandInput;

const MAX_TITLE_CHARS: usize = 100;
const MAX_LOCATION_CHARS: usize = 100;
const MAX_BIOME_CHARS: usize = 50;
const MAX_SOIL_TYPE_CHARS: usize = 50;
const MAX_AUTHORITY_CHARS: usize = 100;

/// Exclusive upper bound and scale of `size_square_meters NUMERIC(12, 2)`.
// 10_000_000_000 = 0x2_540B_E400 (`Decimal::new` is not const).
const MAX_SIZE: Decimal = Decimal::from_parts(0x540B_E400, 0x2, 0, false, 0);
const MAX_SIZE_SCALE: u32 = 2;

/// Create/update body. Update uses the same shape and replaces every field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub size_square_meters: f64,
    #[serde(default)]
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub biome_type: String,
    pub average_humidity: Option<f64>,
    pub average_temperature: Option<f64>,
    pub elevation_meters: Option<f64>,
    pub forest_density_percentage: Option<f64>,
    #[serde(default)]
    pub tree_species: Vec<String>,
    pub soil_type: Option<String>,
    /// `YYYY-MM-DD`
    pub certification_date: Option<String>,
    pub certification_authority: Option<String>,
}

impl LandRequest {
    pub fn into_input(self) -> Result<LandInput, LandError> {
        check_text("title", &self.title, MAX_TITLE_CHARS)?;
        check_text("location", &self.location, MAX_LOCATION_CHARS)?;
        check_text("biomeType", &self.biome_type, MAX_BIOME_CHARS)?;
        check_optional_text("soilType", self.soil_type.as_deref(), MAX_SOIL_TYPE_CHARS)?;
        check_optional_text(
            "certificationAuthority",
            self.certification_authority.as_deref(),
            MAX_AUTHORITY_CHARS,
        )?;

        if !self.size_square_meters.is_finite() || self.size_square_meters <= 0.0 {
            return Err(invalid("sizeSquareMeters must be greater than 0"));
        }
        let size_square_meters = Decimal::try_from(self.size_square_meters)
            .map_err(|e| invalid(format!("invalid sizeSquareMeters: {}", e)))?;
        if size_square_meters >= MAX_SIZE {
            return Err(invalid(format!(
                "sizeSquareMeters must be less than {}",
                MAX_SIZE
            )));
        }
        if size_square_meters.normalize().scale() > MAX_SIZE_SCALE {
            return Err(invalid(format!(
                "sizeSquareMeters must have at most {} decimal places",
                MAX_SIZE_SCALE
            )));
        }

        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(invalid("latitude must be between -90 and 90"));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(invalid("longitude must be between -180 and 180"));
        }

        let certification_date = self
            .certification_date
            .as_deref()
            .map(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .transpose()
            .map_err(|_| invalid("invalid certification date format"))?;

        Ok(LandInput {
            title: self.title,
            description: self.description,
            size_square_meters,
            location: self.location,
            latitude: self.latitude,
            longitude: self.longitude,
            biome_type: self.biome_type,
            average_humidity: self.average_humidity,
            average_temperature: self.average_temperature,
            elevation_meters: self.elevation_meters,
            forest_density_percentage: self.forest_density_percentage,
            tree_species: self.tree_species,
            soil_type: self.soil_type,
            certification_date,
            certification_authority: self.certification_authority,
        })
    }
}

fn check_text(field: &str, value: &str, max_chars: usize) -> Result<(), LandError> {
    let len = value.chars().count();
    if len == 0 {
        return Err(invalid(format!("{} is required", field)));
    }
    if len > max_chars {
        return Err(invalid(format!(
            "{} must be at most {} characters",
            field, max_chars
        )));
    }
    Ok(())
}

fn check_optional_text(field: &str, value: Option<&str>, max_chars: usize) -> Result<(), LandError> {
    match value {
        Some(v) if v.chars().count() > max_chars => Err(invalid(format!(
            "{} must be at most {} characters",
            field, max_chars
        ))),
        _ => Ok(()),
    }
}

fn invalid(msg: impl Into<String>) -> LandError {
    LandError::Validation(msg.into())
}
