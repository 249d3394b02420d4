use super::Vec3;

/// Which coordinate of a [`GeoPoint`] failed validation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GeoAxis {
    Latitude,
    Longitude,
}

impl std::fmt::Display for GeoAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoAxis::Latitude => write!(f, "latitude"),
            GeoAxis::Longitude => write!(f, "longitude"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GeoError {
    NonFinite(GeoAxis),
    OutOfRange { axis: GeoAxis, value: f64 },
}

impl std::fmt::Display for GeoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoError::NonFinite(axis) => write!(f, "{axis} is not a finite number"),
            GeoError::OutOfRange { axis, value } => {
                let limit = match axis {
                    GeoAxis::Latitude => 90.0,
                    GeoAxis::Longitude => 180.0,
                };
                write!(f, "{axis} {value} outside [-{limit}, {limit}]")
            }
        }
    }
}

impl std::error::Error for GeoError {}

/// Geographic coordinate in degrees.
///
/// Only constructible through [`GeoPoint::new`], so every instance is finite
/// and in range. Downstream geometry never has to re-check.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        check_axis(GeoAxis::Latitude, latitude, 90.0)?;
        check_axis(GeoAxis::Longitude, longitude, 180.0)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Position of this point on a sphere of `radius` centered at the origin.
    pub fn to_sphere(&self, radius: f64) -> Vec3 {
        sphere_position(self.latitude, self.longitude, radius)
    }
}

fn check_axis(axis: GeoAxis, value: f64, limit: f64) -> Result<(), GeoError> {
    if !value.is_finite() {
        return Err(GeoError::NonFinite(axis));
    }
    if !(-limit..=limit).contains(&value) {
        return Err(GeoError::OutOfRange { axis, value });
    }
    Ok(())
}

/// Maps latitude/longitude (degrees) onto a sphere of `radius`.
///
/// Longitude is offset by 180° and `x` is mirrored so positions line up with
/// the equirectangular texture seam of the globe mesh. Axis order and signs
/// must stay exactly as written.
pub fn sphere_position(lat_deg: f64, lng_deg: f64, radius: f64) -> Vec3 {
    let phi = (90.0 - lat_deg).to_radians();
    let theta = (lng_deg + 180.0).to_radians();

    let x = -(radius * phi.sin() * theta.cos());
    let z = radius * phi.sin() * theta.sin();
    let y = radius * phi.cos();

    Vec3::new(x, y, z)
}
