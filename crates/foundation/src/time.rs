/// Engine time in seconds since the session started.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64);

impl Time {
    pub fn seconds(self) -> f64 {
        self.0
    }

    pub fn advanced_by(self, dt_s: f64) -> Self {
        Time(self.0 + dt_s)
    }
}
