//! Runtime settings read from the environment, plus fixed limits
//! (upload size, OTP lifetime, expiration thresholds).

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
