mod daylight;
mod observer;
mod primaries;

pub(crate) use daylight::CIE_ILLUMINANT_D50;
pub(crate) use observer::OBSERVER_X_1931;
pub(crate) use observer::OBSERVER_Y_1931;
pub(crate) use observer::OBSERVER_Z_1931;
pub(crate) use primaries::PRIMARY_BLUE;
pub(crate) use primaries::PRIMARY_GREEN;
pub(crate) use primaries::PRIMARY_RED;
