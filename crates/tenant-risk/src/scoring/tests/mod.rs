mod calibration;
mod common;
mod thresholds;
