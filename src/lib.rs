pub mod config;
pub mod ephemeris;
pub mod export;
pub mod gui;
pub mod illumination;
pub mod logging;
pub mod math;
pub mod mesh;
pub mod orrery;
pub mod pose;
pub mod render;
pub mod scene;
