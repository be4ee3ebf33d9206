//! Ruxfont - SoundFont 2 bank decoder
//!
//! This library provides:
//! - Decoding of SoundFont 2 (.sf2) banks from an in-memory buffer
//! - Typed generator and modulator records
//! - Resolution of presets and instruments into merged zones
//! - Extraction of the PCM sample data
//!
//! # Example
//!
//! ```no_run
//! use ruxfont::{parse_sf2_data_with_options, ParseOptions};
//!
//! let file_data = std::fs::read("bank.sf2").unwrap();
//! let options = ParseOptions::default().with_target_sample_rate(44_100);
//! let sound_font = parse_sf2_data_with_options(&file_data, &options).unwrap();
//! for preset in sound_font.presets().unwrap() {
//!     println!("{} -> {:?}", preset.name, preset.instrument);
//! }
//! ```

pub mod bank;
pub mod config;
pub mod error;
pub mod parser;

// Re-export main types for convenience
pub use bank::{
    zone_builder::{create_instruments, create_presets, Instrument, Preset, Zone},
    zone_params::ZoneParameters,
};
pub use config::ParseOptions;
pub use error::RuxError;
pub use parser::generator_parser::GeneratorType;
pub use parser::riff_parser::Chunk;
pub use parser::sf2_parser::{parse_sf2_data, parse_sf2_data_with_options};
pub use parser::sf2_types::{
    Bag, GeneratorAmount, GeneratorRecord, InstrumentHeader, ModulatorRecord, PresetHeader, Range,
    RawGenerator, SampleHeader, SampleType, SoundFont,
};
