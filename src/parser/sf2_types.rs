//! SoundFont 2 data structures
//!
//! Reference: <https://www.synthfont.com/sfspec24.pdf>

use crate::parser::generator_parser::GeneratorType;
use crate::parser::riff_parser::Chunk;
use serde::Serialize;
use std::collections::BTreeMap;

/// Name of the terminal record of the `phdr` chunk
pub const END_OF_PRESETS: &str = "EOP";
/// Name of the terminal record of the `inst` chunk
pub const END_OF_INSTRUMENTS: &str = "EOI";
/// Name of the terminal record of the `shdr` chunk
pub const END_OF_SAMPLES: &str = "EOS";

/// Preset header (`phdr` record, 38 bytes)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresetHeader {
    pub name: String,
    pub preset: u16,
    pub bank: u16,
    /// First preset zone, the next header's index is the exclusive end
    pub preset_bag_index: u16,
    pub library: u32,
    pub genre: u32,
    pub morphology: u32,
}

/// Instrument header (`inst` record, 22 bytes)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstrumentHeader {
    pub name: String,
    pub instrument_bag_index: u16,
}

/// Zone index record of `pbag` and `ibag` (4 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bag {
    pub generator_index: u16,
    pub modulator_index: u16,
}

/// Inclusive byte range used by `keyRange`, `velRange`, `keynum` and `velocity`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub lo: u8,
    pub hi: u8,
}

impl Range {
    pub const FULL: Range = Range { lo: 0, hi: 127 };

    pub const fn contains(&self, value: u8) -> bool {
        self.lo <= value && value <= self.hi
    }
}

/// Generator amount interpreted according to its type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeneratorAmount {
    Range(Range),
    Amount(i16),
}

impl GeneratorAmount {
    pub const fn amount(&self) -> Option<i16> {
        match self {
            GeneratorAmount::Amount(v) => Some(*v),
            GeneratorAmount::Range(_) => None,
        }
    }

    pub const fn range(&self) -> Option<Range> {
        match self {
            GeneratorAmount::Range(r) => Some(*r),
            GeneratorAmount::Amount(_) => None,
        }
    }
}

/// Undecoded generator, both interpretations of the amount are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RawGenerator {
    pub code: u16,
    pub amount: i16,
    pub lo: u8,
    pub hi: u8,
}

/// Decoded `pgen`/`igen` record, or the destination + amount of a `pmod`/`imod` record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeneratorRecord {
    Known {
        generator_type: GeneratorType,
        value: GeneratorAmount,
    },
    Unknown(RawGenerator),
}

/// Modulators only expose their destination generator and amount
pub type ModulatorRecord = GeneratorRecord;

impl GeneratorRecord {
    pub const fn generator_type(&self) -> Option<GeneratorType> {
        match self {
            GeneratorRecord::Known { generator_type, .. } => Some(*generator_type),
            GeneratorRecord::Unknown(_) => None,
        }
    }

    /// Canonical name, `unknown` for unassigned codes
    pub const fn name(&self) -> &'static str {
        match self {
            GeneratorRecord::Known { generator_type, .. } => generator_type.name(),
            GeneratorRecord::Unknown(_) => "unknown",
        }
    }
}

/// Sample header (`shdr` record, 46 bytes)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleHeader {
    pub name: String,
    pub start: u32,
    pub end: u32,
    /// Relative to `start` once the sample is extracted
    pub start_loop: u32,
    /// Relative to `start` once the sample is extracted
    pub end_loop: u32,
    pub sample_rate: u32,
    pub original_pitch: u8,
    /// In cents
    pub pitch_correction: i8,
    pub sample_link: u16,
    pub sample_type: u16,
}

impl SampleHeader {
    pub const fn kind(&self) -> SampleType {
        SampleType::from_bits(self.sample_type)
    }
}

/// Channel layout flags of the `sfSampleType` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SampleType {
    pub mono: bool,
    pub right: bool,
    pub left: bool,
    pub linked: bool,
    /// Sample data lives in a ROM, not in the `smpl` chunk
    pub rom: bool,
}

impl SampleType {
    pub const fn from_bits(bits: u16) -> Self {
        SampleType {
            mono: bits & 0x0001 != 0,
            right: bits & 0x0002 != 0,
            left: bits & 0x0004 != 0,
            linked: bits & 0x0008 != 0,
            rom: bits & 0x8000 != 0,
        }
    }
}

/// Fully decoded SoundFont bank.
///
/// Header arrays are free of their terminal records, zones and records are the flat `pdta` lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoundFont {
    pub info: BTreeMap<String, String>,
    pub preset_headers: Vec<PresetHeader>,
    pub preset_zones: Vec<Bag>,
    pub preset_zone_modulators: Vec<ModulatorRecord>,
    pub preset_zone_generators: Vec<GeneratorRecord>,
    pub instrument_headers: Vec<InstrumentHeader>,
    pub instrument_zones: Vec<Bag>,
    pub instrument_zone_modulators: Vec<ModulatorRecord>,
    pub instrument_zone_generators: Vec<GeneratorRecord>,
    pub sample_headers: Vec<SampleHeader>,
    /// PCM data, index aligned with `sample_headers`
    pub samples: Vec<Vec<i16>>,
    /// Raw `smpl` chunk of the source buffer
    pub sampling_data: Chunk,
}
