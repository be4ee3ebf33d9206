//! Resolution of the flat `pdta` lists into presets and instruments with their zones.
//!
//! Every index stored in a header or a bag is the start of a half-open range whose end is the
//! index stored in the next element, or the length of the target list for the last element.

use crate::bank::zone_params::ZoneParameters;
use crate::parser::generator_parser::GeneratorType;
use crate::parser::sf2_types::{
    Bag, GeneratorRecord, InstrumentHeader, ModulatorRecord, PresetHeader, SampleHeader,
    SoundFont,
};
use crate::RuxError;
use serde::Serialize;
use std::ops::Range;

/// Preset or instrument zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Zone {
    pub generator: ZoneParameters,
    /// Generators in file order, before merging
    pub generator_sequence: Vec<GeneratorRecord>,
    pub modulator: ZoneParameters,
    /// Modulators in file order, before merging
    pub modulator_sequence: Vec<ModulatorRecord>,
}

impl Zone {
    /// Instrument linked by a preset zone, generators take precedence over modulators
    pub fn instrument(&self) -> Option<u16> {
        self.linked_index(GeneratorType::Instrument)
    }

    /// Sample linked by an instrument zone
    pub fn sample_id(&self) -> Option<u16> {
        self.linked_index(GeneratorType::SampleId)
    }

    // amounts of index generators are unsigned
    fn linked_index(&self, generator_type: GeneratorType) -> Option<u16> {
        self.generator
            .amount(generator_type)
            .or_else(|| self.modulator.amount(generator_type))
            .map(|amount| amount as u16)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub name: String,
    pub zones: Vec<Zone>,
    pub header: PresetHeader,
    /// Instrument of the last zone linking one
    pub instrument: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instrument {
    pub name: String,
    pub zones: Vec<Zone>,
    pub header: InstrumentHeader,
}

/// Header owning a range of bags
pub trait ZoneHeader {
    fn name(&self) -> &str;
    fn bag_index(&self) -> u16;
}

impl ZoneHeader for PresetHeader {
    fn name(&self) -> &str {
        &self.name
    }

    fn bag_index(&self) -> u16 {
        self.preset_bag_index
    }
}

impl ZoneHeader for InstrumentHeader {
    fn name(&self) -> &str {
        &self.name
    }

    fn bag_index(&self) -> u16 {
        self.instrument_bag_index
    }
}

/// Half-open range starting at `start` and ending at `next` or `len`.
fn bounded_range(
    start: u16,
    next: Option<u16>,
    len: usize,
    what: &str,
) -> Result<Range<usize>, RuxError> {
    let start = start as usize;
    let end = next.map_or(len, |next| next as usize);
    if start > end || end > len {
        return Err(RuxError::FormatError(format!(
            "{what} range [{start}..{end}) invalid for {len} entries"
        )));
    }
    Ok(start..end)
}

/// Bags belonging to `headers[index]`.
pub fn bag_range<H: ZoneHeader>(
    headers: &[H],
    index: usize,
    bag_count: usize,
) -> Result<Range<usize>, RuxError> {
    let header = headers.get(index).ok_or_else(|| {
        RuxError::FormatError(format!("no header at index {index} of {}", headers.len()))
    })?;
    let next = headers.get(index + 1).map(ZoneHeader::bag_index);
    bounded_range(
        header.bag_index(),
        next,
        bag_count,
        &format!("bag of '{}'", header.name()),
    )
}

/// Slices of the generator and modulator lists belonging to `bags[index]`.
fn bag_records<'a>(
    bags: &[Bag],
    index: usize,
    generators: &'a [GeneratorRecord],
    modulators: &'a [ModulatorRecord],
) -> Result<(&'a [GeneratorRecord], &'a [ModulatorRecord]), RuxError> {
    let bag = bags[index];
    let next = bags.get(index + 1);
    let generator_range = bounded_range(
        bag.generator_index,
        next.map(|b| b.generator_index),
        generators.len(),
        &format!("generator of bag {index}"),
    )?;
    let modulator_range = bounded_range(
        bag.modulator_index,
        next.map(|b| b.modulator_index),
        modulators.len(),
        &format!("modulator of bag {index}"),
    )?;
    Ok((&generators[generator_range], &modulators[modulator_range]))
}

fn create_zones(
    bag_range: Range<usize>,
    bags: &[Bag],
    generators: &[GeneratorRecord],
    modulators: &[ModulatorRecord],
) -> Result<Vec<Zone>, RuxError> {
    bag_range
        .map(|index| {
            let (generator_sequence, modulator_sequence) =
                bag_records(bags, index, generators, modulators)?;
            Ok(Zone {
                generator: generator_sequence.iter().collect(),
                generator_sequence: generator_sequence.to_vec(),
                modulator: modulator_sequence.iter().collect(),
                modulator_sequence: modulator_sequence.to_vec(),
            })
        })
        .collect()
}

/// Resolve every preset header into its zones and linked instrument.
pub fn create_presets(sound_font: &SoundFont) -> Result<Vec<Preset>, RuxError> {
    let headers = &sound_font.preset_headers;
    (0..headers.len())
        .map(|i| {
            let range = bag_range(headers, i, sound_font.preset_zones.len())?;
            let zones = create_zones(
                range,
                &sound_font.preset_zones,
                &sound_font.preset_zone_generators,
                &sound_font.preset_zone_modulators,
            )?;
            let header = headers[i].clone();
            let instrument = zones.iter().rev().find_map(Zone::instrument);
            log::debug!("Preset '{}' with {} zones", header.name, zones.len());
            Ok(Preset {
                name: header.name.clone(),
                zones,
                header,
                instrument,
            })
        })
        .collect()
}

/// Resolve every instrument header into its zones.
pub fn create_instruments(sound_font: &SoundFont) -> Result<Vec<Instrument>, RuxError> {
    let headers = &sound_font.instrument_headers;
    (0..headers.len())
        .map(|i| {
            let range = bag_range(headers, i, sound_font.instrument_zones.len())?;
            let zones = create_zones(
                range,
                &sound_font.instrument_zones,
                &sound_font.instrument_zone_generators,
                &sound_font.instrument_zone_modulators,
            )?;
            let header = headers[i].clone();
            log::debug!("Instrument '{}' with {} zones", header.name, zones.len());
            Ok(Instrument {
                name: header.name.clone(),
                zones,
                header,
            })
        })
        .collect()
}

impl SoundFont {
    pub fn presets(&self) -> Result<Vec<Preset>, RuxError> {
        create_presets(self)
    }

    pub fn instruments(&self) -> Result<Vec<Instrument>, RuxError> {
        create_instruments(self)
    }

    /// Header of the instrument linked by a preset zone
    pub fn instrument_header_for(&self, zone: &Zone) -> Option<&InstrumentHeader> {
        zone.instrument()
            .and_then(|index| self.instrument_headers.get(index as usize))
    }

    /// Sample header and PCM data linked by an instrument zone
    pub fn sample_for(&self, zone: &Zone) -> Option<(&SampleHeader, &[i16])> {
        let index = zone.sample_id()? as usize;
        let header = self.sample_headers.get(index)?;
        let sample = self.samples.get(index)?;
        Some((header, sample.as_slice()))
    }
}
