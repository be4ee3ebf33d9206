//! Generator and modulator record decoding.
//!
//! Generator codes follow the SF2 enumeration (section 8.1.2); unassigned codes are kept raw.

use crate::parser::primitive_parser::{parse_u16, parse_u8, skip};
use crate::parser::sf2_types::{
    GeneratorAmount, GeneratorRecord, ModulatorRecord, Range, RawGenerator,
};
use nom::{IResult, Parser};
use serde::{Serialize, Serializer};

/// Size of a `pgen`/`igen` record
pub const GENERATOR_RECORD_SIZE: usize = 4;

/// Size of a `pmod`/`imod` record
pub const MODULATOR_RECORD_SIZE: usize = 10;

/// Number of slots in the generator enumeration, `endOper` included
pub const GENERATOR_TABLE_SIZE: u16 = 61;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum GeneratorType {
    StartAddrsOffset = 0,
    EndAddrsOffset = 1,
    StartloopAddrsOffset = 2,
    EndloopAddrsOffset = 3,
    StartAddrsCoarseOffset = 4,
    ModLfoToPitch = 5,
    VibLfoToPitch = 6,
    ModEnvToPitch = 7,
    InitialFilterFc = 8,
    InitialFilterQ = 9,
    ModLfoToFilterFc = 10,
    ModEnvToFilterFc = 11,
    EndAddrsCoarseOffset = 12,
    ModLfoToVolume = 13,
    ChorusEffectsSend = 15,
    ReverbEffectsSend = 16,
    Pan = 17,
    DelayModLfo = 21,
    FreqModLfo = 22,
    DelayVibLfo = 23,
    FreqVibLfo = 24,
    DelayModEnv = 25,
    AttackModEnv = 26,
    HoldModEnv = 27,
    DecayModEnv = 28,
    SustainModEnv = 29,
    ReleaseModEnv = 30,
    KeynumToModEnvHold = 31,
    KeynumToModEnvDecay = 32,
    DelayVolEnv = 33,
    AttackVolEnv = 34,
    HoldVolEnv = 35,
    DecayVolEnv = 36,
    SustainVolEnv = 37,
    ReleaseVolEnv = 38,
    KeynumToVolEnvHold = 39,
    KeynumToVolEnvDecay = 40,
    Instrument = 41,
    KeyRange = 43,
    VelRange = 44,
    StartloopAddrsCoarseOffset = 45,
    Keynum = 46,
    Velocity = 47,
    InitialAttenuation = 48,
    EndloopAddrsCoarseOffset = 50,
    CoarseTune = 51,
    FineTune = 52,
    SampleId = 53,
    SampleModes = 54,
    ScaleTuning = 56,
    ExclusiveClass = 57,
    OverridingRootKey = 58,
    EndOper = 60,
}

impl GeneratorType {
    /// Look up a generator code, `None` for unassigned slots and codes past the table.
    pub const fn from_code(code: u16) -> Option<GeneratorType> {
        use GeneratorType as G;
        let generator_type = match code {
            0 => G::StartAddrsOffset,
            1 => G::EndAddrsOffset,
            2 => G::StartloopAddrsOffset,
            3 => G::EndloopAddrsOffset,
            4 => G::StartAddrsCoarseOffset,
            5 => G::ModLfoToPitch,
            6 => G::VibLfoToPitch,
            7 => G::ModEnvToPitch,
            8 => G::InitialFilterFc,
            9 => G::InitialFilterQ,
            10 => G::ModLfoToFilterFc,
            11 => G::ModEnvToFilterFc,
            12 => G::EndAddrsCoarseOffset,
            13 => G::ModLfoToVolume,
            15 => G::ChorusEffectsSend,
            16 => G::ReverbEffectsSend,
            17 => G::Pan,
            21 => G::DelayModLfo,
            22 => G::FreqModLfo,
            23 => G::DelayVibLfo,
            24 => G::FreqVibLfo,
            25 => G::DelayModEnv,
            26 => G::AttackModEnv,
            27 => G::HoldModEnv,
            28 => G::DecayModEnv,
            29 => G::SustainModEnv,
            30 => G::ReleaseModEnv,
            31 => G::KeynumToModEnvHold,
            32 => G::KeynumToModEnvDecay,
            33 => G::DelayVolEnv,
            34 => G::AttackVolEnv,
            35 => G::HoldVolEnv,
            36 => G::DecayVolEnv,
            37 => G::SustainVolEnv,
            38 => G::ReleaseVolEnv,
            39 => G::KeynumToVolEnvHold,
            40 => G::KeynumToVolEnvDecay,
            41 => G::Instrument,
            43 => G::KeyRange,
            44 => G::VelRange,
            45 => G::StartloopAddrsCoarseOffset,
            46 => G::Keynum,
            47 => G::Velocity,
            48 => G::InitialAttenuation,
            50 => G::EndloopAddrsCoarseOffset,
            51 => G::CoarseTune,
            52 => G::FineTune,
            53 => G::SampleId,
            54 => G::SampleModes,
            56 => G::ScaleTuning,
            57 => G::ExclusiveClass,
            58 => G::OverridingRootKey,
            60 => G::EndOper,
            _ => return None,
        };
        Some(generator_type)
    }

    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Canonical name as written in the SF2 2.04 document
    pub const fn name(&self) -> &'static str {
        use GeneratorType as G;
        match self {
            G::StartAddrsOffset => "startAddrsOffset",
            G::EndAddrsOffset => "endAddrsOffset",
            G::StartloopAddrsOffset => "startloopAddrsOffset",
            G::EndloopAddrsOffset => "endloopAddrsOffset",
            G::StartAddrsCoarseOffset => "startAddrsCoarseOffset",
            G::ModLfoToPitch => "modLfoToPitch",
            G::VibLfoToPitch => "vibLfoToPitch",
            G::ModEnvToPitch => "modEnvToPitch",
            G::InitialFilterFc => "initialFilterFc",
            G::InitialFilterQ => "initialFilterQ",
            G::ModLfoToFilterFc => "modLfoToFilterFc",
            G::ModEnvToFilterFc => "modEnvToFilterFc",
            G::EndAddrsCoarseOffset => "endAddrsCoarseOffset",
            G::ModLfoToVolume => "modLfoToVolume",
            G::ChorusEffectsSend => "chorusEffectsSend",
            G::ReverbEffectsSend => "reverbEffectsSend",
            G::Pan => "pan",
            G::DelayModLfo => "delayModLFO",
            G::FreqModLfo => "freqModLFO",
            G::DelayVibLfo => "delayVibLFO",
            G::FreqVibLfo => "freqVibLFO",
            G::DelayModEnv => "delayModEnv",
            G::AttackModEnv => "attackModEnv",
            G::HoldModEnv => "holdModEnv",
            G::DecayModEnv => "decayModEnv",
            G::SustainModEnv => "sustainModEnv",
            G::ReleaseModEnv => "releaseModEnv",
            G::KeynumToModEnvHold => "keynumToModEnvHold",
            G::KeynumToModEnvDecay => "keynumToModEnvDecay",
            G::DelayVolEnv => "delayVolEnv",
            G::AttackVolEnv => "attackVolEnv",
            G::HoldVolEnv => "holdVolEnv",
            G::DecayVolEnv => "decayVolEnv",
            G::SustainVolEnv => "sustainVolEnv",
            G::ReleaseVolEnv => "releaseVolEnv",
            G::KeynumToVolEnvHold => "keynumToVolEnvHold",
            G::KeynumToVolEnvDecay => "keynumToVolEnvDecay",
            G::Instrument => "instrument",
            G::KeyRange => "keyRange",
            G::VelRange => "velRange",
            G::StartloopAddrsCoarseOffset => "startloopAddrsCoarseOffset",
            G::Keynum => "keynum",
            G::Velocity => "velocity",
            G::InitialAttenuation => "initialAttenuation",
            G::EndloopAddrsCoarseOffset => "endloopAddrsCoarseOffset",
            G::CoarseTune => "coarseTune",
            G::FineTune => "fineTune",
            G::SampleId => "sampleID",
            G::SampleModes => "sampleModes",
            G::ScaleTuning => "scaleTuning",
            G::ExclusiveClass => "exclusiveClass",
            G::OverridingRootKey => "overridingRootKey",
            G::EndOper => "endOper",
        }
    }

    /// Generators whose amount holds a `{lo, hi}` byte pair
    pub const fn is_range(&self) -> bool {
        matches!(
            self,
            GeneratorType::KeyRange
                | GeneratorType::VelRange
                | GeneratorType::Keynum
                | GeneratorType::Velocity
        )
    }
}

impl std::fmt::Display for GeneratorType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for GeneratorType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Decode a generator code with the two bytes of its amount, in file order.
///
/// Total over every `u16` code.
pub fn decode_generator(code: u16, lo: u8, hi: u8) -> GeneratorRecord {
    match GeneratorType::from_code(code) {
        Some(generator_type) if generator_type.is_range() => GeneratorRecord::Known {
            generator_type,
            value: GeneratorAmount::Range(Range { lo, hi }),
        },
        Some(generator_type) => GeneratorRecord::Known {
            generator_type,
            value: GeneratorAmount::Amount(i16::from_le_bytes([lo, hi])),
        },
        None => GeneratorRecord::Unknown(RawGenerator {
            code,
            amount: i16::from_le_bytes([lo, hi]),
            lo,
            hi,
        }),
    }
}

/// Parse a `pgen`/`igen` record: `[u16 oper][u8 lo][u8 hi]`
pub fn parse_generator(i: &[u8]) -> IResult<&[u8], GeneratorRecord> {
    let (i, (code, lo, hi)) = (parse_u16, parse_u8, parse_u8).parse(i)?;
    Ok((i, decode_generator(code, lo, hi)))
}

/// Parse a `pmod`/`imod` record keeping only the destination and amount.
///
/// `[u16 src oper][u16 dest oper][i16 amount][u16 amount src oper][u16 trans oper]`
pub fn parse_modulator(i: &[u8]) -> IResult<&[u8], ModulatorRecord> {
    let (i, ()) = skip(2)(i)?; // source operator
    let (i, (code, lo, hi)) = (parse_u16, parse_u8, parse_u8).parse(i)?;
    let (i, ()) = skip(2)(i)?; // amount source operator
    let (i, ()) = skip(2)(i)?; // transform operator
    Ok((i, decode_generator(code, lo, hi)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNASSIGNED: [u16; 8] = [14, 18, 19, 20, 42, 49, 55, 59];

    #[test]
    fn test_decode_is_total() {
        for code in 0..=u16::MAX {
            let record = decode_generator(code, 0x34, 0x12);
            let expect_known = code < GENERATOR_TABLE_SIZE && !UNASSIGNED.contains(&code);
            match record {
                GeneratorRecord::Known {
                    generator_type,
                    value,
                } => {
                    assert!(expect_known, "code {code} should be unknown");
                    assert_eq!(generator_type.code(), code);
                    if generator_type.is_range() {
                        assert_eq!(value, GeneratorAmount::Range(Range { lo: 0x34, hi: 0x12 }));
                    } else {
                        assert_eq!(value, GeneratorAmount::Amount(0x1234));
                    }
                }
                GeneratorRecord::Unknown(raw) => {
                    assert!(!expect_known, "code {code} should be known");
                    assert_eq!(raw.code, code);
                    assert_eq!(raw.amount, 0x1234);
                }
            }
        }
    }

    #[test]
    fn test_unknown_code_keeps_raw_tuple() {
        let (rest, record) = parse_generator(&[61, 0, 0x01, 0x02]).unwrap();
        assert!(rest.is_empty());
        assert_eq!(
            record,
            GeneratorRecord::Unknown(RawGenerator {
                code: 61,
                amount: 0x0201,
                lo: 0x01,
                hi: 0x02,
            })
        );
        assert_eq!(record.name(), "unknown");
    }

    #[test]
    fn test_range_generators() {
        let (_, record) = parse_generator(&[43, 0, 36, 72]).unwrap();
        assert_eq!(
            record,
            GeneratorRecord::Known {
                generator_type: GeneratorType::KeyRange,
                value: GeneratorAmount::Range(Range { lo: 36, hi: 72 }),
            }
        );
        for code in [43, 44, 46, 47] {
            assert!(GeneratorType::from_code(code).unwrap().is_range());
        }
        assert!(!GeneratorType::Instrument.is_range());
    }

    #[test]
    fn test_scalar_generator_is_signed() {
        // pan -500
        let (_, record) = parse_generator(&[17, 0, 0x0C, 0xFE]).unwrap();
        assert_eq!(
            record,
            GeneratorRecord::Known {
                generator_type: GeneratorType::Pan,
                value: GeneratorAmount::Amount(-500),
            }
        );
    }

    #[test]
    fn test_names() {
        assert_eq!(GeneratorType::SampleId.name(), "sampleID");
        assert_eq!(GeneratorType::DelayModLfo.name(), "delayModLFO");
        assert_eq!(GeneratorType::from_code(60), Some(GeneratorType::EndOper));
        assert_eq!(GeneratorType::from_code(42), None);
        assert_eq!(GeneratorType::OverridingRootKey.to_string(), "overridingRootKey");
    }

    #[test]
    fn test_parse_modulator_skips_operators() {
        let data = [
            0x02, 0x05, // source: note-on velocity
            48, 0, // destination: initialAttenuation
            0xC0, 0x03, // amount: 960
            0x00, 0x00, // amount source
            0x00, 0x00, // transform
            0xAA,
        ];
        let (rest, record) = parse_modulator(&data).unwrap();
        assert_eq!(rest, &[0xAA]);
        assert_eq!(
            record,
            GeneratorRecord::Known {
                generator_type: GeneratorType::InitialAttenuation,
                value: GeneratorAmount::Amount(960),
            }
        );
    }

    #[test]
    fn test_parse_truncated_records() {
        assert!(parse_generator(&[17, 0, 0]).is_err());
        assert!(parse_modulator(&[0; 9]).is_err());
    }

    #[test]
    fn test_serialize_as_name() {
        let json = serde_json::to_string(&GeneratorType::VelRange).unwrap();
        assert_eq!(json, "\"velRange\"");
    }
}
