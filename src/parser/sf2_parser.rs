use crate::config::ParseOptions;
use crate::parser::generator_parser::{
    parse_generator, parse_modulator, GENERATOR_RECORD_SIZE, MODULATOR_RECORD_SIZE,
};
use crate::parser::primitive_parser::{
    make_string, parse_fixed_string, parse_i8, parse_u16, parse_u32, parse_u8,
};
use crate::parser::riff_parser::{walk_chunks, walk_list, Chunk};
use crate::parser::sample_parser::extract_samples;
use crate::parser::sf2_types::{
    Bag, InstrumentHeader, PresetHeader, SampleHeader, SoundFont, END_OF_INSTRUMENTS,
    END_OF_PRESETS, END_OF_SAMPLES,
};
use crate::RuxError;
use nom::multi::count;
use nom::{IResult, Parser};
use std::collections::BTreeMap;

// SF2 docs at <https://www.synthfont.com/sfspec24.pdf>

pub const PRESET_HEADER_SIZE: usize = 38;
pub const INSTRUMENT_HEADER_SIZE: usize = 22;
pub const BAG_SIZE: usize = 4;
pub const SAMPLE_HEADER_SIZE: usize = 46;

const NAME_SIZE: usize = 20;

/// Subchunks of `pdta`, in file order
pub const PDTA_CHUNKS: [&str; 9] = [
    "phdr", "pbag", "pmod", "pgen", "inst", "ibag", "imod", "igen", "shdr",
];

/// Well-known `INFO` tags and the key they are stored under
pub const INFO_TAGS: [(&str, &str); 11] = [
    ("ifil", "version"),
    ("isng", "sound_engine"),
    ("INAM", "bank_name"),
    ("irom", "rom_name"),
    ("iver", "rom_version"),
    ("ICRD", "creation_date"),
    ("IENG", "engineers"),
    ("IPRD", "product"),
    ("ICOP", "copyright"),
    ("ICMT", "comments"),
    ("ISFT", "software"),
];

/// Key under which an `INFO` tag is stored, unknown tags are kept as is
pub fn info_key(tag: &str) -> &str {
    INFO_TAGS
        .iter()
        .find(|(t, _)| *t == tag)
        .map_or(tag, |(_, key)| key)
}

/// Decode a SoundFont bank with default options.
pub fn parse_sf2_data(file_data: &[u8]) -> Result<SoundFont, RuxError> {
    parse_sf2_data_with_options(file_data, &ParseOptions::default())
}

/// Decode a SoundFont bank, nothing is returned unless the whole file is valid.
pub fn parse_sf2_data_with_options(
    file_data: &[u8],
    options: &ParseOptions,
) -> Result<SoundFont, RuxError> {
    parse_sound_font(file_data, options).inspect_err(|err| {
        log::error!("Failed to parse SF2 data: {err}");
    })
}

fn parse_sound_font(data: &[u8], options: &ParseOptions) -> Result<SoundFont, RuxError> {
    options.validate()?;
    let top = walk_chunks(data, 0, data.len())?;
    let riff = expect_single(&top, "RIFF", "top level")?;
    let sections = walk_list(data, riff, "sfbk")?;
    if sections.len() != 3 {
        return Err(RuxError::structural("3 chunks in 'sfbk'", sections.len()));
    }

    let info_chunks = walk_section(data, &sections[0], "INFO")?;
    let info = parse_info(data, &info_chunks)?;

    let sdta_chunks = walk_section(data, &sections[1], "sdta")?;
    let sampling_data = expect_single(&sdta_chunks, "smpl", "'sdta'")?.clone();

    let pdta_chunks = walk_section(data, &sections[2], "pdta")?;
    let [phdr, pbag, pmod, pgen, inst, ibag, imod, igen, shdr] = &pdta_chunks[..] else {
        return Err(RuxError::structural(
            &format!("{} chunks in 'pdta'", PDTA_CHUNKS.len()),
            pdta_chunks.len(),
        ));
    };
    for (chunk, expected) in pdta_chunks.iter().zip(PDTA_CHUNKS) {
        expect_type(chunk, expected)?;
    }

    let preset_headers = drop_terminal(
        parse_records(data, phdr, PRESET_HEADER_SIZE, parse_preset_header)?,
        |h| h.name == END_OF_PRESETS,
    );
    let preset_zones = parse_records(data, pbag, BAG_SIZE, parse_bag)?;
    let preset_zone_modulators =
        parse_records(data, pmod, MODULATOR_RECORD_SIZE, parse_modulator)?;
    let preset_zone_generators =
        parse_records(data, pgen, GENERATOR_RECORD_SIZE, parse_generator)?;
    let instrument_headers = drop_terminal(
        parse_records(data, inst, INSTRUMENT_HEADER_SIZE, parse_instrument_header)?,
        |h| h.name == END_OF_INSTRUMENTS,
    );
    let instrument_zones = parse_records(data, ibag, BAG_SIZE, parse_bag)?;
    let instrument_zone_modulators =
        parse_records(data, imod, MODULATOR_RECORD_SIZE, parse_modulator)?;
    let instrument_zone_generators =
        parse_records(data, igen, GENERATOR_RECORD_SIZE, parse_generator)?;
    let sample_headers = drop_terminal(
        parse_records(data, shdr, SAMPLE_HEADER_SIZE, parse_sample_header)?,
        |h| h.name == END_OF_SAMPLES,
    );

    let (sample_headers, samples) = extract_samples(
        data,
        &sampling_data,
        sample_headers,
        options.target_sample_rate,
    )?;

    log::debug!(
        "Parsed SF2 with {} presets, {} instruments, {} samples",
        preset_headers.len(),
        instrument_headers.len(),
        sample_headers.len()
    );

    Ok(SoundFont {
        info,
        preset_headers,
        preset_zones,
        preset_zone_modulators,
        preset_zone_generators,
        instrument_headers,
        instrument_zones,
        instrument_zone_modulators,
        instrument_zone_generators,
        sample_headers,
        samples,
        sampling_data,
    })
}

fn expect_type(chunk: &Chunk, expected: &str) -> Result<(), RuxError> {
    if chunk.chunk_type == expected {
        Ok(())
    } else {
        Err(RuxError::structural(
            &format!("'{expected}' chunk"),
            format!("'{}'", chunk.chunk_type),
        ))
    }
}

/// Nested `sfbk` sections are `LIST` chunks, never `RIFF`.
fn walk_section(data: &[u8], chunk: &Chunk, form_type: &str) -> Result<Vec<Chunk>, RuxError> {
    expect_type(chunk, "LIST")?;
    walk_list(data, chunk, form_type)
}

fn expect_single<'a>(
    chunks: &'a [Chunk],
    expected: &str,
    location: &str,
) -> Result<&'a Chunk, RuxError> {
    match chunks {
        [chunk] => {
            expect_type(chunk, expected)?;
            Ok(chunk)
        }
        _ => Err(RuxError::structural(&format!("1 chunk in {location}"), chunks.len())),
    }
}

/// Decode the `INFO` list into `{key -> text}`.
fn parse_info(data: &[u8], chunks: &[Chunk]) -> Result<BTreeMap<String, String>, RuxError> {
    let mut info = BTreeMap::new();
    for chunk in chunks {
        let payload = chunk.payload(data)?;
        let value = match chunk.chunk_type.as_str() {
            "ifil" | "iver" => parse_version(payload)?,
            _ => make_string(payload),
        };
        log::debug!("INFO {} = {value}", chunk.chunk_type);
        info.insert(info_key(&chunk.chunk_type).to_string(), value);
    }
    Ok(info)
}

/// `sfVersionTag`: `[u16 major][u16 minor]`
fn parse_version(i: &[u8]) -> Result<String, RuxError> {
    let (_, (major, minor)) = (parse_u16, parse_u16).parse(i)?;
    Ok(format!("{major}.{minor}"))
}

/// Decode all fixed size records of `chunk`.
fn parse_records<T>(
    data: &[u8],
    chunk: &Chunk,
    record_size: usize,
    parser: fn(&[u8]) -> IResult<&[u8], T>,
) -> Result<Vec<T>, RuxError> {
    let payload = chunk.payload(data)?;
    if payload.len() % record_size != 0 {
        return Err(RuxError::FormatError(format!(
            "chunk '{}' of {} bytes is not a multiple of its {record_size} bytes records",
            chunk.chunk_type,
            payload.len()
        )));
    }
    let record_count = payload.len() / record_size;
    log::debug!("Parsing {record_count} '{}' records", chunk.chunk_type);
    let (_rest, records) = count(parser, record_count).parse(payload)?;
    Ok(records)
}

/// Remove the trailing terminal record, if present.
fn drop_terminal<T>(mut records: Vec<T>, is_terminal: impl Fn(&T) -> bool) -> Vec<T> {
    if records.last().is_some_and(is_terminal) {
        records.pop();
    }
    records
}

pub fn parse_preset_header(i: &[u8]) -> IResult<&[u8], PresetHeader> {
    let (i, name) = parse_fixed_string(NAME_SIZE)(i)?;
    let (i, (preset, bank, preset_bag_index)) = (parse_u16, parse_u16, parse_u16).parse(i)?;
    let (i, (library, genre, morphology)) = (parse_u32, parse_u32, parse_u32).parse(i)?;
    Ok((
        i,
        PresetHeader {
            name,
            preset,
            bank,
            preset_bag_index,
            library,
            genre,
            morphology,
        },
    ))
}

pub fn parse_instrument_header(i: &[u8]) -> IResult<&[u8], InstrumentHeader> {
    let (i, name) = parse_fixed_string(NAME_SIZE)(i)?;
    let (i, instrument_bag_index) = parse_u16(i)?;
    Ok((
        i,
        InstrumentHeader {
            name,
            instrument_bag_index,
        },
    ))
}

pub fn parse_bag(i: &[u8]) -> IResult<&[u8], Bag> {
    let (i, (generator_index, modulator_index)) = (parse_u16, parse_u16).parse(i)?;
    Ok((
        i,
        Bag {
            generator_index,
            modulator_index,
        },
    ))
}

pub fn parse_sample_header(i: &[u8]) -> IResult<&[u8], SampleHeader> {
    let (i, name) = parse_fixed_string(NAME_SIZE)(i)?;
    let (i, (start, end, start_loop, end_loop, sample_rate)) =
        (parse_u32, parse_u32, parse_u32, parse_u32, parse_u32).parse(i)?;
    let (i, (original_pitch, pitch_correction, sample_link, sample_type)) =
        (parse_u8, parse_i8, parse_u16, parse_u16).parse(i)?;
    Ok((
        i,
        SampleHeader {
            name,
            start,
            end,
            start_loop,
            end_loop,
            sample_rate,
            original_pitch,
            pitch_correction,
            sample_link,
            sample_type,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_key_lookup() {
        assert_eq!(info_key("INAM"), "bank_name");
        assert_eq!(info_key("ifil"), "version");
        assert_eq!(info_key("XYZW"), "XYZW");
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version(&[2, 0, 4, 0]).unwrap(), "2.4");
        assert!(matches!(
            parse_version(&[2, 0]),
            Err(RuxError::BoundsError(_))
        ));
    }

    #[test]
    fn test_parse_preset_header_record() {
        let mut data = b"Piano".to_vec();
        data.resize(NAME_SIZE, 0);
        data.extend(3u16.to_le_bytes());
        data.extend(128u16.to_le_bytes());
        data.extend(7u16.to_le_bytes());
        data.extend(1u32.to_le_bytes());
        data.extend(2u32.to_le_bytes());
        data.extend(3u32.to_le_bytes());
        assert_eq!(data.len(), PRESET_HEADER_SIZE);
        let (rest, header) = parse_preset_header(&data).unwrap();
        assert!(rest.is_empty());
        assert_eq!(
            header,
            PresetHeader {
                name: "Piano".to_string(),
                preset: 3,
                bank: 128,
                preset_bag_index: 7,
                library: 1,
                genre: 2,
                morphology: 3,
            }
        );
    }

    #[test]
    fn test_parse_sample_header_record() {
        let mut data = b"Sine".to_vec();
        data.resize(NAME_SIZE, 0);
        for v in [10u32, 20, 12, 18, 44_100] {
            data.extend(v.to_le_bytes());
        }
        data.push(60);
        data.push(0xFB); // -5 cents
        data.extend(0u16.to_le_bytes());
        data.extend(1u16.to_le_bytes());
        assert_eq!(data.len(), SAMPLE_HEADER_SIZE);
        let (_, header) = parse_sample_header(&data).unwrap();
        assert_eq!(header.name, "Sine");
        assert_eq!(header.start, 10);
        assert_eq!(header.end, 20);
        assert_eq!(header.start_loop, 12);
        assert_eq!(header.end_loop, 18);
        assert_eq!(header.sample_rate, 44_100);
        assert_eq!(header.original_pitch, 60);
        assert_eq!(header.pitch_correction, -5);
        assert_eq!(header.sample_type, 1);
    }

    #[test]
    fn test_drop_terminal_only_when_last() {
        let names = vec!["a", "EOP"];
        assert_eq!(drop_terminal(names, |n| *n == "EOP"), vec!["a"]);
        let names = vec!["EOP", "a"];
        assert_eq!(drop_terminal(names, |n| *n == "EOP"), vec!["EOP", "a"]);
        let names: Vec<&str> = vec![];
        assert!(drop_terminal(names, |n| *n == "EOP").is_empty());
    }

    #[test]
    fn test_parse_records_width_mismatch() {
        let data = [0u8; 13];
        let chunk = Chunk {
            chunk_type: "pbag".to_string(),
            size: 5,
            offset: 8,
        };
        let err = parse_records(&data, &chunk, BAG_SIZE, parse_bag).unwrap_err();
        assert!(matches!(err, RuxError::FormatError(_)), "{err}");
    }
}
