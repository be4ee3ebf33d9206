//! Extraction of the PCM data referenced by the sample headers.
//!
//! Samples recorded below the target rate are upsampled by plain duplication of every frame.
//! This keeps loop points exact but applies no filtering at all, it is not a general resampler.

use crate::parser::riff_parser::Chunk;
use crate::parser::sf2_types::SampleHeader;
use crate::RuxError;

/// Bytes per 16 bits PCM frame
const FRAME_SIZE: usize = 2;

/// Copy every sample out of the `smpl` chunk, rebasing and scaling the loop points.
///
/// Returns the adjusted headers with their PCM buffers, index aligned.
pub fn extract_samples(
    data: &[u8],
    sampling_data: &Chunk,
    headers: Vec<SampleHeader>,
    target_sample_rate: u32,
) -> Result<(Vec<SampleHeader>, Vec<Vec<i16>>), RuxError> {
    let blob = sampling_data.payload(data)?;
    log::debug!(
        "Extracting {} samples from {} bytes of sample data",
        headers.len(),
        blob.len()
    );
    let mut sample_headers = Vec::with_capacity(headers.len());
    let mut samples = Vec::with_capacity(headers.len());
    for header in headers {
        let (header, sample) = extract_sample(blob, header, target_sample_rate)?;
        sample_headers.push(header);
        samples.push(sample);
    }
    Ok((sample_headers, samples))
}

/// Extract a single sample from the sample data blob.
pub fn extract_sample(
    blob: &[u8],
    header: SampleHeader,
    target_sample_rate: u32,
) -> Result<(SampleHeader, Vec<i16>), RuxError> {
    let pcm = read_pcm(blob, &header)?;
    let start_loop = rebase_loop_point(&header, header.start_loop, "start loop");
    let end_loop = rebase_loop_point(&header, header.end_loop, "end loop");

    let (pcm, sample_rate, multiply) = if header.sample_rate > 0 {
        upsample(pcm, header.sample_rate, target_sample_rate)
    } else {
        (pcm, header.sample_rate, 1)
    };
    if multiply > 1 {
        log::debug!(
            "Sample '{}' upsampled x{multiply} from {} Hz to {sample_rate} Hz",
            header.name,
            header.sample_rate
        );
    }
    let scale = |point: u32| {
        point.checked_mul(multiply).ok_or_else(|| {
            RuxError::FormatError(format!(
                "loop point {point} of sample '{}' overflows once scaled x{multiply}",
                header.name
            ))
        })
    };
    let start_loop = scale(start_loop)?;
    let end_loop = scale(end_loop)?;

    let header = SampleHeader {
        start_loop,
        end_loop,
        sample_rate,
        ..header
    };
    Ok((header, pcm))
}

fn read_pcm(blob: &[u8], header: &SampleHeader) -> Result<Vec<i16>, RuxError> {
    if header.end < header.start {
        return Err(RuxError::BoundsError(format!(
            "sample '{}' ends at {} before its start {}",
            header.name, header.end, header.start
        )));
    }
    let from = header.start as usize * FRAME_SIZE;
    let to = header.end as usize * FRAME_SIZE;
    let bytes = blob.get(from..to).ok_or_else(|| {
        RuxError::BoundsError(format!(
            "sample '{}' range [{}..{}) outside of {} sample frames",
            header.name,
            header.start,
            header.end,
            blob.len() / FRAME_SIZE
        ))
    })?;
    Ok(bytes
        .chunks_exact(FRAME_SIZE)
        .map(|frame| i16::from_le_bytes([frame[0], frame[1]]))
        .collect())
}

/// Make a loop point relative to the start of the sample.
fn rebase_loop_point(header: &SampleHeader, point: u32, label: &str) -> u32 {
    point.checked_sub(header.start).unwrap_or_else(|| {
        log::warn!(
            "Sample '{}' {label} {point} is before its start {}, clamping to 0",
            header.name,
            header.start
        );
        0
    })
}

/// Double every frame until `sample_rate` reaches `target_sample_rate`.
///
/// Returns the new buffer, the new rate and the applied factor.
pub fn upsample(sample: Vec<i16>, sample_rate: u32, target_sample_rate: u32) -> (Vec<i16>, u32, u32) {
    let mut sample = sample;
    let mut sample_rate = sample_rate;
    let mut multiply = 1;
    while sample_rate > 0 && sample_rate < target_sample_rate {
        let Some(doubled_rate) = sample_rate.checked_mul(2) else {
            break;
        };
        sample = sample.iter().flat_map(|&frame| [frame, frame]).collect();
        sample_rate = doubled_rate;
        multiply *= 2;
    }
    (sample, sample_rate, multiply)
}
