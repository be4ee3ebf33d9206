use encoding_rs::WINDOWS_1252;
use nom::{bytes, number, IResult};

/// Parse unsigned byte
pub fn parse_u8(i: &[u8]) -> IResult<&[u8], u8> {
    number::complete::le_u8(i)
}

/// Parse signed byte
pub fn parse_i8(i: &[u8]) -> IResult<&[u8], i8> {
    number::complete::le_i8(i)
}

/// Parse unsigned short
pub fn parse_u16(i: &[u8]) -> IResult<&[u8], u16> {
    number::complete::le_u16(i)
}

/// Parse signed short
pub fn parse_i16(i: &[u8]) -> IResult<&[u8], i16> {
    number::complete::le_i16(i)
}

/// Parse unsigned 32
pub fn parse_u32(i: &[u8]) -> IResult<&[u8], u32> {
    number::complete::le_u32(i)
}

/// Parse signed 32
pub fn parse_i32(i: &[u8]) -> IResult<&[u8], i32> {
    number::complete::le_i32(i)
}

/// Skip `n` bytes, failing if fewer are available.
pub fn skip(n: usize) -> impl Fn(&[u8]) -> IResult<&[u8], ()> {
    move |i: &[u8]| {
        let (rest, _) = bytes::complete::take(n)(i)?;
        Ok((rest, ()))
    }
}

/// Number of bytes consumed from `origin` to reach `rest`.
///
/// `rest` must be a suffix of `origin`, which holds for any remainder handed back by the parsers.
pub const fn position(origin: &[u8], rest: &[u8]) -> usize {
    origin.len() - rest.len()
}

/// Materialize properly encoded String, stopping at the first NUL byte
pub fn make_string(i: &[u8]) -> String {
    let end = i.iter().position(|&b| b == 0).unwrap_or(i.len());
    let (cow, _encoding_used, had_errors) = WINDOWS_1252.decode(&i[..end]);
    if had_errors {
        log::debug!("Error decoding string raw={:02X?}", &i[..end]);
        String::from_utf8_lossy(&i[..end]).into_owned()
    } else {
        cow.into_owned()
    }
}

/// Parse a NUL padded string field of exactly `field_size` bytes.
pub fn parse_fixed_string(field_size: usize) -> impl Fn(&[u8]) -> IResult<&[u8], String> {
    move |i: &[u8]| {
        let (rest, field) = bytes::complete::take(field_size)(i)?;
        Ok((rest, make_string(field)))
    }
}

/// Parse a four character code such as `RIFF` or `phdr`.
pub fn parse_fourcc(i: &[u8]) -> IResult<&[u8], String> {
    let (rest, tag) = bytes::complete::take(4usize)(i)?;
    Ok((rest, String::from_utf8_lossy(tag).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_little_endian_widths() {
        let data = [0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF];
        let (rest, v) = parse_u16(&data).unwrap();
        assert_eq!(v, 0x0201);
        let (rest, v) = parse_u16(rest).unwrap();
        assert_eq!(v, 0x0403);
        let (rest, v) = parse_i16(rest).unwrap();
        assert_eq!(v, -1);
        assert!(rest.is_empty());

        let (_, v) = parse_u32(&data).unwrap();
        assert_eq!(v, 0x0403_0201);
        let (_, v) = parse_i32(&[0xFE, 0xFF, 0xFF, 0xFF]).unwrap();
        assert_eq!(v, -2);
        let (_, v) = parse_i8(&[0x80]).unwrap();
        assert_eq!(v, -128);
        let (_, v) = parse_u8(&[0x80]).unwrap();
        assert_eq!(v, 128);
    }

    #[test]
    fn test_read_past_end_fails_without_consuming() {
        assert!(parse_u32(&[0x01, 0x02, 0x03]).is_err());
        assert!(parse_u16(&[0x01]).is_err());
        assert!(parse_u8(&[]).is_err());
        assert!(skip(4)(&[0x00, 0x00]).is_err());
        assert!(parse_fixed_string(20)(b"too short").is_err());
    }

    #[test]
    fn test_read_fixed_string_trims_nul_padding() {
        let mut data = b"Grand Piano".to_vec();
        data.resize(20, 0);
        data.push(0xAA);
        let (rest, name) = parse_fixed_string(20)(&data).unwrap();
        assert_eq!(name, "Grand Piano");
        assert_eq!(rest, &[0xAA]);
    }

    #[test]
    fn test_read_fixed_string_ignores_junk_after_nul() {
        let data = b"EOP\0garbage\0\0\0\0\0\0\0\0\0";
        let (_, name) = parse_fixed_string(20)(data).unwrap();
        assert_eq!(name, "EOP");
    }

    #[test]
    fn test_read_fixed_string_windows_1252() {
        let data = [b'C', b'r', 0xE8, b'm', b'e', 0x00];
        let (_, name) = parse_fixed_string(6)(&data).unwrap();
        assert_eq!(name, "Crème");
    }

    #[test]
    fn test_position_tracking() {
        let data = [0u8; 10];
        let (rest, _) = parse_u32(&data).unwrap();
        let (rest, ()) = skip(2)(rest).unwrap();
        assert_eq!(position(&data, rest), 6);
    }

    #[test]
    fn test_read_fourcc() {
        let (rest, tag) = parse_fourcc(b"RIFFxxxx").unwrap();
        assert_eq!(tag, "RIFF");
        assert_eq!(rest.len(), 4);
    }
}
