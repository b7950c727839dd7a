use narrowfp::error::NarrowError;
use narrowfp::{NarrowFormat, Rounding, bf16, f16};

/// Parse `0x`-prefixed hex or plain decimal.
pub fn parse_bits(s: &str) -> Result<u64, NarrowError> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|_| NarrowError::Parse(format!("bit pattern '{s}'")))
}

fn encode_one(value: f32, ty: NarrowFormat, rounding: Rounding) -> u16 {
    match ty {
        NarrowFormat::Bf16 => bf16::encode_with(value, rounding),
        NarrowFormat::Half => f16::encode_with(value, rounding),
    }
}

fn decode_one(bits: u16, ty: NarrowFormat) -> f32 {
    match ty {
        NarrowFormat::Bf16 => bf16::narrow_decode(bits),
        NarrowFormat::Half => f16::f16_to_f32(bits),
    }
}

pub fn encode(
    value: f32,
    ty: NarrowFormat,
    rounding: Rounding,
) -> Result<(), Box<dyn std::error::Error>> {
    let bits = encode_one(value, ty, rounding);
    let back = decode_one(bits, ty);
    println!("{ty} 0x{bits:04X}");
    println!("decoded: {back}");
    println!("error: {}", (back - value).abs());
    Ok(())
}

pub fn decode(bits: &str, ty: NarrowFormat) -> Result<(), Box<dyn std::error::Error>> {
    let raw = parse_bits(bits)?;
    let bits = u16::try_from(raw)
        .map_err(|_| NarrowError::Parse(format!("{ty} pattern 0x{raw:X} wider than 16 bits")))?;
    println!("{}", decode_one(bits, ty));
    Ok(())
}

pub fn pack(
    x: f32,
    y: f32,
    ty: NarrowFormat,
    rounding: Rounding,
) -> Result<(), Box<dyn std::error::Error>> {
    let word = match ty {
        NarrowFormat::Bf16 => bf16::encode_pair_with(x, y, rounding),
        NarrowFormat::Half => f16::encode_pair(x, y, rounding),
    };
    println!("{ty}x2 0x{word:08X}");
    Ok(())
}

pub fn unpack(word: &str, ty: NarrowFormat) -> Result<(), Box<dyn std::error::Error>> {
    let raw = parse_bits(word)?;
    let word = u32::try_from(raw)
        .map_err(|_| NarrowError::Parse(format!("word 0x{raw:X} wider than 32 bits")))?;
    let (lo, hi) = match ty {
        NarrowFormat::Bf16 => bf16::narrow_decode_pair(word),
        NarrowFormat::Half => f16::decode_pair(word),
    };
    println!("lane0: {lo}");
    println!("lane1: {hi}");
    Ok(())
}
