//! Распаковка и упаковка выборок.
//!
//! | NBITS | байт на выборку | раскладка                                     |
//! |-------|-----------------|-----------------------------------------------|
//! | 4     | 1               | Re: старший полубайт, Im: младший (со знаком) |
//! | 8     | 2               | Re, Im: знаковые байты                         |
//! | 16    | 4               | Re, Im: IEEE half, little-endian               |
//!
//! Для 16 бит данные трактуются как пары half-float. Это поведение формата
//! сохранено как есть, хотя целочисленная трактовка тоже встречается.

use byteorder::{ByteOrder, LittleEndian};
use guppi_types::{BitDepth, GuppiError, GuppiResult};
use half::f16;
use num_complex::Complex32;

/// Общая возможность кодирования/декодирования для каждой разрядности.
pub trait SampleCodec {
    /// Распаковывает область данных в комплексные выборки.
    fn decode(
        &self,
        raw: &[u8],
    ) -> GuppiResult<Vec<Complex32>>;

    /// Упаковывает выборки и дописывает байты в `out`.
    ///
    /// Для 4 и 8 бит значения округляются до ближайшего целого и
    /// усекаются по модулю (дополнительный код): 8 в 4-битном поле
    /// превращается в -8.
    fn encode<'a, I>(
        &self,
        samples: I,
        out: &mut Vec<u8>,
    ) where
        I: IntoIterator<Item = &'a Complex32>;
}

impl SampleCodec for BitDepth {
    fn decode(
        &self,
        raw: &[u8],
    ) -> GuppiResult<Vec<Complex32>> {
        let bytes_per_sample = self.bits_per_sample() / 8;

        if raw.len() % bytes_per_sample != 0 {
            return Err(GuppiError::geometry(format!(
                "{} data region of {} bytes is not a whole number of samples",
                self,
                raw.len()
            )));
        }

        let samples = match self {
            BitDepth::Four => raw
                .iter()
                .map(|&b| {
                    let (re, im) = unpack_nibbles(b);
                    Complex32::new(re as f32, im as f32)
                })
                .collect(),
            BitDepth::Eight => raw
                .chunks_exact(2)
                .map(|c| Complex32::new(c[0] as i8 as f32, c[1] as i8 as f32))
                .collect(),
            BitDepth::Sixteen => raw
                .chunks_exact(4)
                .map(|c| {
                    Complex32::new(
                        f16::from_bits(LittleEndian::read_u16(&c[0..2])).to_f32(),
                        f16::from_bits(LittleEndian::read_u16(&c[2..4])).to_f32(),
                    )
                })
                .collect(),
        };

        Ok(samples)
    }

    fn encode<'a, I>(
        &self,
        samples: I,
        out: &mut Vec<u8>,
    ) where
        I: IntoIterator<Item = &'a Complex32>,
    {
        match self {
            BitDepth::Four => {
                out.extend(
                    samples
                        .into_iter()
                        .map(|s| pack_nibbles(quantize(s.re) as i8, quantize(s.im) as i8)),
                );
            }
            BitDepth::Eight => {
                for s in samples {
                    out.push(quantize(s.re) as i8 as u8);
                    out.push(quantize(s.im) as i8 as u8);
                }
            }
            BitDepth::Sixteen => {
                let mut word = [0u8; 2];
                for s in samples {
                    LittleEndian::write_u16(&mut word, f16::from_f32(s.re).to_bits());
                    out.extend_from_slice(&word);
                    LittleEndian::write_u16(&mut word, f16::from_f32(s.im).to_bits());
                    out.extend_from_slice(&word);
                }
            }
        }
    }
}

/// Раскладывает байт 4-битной выборки на (Re, Im) с расширением знака.
#[inline]
pub fn unpack_nibbles(byte: u8) -> (i8, i8) {
    let b = byte as i8;
    (b >> 4, (b << 4) >> 4)
}

/// Собирает байт из двух 4-битных значений; старшие биты отбрасываются.
#[inline]
pub fn pack_nibbles(
    re: i8,
    im: i8,
) -> u8 {
    ((re as u8) << 4) | (im as u8 & 0x0F)
}

/// Переводит 4-битные данные в 8-битные пары (Re, Im) без перехода
/// к комплексным числам. Выход вдвое длиннее входа.
pub fn widen_4bit_to_8bit(
    raw: &[u8],
    out: &mut Vec<u8>,
) {
    out.reserve(raw.len() * 2);
    for &b in raw {
        let (re, im) = unpack_nibbles(b);
        out.push(re as u8);
        out.push(im as u8);
    }
}

#[inline]
fn quantize(v: f32) -> i32 {
    // `as` насыщает и отображает NaN в 0
    v.round() as i32
}
