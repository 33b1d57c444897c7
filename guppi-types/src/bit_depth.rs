use crate::{GuppiError, GuppiResult};

/// Разрядность одной компоненты (Re или Im) выборки.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BitDepth {
    /// 4 бита: одна комплексная выборка в одном байте (Re: старший полубайт)
    Four = 4,
    /// 8 бит: Re и Im: соседние знаковые байты
    Eight = 8,
    /// 16 бит: Re и Im: соседние half-float значения
    Sixteen = 16,
}

impl BitDepth {
    pub fn from_nbits(v: i64) -> GuppiResult<Self> {
        match v {
            4 => Ok(BitDepth::Four),
            8 => Ok(BitDepth::Eight),
            16 => Ok(BitDepth::Sixteen),
            _ => Err(GuppiError::UnsupportedBitDepth(v)),
        }
    }

    pub fn nbits(&self) -> u32 {
        *self as u32
    }

    /// Размер одной комплексной выборки в битах (Re + Im).
    pub fn bits_per_sample(&self) -> usize {
        2 * self.nbits() as usize
    }

    /// Сколько байт занимают `samples` комплексных выборок.
    pub fn packed_len(
        &self,
        samples: usize,
    ) -> usize {
        samples * self.bits_per_sample() / 8
    }

    /// Сколько комплексных выборок содержится в `bytes` байтах.
    pub fn samples_in(
        &self,
        bytes: usize,
    ) -> usize {
        bytes * 8 / self.bits_per_sample()
    }
}

impl std::fmt::Display for BitDepth {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}-bit", self.nbits())
    }
}
