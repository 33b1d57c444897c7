use crate::{keys, BitDepth, GroupingAxis, GuppiError, GuppiHeader, GuppiResult};

/// Поля заголовка, определяющие раскладку блока.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDescriptor {
    /// Число поляризаций (NPOL)
    pub npol: usize,
    /// Общее число каналов (OBSNCHAN)
    pub obsnchan: usize,
    /// Разрядность компоненты (NBITS)
    pub bit_depth: BitDepth,
    /// Длина области данных в байтах без выравнивания (BLOCSIZE)
    pub blocsize: usize,
    /// Число антенн (NANTS), если задано
    pub nants: Option<usize>,
    /// Число лучей (NBEAMS), если задано
    pub nbeams: Option<usize>,
    /// Выравнивание заголовка и данных по 512 байт (DIRECTIO)
    pub directio: bool,
}

impl BlockDescriptor {
    /// Извлекает дескриптор из заголовка.
    ///
    /// Отсутствие NPOL, OBSNCHAN, NBITS, BLOCSIZE или DIRECTIO: ошибка
    /// `MissingField`; NBITS вне {4, 8, 16}: `UnsupportedBitDepth`.
    pub fn from_header(header: &GuppiHeader) -> GuppiResult<Self> {
        let npol = header.get_usize(keys::NPOL)?;
        let obsnchan = header.get_usize(keys::OBSNCHAN)?;
        let bit_depth = BitDepth::from_nbits(header.get_int(keys::NBITS)?)?;
        let blocsize = header.get_usize(keys::BLOCSIZE)?;
        let nants = header.get_opt_usize(keys::NANTS)?;
        let nbeams = header.get_opt_usize(keys::NBEAMS)?;

        if !header.contains_key(keys::DIRECTIO) {
            return Err(GuppiError::missing_field(keys::DIRECTIO));
        }

        Ok(Self {
            npol,
            obsnchan,
            bit_depth,
            blocsize,
            nants,
            nbeams,
            directio: header.directio(),
        })
    }

    /// Ведущая ось тензора (NBEAMS приоритетнее NANTS).
    pub fn grouping(&self) -> GroupingAxis {
        GroupingAxis::from_counts(self.nants, self.nbeams)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeaderValue;

    fn header() -> GuppiHeader {
        [
            ("NPOL", 2),
            ("OBSNCHAN", 64),
            ("NBITS", 8),
            ("BLOCSIZE", 8192),
            ("NANTS", 4),
            ("DIRECTIO", 1),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_from_header() {
        let d = BlockDescriptor::from_header(&header()).unwrap();

        assert_eq!(d.npol, 2);
        assert_eq!(d.obsnchan, 64);
        assert_eq!(d.bit_depth, BitDepth::Eight);
        assert_eq!(d.blocsize, 8192);
        assert_eq!(d.grouping(), GroupingAxis::Antennas(4));
        assert!(d.directio);
    }

    #[test]
    fn test_missing_fields() {
        for key in ["NPOL", "OBSNCHAN", "NBITS", "BLOCSIZE", "DIRECTIO"] {
            let mut h = header();
            h.remove(key);
            match BlockDescriptor::from_header(&h) {
                Err(GuppiError::MissingField(k)) => assert_eq!(k, key),
                other => panic!("expected MissingField({key}), got {other:?}"),
            }
        }
    }

    #[test]
    fn test_unsupported_nbits() {
        let mut h = header();
        h.insert("NBITS", HeaderValue::Int(2));
        assert!(matches!(
            BlockDescriptor::from_header(&h),
            Err(GuppiError::UnsupportedBitDepth(2))
        ));
    }
}
