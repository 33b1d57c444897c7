use guppi_types::{BlockDescriptor, GuppiError, GuppiResult};
use log::debug;

/// Состояние сессии: дескриптор первого блока, прочитанного из потока.
///
/// Формат предполагает неизменную канализацию в пределах файла, поэтому
/// каждый следующий блок обязан совпасть с первым поле в поле.
#[derive(Debug, Default, Clone)]
pub struct SessionState {
    first: Option<BlockDescriptor>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Дескриптор первого блока, если он уже прочитан.
    pub fn descriptor(&self) -> Option<&BlockDescriptor> {
        self.first.as_ref()
    }

    /// Запоминает первый дескриптор или сверяет с ним очередной.
    pub fn check(
        &mut self,
        desc: &BlockDescriptor,
    ) -> GuppiResult<()> {
        match &self.first {
            None => {
                debug!("session captured: {desc:?}");
                self.first = Some(*desc);
                Ok(())
            }
            Some(first) => compare_descriptors(first, desc),
        }
    }

    pub fn reset(&mut self) {
        self.first = None;
    }
}

/// Сравнивает дескрипторы и называет первое расхождение.
pub fn compare_descriptors(
    expected: &BlockDescriptor,
    found: &BlockDescriptor,
) -> GuppiResult<()> {
    fn mismatch<T: ToString>(
        field: &'static str,
        expected: T,
        found: T,
    ) -> GuppiError {
        GuppiError::SessionMismatch {
            field,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    fn opt(v: Option<usize>) -> String {
        v.map_or_else(|| "absent".to_string(), |n| n.to_string())
    }

    if expected.npol != found.npol {
        return Err(mismatch("NPOL", expected.npol, found.npol));
    }
    if expected.obsnchan != found.obsnchan {
        return Err(mismatch("OBSNCHAN", expected.obsnchan, found.obsnchan));
    }
    if expected.bit_depth != found.bit_depth {
        return Err(mismatch(
            "NBITS",
            expected.bit_depth.nbits(),
            found.bit_depth.nbits(),
        ));
    }
    if expected.blocsize != found.blocsize {
        return Err(mismatch("BLOCSIZE", expected.blocsize, found.blocsize));
    }
    if expected.nants != found.nants {
        return Err(mismatch("NANTS", opt(expected.nants), opt(found.nants)));
    }
    if expected.nbeams != found.nbeams {
        return Err(mismatch("NBEAMS", opt(expected.nbeams), opt(found.nbeams)));
    }
    if expected.directio != found.directio {
        return Err(mismatch("DIRECTIO", expected.directio, found.directio));
    }

    Ok(())
}
