use guppi_types::{BitDepth, BlockDescriptor, GroupingAxis, GuppiError, GuppiResult};

/// Раскладка одного блока: сколько отсчётов времени он содержит и как
/// каналы распределены по ведущей оси.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGeometry {
    /// Число поляризаций
    pub npol: usize,
    /// Общее число каналов
    pub obsnchan: usize,
    /// Отсчётов времени в блоке
    pub nsamps_per_block: usize,
    /// Ведущая ось (антенны, лучи или её отсутствие)
    pub grouping: GroupingAxis,
    /// Каналов на одну антенну/луч (равно `obsnchan` без группировки)
    pub nchan_per_group: usize,
}

impl BlockGeometry {
    /// Вычисляет геометрию из дескриптора.
    pub fn resolve(desc: &BlockDescriptor) -> GuppiResult<Self> {
        Self::from_parts(
            desc.npol,
            desc.obsnchan,
            desc.bit_depth,
            desc.blocsize,
            desc.grouping(),
        )
    }

    /// `nsamps = BLOCSIZE / (2 * NPOL * OBSNCHAN * NBITS/8)`, с точной
    /// обратной проверкой. Арифметика ведётся в битах, поэтому 4-битный
    /// случай не требует дробей.
    pub fn from_parts(
        npol: usize,
        obsnchan: usize,
        bit_depth: BitDepth,
        blocsize: usize,
        grouping: GroupingAxis,
    ) -> GuppiResult<Self> {
        if npol == 0 || obsnchan == 0 {
            return Err(GuppiError::geometry(format!(
                "NPOL ({npol}) and OBSNCHAN ({obsnchan}) must be positive"
            )));
        }

        let overflow = || GuppiError::geometry("block dimensions overflow");

        let bits_per_timestep = npol
            .checked_mul(obsnchan)
            .and_then(|v| v.checked_mul(bit_depth.bits_per_sample()))
            .ok_or_else(overflow)?;
        let block_bits = blocsize.checked_mul(8).ok_or_else(overflow)?;

        let nsamps_per_block = block_bits / bits_per_timestep;

        if nsamps_per_block * bits_per_timestep != block_bits {
            return Err(GuppiError::geometry(format!(
                "2*{npol}*{obsnchan}*{}*{nsamps_per_block} != {blocsize}",
                bit_depth.nbits() as f64 / 8.0
            )));
        }

        let nchan_per_group = match grouping.count() {
            None => obsnchan,
            Some(0) => {
                return Err(GuppiError::geometry(format!(
                    "{} must be positive",
                    grouping.key().unwrap_or("grouping axis")
                )));
            }
            Some(n) => {
                if obsnchan % n != 0 {
                    return Err(GuppiError::geometry(format!(
                        "OBSNCHAN does not divide evenly across {}: obsnchan: {obsnchan}, {}: {n}",
                        grouping_noun(grouping),
                        grouping.key().unwrap_or_default().to_lowercase(),
                    )));
                }
                obsnchan / n
            }
        };

        Ok(Self {
            npol,
            obsnchan,
            nsamps_per_block,
            grouping,
            nchan_per_group,
        })
    }

    /// Форма тензора: (группа, канал, время, поляризация) или
    /// (канал, время, поляризация).
    pub fn shape(&self) -> Vec<usize> {
        match self.grouping.count() {
            Some(groups) => vec![
                groups,
                self.nchan_per_group,
                self.nsamps_per_block,
                self.npol,
            ],
            None => vec![self.obsnchan, self.nsamps_per_block, self.npol],
        }
    }

    /// Число комплексных выборок в блоке.
    pub fn sample_count(&self) -> usize {
        self.obsnchan * self.nsamps_per_block * self.npol
    }
}

fn grouping_noun(grouping: GroupingAxis) -> &'static str {
    match grouping {
        GroupingAxis::Beams(_) => "beams",
        _ => "antennas",
    }
}
