use guppi_types::{GuppiError, GuppiResult};
use ndarray::{Array3, Array4, ArrayViewD};
use num_complex::Complex32;

use crate::geometry::BlockGeometry;

/// Комплексные выборки одного блока.
///
/// Компоненты всегда хранятся как пара f32 независимо от NBITS источника.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleTensor {
    /// (антенна/луч, канал в группе, время, поляризация)
    Grouped(Array4<Complex32>),
    /// (канал, время, поляризация)
    Ungrouped(Array3<Complex32>),
}

impl SampleTensor {
    /// Раскладывает плоский вектор выборок по форме из геометрии.
    pub fn from_samples(
        geometry: &BlockGeometry,
        samples: Vec<Complex32>,
    ) -> GuppiResult<Self> {
        let expected = geometry.sample_count();
        if samples.len() != expected {
            return Err(GuppiError::geometry(format!(
                "decoded {} samples, geometry expects {expected}",
                samples.len()
            )));
        }

        let (npol, nsamps) = (geometry.npol, geometry.nsamps_per_block);
        let tensor = match geometry.grouping.count() {
            Some(groups) => SampleTensor::Grouped(
                Array4::from_shape_vec((groups, geometry.nchan_per_group, nsamps, npol), samples)
                    .map_err(|e| GuppiError::shape(e.to_string()))?,
            ),
            None => SampleTensor::Ungrouped(
                Array3::from_shape_vec((geometry.obsnchan, nsamps, npol), samples)
                    .map_err(|e| GuppiError::shape(e.to_string()))?,
            ),
        };

        Ok(tensor)
    }

    /// Динамическое представление для обхода в логическом порядке.
    pub fn view(&self) -> ArrayViewD<'_, Complex32> {
        match self {
            SampleTensor::Grouped(a) => a.view().into_dyn(),
            SampleTensor::Ungrouped(a) => a.view().into_dyn(),
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            SampleTensor::Grouped(a) => a.shape(),
            SampleTensor::Ungrouped(a) => a.shape(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SampleTensor::Grouped(a) => a.len(),
            SampleTensor::Ungrouped(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Длина ведущей оси, если тензор четырёхмерный.
    pub fn group_count(&self) -> Option<usize> {
        match self {
            SampleTensor::Grouped(a) => Some(a.dim().0),
            SampleTensor::Ungrouped(_) => None,
        }
    }

    /// Каналов в одной группе (все каналы для трёхмерного тензора).
    pub fn nchan_per_group(&self) -> usize {
        match self {
            SampleTensor::Grouped(a) => a.dim().1,
            SampleTensor::Ungrouped(a) => a.dim().0,
        }
    }

    /// Общее число каналов.
    pub fn obsnchan(&self) -> usize {
        self.group_count().unwrap_or(1) * self.nchan_per_group()
    }

    /// Отсчётов времени.
    pub fn ntime(&self) -> usize {
        let shape = self.shape();
        shape[shape.len() - 2]
    }

    pub fn npol(&self) -> usize {
        let shape = self.shape();
        shape[shape.len() - 1]
    }
}

impl From<Array4<Complex32>> for SampleTensor {
    fn from(a: Array4<Complex32>) -> Self {
        SampleTensor::Grouped(a)
    }
}

impl From<Array3<Complex32>> for SampleTensor {
    fn from(a: Array3<Complex32>) -> Self {
        SampleTensor::Ungrouped(a)
    }
}

#[cfg(test)]
mod tests {
    use guppi_types::{BitDepth, GroupingAxis};

    use super::*;

    #[test]
    fn test_reshape_is_row_major() {
        let g = BlockGeometry::from_parts(2, 4, BitDepth::Eight, 2 * 4 * 2 * 3, GroupingAxis::Antennas(2))
            .unwrap();
        let samples: Vec<Complex32> = (0..g.sample_count())
            .map(|i| Complex32::new(i as f32, 0.0))
            .collect();

        let t = SampleTensor::from_samples(&g, samples).unwrap();
        assert_eq!(t.shape(), &[2, 2, 3, 2]);
        assert_eq!(t.obsnchan(), 4);
        assert_eq!(t.ntime(), 3);
        assert_eq!(t.npol(), 2);

        // Поляризация меняется быстрее всего, затем время, канал, антенна
        match &t {
            SampleTensor::Grouped(a) => {
                assert_eq!(a[[0, 0, 0, 1]].re, 1.0);
                assert_eq!(a[[0, 0, 1, 0]].re, 2.0);
                assert_eq!(a[[0, 1, 0, 0]].re, 6.0);
                assert_eq!(a[[1, 0, 0, 0]].re, 12.0);
            }
            SampleTensor::Ungrouped(_) => panic!("expected grouped tensor"),
        }
    }

    #[test]
    fn test_sample_count_mismatch() {
        let g = BlockGeometry::from_parts(1, 2, BitDepth::Eight, 8, GroupingAxis::Ungrouped).unwrap();
        assert!(SampleTensor::from_samples(&g, vec![Complex32::new(0.0, 0.0); 3]).is_err());
    }
}
