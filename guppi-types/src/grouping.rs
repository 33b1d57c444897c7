/// Ведущая ось тензора выборок.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupingAxis {
    /// Ни NANTS, ни NBEAMS: тензор трёхмерный (канал, время, поляризация)
    Ungrouped,
    /// Каналы разбиты по антеннам (NANTS)
    Antennas(usize),
    /// Каналы разбиты по лучам (NBEAMS)
    Beams(usize),
}

impl GroupingAxis {
    /// Выбирает ось: NBEAMS имеет приоритет над NANTS.
    pub fn from_counts(
        nants: Option<usize>,
        nbeams: Option<usize>,
    ) -> Self {
        match (nbeams, nants) {
            (Some(b), _) => GroupingAxis::Beams(b),
            (None, Some(a)) => GroupingAxis::Antennas(a),
            (None, None) => GroupingAxis::Ungrouped,
        }
    }

    /// Длина ведущей оси, если она есть.
    pub fn count(&self) -> Option<usize> {
        match self {
            GroupingAxis::Ungrouped => None,
            GroupingAxis::Antennas(n) | GroupingAxis::Beams(n) => Some(*n),
        }
    }

    /// Ключ заголовка, задающий ось.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            GroupingAxis::Ungrouped => None,
            GroupingAxis::Antennas(_) => Some(crate::keys::NANTS),
            GroupingAxis::Beams(_) => Some(crate::keys::NBEAMS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beams_take_precedence() {
        assert_eq!(
            GroupingAxis::from_counts(Some(4), Some(2)),
            GroupingAxis::Beams(2)
        );
        assert_eq!(
            GroupingAxis::from_counts(Some(4), None),
            GroupingAxis::Antennas(4)
        );
        assert_eq!(GroupingAxis::from_counts(None, None), GroupingAxis::Ungrouped);
        assert_eq!(GroupingAxis::Ungrouped.count(), None);
    }
}
