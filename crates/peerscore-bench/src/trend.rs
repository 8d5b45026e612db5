//! Sector by year matrix of mean scores.

use crate::segment::SegmentStats;
use peerscore_data::Sector;
use std::collections::{BTreeMap, BTreeSet};

/// Mean score per (sector, year). Missing combinations have no cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendMatrix {
    years: Vec<i32>,
    sectors: Vec<Sector>,
    cells: BTreeMap<(Sector, i32), f64>,
}

impl TrendMatrix {
    /// Build from segment statistics
    pub fn from_segments(segments: &[SegmentStats]) -> Self {
        let mut years = BTreeSet::new();
        let mut sectors = BTreeSet::new();
        let mut cells = BTreeMap::new();
        for stats in segments {
            years.insert(stats.key.year);
            sectors.insert(stats.key.sector.clone());
            cells.insert((stats.key.sector.clone(), stats.key.year), stats.mean);
        }
        Self {
            years: years.into_iter().collect(),
            sectors: sectors.into_iter().collect(),
            cells,
        }
    }

    /// Column years, ascending
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Row sectors, in sector order
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// Mean score of a sector in a year
    pub fn get(&self, sector: &Sector, year: i32) -> Option<f64> {
        self.cells.get(&(sector.clone(), year)).copied()
    }

    /// One sector's cells across all years
    pub fn row(&self, sector: &Sector) -> Vec<Option<f64>> {
        self.years.iter().map(|&year| self.get(sector, year)).collect()
    }

    /// Whether the matrix has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::IndustryYear;
    use peerscore_data::IsicSection;

    fn stats(year: i32, sector: Sector, mean: f64) -> SegmentStats {
        SegmentStats {
            key: IndustryYear::new(year, sector),
            count: 1,
            mean,
            median: mean,
            std: None,
        }
    }

    #[test]
    fn test_sparse_matrix() {
        let trade = Sector::Isic(IsicSection::Trade);
        let other = Sector::Unclassified("Other".into());
        let matrix = TrendMatrix::from_segments(&[
            stats(2022, trade.clone(), 5.5),
            stats(2020, trade.clone(), 4.0),
            stats(2021, other.clone(), 3.0),
        ]);

        assert_eq!(matrix.years(), &[2020, 2021, 2022]);
        assert_eq!(matrix.sectors(), &[trade.clone(), other.clone()]);
        assert_eq!(matrix.row(&trade), vec![Some(4.0), None, Some(5.5)]);
        assert_eq!(matrix.get(&other, 2021), Some(3.0));
        assert_eq!(matrix.get(&other, 2022), None);
    }

    #[test]
    fn test_empty() {
        assert!(TrendMatrix::from_segments(&[]).is_empty());
    }
}
