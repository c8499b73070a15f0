//! CC number to HUI fader zone lookup

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::{Error, Result};
use crate::hui::FaderZone;
use crate::midi::MAX_DATA_BYTE;

/// Static CC → zone table, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneMapper {
    table: [Option<FaderZone>; 128],
}

impl ZoneMapper {
    /// Build the table from `(cc, zone)` pairs.
    ///
    /// Fails on a CC number above 127 or a zone above 7. Two CCs sharing a
    /// zone is allowed but logged.
    pub fn new<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u8, u8)>,
    {
        let mut table = [None; 128];
        let mut used = [false; crate::hui::ZONE_COUNT];

        for (cc, zone_index) in entries {
            if cc > MAX_DATA_BYTE {
                return Err(Error::Config(format!(
                    "mapping CC number {} is out of range (must be 0-127)",
                    cc
                )));
            }
            let zone = FaderZone::new(zone_index).ok_or_else(|| {
                Error::Config(format!(
                    "CC {} maps to zone {} (must be 0-7)",
                    cc, zone_index
                ))
            })?;

            if used[usize::from(zone.index())] {
                warn!("Zone {} is targeted by more than one CC (latest: CC {})", zone, cc);
            }
            used[usize::from(zone.index())] = true;
            table[usize::from(cc)] = Some(zone);
        }

        Ok(Self { table })
    }

    /// Zone for a CC number, `None` when unmapped or out of range.
    pub fn resolve(&self, cc: u8) -> Option<FaderZone> {
        self.table.get(usize::from(cc)).copied().flatten()
    }

    /// Mapped `(cc, zone)` pairs in ascending CC order.
    pub fn entries(&self) -> impl Iterator<Item = (u8, FaderZone)> + '_ {
        self.table
            .iter()
            .enumerate()
            .filter_map(|(cc, zone)| zone.map(|z| (cc as u8, z)))
    }
}

impl TryFrom<&BTreeMap<u8, u8>> for ZoneMapper {
    type Error = Error;

    fn try_from(map: &BTreeMap<u8, u8>) -> Result<Self> {
        Self::new(map.iter().map(|(&cc, &zone)| (cc, zone)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(index: u8) -> FaderZone {
        FaderZone::new(index).unwrap()
    }

    #[test]
    fn test_resolve_mapped_and_unmapped() {
        let mapper = ZoneMapper::new([(11, 0), (1, 1), (7, 7)]).unwrap();

        assert_eq!(mapper.resolve(11), Some(zone(0)));
        assert_eq!(mapper.resolve(1), Some(zone(1)));
        assert_eq!(mapper.resolve(7), Some(zone(7)));
        assert_eq!(mapper.resolve(64), None);
        assert_eq!(mapper.resolve(200), None);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let mapper = ZoneMapper::new([(21, 3)]).unwrap();
        for _ in 0..10 {
            assert_eq!(mapper.resolve(21), Some(zone(3)));
            assert_eq!(mapper.resolve(22), None);
        }
    }

    #[test]
    fn test_rejects_zone_out_of_range() {
        let err = ZoneMapper::new([(1, 8)]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("zone 8"));
    }

    #[test]
    fn test_rejects_cc_out_of_range() {
        assert!(matches!(
            ZoneMapper::new([(128, 0)]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_shared_zone_is_allowed() {
        let mapper = ZoneMapper::new([(1, 2), (2, 2)]).unwrap();
        assert_eq!(mapper.resolve(1), Some(zone(2)));
        assert_eq!(mapper.resolve(2), Some(zone(2)));
    }

    #[test]
    fn test_entries_sorted_by_cc() {
        let map: BTreeMap<u8, u8> = [(9, 6), (2, 2), (5, 4)].into_iter().collect();
        let mapper = ZoneMapper::try_from(&map).unwrap();
        let entries: Vec<_> = mapper.entries().map(|(cc, z)| (cc, z.index())).collect();
        assert_eq!(entries, vec![(2, 2), (5, 4), (9, 6)]);
    }
}
