//! Property tests for the outer-join merge.

use std::collections::{BTreeMap, BTreeSet};

use mpa_ingest::{SampleTable, TaxonKey, detect_lines};
use mpa_merge::{CollectingSink, MergedTable, TableMerger};
use proptest::prelude::*;

type Sample = BTreeMap<String, f64>;

fn sample_strategy() -> impl Strategy<Value = Sample> {
    prop::collection::btree_map("t[0-9]", 0.0f64..100.0, 0..8)
}

fn to_table(index: usize, sample: &Sample) -> SampleTable {
    let header = format!("#SampleID\tS{index}");
    let layout = detect_lines(&[header.as_str()]).unwrap();
    let rows = sample
        .iter()
        .map(|(taxon, value)| (TaxonKey::from(taxon.as_str()), Some(*value)));
    SampleTable::from_rows(format!("s{index}.tsv"), layout, rows).unwrap()
}

fn merge_in_order(samples: &[Sample], order: &[usize], fill: f64) -> MergedTable {
    let mut sink = CollectingSink::new();
    let mut merger = TableMerger::new();
    for &index in order {
        merger.push(to_table(index, &samples[index]), &mut sink).unwrap();
    }
    merger.finish(fill, &mut sink).unwrap().0
}

proptest! {
    #[test]
    fn every_input_taxon_appears_once(samples in prop::collection::vec(sample_strategy(), 2..5)) {
        let order: Vec<usize> = (0..samples.len()).collect();
        let merged = merge_in_order(&samples, &order, 0.0);

        let expected: BTreeSet<TaxonKey> = samples
            .iter()
            .flat_map(|sample| sample.keys().map(|taxon| TaxonKey::from(taxon.as_str())))
            .collect();
        let actual: Vec<TaxonKey> = merged.keys().cloned().collect();
        prop_assert_eq!(actual.len(), expected.len());
        prop_assert!(actual.into_iter().eq(expected.into_iter()));
        prop_assert_eq!(merged.samples().len(), samples.len());
    }

    #[test]
    fn cells_are_input_values_or_fill(
        samples in prop::collection::vec(sample_strategy(), 2..5),
        fill in -10.0f64..10.0,
    ) {
        let order: Vec<usize> = (0..samples.len()).collect();
        let merged = merge_in_order(&samples, &order, fill);

        for key in merged.keys() {
            let taxon = &key.parts()[0];
            for (index, sample) in samples.iter().enumerate() {
                let expected = sample.get(taxon).copied().unwrap_or(fill);
                prop_assert_eq!(merged.value(key, &format!("S{index}")), Some(expected));
            }
        }
    }

    #[test]
    fn input_order_does_not_change_content(
        samples in prop::collection::vec(sample_strategy(), 2..5),
    ) {
        let forward: Vec<usize> = (0..samples.len()).collect();
        let reverse: Vec<usize> = forward.iter().rev().copied().collect();
        let a = merge_in_order(&samples, &forward, 0.0);
        let b = merge_in_order(&samples, &reverse, 0.0);

        prop_assert!(a.keys().eq(b.keys()));
        let expected_order: Vec<String> = reverse.iter().map(|index| format!("S{index}")).collect();
        prop_assert_eq!(b.samples(), expected_order.as_slice());
        for key in a.keys() {
            for sample in a.samples() {
                prop_assert_eq!(a.value(key, sample), b.value(key, sample));
            }
        }
    }
}
