//! End-to-end integration tests.

use correl_nets::{
    significance, ClrPearson, Dataset, PAdjust, Procs, SignificanceEngine, COL_ADJUSTED_P,
};

/// Deterministic abundances from a small LCG, so tests need no RNG.
fn abundances(n: usize, mut state: u64) -> Vec<f64> {
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) % 50) as f64
        })
        .collect()
}

fn dataset(features: usize, samples: usize) -> Dataset {
    let columns = (0..features)
        .map(|j| (format!("otu_{j}"), abundances(samples, 17 + j as u64)))
        .collect();
    Dataset::from_columns(columns).unwrap()
}

/// Three features, ten samples, five bootstraps, no correction.
#[test]
fn small_run_without_correction() {
    let result = SignificanceEngine::new()
        .bootstraps(5)
        .p_adjust(PAdjust::None)
        .procs(Procs::Fixed(1))
        .seed(11)
        .run(&dataset(3, 10), &ClrPearson::default())
        .unwrap();

    let table = &result.table;
    assert_eq!(table.len(), 3);
    assert_eq!(table.header(), &["feature1", "feature2", "r", "p"]);

    let pairs: Vec<_> = table
        .records()
        .iter()
        .map(|r| (r.feature1.as_str(), r.feature2.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![("otu_0", "otu_1"), ("otu_0", "otu_2"), ("otu_1", "otu_2")]
    );

    for rec in table.records() {
        let p = rec.p.unwrap();
        let steps = p * 5.0;
        assert!((steps - steps.round()).abs() < 1e-12, "p = {p}");
        assert!((0.0..=1.0).contains(&p));
        assert!(rec.adjusted_p.is_none());
    }
}

/// Two features produce exactly one pair.
#[test]
fn two_features_one_pair() {
    let result = SignificanceEngine::quick()
        .run(&dataset(2, 8), &ClrPearson::default())
        .unwrap();
    assert_eq!(result.table.len(), 1);
    assert_eq!(result.counts.counts().len(), 1);
}

/// Correction adds a fifth column aligned with the pairs.
#[test]
fn correction_adds_adjusted_column() {
    let result = SignificanceEngine::new()
        .bootstraps(20)
        .p_adjust(PAdjust::BenjaminiHochberg)
        .procs(Procs::Fixed(2))
        .seed(5)
        .run(&dataset(5, 12), &ClrPearson::default())
        .unwrap();

    let table = &result.table;
    assert_eq!(table.len(), 10);
    assert_eq!(table.n_columns(), 5);
    assert_eq!(table.header()[4], COL_ADJUSTED_P);
    for rec in table.records() {
        let (p, adj) = (rec.p.unwrap(), rec.adjusted_p.unwrap());
        assert!(adj >= p - 1e-12, "adjusted {adj} below raw {p}");
        assert!(adj <= 1.0);
    }
}

/// A user-supplied correction is applied as given.
#[test]
fn custom_correction() {
    let halve = PAdjust::custom(|p: &[f64]| p.iter().map(|v| v / 2.0).collect());
    let result = SignificanceEngine::new()
        .bootstraps(10)
        .p_adjust(halve)
        .procs(Procs::Fixed(1))
        .seed(1)
        .run(&dataset(3, 9), &ClrPearson::default())
        .unwrap();
    for rec in result.table.records() {
        assert_eq!(rec.adjusted_p.unwrap(), rec.p.unwrap() / 2.0);
    }
}

/// Correlations-only path has three columns.
#[test]
fn correlations_only() {
    let table = SignificanceEngine::new()
        .correlations(&dataset(4, 10), &ClrPearson::default())
        .unwrap();
    assert_eq!(table.n_columns(), 3);
    assert_eq!(table.len(), 6);
    assert!(table.records().iter().all(|r| r.p.is_none()));
}

/// Convenience function uses the default configuration.
#[test]
fn convenience_function() {
    let result = significance(&dataset(3, 10), &ClrPearson::default()).unwrap();
    assert_eq!(result.metadata.bootstraps, 100);
    assert_eq!(result.counts.trials(), 100);
    assert!(result.table.has_adjusted_p());
}

/// Results serialize to JSON and text.
#[test]
fn output_formats() {
    let result = SignificanceEngine::quick()
        .seed(2)
        .run(&dataset(3, 10), &ClrPearson::default())
        .unwrap();

    let json = correl_nets::output::to_json(&result).unwrap();
    assert!(json.contains("\"feature1\":\"otu_0\""));
    assert!(json.contains("\"seed\":2"));

    let tsv = correl_nets::output::to_tsv(&result.table).unwrap();
    assert_eq!(tsv.lines().count(), 4);

    let summary = correl_nets::output::format_result(&result, 0.05);
    assert!(summary.contains("Bootstraps: 20"));
}

/// Taxonomy-style names with delimiters keep every row at header width.
#[test]
fn delimited_output_quotes_taxonomy_names() {
    let ds = Dataset::from_columns(vec![
        ("Bacteria;Firmicutes,Clostridia", abundances(10, 3)),
        ("Bacteria\tBacteroidetes", abundances(10, 4)),
    ])
    .unwrap();
    let result = SignificanceEngine::new()
        .bootstraps(5)
        .p_adjust(PAdjust::None)
        .procs(Procs::Fixed(1))
        .seed(4)
        .run(&ds, &ClrPearson::default())
        .unwrap();

    for delimiter in [b',', b'\t'] {
        let mut buf = Vec::new();
        correl_nets::output::write_delimited(&result.table, &mut buf, delimiter).unwrap();
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .from_reader(buf.as_slice());
        assert_eq!(reader.headers().unwrap().len(), 4);
        let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 4);
        assert_eq!(&rows[0][0], "Bacteria;Firmicutes,Clostridia");
        assert_eq!(&rows[0][1], "Bacteria\tBacteroidetes");
    }
}
