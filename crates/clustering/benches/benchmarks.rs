criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        clustering_kprototypes_cold,
        clustering_kprototypes_warm,
        clustering_kprototypes_euclidean,
}

fn clustering_kprototypes_cold(c: &mut criterion::Criterion) {
    let (ref weights, ref features, ref labels) = fixture();
    c.bench_function("cluster a 64x64 image into 64 superpixels", |b| {
        b.iter(|| Clusterer::new(weights).run(64, CLASSES, features, labels))
    });
}

fn clustering_kprototypes_warm(c: &mut criterion::Criterion) {
    let (ref weights, ref features, ref labels) = fixture();
    let mut clusterer = Clusterer::new(weights);
    clusterer.run(64, CLASSES, features, labels);
    c.bench_function("recluster a 64x64 image from a warm start", |b| {
        b.iter(|| clusterer.run(64, CLASSES, features, labels))
    });
}

fn clustering_kprototypes_euclidean(c: &mut criterion::Criterion) {
    let (ref weights, ref features, ref labels) = fixture();
    let config = ClustererConfig {
        metric: FeatureMetric::Euclidean,
        ..ClustererConfig::default()
    };
    c.bench_function("cluster a 64x64 image with diagonal distance", |b| {
        b.iter(|| Clusterer::with_config(weights, config).run(64, CLASSES, features, labels))
    });
}

const CLASSES: usize = 8;
const SIDE: Coord = 64;

/// smooth color gradient with blocky labels
fn fixture() -> (Weights, FeatureImage, LabelImage) {
    let weights = Weights::zeros(CLASSES).with_similarity(SimilarityMatrix::identity());
    let color = (0..SIDE * SIDE)
        .map(|i| {
            let x = (i % SIDE) as Cost / SIDE as Cost;
            let y = (i / SIDE) as Cost / SIDE as Cost;
            [x, y, (x + y) / 2.]
        })
        .collect::<Vec<_>>();
    let features = FeatureImage::from_color(SIDE, SIDE, &color).expect("square image");
    let labels = (0..SIDE * SIDE)
        .map(|i| ((i % SIDE) / 16 + (i / SIDE) / 16 * 4) as Label % CLASSES as Label)
        .collect();
    let labels = LabelImage::from_vec(SIDE, SIDE, labels).expect("square image");
    (weights, features, labels)
}

use hseg_clustering::*;
use hseg_core::*;
use hseg_model::*;
