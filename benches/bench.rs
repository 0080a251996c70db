// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use criterion::*;

use hyperdft::{
    dft::kernel::visibility_intensity,
    synthetic::{generate_sources, generate_visibilities, SyntheticParams},
    Complex, CpuDevice, DftConfig, DftFloat, DirectionCorrection,
};

fn cpu_dft<F: DftFloat>(c: &mut Criterion, name: &str) {
    let mut group = c.benchmark_group(name);
    for (num_sources, num_visibilities) in [(10, 10_000), (100, 10_000), (1000, 1000)] {
        let config = DftConfig::default().with_counts(num_sources, num_visibilities);
        let sources = generate_sources::<F>(&config, 1);
        let visibilities =
            generate_visibilities::<F>(&config, &SyntheticParams::default()).unwrap();
        let mut intensities = vec![Complex::<F>::default(); num_visibilities];
        let device = CpuDevice::new();

        group.throughput(Throughput::Elements((num_sources * num_visibilities) as u64));
        group.bench_with_input(
            BenchmarkId::new("extract_visibilities", format!("{num_sources}x{num_visibilities}")),
            &(),
            |b, _| {
                b.iter(|| {
                    hyperdft::extract_visibilities(
                        &device,
                        &config,
                        &sources,
                        &visibilities,
                        &mut intensities,
                        num_visibilities,
                    )
                    .unwrap()
                })
            },
        );
    }
    group.finish();
}

fn cpu_dft_single(c: &mut Criterion) {
    cpu_dft::<f32>(c, "cpu single");
}

fn cpu_dft_double(c: &mut Criterion) {
    cpu_dft::<f64>(c, "cpu double");
}

fn kernel(c: &mut Criterion) {
    let config = DftConfig::default().with_counts(1000, 1);
    let sources = generate_sources::<f64>(&config, 1);
    let visibilities = generate_visibilities::<f64>(&config, &SyntheticParams::default()).unwrap();

    for correction in [DirectionCorrection::SmallAngle, DirectionCorrection::Exact] {
        c.bench_function(&format!("1000 sources, {correction} correction"), |b| {
            b.iter(|| visibility_intensity(black_box(&visibilities[0]), &sources, correction))
        });
    }
}

criterion_group!(benches, cpu_dft_single, cpu_dft_double, kernel);
criterion_main!(benches);
