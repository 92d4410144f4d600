// Criterion benchmarks for candidate selection

use std::collections::HashSet;

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use campus_match::core::{choose_uniform, is_eligible};
use campus_match::models::{Gender, Profile};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

fn create_profile(id: usize) -> Profile {
    Profile {
        id: Uuid::new_v4(),
        user_id: id as i64,
        display_name: format!("User {}", id),
        photo_ref: format!("photo-{}", id),
        gender: if id % 2 == 0 { Gender::Female } else { Gender::Male },
        faculty: Some("Law".to_string()),
        age: 18 + (id % 20) as u8,
        bio: String::new(),
        is_active: id % 10 != 0,
        created_at: Utc::now(),
    }
}

fn bench_eligibility_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("eligibility_filter");

    for size in [100, 1_000, 10_000].iter() {
        let profiles: Vec<Profile> = (0..*size).map(create_profile).collect();
        // A third of the pool already rated
        let rated: HashSet<Uuid> = profiles.iter().step_by(3).map(|p| p.id).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                profiles
                    .iter()
                    .filter(|p| is_eligible(black_box(p), black_box(1), &rated))
                    .count()
            });
        });
    }

    group.finish();
}

fn bench_choose_uniform(c: &mut Criterion) {
    let mut group = c.benchmark_group("choose_uniform");

    for size in [100, 1_000, 10_000].iter() {
        let profiles: Vec<Profile> = (0..*size).map(create_profile).collect();
        let mut rng = StdRng::seed_from_u64(7);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| choose_uniform(black_box(profiles.clone()), &mut rng));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_eligibility_filter, bench_choose_uniform);
criterion_main!(benches);
