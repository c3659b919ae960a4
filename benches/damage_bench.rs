//! Damage formula throughput benchmarks.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use skillcast::combat::{defense_reduction, roll_damage, Rng};
use skillcast::data::SkillTemplate;

fn strike_template() -> SkillTemplate {
    serde_json::from_str(
        r#"{
            "id": 1,
            "name": "Strike",
            "skillType": "active",
            "damageType": "physical",
            "targetType": "enemy",
            "maxLevel": 1,
            "levels": [{"level": 1, "baseDamage": 12, "damageMultiplier": 0.6, "critChanceBonus": 0.02}]
        }"#,
    )
    .unwrap()
}

fn bench_damage(c: &mut Criterion) {
    let template = strike_template();
    let level_data = template.level_data(1).unwrap().clone();

    c.bench_function("roll_damage", |b| {
        let mut rng = Rng::new(7);
        b.iter(|| {
            roll_damage(
                black_box(&template),
                black_box(&level_data),
                black_box(40),
                black_box(30),
                black_box(25),
                black_box(60),
                &mut rng,
            )
        })
    });

    c.bench_function("defense_reduction_sweep", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for defense in 0..1000 {
                total += defense_reduction(black_box(defense));
            }
            total
        })
    });
}

criterion_group!(benches, bench_damage);
criterion_main!(benches);
