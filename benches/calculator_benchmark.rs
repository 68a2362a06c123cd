use criterion::{criterion_group, criterion_main, Criterion};
use diet_planner::models::{ActivityLevel, CustomMacroRatios, Goal, Sex, UserProfile};
use diet_planner::services::calculator::calculate_nutrition_plan;
use diet_planner::services::validator::validate_nutrition_targets;
use std::hint::black_box;

fn benchmark_nutrition_plan(c: &mut Criterion) {
    let mut profile = UserProfile::new("bench_user", "2026-01-01T00:00:00.000Z");
    profile.age = Some(30.0);
    profile.sex = Some(Sex::Male);
    profile.height_cm = Some(180.0);
    profile.weight_kg = Some(80.0);
    profile.activity_level = Some(ActivityLevel::ModeratelyActive);
    profile.goal = Some(Goal::Lose);

    let ratios = CustomMacroRatios::new(40.0, 30.0, 30.0);

    let mut group = c.benchmark_group("nutrition_plan");

    group.bench_function("standard_macros", |b| {
        b.iter(|| calculate_nutrition_plan(black_box(&profile), None))
    });

    group.bench_function("custom_ratios", |b| {
        b.iter(|| calculate_nutrition_plan(black_box(&profile), Some(black_box(&ratios))))
    });

    group.bench_function("calculate_and_validate", |b| {
        b.iter(|| {
            calculate_nutrition_plan(black_box(&profile), None)
                .map(|result| validate_nutrition_targets(&result))
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_nutrition_plan);
criterion_main!(benches);
