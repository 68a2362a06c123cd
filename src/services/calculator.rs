// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Metabolic calculator: profile -> daily calorie and macro budget.
//!
//! Pipeline:
//! 1. BMR (Mifflin-St Jeor)
//! 2. TDEE = BMR x activity multiplier
//! 3. Goal adjustment (-500 / 0 / +500 kcal)
//! 4. Macros, either the standard protein-per-kg / 25% fat / carbs-remainder
//!    sequence or a fully specified custom percentage split
//!
//! Everything here is pure. Rounding is half-up (toward +inf at .5), which is
//! what the mobile client has always used, so the two sides agree on
//! negative halves too.

use crate::error::AppError;
use crate::models::{CustomMacroRatios, Goal, Sex, UserProfile};
use serde::{Deserialize, Serialize};

pub const CALORIES_PER_GRAM_PROTEIN: i64 = 4;
pub const CALORIES_PER_GRAM_CARBS: i64 = 4;
pub const CALORIES_PER_GRAM_FATS: i64 = 9;

/// Default share of total calories assigned to fat.
pub const DEFAULT_FAT_PERCENTAGE: f64 = 0.25;

/// Daily calorie deficit/surplus for the lose/gain goals.
const GOAL_CALORIE_DELTA: i64 = 500;

/// Full calculation output. Always derivable from (profile, ratios).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionCalculationResult {
    /// Basal Metabolic Rate in kcal/day, unrounded
    pub bmr: f64,
    /// Total Daily Energy Expenditure in kcal/day
    pub tdee: i64,
    /// Goal-adjusted daily calorie target
    pub adjusted_calories: i64,
    pub protein_grams: i64,
    pub carbs_grams: i64,
    pub fats_grams: i64,
    pub protein_calories: i64,
    pub carbs_calories: i64,
    pub fats_calories: i64,
    /// Share of summed macro calories (not of `adjusted_calories`)
    pub protein_percentage: f64,
    pub carbs_percentage: f64,
    pub fats_percentage: f64,
}

/// Macro targets in grams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroGrams {
    pub protein_grams: i64,
    pub carbs_grams: i64,
    pub fats_grams: i64,
}

/// Round to the nearest integer, halves toward positive infinity.
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Basal Metabolic Rate using the Mifflin-St Jeor equation.
///
/// `10 x weight + 6.25 x height - 5 x age`, then +5 for men, -161 for women
/// and -78 (the mean of the two offsets) otherwise. Not rounded.
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age: f64, sex: Sex) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age;

    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
        Sex::Other => base - 78.0,
    }
}

/// Total Daily Energy Expenditure.
///
/// Profiles always carry one of the five [`crate::models::ActivityLevel`]
/// multipliers, but any positive factor is accepted here.
pub fn calculate_tdee(bmr: f64, activity_multiplier: f64) -> i64 {
    round_half_up(bmr * activity_multiplier)
}

pub fn adjust_calories_for_goal(tdee: i64, goal: Goal) -> i64 {
    match goal {
        Goal::Lose => tdee.saturating_sub(GOAL_CALORIE_DELTA),
        Goal::Maintain => tdee,
        Goal::Gain => tdee.saturating_add(GOAL_CALORIE_DELTA),
    }
}

/// Protein target in grams: 2.2 g/kg when cutting, 1.8 maintaining, 2.0 gaining.
pub fn calculate_protein_target(weight_kg: f64, goal: Goal) -> i64 {
    let grams_per_kg = match goal {
        Goal::Lose => 2.2,
        Goal::Maintain => 1.8,
        Goal::Gain => 2.0,
    };
    round_half_up(weight_kg * grams_per_kg)
}

/// Fat target in grams for a given share (0-1) of total calories.
pub fn calculate_fat_target(total_calories: i64, percentage: f64) -> i64 {
    round_half_up(total_calories as f64 * percentage / CALORIES_PER_GRAM_FATS as f64)
}

/// Carbs fill whatever calories protein and fat leave over.
///
/// Goes negative when protein and fat already exceed the total; that is left
/// for the validator's carbs minimum to reject.
pub fn calculate_carbs_target(total_calories: i64, protein_grams: i64, fats_grams: i64) -> i64 {
    let remaining = total_calories
        - protein_grams * CALORIES_PER_GRAM_PROTEIN
        - fats_grams * CALORIES_PER_GRAM_FATS;
    round_half_up(remaining as f64 / CALORIES_PER_GRAM_CARBS as f64)
}

/// Split total calories by percentage, each macro rounded on its own.
///
/// Unspecified percentages fall back to 30/40/30. The three results are not
/// reconciled, so their calories rarely add back up to `total_calories`.
pub fn calculate_macros_with_custom_ratios(
    total_calories: i64,
    ratios: &CustomMacroRatios,
) -> MacroGrams {
    let (protein_pct, carbs_pct, fats_pct) = ratios.with_defaults();
    let total = total_calories as f64;

    MacroGrams {
        protein_grams: round_half_up(
            total * protein_pct / 100.0 / CALORIES_PER_GRAM_PROTEIN as f64,
        ),
        carbs_grams: round_half_up(total * carbs_pct / 100.0 / CALORIES_PER_GRAM_CARBS as f64),
        fats_grams: round_half_up(total * fats_pct / 100.0 / CALORIES_PER_GRAM_FATS as f64),
    }
}

/// Run the whole pipeline for a profile.
///
/// Custom ratios are only used when all three percentages are present;
/// a partial override falls through to the standard calculation.
///
/// # Errors
///
/// Returns [`AppError::IncompleteProfile`] if any biometric field is missing.
pub fn calculate_nutrition_plan(
    profile: &UserProfile,
    custom_ratios: Option<&CustomMacroRatios>,
) -> Result<NutritionCalculationResult, AppError> {
    let p = profile.complete()?;

    let bmr = calculate_bmr(p.weight_kg, p.height_cm, p.age, p.sex);
    let tdee = calculate_tdee(bmr, p.activity_level.multiplier());
    let adjusted_calories = adjust_calories_for_goal(tdee, p.goal);

    let macros = match custom_ratios.filter(|r| r.fully_specified().is_some()) {
        Some(ratios) => calculate_macros_with_custom_ratios(adjusted_calories, ratios),
        None => {
            let protein_grams = calculate_protein_target(p.weight_kg, p.goal);
            let fats_grams = calculate_fat_target(adjusted_calories, DEFAULT_FAT_PERCENTAGE);
            let carbs_grams = calculate_carbs_target(adjusted_calories, protein_grams, fats_grams);
            MacroGrams {
                protein_grams,
                carbs_grams,
                fats_grams,
            }
        }
    };

    let protein_calories = macros.protein_grams * CALORIES_PER_GRAM_PROTEIN;
    let carbs_calories = macros.carbs_grams * CALORIES_PER_GRAM_CARBS;
    let fats_calories = macros.fats_grams * CALORIES_PER_GRAM_FATS;
    let total_macro_calories = protein_calories + carbs_calories + fats_calories;

    let share = |calories: i64| {
        if total_macro_calories == 0 {
            0.0
        } else {
            calories as f64 / total_macro_calories as f64 * 100.0
        }
    };

    Ok(NutritionCalculationResult {
        bmr,
        tdee,
        adjusted_calories,
        protein_grams: macros.protein_grams,
        carbs_grams: macros.carbs_grams,
        fats_grams: macros.fats_grams,
        protein_calories,
        carbs_calories,
        fats_calories,
        protein_percentage: share(protein_calories),
        carbs_percentage: share(carbs_calories),
        fats_percentage: share(fats_calories),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityLevel;

    fn profile(
        age: f64,
        sex: Sex,
        height_cm: f64,
        weight_kg: f64,
        activity_level: ActivityLevel,
        goal: Goal,
    ) -> UserProfile {
        UserProfile {
            age: Some(age),
            sex: Some(sex),
            height_cm: Some(height_cm),
            weight_kg: Some(weight_kg),
            activity_level: Some(activity_level),
            goal: Some(goal),
            ..UserProfile::new("user_test", "2026-01-01T00:00:00Z")
        }
    }

    #[test]
    fn test_absurd_weight_is_rejected_not_computed() {
        let p = profile(
            30.0,
            Sex::Male,
            180.0,
            1e300,
            ActivityLevel::ExtraActive,
            Goal::Gain,
        );

        match calculate_nutrition_plan(&p, None) {
            Err(AppError::IncompleteProfile { missing }) => assert_eq!(missing, vec!["weight_kg"]),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_bmr_by_sex() {
        assert_eq!(calculate_bmr(80.0, 180.0, 30.0, Sex::Male), 1780.0);
        assert_eq!(calculate_bmr(60.0, 165.0, 25.0, Sex::Female), 1345.25);
        assert_eq!(calculate_bmr(70.0, 170.0, 28.0, Sex::Other), 1544.5);
    }

    #[test]
    fn test_tdee_rounds() {
        assert_eq!(calculate_tdee(1780.0, 1.2), 2136);
        assert_eq!(calculate_tdee(1345.25, 1.375), 1850);
    }

    #[test]
    fn test_goal_adjustment() {
        assert_eq!(adjust_calories_for_goal(2500, Goal::Lose), 2000);
        assert_eq!(adjust_calories_for_goal(2500, Goal::Maintain), 2500);
        assert_eq!(adjust_calories_for_goal(2500, Goal::Gain), 3000);
    }

    #[test]
    fn test_protein_target() {
        assert_eq!(calculate_protein_target(80.0, Goal::Lose), 176);
        assert_eq!(calculate_protein_target(80.0, Goal::Maintain), 144);
        assert_eq!(calculate_protein_target(80.0, Goal::Gain), 160);
    }

    #[test]
    fn test_fat_target() {
        assert_eq!(calculate_fat_target(2000, DEFAULT_FAT_PERCENTAGE), 56);
        assert_eq!(calculate_fat_target(2000, 0.30), 67);
    }

    #[test]
    fn test_carbs_target() {
        assert_eq!(calculate_carbs_target(2000, 150, 56), 224);
    }

    #[test]
    fn test_carbs_target_can_go_negative() {
        // 300g protein + 100g fat = 2100 kcal > 1500 kcal budget
        assert_eq!(calculate_carbs_target(1500, 300, 100), -150);
    }

    #[test]
    fn test_round_half_up_matches_client_on_negative_halves() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
    }

    #[test]
    fn test_custom_ratio_macros() {
        let macros =
            calculate_macros_with_custom_ratios(2000, &CustomMacroRatios::new(30.0, 40.0, 30.0));
        assert_eq!(
            macros,
            MacroGrams {
                protein_grams: 150,
                carbs_grams: 200,
                fats_grams: 67,
            }
        );
    }

    #[test]
    fn test_custom_ratio_partial_falls_back_to_defaults() {
        let ratios = CustomMacroRatios {
            protein_percentage: Some(40.0),
            ..Default::default()
        };
        let macros = calculate_macros_with_custom_ratios(2000, &ratios);
        assert_eq!(macros.protein_grams, 200);
        assert_eq!(macros.carbs_grams, 200);
        assert_eq!(macros.fats_grams, 67);
    }

    #[test]
    fn test_full_plan_standard_path() {
        let user = profile(
            30.0,
            Sex::Male,
            180.0,
            80.0,
            ActivityLevel::ModeratelyActive,
            Goal::Lose,
        );
        let result = calculate_nutrition_plan(&user, None).unwrap();

        assert_eq!(result.bmr, 1780.0);
        assert_eq!(result.tdee, 2759);
        assert_eq!(result.adjusted_calories, 2259);
        assert_eq!(result.protein_grams, 176);
        assert_eq!(result.fats_grams, 63);
        assert_eq!(result.carbs_grams, 247);
        assert_eq!(result.protein_calories, 704);
        assert_eq!(result.fats_calories, 567);
    }

    #[test]
    fn test_full_plan_custom_ratio_path() {
        let user = profile(
            30.0,
            Sex::Male,
            180.0,
            80.0,
            ActivityLevel::ModeratelyActive,
            Goal::Lose,
        );
        let ratios = CustomMacroRatios::new(40.0, 30.0, 30.0);
        let result = calculate_nutrition_plan(&user, Some(&ratios)).unwrap();

        assert_eq!(result.adjusted_calories, 2259);
        assert_eq!(result.protein_grams, 226); // 903.6 / 4 = 225.9
        assert_eq!(result.carbs_grams, 169); // 677.7 / 4 = 169.4
        assert_eq!(result.fats_grams, 75); // 677.7 / 9 = 75.3
    }

    #[test]
    fn test_partial_ratios_use_standard_path() {
        let user = profile(
            30.0,
            Sex::Male,
            180.0,
            80.0,
            ActivityLevel::ModeratelyActive,
            Goal::Lose,
        );
        let partial = CustomMacroRatios {
            protein_percentage: Some(50.0),
            carbs_percentage: Some(20.0),
            fats_percentage: None,
        };
        let with_partial = calculate_nutrition_plan(&user, Some(&partial)).unwrap();
        let standard = calculate_nutrition_plan(&user, None).unwrap();
        assert_eq!(with_partial, standard);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let user = profile(
            45.0,
            Sex::Female,
            160.0,
            68.0,
            ActivityLevel::LightlyActive,
            Goal::Maintain,
        );
        for ratios in [None, Some(CustomMacroRatios::new(25.0, 50.0, 25.0))] {
            let r = calculate_nutrition_plan(&user, ratios.as_ref()).unwrap();
            let total = r.protein_percentage + r.carbs_percentage + r.fats_percentage;
            assert!((total - 100.0).abs() < 1e-9, "total was {}", total);
        }
    }

    #[test]
    fn test_calculation_is_deterministic() {
        let user = profile(
            28.0,
            Sex::Other,
            170.0,
            70.0,
            ActivityLevel::VeryActive,
            Goal::Gain,
        );
        let first = calculate_nutrition_plan(&user, None).unwrap();
        let second = calculate_nutrition_plan(&user, None).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.bmr.to_bits(), second.bmr.to_bits());
    }

    #[test]
    fn test_incomplete_profile_fails() {
        let user = UserProfile::new("user_empty", "2026-01-01T00:00:00Z");
        let err = calculate_nutrition_plan(&user, None).unwrap_err();
        assert!(matches!(err, AppError::IncompleteProfile { .. }));
    }
}
