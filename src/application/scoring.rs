//! Composite PCOS risk scoring with explainable factor contributions.
//!
//! Five independently capped sub-scores sum into a 0-100 composite:
//! cycle irregularity (0-40), symptom severity (0-25), BMI and weight
//! (0-20), hormonal indicators (0-10), family history (0 or 5). Pure
//! function of the history snapshot plus a wall-clock timestamp field.

use chrono::Utc;

use crate::domain::{
    CycleRecord, CycleStatistics, DataPoints, Explanations, FactorScores, Priority,
    Recommendation, RecommendationBlock, RiskAssessment, RiskCategory, SymptomRecord, TopFactor,
    UserMetrics, WeightTrend,
};
use crate::Result;

use super::{ensure_valid_history, ensure_valid_metrics, ensure_valid_symptoms};

/// Compute a full risk assessment over the current history snapshot.
///
/// Recomputed wholesale on each call; callers replace any previously
/// stored assessment with the returned one.
///
/// # Errors
/// Returns `LunaraError::Validation` when the inputs are malformed.
pub fn assess(
    cycles: &[CycleRecord],
    symptoms: &[SymptomRecord],
    metrics: &UserMetrics,
) -> Result<RiskAssessment> {
    ensure_valid_history(cycles)?;
    ensure_valid_symptoms(symptoms)?;
    ensure_valid_metrics(metrics)?;

    let stats = CycleStatistics::from_records(cycles);
    let irregularity = analyze_irregularity(cycles.len(), &stats);

    let contributions = FactorScores {
        cycle_irregularity: irregularity.score,
        symptom_severity: symptom_severity_score(symptoms),
        bmi_and_weight: bmi_weight_score(metrics),
        hormonal_indicators: hormonal_score(metrics),
        family_history: if metrics.family_history { 5.0 } else { 0.0 },
    };

    // Sub-scores are all nonnegative, so only the upper bound needs clamping.
    let risk_score = (contributions.total().round() as u32).min(100);
    let risk_category = RiskCategory::from_score(risk_score);

    let explanations = build_explanations(risk_category, &contributions, &irregularity, metrics);

    tracing::info!(
        "Risk assessment complete: score={}, category={}",
        risk_score,
        risk_category
    );

    Ok(RiskAssessment {
        risk_score,
        risk_category,
        contributions,
        explanations,
        data_points: DataPoints {
            cycles_tracked: cycles.len(),
            symptoms_logged: symptoms.len(),
            metrics_provided: metrics.provided_count(),
        },
        calculated_at: Utc::now(),
    })
}

/// Lifestyle recommendation blocks for an assessment.
///
/// Diet and Exercise are always present; their content depends on the BMI
/// and irregularity contributions. Sleep & Stress is unconditional, and a
/// Data Tracking block appears while the history is still short.
#[must_use]
pub fn lifestyle_plan(
    assessment: &RiskAssessment,
    cycles_tracked: usize,
) -> Vec<RecommendationBlock> {
    let contributions = &assessment.contributions;
    let mut blocks = Vec::new();

    if contributions.bmi_and_weight > 10.0 {
        blocks.push(RecommendationBlock {
            category: "Diet".to_string(),
            priority: Priority::High,
            items: vec![
                "Focus on low-glycemic index (GI) foods: whole grains, legumes, non-starchy vegetables".to_string(),
                "Include anti-inflammatory foods: fatty fish (omega-3), nuts, seeds, berries".to_string(),
                "Reduce refined carbs, added sugars, and processed foods".to_string(),
                "Eat balanced meals with protein, healthy fats, and complex carbs".to_string(),
                "Stay hydrated: 8-10 glasses water daily".to_string(),
                "Consider eating smaller, frequent meals to stabilize blood sugar".to_string(),
            ],
        });
    } else {
        blocks.push(RecommendationBlock {
            category: "Diet".to_string(),
            priority: Priority::Medium,
            items: vec![
                "Maintain balanced diet with variety of whole foods".to_string(),
                "Include plenty of fruits, vegetables, whole grains".to_string(),
                "Ensure adequate protein intake".to_string(),
                "Limit processed foods and added sugars".to_string(),
            ],
        });
    }

    if contributions.cycle_irregularity > 15.0 {
        blocks.push(RecommendationBlock {
            category: "Exercise".to_string(),
            priority: Priority::High,
            items: vec![
                "Strength training 3-4 times/week (improves insulin sensitivity)".to_string(),
                "Moderate cardio 150+ min/week (walking, cycling, swimming)".to_string(),
                "Include flexibility work: yoga, stretching (reduces stress)".to_string(),
                "Build consistency gradually - even 30 min/day helps".to_string(),
                "Consider HIIT (high-intensity interval training) 1-2x/week".to_string(),
            ],
        });
    } else {
        blocks.push(RecommendationBlock {
            category: "Exercise".to_string(),
            priority: Priority::Medium,
            items: vec![
                "Regular physical activity most days of the week".to_string(),
                "Mix of cardio (150 min/week) and strength training (2x/week)".to_string(),
                "Find activities you enjoy for sustainability".to_string(),
            ],
        });
    }

    blocks.push(RecommendationBlock {
        category: "Sleep & Stress".to_string(),
        priority: Priority::High,
        items: vec![
            "Aim for 7-9 hours quality sleep nightly".to_string(),
            "Maintain consistent sleep/wake schedule (even weekends)".to_string(),
            "Limit screens 1 hour before bed".to_string(),
            "Practice stress management: meditation, deep breathing, yoga".to_string(),
            "Manage cortisol levels - chronic stress worsens PCOS symptoms".to_string(),
        ],
    });

    if cycles_tracked < 6 {
        blocks.push(RecommendationBlock {
            category: "Data Tracking".to_string(),
            priority: Priority::High,
            items: vec![
                "Track at least 3 complete cycles to establish patterns".to_string(),
                "Log symptoms daily during your period".to_string(),
                "Note flow intensity and duration consistently".to_string(),
                "Track lifestyle factors to identify correlations".to_string(),
            ],
        });
    }

    blocks
}

/// Cycle irregularity analysis: the sub-score plus the detail needed for
/// the factor explanation.
struct IrregularityAnalysis {
    score: f64,
    avg_cycle: Option<f64>,
    std_dev: Option<f64>,
    details: String,
}

fn analyze_irregularity(record_count: usize, stats: &CycleStatistics) -> IrregularityAnalysis {
    if record_count < 2 {
        return IrregularityAnalysis {
            score: 10.0,
            avg_cycle: None,
            std_dev: None,
            details: "Insufficient data".to_string(),
        };
    }

    let (Some(avg), Some(std_dev)) = (stats.mean_gap, stats.std_dev) else {
        return IrregularityAnalysis {
            score: 5.0,
            avg_cycle: None,
            std_dev: None,
            details: "Cycles within normal range".to_string(),
        };
    };

    let mut score = 0.0;
    let mut details = String::new();

    if !(21.0..=35.0).contains(&avg) {
        score += (avg - 28.0).abs() * 1.5;
        details = if avg < 21.0 {
            "Cycles too short (oligomenorrhea risk)".to_string()
        } else {
            "Cycles too long (anovulation risk)".to_string()
        };
    }

    // Irregular if the spread exceeds 5 days
    if std_dev > 5.0 {
        score += std_dev * 2.0;
        details = if details.is_empty() {
            "High cycle variability".to_string()
        } else {
            format!("{details} + high variability")
        };
    }

    IrregularityAnalysis {
        score: score.min(40.0),
        avg_cycle: Some(avg),
        std_dev: Some(std_dev),
        details,
    }
}

fn symptom_severity_score(symptoms: &[SymptomRecord]) -> f64 {
    if symptoms.is_empty() {
        return 0.0;
    }

    let count = symptoms.len() as f64;
    let frequency =
        |flag: fn(&SymptomRecord) -> bool| symptoms.iter().filter(|s| flag(s)).count() as f64 / count;

    let avg_pain = symptoms
        .iter()
        .map(|s| f64::from(s.pain_score))
        .sum::<f64>()
        / count;

    let score = (avg_pain / 10.0) * 8.0
        + frequency(|s| s.acne) * 5.0
        + frequency(|s| s.fatigue) * 4.0
        + frequency(|s| s.mood_swings) * 4.0
        + frequency(|s| s.bloating) * 4.0;

    score.min(25.0)
}

fn bmi_weight_score(metrics: &UserMetrics) -> f64 {
    let mut score: f64 = 0.0;

    if let Some(bmi) = metrics.bmi {
        score += if bmi < 18.5 {
            0.0 // Underweight
        } else if bmi < 25.0 {
            2.0 // Normal
        } else if bmi < 30.0 {
            10.0 // Overweight
        } else if bmi < 35.0 {
            15.0 // Obese Class I
        } else {
            20.0 // Obese Class II+
        };
    }

    score += match metrics.weight_trend {
        WeightTrend::Increasing => 5.0,
        WeightTrend::Stable => 0.0,
        WeightTrend::Decreasing => -2.0,
    };

    score.clamp(0.0, 20.0)
}

fn hormonal_score(metrics: &UserMetrics) -> f64 {
    let mut score = 0.0;

    if metrics.hirsutism > 0 {
        score += f64::from(metrics.hirsutism) / 10.0 * 6.0;
    }
    if metrics.acne_severity > 0 {
        score += f64::from(metrics.acne_severity) / 4.0 * 4.0;
    }

    score.min(10.0)
}

fn build_explanations(
    category: RiskCategory,
    contributions: &FactorScores,
    irregularity: &IrregularityAnalysis,
    metrics: &UserMetrics,
) -> Explanations {
    let mut top_factors = Vec::new();
    for (name, value) in contributions.ranked().into_iter().take(3) {
        if value > 0.0 {
            top_factors.push(TopFactor {
                name: name.to_string(),
                contribution: value,
                explanation: factor_explanation(name, irregularity, metrics),
            });
        }
    }

    let mut recommendations = Vec::new();
    let mut action_items = Vec::new();

    if contributions.cycle_irregularity > 15.0 {
        recommendations.push(Recommendation {
            category: "Cycle Tracking".to_string(),
            advice: "Track your cycle consistently for at least 3 months to establish patterns. Note start/end dates and flow intensity.".to_string(),
        });
        action_items.push(
            "Schedule gynecologist consultation if cycles are >35 days or <21 days".to_string(),
        );
    }

    if contributions.symptom_severity > 10.0 {
        recommendations.push(Recommendation {
            category: "Symptom Management".to_string(),
            advice: "Severe or frequent symptoms warrant medical evaluation. Consider a symptom diary to identify patterns.".to_string(),
        });
        action_items.push("Get blood tests: FSH, LH, testosterone, pelvic ultrasound".to_string());
    }

    if contributions.bmi_and_weight > 10.0 {
        recommendations.push(Recommendation {
            category: "Weight Management".to_string(),
            advice: "A 5-10% weight loss can significantly improve PCOS symptoms and hormonal balance.".to_string(),
        });
        action_items.push("Consult dietitian for low-GI, anti-inflammatory diet plan".to_string());
        action_items.push("Aim for 150 min/week moderate cardio + strength training".to_string());
    }

    if contributions.hormonal_indicators > 5.0 {
        recommendations.push(Recommendation {
            category: "Hormonal Health".to_string(),
            advice: "Manage stress and maintain consistent sleep (7-9 hours) to support hormonal balance.".to_string(),
        });
        action_items
            .push("Practice stress management: yoga, meditation, breathing exercises".to_string());
    }

    if contributions.family_history > 0.0 {
        action_items.push("Family history of PCOS: preventive screening recommended".to_string());
    }

    Explanations {
        summary: category.description().to_string(),
        top_factors,
        recommendations,
        action_items,
    }
}

fn factor_explanation(
    name: &str,
    irregularity: &IrregularityAnalysis,
    metrics: &UserMetrics,
) -> String {
    match name {
        "cycleIrregularity" => match irregularity.avg_cycle {
            Some(avg) if avg < 21.0 => {
                "Your cycles are consistently shorter than normal (oligomenorrhea), suggesting irregular ovulation.".to_string()
            }
            Some(avg) if avg > 35.0 => {
                "Your cycles are longer than normal, indicating potential anovulation or ovulation dysfunction.".to_string()
            }
            Some(_) => format!(
                "Your cycle variability (±{:.1} days) is higher than normal (should be ±2-3 days).",
                irregularity.std_dev.unwrap_or(0.0)
            ),
            None => irregularity.details.clone(),
        },
        "symptomSeverity" => {
            "Frequent or severe menstrual symptoms (pain, bloating, mood changes) can indicate hormonal imbalances.".to_string()
        }
        "bmiAndWeight" => {
            if metrics.bmi.is_some_and(|bmi| bmi >= 30.0) {
                "Higher BMI is associated with increased insulin resistance and PCOS risk.".to_string()
            } else {
                "Weight management supports hormonal balance and reduces PCOS symptoms.".to_string()
            }
        }
        "hormonalIndicators" => {
            "Acne, excessive hair growth, or severe mood changes suggest hormonal fluctuations typical of PCOS.".to_string()
        }
        "familyHistory" => {
            "PCOS has genetic components. Family history increases your risk profile.".to_string()
        }
        _ => "Contributing factor to PCOS risk assessment.".to_string(),
    }
}
