//! Batch aggregation and statistics.
//!
//! This module turns a batch of expert records into the statistics summary
//! shown on the dashboard. Everything here is pure: same input, same
//! output, no I/O.
//!
//! Percentages are `count / total * 100` rounded to one decimal place,
//! half away from zero, and are 0 for an empty batch. Distributions keep
//! first-seen order; the tech stack distribution is sorted by count
//! descending with ties left in first-seen order.
//!
//! `tech_stack` and `task_types` are sets: a tag repeated within one record
//! is counted once, so a tag's count never exceeds the number of experts.

use crate::config::AggregationConfig;
use crate::models::{
    AvgScores, Distribution, ExpertRecord, Kpi, QualityLabel, QualityLabelStats,
    StatisticsSummary, TaskStats, TemplateRisk, TemplateRiskStats,
};
use indexmap::IndexSet;

/// Diversity score buckets, inclusive upper bounds.
const DIVERSITY_BUCKETS: [(&str, u32); 4] =
    [("0-30", 30), ("31-50", 50), ("51-70", 70), ("71-100", 100)];

/// Category sets and limits the aggregator works with.
#[derive(Debug, Clone)]
pub struct AggregationPolicy {
    /// Degrees counted as masters-and-above.
    pub advanced_degrees: Vec<String>,
    /// Tiers counted as elite when a record has no explicit flag.
    pub elite_tiers: Vec<String>,
    /// Number of tech stack tags kept.
    pub tech_stack_top_n: usize,
    /// Task count at which an expert counts as high-volume.
    pub high_task_threshold: u32,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self::from(&AggregationConfig::default())
    }
}

impl From<&AggregationConfig> for AggregationPolicy {
    fn from(config: &AggregationConfig) -> Self {
        Self {
            advanced_degrees: config.advanced_degrees.clone(),
            elite_tiers: config.elite_tiers.clone(),
            tech_stack_top_n: config.tech_stack_top_n,
            high_task_threshold: config.high_task_threshold,
        }
    }
}

impl AggregationPolicy {
    pub fn is_advanced_degree(&self, record: &ExpertRecord) -> bool {
        self.advanced_degrees.iter().any(|d| *d == record.degree)
    }

    /// The record's own flag wins over the tier lookup.
    pub fn is_elite_school(&self, record: &ExpertRecord) -> bool {
        record
            .is_elite_school
            .unwrap_or_else(|| self.elite_tiers.iter().any(|t| *t == record.school_tier))
    }
}

/// Compute the full statistics summary for a batch.
pub fn summarize(records: &[ExpertRecord], policy: &AggregationPolicy) -> StatisticsSummary {
    if records.is_empty() {
        return StatisticsSummary::default();
    }

    let tech_stack = count_categories(records.iter().flat_map(|r| distinct(&r.tech_stack)));

    StatisticsSummary {
        total_experts: records.len(),
        degree_distribution: count_categories(records.iter().map(|r| &r.degree)),
        school_tier_distribution: count_categories(records.iter().map(|r| &r.school_tier)),
        tech_stack_distribution: top_n(tech_stack, policy.tech_stack_top_n),
        task_stats: Some(task_stats(records, policy.high_task_threshold)),
        task_type_distribution: count_categories(
            records.iter().flat_map(|r| distinct(&r.task_types)),
        ),
        kpi: compute_kpi(records, policy),
        template_risk_stats: Some(template_risk_stats(records)),
        quality_label_stats: Some(quality_label_stats(records)),
        diversity_score_distribution: Some(diversity_distribution(records)),
        avg_scores: Some(avg_scores(records)),
    }
}

/// Compute the headline KPIs.
pub fn compute_kpi(records: &[ExpertRecord], policy: &AggregationPolicy) -> Kpi {
    let total = records.len();
    let masters = count_where(records, |r| policy.is_advanced_degree(r));
    let elite = count_where(records, |r| policy.is_elite_school(r));
    let big_company = count_where(records, |r| r.has_big_company_experience);

    Kpi {
        masters_and_above_count: masters,
        masters_and_above_pct: percentage(masters, total),
        elite_school_count: elite,
        elite_school_pct: percentage(elite, total),
        big_company_count: big_company,
        big_company_pct: percentage(big_company, total),
    }
}

/// Count occurrences per category in first-seen order.
pub fn count_categories<'a, I, S>(values: I) -> Distribution
where
    I: IntoIterator<Item = &'a S>,
    S: AsRef<str> + ?Sized + 'a,
{
    let mut dist = Distribution::new();

    for value in values {
        *dist.entry(value.as_ref().to_string()).or_insert(0) += 1;
    }

    dist
}

/// Keep the `n` largest entries, descending by count.
///
/// The sort is stable, so equal counts stay in their existing order.
pub fn top_n(mut dist: Distribution, n: usize) -> Distribution {
    dist.sort_by(|_, a, _, b| b.cmp(a));
    dist.truncate(n);
    dist
}

/// `count / total * 100` rounded to one decimal, 0 when `total` is 0.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(count as f64 / total as f64 * 100.0, 1)
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn distinct(tags: &[String]) -> IndexSet<&String> {
    tags.iter().collect()
}

fn count_where<F>(records: &[ExpertRecord], predicate: F) -> usize
where
    F: Fn(&ExpertRecord) -> bool,
{
    records.iter().filter(|r| predicate(r)).count()
}

fn mean<F>(records: &[ExpertRecord], value: F) -> f64
where
    F: Fn(&ExpertRecord) -> f64,
{
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(value).sum::<f64>() / records.len() as f64
}

fn task_stats(records: &[ExpertRecord], high_task_threshold: u32) -> TaskStats {
    let total = records.len();
    let total_tasks: u64 = records.iter().map(|r| u64::from(r.task_count)).sum();
    let high = count_where(records, |r| r.task_count >= high_task_threshold);

    TaskStats {
        total_tasks,
        avg_tasks_per_expert: round_to(total_tasks as f64 / total as f64, 2),
        high_task_expert_count: high,
        high_task_expert_pct: percentage(high, total),
    }
}

fn template_risk_stats(records: &[ExpertRecord]) -> TemplateRiskStats {
    let total = records.len();
    let high = count_where(records, |r| r.template_risk_level == TemplateRisk::High);
    let medium = count_where(records, |r| r.template_risk_level == TemplateRisk::Medium);
    let low = count_where(records, |r| r.template_risk_level == TemplateRisk::Low);

    TemplateRiskStats {
        high_risk_count: high,
        high_risk_pct: percentage(high, total),
        medium_risk_count: medium,
        medium_risk_pct: percentage(medium, total),
        low_risk_count: low,
        low_risk_pct: percentage(low, total),
        avg_template_ratio: round_to(mean(records, |r| r.template_ratio), 3),
        avg_unique_patterns: round_to(mean(records, |r| f64::from(r.unique_patterns)), 1),
    }
}

fn quality_label_stats(records: &[ExpertRecord]) -> QualityLabelStats {
    let total = records.len();
    let high = count_where(records, |r| r.quality_label == QualityLabel::HighQuality);
    let normal = count_where(records, |r| r.quality_label == QualityLabel::Normal);
    let risk = count_where(records, |r| r.quality_label == QualityLabel::Risk);

    QualityLabelStats {
        high_quality_count: high,
        high_quality_pct: percentage(high, total),
        normal_count: normal,
        normal_pct: percentage(normal, total),
        risk_count: risk,
        risk_pct: percentage(risk, total),
    }
}

/// All four buckets are always present.
fn diversity_distribution(records: &[ExpertRecord]) -> Distribution {
    let mut dist: Distribution = DIVERSITY_BUCKETS
        .iter()
        .map(|(label, _)| (label.to_string(), 0))
        .collect();

    for record in records {
        let label = DIVERSITY_BUCKETS
            .iter()
            .find(|(_, upper)| record.diversity_score <= *upper)
            .map(|(label, _)| *label)
            .unwrap_or("71-100");
        if let Some(count) = dist.get_mut(label) {
            *count += 1;
        }
    }

    dist
}

fn avg_scores(records: &[ExpertRecord]) -> AvgScores {
    AvgScores {
        type_score: round_to(mean(records, |r| f64::from(r.type_score)), 1),
        domain_score: round_to(mean(records, |r| f64::from(r.domain_score)), 1),
        structure_score: round_to(mean(records, |r| f64::from(r.structure_score)), 1),
        diversity_score: round_to(mean(records, |r| f64::from(r.diversity_score)), 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, degree: &str, tier: &str) -> ExpertRecord {
        ExpertRecord::new(id, degree, tier)
    }

    fn with_stack(id: &str, stack: &[&str]) -> ExpertRecord {
        let mut r = record(id, "本科", "普通本科");
        r.tech_stack = stack.iter().map(|s| s.to_string()).collect();
        r
    }

    fn sample_batch() -> Vec<ExpertRecord> {
        let degrees = ["硕士", "本科", "博士", "本科", "大专", "硕士", "本科", "其他", "硕士", "本科"];
        degrees
            .iter()
            .enumerate()
            .map(|(i, degree)| {
                let mut r = record(&format!("t{}", i), degree, if i % 3 == 0 { "985" } else { "普通本科" });
                r.has_big_company_experience = i % 4 == 0;
                r.task_count = (i as u32) * 3;
                r.diversity_score = (i as u32) * 10;
                r.type_score = 50;
                r.template_ratio = 0.25;
                r.unique_patterns = 4;
                r.tech_stack = vec!["Java".to_string(), format!("tag{}", i % 2)];
                r.task_types = if i % 2 == 0 { vec!["面试辅导".to_string()] } else { vec![] };
                r
            })
            .collect()
    }

    #[test]
    fn test_empty_batch() {
        let summary = summarize(&[], &AggregationPolicy::default());

        assert_eq!(summary.total_experts, 0);
        assert_eq!(summary.kpi, Kpi::default());
        assert!(summary.degree_distribution.is_empty());
        assert!(summary.school_tier_distribution.is_empty());
        assert!(summary.tech_stack_distribution.is_empty());
        assert!(summary.task_type_distribution.is_empty());
        assert!(summary.task_stats.is_none());
        assert!(summary.diversity_score_distribution.is_none());
    }

    #[test]
    fn test_masters_and_above_kpi() {
        let summary = summarize(&sample_batch(), &AggregationPolicy::default());

        assert_eq!(summary.total_experts, 10);
        assert_eq!(summary.kpi.masters_and_above_count, 4);
        assert_eq!(summary.kpi.masters_and_above_pct, 40.0);
    }

    #[test]
    fn test_degree_distribution_sums_to_total() {
        let batch = sample_batch();
        let summary = summarize(&batch, &AggregationPolicy::default());

        let sum: usize = summary.degree_distribution.values().sum();
        assert_eq!(sum, summary.total_experts);
        assert_eq!(summary.degree_distribution.get("本科"), Some(&4));
        assert_eq!(summary.degree_distribution.get("博士"), Some(&1));
        // Categories absent from the batch are not zero-filled
        assert!(!summary.degree_distribution.contains_key("未知"));

        let tier_sum: usize = summary.school_tier_distribution.values().sum();
        assert_eq!(tier_sum, batch.len());
    }

    #[test]
    fn test_kpi_pct_matches_rounding_rule() {
        let batch: Vec<ExpertRecord> = (0..3)
            .map(|i| {
                let mut r = record(&format!("t{}", i), "本科", "其他");
                r.has_big_company_experience = i == 0;
                r
            })
            .collect();
        let kpi = compute_kpi(&batch, &AggregationPolicy::default());

        assert_eq!(kpi.big_company_count, 1);
        assert_eq!(kpi.big_company_pct, 33.3);
        assert_eq!(kpi.masters_and_above_pct, 0.0);
        assert_eq!(
            kpi.big_company_pct,
            round_to(kpi.big_company_count as f64 / 3.0 * 100.0, 1)
        );
    }

    #[test]
    fn test_elite_school_flag_overrides_tier() {
        let mut flagged = record("t1", "本科", "普通本科");
        flagged.is_elite_school = Some(true);
        let mut unflagged = record("t2", "本科", "985");
        unflagged.is_elite_school = Some(false);
        let derived = record("t3", "本科", "海外名校");

        let kpi = compute_kpi(&[flagged, unflagged, derived], &AggregationPolicy::default());
        assert_eq!(kpi.elite_school_count, 2);
        assert_eq!(kpi.elite_school_pct, 66.7);
    }

    #[test]
    fn test_configurable_degree_set() {
        let policy = AggregationPolicy {
            advanced_degrees: vec!["Master".to_string(), "PhD".to_string()],
            ..AggregationPolicy::default()
        };
        let batch = vec![
            record("t1", "Master", "A"),
            record("t2", "硕士", "A"),
            record("t3", "Bachelor", "A"),
            record("t4", "PhD", "A"),
        ];

        let kpi = compute_kpi(&batch, &policy);
        assert_eq!(kpi.masters_and_above_count, 2);
        assert_eq!(kpi.masters_and_above_pct, 50.0);
    }

    #[test]
    fn test_tech_stack_top_n_selection() {
        // 12 distinct tags with counts 12, 11, ..., 1
        let mut batch = Vec::new();
        for i in 0..12 {
            let tags: Vec<String> = (0..(12 - i)).map(|t| format!("tag{:02}", t)).collect();
            let tag_refs: Vec<&str> = tags.iter().map(String::as_str).collect();
            batch.push(with_stack(&format!("t{}", i), &tag_refs));
        }

        let summary = summarize(&batch, &AggregationPolicy::default());
        let dist = &summary.tech_stack_distribution;
        assert_eq!(dist.len(), 10);

        let counts: Vec<usize> = dist.values().copied().collect();
        assert!(counts.windows(2).all(|w| w[0] >= w[1]));

        let min_included = *counts.last().unwrap();
        let full = count_categories(batch.iter().flat_map(|r| r.tech_stack.iter()));
        for (tag, count) in &full {
            if !dist.contains_key(tag) {
                assert!(*count <= min_included);
            }
        }
    }

    #[test]
    fn test_tech_stack_ties_keep_first_seen_order() {
        let batch = vec![
            with_stack("t1", &["Rust", "Go"]),
            with_stack("t2", &["Python"]),
            with_stack("t3", &["Python", "Go"]),
        ];
        let policy = AggregationPolicy {
            tech_stack_top_n: 2,
            ..AggregationPolicy::default()
        };

        let summary = summarize(&batch, &policy);
        let keys: Vec<&str> = summary.tech_stack_distribution.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Go", "Python"]);

        let all = top_n(
            count_categories(batch.iter().flat_map(|r| r.tech_stack.iter())),
            10,
        );
        let keys: Vec<&str> = all.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Go", "Python", "Rust"]);
    }

    #[test]
    fn test_task_type_distribution() {
        let summary = summarize(&sample_batch(), &AggregationPolicy::default());
        assert_eq!(summary.task_type_distribution.len(), 1);
        assert_eq!(summary.task_type_distribution.get("面试辅导"), Some(&5));

        let no_tasks = vec![record("t1", "本科", "211")];
        let summary = summarize(&no_tasks, &AggregationPolicy::default());
        assert!(summary.task_type_distribution.is_empty());
    }

    #[test]
    fn test_repeated_tags_count_once_per_expert() {
        let mut r = with_stack("t1", &["Java", "Java", "Go"]);
        r.task_types = vec!["生成".to_string(), "生成".to_string()];
        let batch = vec![r, with_stack("t2", &["Java"])];

        let summary = summarize(&batch, &AggregationPolicy::default());
        assert_eq!(summary.tech_stack_distribution.get("Java"), Some(&2));
        assert_eq!(summary.tech_stack_distribution.get("Go"), Some(&1));
        assert_eq!(summary.task_type_distribution.get("生成"), Some(&1));
        assert!(summary
            .tech_stack_distribution
            .values()
            .all(|count| *count <= summary.total_experts));
    }

    #[test]
    fn test_supplemental_statistics() {
        let summary = summarize(&sample_batch(), &AggregationPolicy::default());

        let tasks = summary.task_stats.unwrap();
        assert_eq!(tasks.total_tasks, 135);
        assert_eq!(tasks.avg_tasks_per_expert, 13.5);
        // task counts 12, 15, 18, 21, 24, 27 reach the threshold
        assert_eq!(tasks.high_task_expert_count, 6);
        assert_eq!(tasks.high_task_expert_pct, 60.0);

        let risk = summary.template_risk_stats.unwrap();
        assert_eq!(risk.low_risk_count, 10);
        assert_eq!(risk.low_risk_pct, 100.0);
        assert_eq!(risk.avg_template_ratio, 0.25);
        assert_eq!(risk.avg_unique_patterns, 4.0);

        let quality = summary.quality_label_stats.unwrap();
        assert_eq!(quality.normal_count, 10);

        let buckets = summary.diversity_score_distribution.unwrap();
        let labels: Vec<&str> = buckets.keys().map(String::as_str).collect();
        assert_eq!(labels, vec!["0-30", "31-50", "51-70", "71-100"]);
        assert_eq!(buckets["0-30"], 4);
        assert_eq!(buckets["31-50"], 2);
        assert_eq!(buckets["51-70"], 2);
        assert_eq!(buckets["71-100"], 2);

        let avg = summary.avg_scores.unwrap();
        assert_eq!(avg.type_score, 50.0);
        assert_eq!(avg.diversity_score, 45.0);
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let batch = sample_batch();
        let policy = AggregationPolicy::default();

        let first = serde_json::to_vec(&summarize(&batch, &policy)).unwrap();
        let second = serde_json::to_vec(&summarize(&batch, &policy)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_percentage_edge_cases() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(percentage(1, 8), 12.5);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(7, 7), 100.0);
    }
}
