//! Data models for the expert dashboard.
//!
//! This module contains the per-expert attribute record supplied by a
//! record source and the statistics summary served to the dashboard.
//! Field names are the JSON wire contract with the browser renderer.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category -> count mapping over a batch, in emission order.
pub type Distribution = IndexMap<String, usize>;

/// Template reuse risk of an expert's task prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateRisk {
    /// Prompts are structurally diverse
    #[default]
    Low,
    /// Some template reuse
    Medium,
    /// Most prompts share one structure
    High,
}

impl fmt::Display for TemplateRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateRisk::Low => write!(f, "low"),
            TemplateRisk::Medium => write!(f, "medium"),
            TemplateRisk::High => write!(f, "high"),
        }
    }
}

/// Overall quality label assigned to an expert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLabel {
    HighQuality,
    #[default]
    Normal,
    Risk,
}

impl fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityLabel::HighQuality => write!(f, "high_quality"),
            QualityLabel::Normal => write!(f, "normal"),
            QualityLabel::Risk => write!(f, "risk"),
        }
    }
}

/// Attribute record for one expert, one per uploaded identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpertRecord {
    /// Unique within a batch.
    pub talent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Highest degree, e.g. "本科", "硕士", "博士".
    #[serde(default)]
    pub degree: String,
    /// Institution tier, e.g. "985", "211", "海外名校".
    #[serde(default)]
    pub school_tier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_name: Option<String>,
    /// Explicit elite flag. When absent the tier decides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_elite_school: Option<bool>,

    #[serde(default, alias = "tech_stacks")]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<u32>,

    #[serde(default)]
    pub task_count: u32,
    #[serde(default)]
    pub task_types: Vec<String>,
    #[serde(default)]
    pub domains: Vec<String>,

    // Diversity scores, 0-100
    #[serde(default)]
    pub type_score: u32,
    #[serde(default)]
    pub domain_score: u32,
    #[serde(default)]
    pub structure_score: u32,
    #[serde(default)]
    pub diversity_score: u32,

    /// Share of tasks using the most common prompt structure, 0-1.
    #[serde(default)]
    pub template_ratio: f64,
    #[serde(default)]
    pub unique_patterns: u32,
    #[serde(default)]
    pub template_risk_level: TemplateRisk,
    #[serde(default)]
    pub template_risk_description: String,

    #[serde(default)]
    pub quality_label: QualityLabel,
    #[serde(default)]
    pub quality_label_reason: String,

    #[serde(default, alias = "has_big_company_exp")]
    pub has_big_company_experience: bool,
    #[serde(default)]
    pub companies: Vec<String>,
}

impl ExpertRecord {
    /// Creates a record with only the identifying and categorical fields set.
    pub fn new(
        talent_id: impl Into<String>,
        degree: impl Into<String>,
        school_tier: impl Into<String>,
    ) -> Self {
        Self {
            talent_id: talent_id.into(),
            degree: degree.into(),
            school_tier: school_tier.into(),
            ..Self::default()
        }
    }
}

/// Headline counts and percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub masters_and_above_count: usize,
    pub masters_and_above_pct: f64,
    pub elite_school_count: usize,
    pub elite_school_pct: f64,
    pub big_company_count: usize,
    pub big_company_pct: f64,
}

/// Task volume statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total_tasks: u64,
    pub avg_tasks_per_expert: f64,
    pub high_task_expert_count: usize,
    pub high_task_expert_pct: f64,
}

/// Template reuse risk breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateRiskStats {
    pub high_risk_count: usize,
    pub high_risk_pct: f64,
    pub medium_risk_count: usize,
    pub medium_risk_pct: f64,
    pub low_risk_count: usize,
    pub low_risk_pct: f64,
    pub avg_template_ratio: f64,
    pub avg_unique_patterns: f64,
}

/// Quality label breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityLabelStats {
    pub high_quality_count: usize,
    pub high_quality_pct: f64,
    pub normal_count: usize,
    pub normal_pct: f64,
    pub risk_count: usize,
    pub risk_pct: f64,
}

/// Mean diversity scores across the batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvgScores {
    pub type_score: f64,
    pub domain_score: f64,
    pub structure_score: f64,
    pub diversity_score: f64,
}

/// Statistics derived from one batch. Immutable once computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSummary {
    pub total_experts: usize,
    pub degree_distribution: Distribution,
    pub school_tier_distribution: Distribution,
    /// Top N tags, descending by count.
    pub tech_stack_distribution: Distribution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_stats: Option<TaskStats>,
    pub task_type_distribution: Distribution,
    pub kpi: Kpi,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_risk_stats: Option<TemplateRiskStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_label_stats: Option<QualityLabelStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diversity_score_distribution: Option<Distribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_scores: Option<AvgScores>,
}
