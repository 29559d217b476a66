//! Batch validation, run before a batch reaches the aggregator.

use crate::error::DashboardError;
use crate::models::ExpertRecord;
use std::collections::HashSet;

const MAX_SCORE: u32 = 100;

/// Check every record in a batch, failing on the first bad one.
pub fn validate_batch(records: &[ExpertRecord]) -> Result<(), DashboardError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        validate_record(index, record)?;

        if !seen.insert(record.talent_id.as_str()) {
            return Err(DashboardError::validation(
                &record.talent_id,
                "duplicate talent_id in batch",
            ));
        }
    }

    Ok(())
}

fn validate_record(index: usize, record: &ExpertRecord) -> Result<(), DashboardError> {
    if record.talent_id.trim().is_empty() {
        return Err(DashboardError::validation(
            format!("#{}", index),
            "missing talent_id",
        ));
    }
    let id = record.talent_id.as_str();

    if record.degree.trim().is_empty() {
        return Err(DashboardError::validation(id, "missing degree"));
    }
    if record.school_tier.trim().is_empty() {
        return Err(DashboardError::validation(id, "missing school_tier"));
    }

    let scores = [
        ("type_score", record.type_score),
        ("domain_score", record.domain_score),
        ("structure_score", record.structure_score),
        ("diversity_score", record.diversity_score),
    ];
    for (field, value) in scores {
        if value > MAX_SCORE {
            return Err(DashboardError::validation(
                id,
                format!("{} out of range: {}", field, value),
            ));
        }
    }

    if !record.template_ratio.is_finite() || !(0.0..=1.0).contains(&record.template_ratio) {
        return Err(DashboardError::validation(
            id,
            format!("template_ratio out of range: {}", record.template_ratio),
        ));
    }

    Ok(())
}
