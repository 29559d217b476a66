//! Deterministic mock record source.
//!
//! Each record is generated from an RNG seeded with the SHA-256 digest of
//! its talent id, so the same id always produces the same expert. The
//! generator simulates a task history per expert and derives the
//! diversity scores, template risk and quality label from it.

use crate::analysis::round_to;
use crate::error::DashboardError;
use crate::models::{ExpertRecord, QualityLabel, TemplateRisk};
use crate::source::RecordSource;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

const NAMES: &[&str] = &[
    "张伟", "王芳", "李明", "刘洋", "陈静", "杨帆", "赵强", "黄磊", "周杰", "吴敏", "郑华", "孙燕",
    "马超", "朱峰", "胡鹏", "林涛", "何雨", "罗军", "梁静", "宋健", "唐文", "韩雪", "曹亮", "许晨",
];

const DEGREES: &[(&str, u32)] = &[
    ("硕士", 40),
    ("本科", 35),
    ("博士", 10),
    ("大专", 10),
    ("其他", 5),
];

const SCHOOL_TIERS: &[(&str, u32)] = &[
    ("985", 25),
    ("211", 20),
    ("海外名校", 10),
    ("普通本科", 35),
    ("其他", 10),
];

const TECH_STACKS: &[&str] = &[
    "Java", "C++", "Python", "前端", "后端", "全栈", "架构", "算法", "数据", "运维", "AI/ML",
];

const SKILLS: &[&str] = &[
    "Python", "Java", "JavaScript", "TypeScript", "Go", "Rust", "C++", "React", "Vue",
    "Node.js", "Spring Boot", "Django", "FastAPI", "MySQL", "PostgreSQL", "MongoDB", "Redis",
    "Elasticsearch", "Docker", "Kubernetes", "AWS", "阿里云", "微服务", "分布式系统", "机器学习",
    "深度学习", "NLP", "计算机视觉", "推荐系统", "系统设计", "高并发", "性能优化", "安全", "测试",
];

const TASK_TYPES: &[&str] = &["改写", "评测", "生成", "推理", "翻译", "问答", "代码", "总结"];

const DOMAINS: &[&str] = &[
    "K12教育", "高等教育/科研", "临床医学", "投资/证券", "财务/会计", "软件开发", "产品/运营",
    "市场/营销", "法律/合规", "设计/创意", "项目/管理", "人力/行政", "咨询/分析", "文化/传媒",
    "通用/日常",
];

const BIG_COMPANIES: &[&str] = &[
    "腾讯", "阿里巴巴", "字节跳动", "华为", "美团", "京东", "百度", "快手", "小米", "网易", "滴滴",
    "拼多多", "微软", "Google", "Amazon",
];

const NORMAL_COMPANIES: &[&str] = &[
    "某科技公司", "某互联网公司", "某创业公司", "某金融科技公司", "某软件公司", "某游戏公司",
    "某电商公司",
];

const PROMPT_TEMPLATES: &[&str] = &[
    "请帮我{action}一下{object}",
    "我需要{action}{object}，要求{requirement}",
    "1. {step1}\n2. {step2}\n3. {step3}",
    "{object}是什么？请详细解释",
    "帮我分析一下{object}的{aspect}",
    "请根据以下要求{action}：{requirement}",
];

const BIG_COMPANY_RATE: f64 = 0.30;
const TASK_COUNT_LAMBDA: f64 = 0.08;

fn school_names(tier: &str) -> &'static [&'static str] {
    match tier {
        "985" => &[
            "清华大学", "北京大学", "复旦大学", "上海交通大学", "浙江大学", "南京大学",
            "中国科学技术大学", "哈尔滨工业大学", "西安交通大学", "武汉大学",
        ],
        "211" => &[
            "北京邮电大学", "华东理工大学", "南京航空航天大学", "西安电子科技大学",
            "武汉理工大学", "中南财经政法大学", "苏州大学", "上海大学",
        ],
        "海外名校" => &[
            "MIT", "Stanford University", "Carnegie Mellon", "UC Berkeley",
            "Cambridge University", "Oxford University", "ETH Zurich",
        ],
        "普通本科" => &[
            "北京工商大学", "上海应用技术大学", "杭州电子科技大学", "成都理工大学",
            "广东工业大学", "武汉科技大学", "长沙理工大学",
        ],
        _ => &["其他院校"],
    }
}

/// Generates records locally, no I/O.
#[derive(Debug, Clone, Default)]
pub struct MockSource;

impl MockSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RecordSource for MockSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch(&self, talent_ids: &[String]) -> Result<Vec<ExpertRecord>, DashboardError> {
        Ok(talent_ids.iter().map(|id| generate_expert(id)).collect())
    }
}

/// One simulated task.
#[derive(Debug, Clone)]
struct SimulatedTask {
    query: String,
    task_type: &'static str,
    domain: &'static str,
}

/// Prompt structure metrics for a task history.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct StructureAnalysis {
    unique_patterns: u32,
    template_ratio: f64,
    pattern_diversity: f64,
    structure_score: u32,
}

fn seeded_rng(talent_id: &str) -> StdRng {
    let digest = Sha256::digest(talent_id.as_bytes());
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&digest);
    StdRng::from_seed(seed)
}

fn weighted_pick(rng: &mut StdRng, items: &[(&'static str, u32)]) -> &'static str {
    let total: u32 = items.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0..total);
    for (item, weight) in items {
        if roll < *weight {
            return *item;
        }
        roll -= weight;
    }
    items[items.len() - 1].0
}

fn sample(rng: &mut StdRng, pool: &[&'static str], k: usize) -> Vec<&'static str> {
    pool.choose_multiple(rng, k.min(pool.len())).copied().collect()
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Unique values in first-seen order.
fn unique(values: &[&'static str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}

/// Generate the record for one talent id.
pub fn generate_expert(talent_id: &str) -> ExpertRecord {
    let mut rng = seeded_rng(talent_id);

    let degree = weighted_pick(&mut rng, DEGREES);
    let school_tier = weighted_pick(&mut rng, SCHOOL_TIERS);
    let school_name = school_names(school_tier).choose(&mut rng).copied();

    let stack_size = rng.gen_range(1..=3);
    let tech_stack = sample(&mut rng, TECH_STACKS, stack_size);
    let skill_count = rng.gen_range(3..=8);
    let skills = sample(&mut rng, SKILLS, skill_count);
    let years_of_experience = rng.gen_range(1..=15);

    // Exponentially distributed task volume
    let u: f64 = rng.gen();
    let task_count = ((-(1.0 - u).ln() / TASK_COUNT_LAMBDA) as u32).clamp(3, 60);

    let template_bias = rng.gen_range(0.1..0.8);
    let tasks = simulate_tasks(&mut rng, task_count as usize, template_bias);
    let structure = analyze_structure(&tasks);

    let task_types: Vec<&'static str> = tasks.iter().map(|t| t.task_type).collect();
    let domains: Vec<&'static str> = tasks.iter().map(|t| t.domain).collect();

    let type_score = type_score(&task_types);
    let domain_score = domain_score(&domains);
    let diversity_score = (f64::from(type_score) * 0.4
        + f64::from(domain_score) * 0.4
        + f64::from(structure.structure_score) * 0.2)
        .round() as u32;

    let (risk, risk_description) =
        template_risk(structure.template_ratio, structure.pattern_diversity);
    let (quality_label, quality_reason) = quality_label(
        type_score,
        domain_score,
        diversity_score,
        task_count,
        risk,
    );

    let has_big_company = rng.gen_bool(BIG_COMPANY_RATE);
    let company_count = rng.gen_range(1..=2);
    let companies = if has_big_company {
        sample(&mut rng, BIG_COMPANIES, company_count)
    } else {
        sample(&mut rng, NORMAL_COMPANIES, company_count)
    };

    let name = NAMES.choose(&mut rng).map(|n| n.to_string());

    ExpertRecord {
        name,
        school_name: school_name.map(String::from),
        is_elite_school: None,
        tech_stack: to_strings(&tech_stack),
        skills: to_strings(&skills),
        years_of_experience: Some(years_of_experience),
        task_count,
        task_types: unique(&task_types),
        domains: unique(&domains),
        type_score,
        domain_score,
        structure_score: structure.structure_score,
        diversity_score,
        template_ratio: structure.template_ratio,
        unique_patterns: structure.unique_patterns,
        template_risk_level: risk,
        template_risk_description: risk_description,
        quality_label,
        quality_label_reason: quality_reason,
        has_big_company_experience: has_big_company,
        companies: to_strings(&companies),
        ..ExpertRecord::new(talent_id, degree, school_tier)
    }
}

/// Simulate a task history. Higher bias concentrates templates, domains
/// and task types into smaller pools.
fn simulate_tasks(rng: &mut StdRng, count: usize, template_bias: f64) -> Vec<SimulatedTask> {
    let template_pool = if template_bias > 0.6 {
        sample(rng, PROMPT_TEMPLATES, 2)
    } else if template_bias > 0.3 {
        sample(rng, PROMPT_TEMPLATES, 4)
    } else {
        PROMPT_TEMPLATES.to_vec()
    };

    let concentrated = template_bias > 0.5;
    let domain_pool = sample(rng, DOMAINS, if concentrated { 2 } else { 6 });
    let type_pool = sample(rng, TASK_TYPES, if concentrated { 2 } else { 5 });

    (0..count)
        .filter_map(|_| {
            let template = *template_pool.choose(rng)?;
            let domain = *domain_pool.choose(rng)?;
            let task_type = *type_pool.choose(rng)?;
            Some(SimulatedTask {
                query: format!("[{}] {} - {}任务", domain, template, task_type),
                task_type,
                domain,
            })
        })
        .collect()
}

/// Measure how many distinct prompt structures a task history uses.
fn analyze_structure(tasks: &[SimulatedTask]) -> StructureAnalysis {
    let patterns: Vec<(usize, bool, bool, bool, String)> = tasks
        .iter()
        .filter(|t| !t.query.is_empty())
        .map(|t| {
            let query = t.query.as_str();
            (
                query.chars().count() / 50,
                query.contains('?') || query.contains('？'),
                ["请", "帮我", "需要", "希望"].iter().any(|kw| query.contains(kw)),
                ["1.", "2.", "①", "②", "-", "•"].iter().any(|kw| query.contains(kw)),
                query.chars().take(5).collect(),
            )
        })
        .collect();

    if patterns.is_empty() {
        return StructureAnalysis::default();
    }

    let mut counts: HashMap<&(usize, bool, bool, bool, String), usize> = HashMap::new();
    for pattern in &patterns {
        *counts.entry(pattern).or_insert(0) += 1;
    }

    let total = patterns.len() as f64;
    let unique_patterns = counts.len();
    let most_common = counts.values().copied().max().unwrap_or(0);

    let template_ratio = most_common as f64 / total;
    let pattern_diversity = unique_patterns as f64 / total;
    let structure_score = (pattern_diversity * 100.0 - template_ratio * 30.0).clamp(0.0, 100.0);

    StructureAnalysis {
        unique_patterns: unique_patterns as u32,
        template_ratio: round_to(template_ratio, 3),
        pattern_diversity: round_to(pattern_diversity, 3),
        structure_score: structure_score.round() as u32,
    }
}

/// Share of the most frequent value and the number of distinct values.
fn concentration(values: &[&'static str]) -> (usize, f64) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(*value).or_insert(0) += 1;
    }
    let top = counts.values().copied().max().unwrap_or(0);
    (counts.len(), top as f64 / values.len() as f64)
}

/// Task type diversity, 0-100.
fn type_score(task_types: &[&'static str]) -> u32 {
    if task_types.is_empty() {
        return 0;
    }
    let (unique, top_ratio) = concentration(task_types);

    let base = (unique as f64 * 15.0).min(60.0);
    let balance = ((1.0 - top_ratio) * 50.0).max(0.0);
    (base + balance).round().min(100.0) as u32
}

/// Domain coverage diversity, 0-100.
fn domain_score(domains: &[&'static str]) -> u32 {
    if domains.is_empty() {
        return 0;
    }
    let (unique, top_ratio) = concentration(domains);

    let base = (unique as f64 * 12.0).min(60.0);
    let penalty = if top_ratio >= 0.9 {
        40.0
    } else if top_ratio >= 0.8 {
        30.0
    } else if top_ratio >= 0.7 {
        20.0
    } else {
        0.0
    };
    let balance = ((1.0 - top_ratio) * 50.0).max(0.0);

    (base + balance - penalty).round().clamp(0.0, 100.0) as u32
}

fn template_risk(template_ratio: f64, pattern_diversity: f64) -> (TemplateRisk, String) {
    let ratio_pct = template_ratio * 100.0;
    if template_ratio >= 0.3 || pattern_diversity <= 0.4 {
        (
            TemplateRisk::High,
            format!("超过{:.0}%的任务结构高度相似，存在模板复用嫌疑", ratio_pct),
        )
    } else if template_ratio >= 0.15 || pattern_diversity <= 0.7 {
        (
            TemplateRisk::Medium,
            format!("约{:.0}%的任务结构相似，存在部分模板复用迹象", ratio_pct),
        )
    } else {
        (
            TemplateRisk::Low,
            format!(
                "任务结构差异度{:.0}%，Prompt设计较多样化",
                pattern_diversity * 100.0
            ),
        )
    }
}

fn quality_label(
    type_score: u32,
    domain_score: u32,
    diversity_score: u32,
    task_count: u32,
    risk: TemplateRisk,
) -> (QualityLabel, String) {
    if diversity_score >= 70
        && risk == TemplateRisk::Low
        && task_count >= 5
        && type_score >= 60
        && domain_score >= 60
    {
        return (
            QualityLabel::HighQuality,
            format!(
                "多样性评分{}分，任务类型和领域分布均衡，模板风险低",
                diversity_score
            ),
        );
    }

    if risk == TemplateRisk::High {
        return (
            QualityLabel::Risk,
            "模板化风险高，任务结构高度相似，存在批量生产嫌疑".to_string(),
        );
    }

    if domain_score < 30 && type_score < 30 {
        return (
            QualityLabel::Risk,
            "任务类型和领域过度集中，泛化能力存疑".to_string(),
        );
    }

    (
        QualityLabel::Normal,
        format!("多样性评分{}分，各维度表现中等", diversity_score),
    )
}
