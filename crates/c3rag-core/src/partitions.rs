//! Collection registry: the named knowledge partitions and their default
//! retrieval knobs.

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::constants::DEFAULT_SCORE_THRESHOLD;

/// A named, topic-scoped slice of the knowledge store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    /// Short routing key ("plugins").
    pub key: String,
    /// Collection name in the vector store ("c3_plugins").
    pub collection: String,
    /// Display title used when grouping context.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f64,
    /// Multiplier applied after per-partition normalization.
    #[serde(default = "default_boost")]
    pub authority_boost: f64,
}

fn default_top_k() -> usize {
    defaults::DEFAULT_PARTITION_TOP_K
}

fn default_score_threshold() -> f64 {
    DEFAULT_SCORE_THRESHOLD
}

fn default_boost() -> f64 {
    1.0
}

impl Partition {
    pub fn new(key: &str, collection: &str, title: &str, description: &str) -> Self {
        Self {
            key: key.to_string(),
            collection: collection.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            top_k: default_top_k(),
            score_threshold: default_score_threshold(),
            authority_boost: default_boost(),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_score_threshold(mut self, threshold: f64) -> Self {
        self.score_threshold = threshold;
        self
    }

    pub fn with_authority_boost(mut self, boost: f64) -> Self {
        self.authority_boost = boost;
        self
    }
}

pub const GUIDE: &str = "guide";
pub const INTERFACE: &str = "interface";
pub const PROJECT: &str = "project";
pub const PLUGINS: &str = "plugins";
pub const BEHAVIORS: &str = "behaviors";
pub const SCRIPTING: &str = "scripting";
pub const TERMS: &str = "terms";
pub const EXAMPLES: &str = "examples";

/// The stock partition set. Reference-grade partitions carry a small boost.
pub fn default_partitions() -> Vec<Partition> {
    vec![
        Partition::new(GUIDE, "c3_guide", "入门指南", "入门教程、概述、技巧指南"),
        Partition::new(
            INTERFACE,
            "c3_interface",
            "编辑器界面",
            "编辑器界面 (工具栏、对话框、调试器)",
        ),
        Partition::new(
            PROJECT,
            "c3_project",
            "项目元素",
            "项目元素 (事件、对象、时间轴、流程图)",
        )
        .with_authority_boost(1.05),
        Partition::new(
            PLUGINS,
            "c3_plugins",
            "插件参考",
            "插件参考 (Sprite、Audio、Array 等)",
        )
        .with_authority_boost(1.1),
        Partition::new(
            BEHAVIORS,
            "c3_behaviors",
            "行为参考",
            "行为参考 (Platform、Physics、Tween 等)",
        )
        .with_authority_boost(1.1),
        Partition::new(
            SCRIPTING,
            "c3_scripting",
            "脚本 API",
            "脚本 API (JavaScript/TypeScript)",
        ),
        Partition::new(TERMS, "c3_terms", "术语表", "官方术语翻译")
            .with_top_k(defaults::DEFAULT_TERMS_TOP_K)
            .with_score_threshold(defaults::DEFAULT_TERMS_SCORE_THRESHOLD),
        Partition::new(EXAMPLES, "c3_examples", "示例代码", "示例项目代码"),
    ]
}

/// Static, ordered set of partitions.
#[derive(Debug, Clone)]
pub struct PartitionRegistry {
    partitions: Vec<Partition>,
}

impl PartitionRegistry {
    pub fn new(partitions: Vec<Partition>) -> Self {
        Self { partitions }
    }

    /// Look up by routing key.
    pub fn get(&self, key: &str) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.key == key)
    }

    /// Look up by vector-store collection name.
    pub fn by_collection(&self, collection: &str) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.collection == collection)
    }

    /// Authority boost for a collection; unknown collections are not boosted.
    pub fn boost_for(&self, collection: &str) -> f64 {
        self.by_collection(collection)
            .map(|p| p.authority_boost)
            .unwrap_or(1.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Partition> {
        self.partitions.iter()
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

impl Default for PartitionRegistry {
    fn default() -> Self {
        Self::new(default_partitions())
    }
}
