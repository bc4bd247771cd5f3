//! Configuration for schema inference

use serde::{Deserialize, Serialize};

/// How the sample cap picks documents when the corpus is larger than the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SampleStrategy {
    /// The first `sample_size` documents.
    #[default]
    Prefix,
    /// `sample_size` documents evenly spaced across the corpus.
    Stride,
}

/// Thresholds for promoting a string field to an enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumTuning {
    pub min_symbols: usize,
    pub max_symbols: usize,
    /// Distinct / total observations must stay strictly below this.
    pub max_ratio: f64,
}

impl Default for EnumTuning {
    fn default() -> Self {
        Self {
            min_symbols: 2,
            max_symbols: 50,
            max_ratio: 0.10,
        }
    }
}

/// Thresholds for clustering and discriminator selection.
///
/// The defaults are empirically tuned; corpora with unusually sparse or
/// unusually uniform records may want different values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceTuning {
    /// Minimum Jaccard similarity of field signatures to share a cluster.
    pub signature_similarity: f64,
    /// Minimum field overlap for re-absorbing a cluster into the dominant one
    /// when neither field set contains the other.
    pub absorb_overlap: f64,
    /// Minimum share of instances whose discriminator value points at their
    /// own cluster.
    pub min_purity: f64,
    /// Distinct / instance ratio at which a candidate counts as a per-record
    /// identifier.
    pub unique_id_ratio: f64,
    pub max_variants: usize,
}

impl Default for ChoiceTuning {
    fn default() -> Self {
        Self {
            signature_similarity: 0.8,
            absorb_overlap: 0.7,
            min_purity: 0.9,
            unique_id_ratio: 0.9,
            max_variants: 50,
        }
    }
}

/// Configuration for schema inference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    /// Maximum number of documents to sample (0 = all)
    pub sample_size: usize,

    pub sample_strategy: SampleStrategy,

    /// Detect discriminated unions among sibling records
    pub infer_choices: bool,

    /// Nesting levels (root included) at which choices are looked for
    pub choice_depth: usize,

    /// Promote low-cardinality string fields to enums
    pub infer_enums: bool,

    /// Name of the root record type
    pub root_name: String,

    pub enums: EnumTuning,

    pub choices: ChoiceTuning,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            sample_size: 0,
            sample_strategy: SampleStrategy::Prefix,
            infer_choices: true,
            choice_depth: 1,
            infer_enums: false,
            root_name: "Root".to_string(),
            enums: EnumTuning::default(),
            choices: ChoiceTuning::default(),
        }
    }
}

impl InferenceConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for custom configuration
    pub fn builder() -> InferenceConfigBuilder {
        InferenceConfigBuilder::default()
    }

    /// Choice depth budget at the root; zero when choices are disabled.
    pub fn root_choice_budget(&self) -> usize {
        if self.infer_choices { self.choice_depth } else { 0 }
    }
}

/// Builder for InferenceConfig
#[derive(Debug, Default)]
pub struct InferenceConfigBuilder {
    config: InferenceConfig,
}

impl InferenceConfigBuilder {
    /// Set the sample size (0 = all documents)
    pub fn sample_size(mut self, size: usize) -> Self {
        self.config.sample_size = size;
        self
    }

    pub fn sample_strategy(mut self, strategy: SampleStrategy) -> Self {
        self.config.sample_strategy = strategy;
        self
    }

    pub fn infer_choices(mut self, enabled: bool) -> Self {
        self.config.infer_choices = enabled;
        self
    }

    /// Set the choice depth (at least 1)
    pub fn choice_depth(mut self, depth: usize) -> Self {
        self.config.choice_depth = depth.max(1);
        self
    }

    pub fn infer_enums(mut self, enabled: bool) -> Self {
        self.config.infer_enums = enabled;
        self
    }

    pub fn root_name(mut self, name: impl Into<String>) -> Self {
        self.config.root_name = name.into();
        self
    }

    pub fn enum_max_symbols(mut self, max: usize) -> Self {
        self.config.enums.max_symbols = max;
        self
    }

    pub fn enum_max_ratio(mut self, ratio: f64) -> Self {
        self.config.enums.max_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    pub fn signature_similarity(mut self, threshold: f64) -> Self {
        self.config.choices.signature_similarity = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn absorb_overlap(mut self, threshold: f64) -> Self {
        self.config.choices.absorb_overlap = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn min_purity(mut self, purity: f64) -> Self {
        self.config.choices.min_purity = purity.clamp(0.0, 1.0);
        self
    }

    pub fn unique_id_ratio(mut self, ratio: f64) -> Self {
        self.config.choices.unique_id_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    pub fn max_variants(mut self, max: usize) -> Self {
        self.config.choices.max_variants = max;
        self
    }

    /// Build the configuration
    pub fn build(self) -> InferenceConfig {
        self.config
    }
}
