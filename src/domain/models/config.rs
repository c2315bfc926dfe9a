//! Configuration for the generation-and-repair flow.
//!
//! Every tunable is an explicit named field so nothing is read from module
//! scope at call sites; the loader in `infrastructure::config` merges YAML
//! files and environment variables over these defaults.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Models used per stage
    #[serde(default)]
    pub models: ModelsConfig,

    /// Convergence-loop budgets and temperature schedule
    #[serde(default)]
    pub convergence: ConvergenceConfig,

    /// Test-suite generation knobs
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Completion-service client settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Test-runner settings
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Directory corrected sources are rooted under when the origin path is
    /// relative
    #[serde(default = "default_source_root")]
    pub source_root: String,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_source_root() -> String {
    "src".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models: ModelsConfig::default(),
            convergence: ConvergenceConfig::default(),
            generation: GenerationConfig::default(),
            api: ApiConfig::default(),
            runner: RunnerConfig::default(),
            source_root: default_source_root(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Per-stage model selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModelsConfig {
    /// Model for the explanation stage
    #[serde(default = "default_model")]
    pub explain: String,

    /// Model for the planning and elaboration stages
    #[serde(default = "default_model")]
    pub plan: String,

    /// Model for test synthesis and function correction
    #[serde(default = "default_model")]
    pub execute: String,
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self { explain: default_model(), plan: default_model(), execute: default_model() }
    }
}

/// Budgets and the temperature schedule driven by stagnation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConvergenceConfig {
    /// Correction cycles allowed before giving up
    #[serde(default = "default_max_correction_attempts")]
    pub max_correction_attempts: u32,

    /// Identical failure sets tolerated before regenerating the suite
    #[serde(default = "default_stagnation_ceiling")]
    pub stagnation_ceiling: u32,

    /// Sampling temperature for the first generation pass
    #[serde(default = "default_base_temperature")]
    pub base_temperature: f32,

    /// Linear temperature increase per stagnant correction
    #[serde(default = "default_correction_temperature_step")]
    pub correction_temperature_step: f32,

    /// Temperature spread applied on escalation
    #[serde(default = "default_escalation_temperature_spread")]
    pub escalation_temperature_spread: f32,
}

const fn default_max_correction_attempts() -> u32 {
    3
}

const fn default_stagnation_ceiling() -> u32 {
    3
}

const fn default_base_temperature() -> f32 {
    0.4
}

const fn default_correction_temperature_step() -> f32 {
    0.1
}

const fn default_escalation_temperature_spread() -> f32 {
    0.6
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            max_correction_attempts: default_max_correction_attempts(),
            stagnation_ceiling: default_stagnation_ceiling(),
            base_temperature: default_base_temperature(),
            correction_temperature_step: default_correction_temperature_step(),
            escalation_temperature_spread: default_escalation_temperature_spread(),
        }
    }
}

/// Suite-generation knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GenerationConfig {
    /// Minimum scenario bullets a plan must contain before elaboration is
    /// skipped
    #[serde(default = "default_approx_min_cases_to_cover")]
    pub approx_min_cases_to_cover: u32,

    /// Scenario minimum used when regenerating after escalation
    #[serde(default = "default_escalated_min_cases")]
    pub escalated_min_cases: u32,

    /// Synthesis re-runs allowed when the model emits unparseable code
    #[serde(default = "default_reruns_if_fail")]
    pub reruns_if_fail: u32,

    /// Test package the generated suite imports
    #[serde(default = "default_unit_test_package")]
    pub unit_test_package: String,

    /// Stream completions instead of waiting for the full response
    #[serde(default)]
    pub stream: bool,

    /// Echo the conversation to the terminal as stages run
    #[serde(default)]
    pub print_text: bool,
}

const fn default_approx_min_cases_to_cover() -> u32 {
    7
}

const fn default_escalated_min_cases() -> u32 {
    10
}

const fn default_reruns_if_fail() -> u32 {
    1
}

fn default_unit_test_package() -> String {
    "pytest".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            approx_min_cases_to_cover: default_approx_min_cases_to_cover(),
            escalated_min_cases: default_escalated_min_cases(),
            reruns_if_fail: default_reruns_if_fail(),
            unit_test_package: default_unit_test_package(),
            stream: false,
            print_text: false,
        }
    }
}

/// Completion-service client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApiConfig {
    /// API key; read from ANTHROPIC_API_KEY when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API version header
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Request timeout in seconds
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,

    /// Max tokens to generate per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Retries for transient HTTP failures (429/5xx/network)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial retry backoff in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum retry backoff in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

const fn default_api_timeout_secs() -> u64 {
    300
}

const fn default_max_tokens() -> u32 {
    4096
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    1000
}

const fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            api_version: default_api_version(),
            timeout_secs: default_api_timeout_secs(),
            max_tokens: default_max_tokens(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Test-runner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunnerConfig {
    /// Runner binary
    #[serde(default = "default_pytest_bin")]
    pub pytest_bin: String,

    /// Runner timeout in seconds; expiry is fatal, not a test failure
    #[serde(default = "default_runner_timeout_secs")]
    pub timeout_secs: u64,

    /// Path the synthesized test module is written to
    #[serde(default = "default_test_output_path")]
    pub test_output_path: String,
}

fn default_pytest_bin() -> String {
    "pytest".to_string()
}

const fn default_runner_timeout_secs() -> u64 {
    300
}

fn default_test_output_path() -> String {
    "tests/unit/test_functions.py".to_string()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            pytest_bin: default_pytest_bin(),
            timeout_secs: default_runner_timeout_secs(),
            test_output_path: default_test_output_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}
