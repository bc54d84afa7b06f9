//! Documentation Generator
//!
//! Orchestrates generation per unit of work: cache lookup first, then a
//! rate-limited provider call with bounded retries, and finally the
//! deterministic template fallback. `generate_*` methods are total: apart
//! from fatal auth failures they always return text.
//!
//! ## Flow per unit
//!
//! 1. Compute the content-identity cache key
//! 2. On hit, return the cached text (no provider or limiter interaction)
//! 3. On miss, acquire a rate-limit slot, call the provider
//! 4. Retry transient failures with exponential backoff and jitter
//! 5. After exhausting retries, build the structural template instead

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use crate::ai::cache::{GenerationCache, cache_key};
use crate::ai::provider::{CompletionRequest, SharedProvider};
use crate::ai::rate_limiter::RateLimiter;
use crate::ai::{prompt, template};
use crate::config::GenerationConfig;
use crate::constants::retry;
use crate::types::{
    AutoDocError, ClassInfo, DocSource, FallbackReason, FunctionInfo, GeneratedDoc,
    GenerationError, GenerationErrorKind, ModuleInfo, Result, UnitKind,
};

/// Retry schedule for transient provider failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: retry::DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(retry::BASE_DELAY_MS),
            max_delay: Duration::from_secs(retry::MAX_DELAY_SECS),
            backoff_factor: retry::BACKOFF_FACTOR,
        }
    }
}

impl RetryPolicy {
    /// Delay before the given retry attempt (0-based), with random jitter
    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_factor.powi(attempt as i32);
        let delay = self.base_delay.mul_f32(factor).min(self.max_delay);
        delay + random_jitter(delay)
    }
}

/// Generated documentation for one file plus the per-unit source markers
#[derive(Debug, Clone)]
pub struct FileDocs {
    pub doc: GeneratedDoc,
    /// Source of every unit (functions, classes, file synthesis) in order
    pub unit_sources: Vec<DocSource>,
}

pub struct DocGenerator {
    provider: Option<SharedProvider>,
    cache: Arc<GenerationCache>,
    limiter: Arc<RateLimiter>,
    config: GenerationConfig,
    retry_policy: RetryPolicy,
    /// Precomputed generation-config fingerprint mixed into cache keys
    fingerprint: String,
}

impl DocGenerator {
    pub fn new(
        provider: Option<SharedProvider>,
        cache: Arc<GenerationCache>,
        limiter: Arc<RateLimiter>,
        config: GenerationConfig,
    ) -> Self {
        let fingerprint = config.fingerprint();
        let retry_policy = RetryPolicy {
            max_retries: config.max_retries,
            ..RetryPolicy::default()
        };
        Self {
            provider,
            cache,
            limiter,
            config,
            retry_policy,
            fingerprint,
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    // =========================================================================
    // Per-unit generation
    // =========================================================================

    pub async fn generate_function(
        &self,
        module_path: &str,
        func: &FunctionInfo,
    ) -> Result<GeneratedDoc> {
        let identity = format!("{}|{}", module_path, func.fingerprint());
        self.generate_unit(
            &identity,
            UnitKind::Function,
            prompt::function_prompt(module_path, func),
            template::function_fallback(func),
        )
        .await
    }

    pub async fn generate_class(
        &self,
        module_path: &str,
        class: &ClassInfo,
    ) -> Result<GeneratedDoc> {
        let identity = format!("{}|{}", module_path, class.fingerprint());
        self.generate_unit(
            &identity,
            UnitKind::Class,
            prompt::class_prompt(module_path, class),
            template::class_fallback(class),
        )
        .await
    }

    /// Generate the full document for one file: every contained function and
    /// class, plus a file-level synthesis pass over their summaries.
    pub async fn generate_file(&self, module: &ModuleInfo) -> Result<FileDocs> {
        let mut unit_sources = Vec::new();
        let mut sections = Vec::new();

        for func in &module.functions {
            let doc = self.generate_function(&module.path, func).await?;
            unit_sources.push(doc.source);
            sections.push(doc.text);
        }

        for class in &module.classes {
            let doc = self.generate_class(&module.path, class).await?;
            unit_sources.push(doc.source);
            sections.push(doc.text);
        }

        let synthesis = self
            .generate_unit(
                &module.fingerprint(),
                UnitKind::File,
                prompt::file_prompt(module, &sections),
                template::file_fallback(module),
            )
            .await?;
        unit_sources.push(synthesis.source);

        let mut text = synthesis.text.clone();
        if !module.functions.is_empty() {
            text.push_str("\n## Functions\n\n");
            for section in sections.iter().take(module.functions.len()) {
                text.push_str(section);
                text.push('\n');
            }
        }
        if !module.classes.is_empty() {
            text.push_str("\n## Classes\n\n");
            for section in sections.iter().skip(module.functions.len()) {
                text.push_str(section);
                text.push('\n');
            }
        }

        Ok(FileDocs {
            doc: GeneratedDoc {
                text,
                source: synthesis.source,
            },
            unit_sources,
        })
    }

    /// One synthesis pass over all file-level summaries
    pub async fn generate_overview(
        &self,
        modules: &[ModuleInfo],
        file_summaries: &[(String, String)],
        project_name: &str,
    ) -> Result<GeneratedDoc> {
        let identity = {
            let mut parts: Vec<String> = modules.iter().map(|m| m.fingerprint()).collect();
            parts.sort();
            format!("{}|{}", project_name, parts.join("\n"))
        };

        self.generate_unit(
            &identity,
            UnitKind::Overview,
            prompt::overview_prompt(project_name, file_summaries),
            template::overview_fallback(modules, project_name),
        )
        .await
    }

    // =========================================================================
    // Core unit flow
    // =========================================================================

    async fn generate_unit(
        &self,
        identity: &str,
        kind: UnitKind,
        prompt_text: String,
        fallback: String,
    ) -> Result<GeneratedDoc> {
        let key = cache_key(identity, kind, &self.fingerprint);

        if let Some(text) = self.cache.get(&key) {
            debug!("Cache hit for {} unit", kind);
            return Ok(GeneratedDoc::generated(text));
        }

        let Some(provider) = &self.provider else {
            return Ok(GeneratedDoc::fallback(fallback, FallbackReason::NoProvider));
        };

        let request = CompletionRequest::new(prompt_text)
            .with_system(prompt::SYSTEM_MESSAGE)
            .with_max_tokens(self.max_tokens_for(kind))
            .with_temperature(self.config.temperature);

        let call_timeout = Duration::from_secs(self.config.timeout_secs);
        let mut attempt = 0u32;
        loop {
            self.limiter.acquire().await;

            // A hung call counts as a transient failure, not a hang
            let outcome = match tokio::time::timeout(call_timeout, provider.complete(&request))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(GenerationError::with_provider(
                    GenerationErrorKind::Timeout,
                    format!("Call exceeded {:?} deadline", call_timeout),
                    provider.name(),
                )
                .into()),
            };

            match outcome {
                Ok(text) => {
                    self.cache.put(key, &text);
                    return Ok(GeneratedDoc::generated(text));
                }
                Err(e) if e.is_fatal() => {
                    // Bad credentials: retrying cannot help, surface now
                    return Err(e);
                }
                Err(e) if e.is_transient() && attempt < self.retry_policy.max_retries => {
                    // A server-provided retry hint overrides the backoff schedule
                    let delay = match &e {
                        AutoDocError::Generation(g) => g
                            .retry_after
                            .unwrap_or_else(|| self.retry_policy.delay_for(attempt)),
                        _ => self.retry_policy.delay_for(attempt),
                    };
                    warn!(
                        "Transient generation failure for {} unit (attempt {}/{}): {}; retrying in {:?}",
                        kind,
                        attempt + 1,
                        self.retry_policy.max_retries,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(
                        "Generation failed for {} unit, using template fallback: {}",
                        kind, e
                    );
                    return Ok(GeneratedDoc::fallback(
                        fallback,
                        FallbackReason::RetriesExhausted,
                    ));
                }
            }
        }
    }

    fn max_tokens_for(&self, kind: UnitKind) -> u32 {
        match kind {
            UnitKind::Function => self.config.max_tokens.min(500),
            UnitKind::Class => self.config.max_tokens.min(800),
            UnitKind::File => self.config.max_tokens,
            UnitKind::Overview => self.config.max_tokens.saturating_mul(2),
        }
    }
}

/// Random jitter up to a quarter of the base delay
fn random_jitter(base_delay: Duration) -> Duration {
    let max_jitter_ms = (base_delay.as_millis() as u64) / 4;
    if max_jitter_ms == 0 {
        return Duration::ZERO;
    }
    let jitter_ms = rand::rng().random_range(0..max_jitter_ms);
    Duration::from_millis(jitter_ms)
}
