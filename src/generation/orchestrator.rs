//! Placeholder Orchestrator
//!
//! Public entry point of the engine. Serves from cache when possible,
//! otherwise walks the enabled providers in order and falls back to
//! procedural synthesis. Never fails.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use crate::cache::{cache_key, PlaceholderCache, SharedCache};
use crate::config::PlaceholderConfig;
use crate::error::{PlaceholderError, Result};
use crate::generation::fallback::{first_success, Attempt};
use crate::generation::provider::{HttpProber, Prober};
use crate::generation::randomizer::AestheticRandomizer;
use crate::generation::synthesizer::{to_data_uri, ProceduralSynthesizer};
use crate::models::{ContentCategory, GeneratedPlaceholder, PlaceholderRequest, ResolvedConfig};

/// Service tag for results synthesized after every provider failed
pub const SVG_FALLBACK_SERVICE: &str = "svg-fallback";
/// Service tag for results produced after an internal failure (never cached)
pub const EMERGENCY_FALLBACK_SERVICE: &str = "emergency-fallback";

/// Warmed up by [`PlaceholderOrchestrator::preload_common`]
pub const COMMON_PRESETS: [(ContentCategory, u32, u32); 4] = [
    (ContentCategory::Character, 400, 300),
    (ContentCategory::Location, 800, 600),
    (ContentCategory::Avatar, 128, 128),
    (ContentCategory::Banner, 1200, 400),
];

/// Last resort when even synthesis fails: a plain paper card.
const STATIC_FALLBACK_SVG: &str = concat!(
    r#"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="300" viewBox="0 0 400 300">"#,
    r##"<rect width="400" height="300" fill="#f5f0e6"/>"##,
    r##"<text x="200" y="160" text-anchor="middle" font-family="Georgia, serif" font-size="24" fill="#3b3024">Coming soon</text>"##,
    "</svg>"
);

pub struct PlaceholderOrchestrator {
    pipeline: Arc<Pipeline>,
}

/// State a generation needs; shared with spawned tasks that outlive the caller.
struct Pipeline {
    config: PlaceholderConfig,
    cache: SharedCache,
    randomizer: AestheticRandomizer,
    synthesizer: ProceduralSynthesizer,
    prober: Arc<dyn Prober>,
    probe_slots: Arc<Semaphore>,
}

impl PlaceholderOrchestrator {
    /// Wires an orchestrator around an existing cache and prober.
    pub fn new(config: PlaceholderConfig, cache: SharedCache, prober: Arc<dyn Prober>) -> Self {
        let randomizer = AestheticRandomizer::new(config.randomization.clone());
        Self::with_randomizer(config, cache, prober, randomizer)
    }

    pub fn with_randomizer(
        config: PlaceholderConfig,
        cache: SharedCache,
        prober: Arc<dyn Prober>,
        randomizer: AestheticRandomizer,
    ) -> Self {
        let synthesizer = ProceduralSynthesizer::from_config(&config);
        let probe_slots = Arc::new(Semaphore::new(config.performance.max_concurrent.max(1)));
        Self {
            pipeline: Arc::new(Pipeline {
                config,
                cache,
                randomizer,
                synthesizer,
                prober,
                probe_slots,
            }),
        }
    }

    /// Builds the production wiring: system-clock cache and HTTP prober.
    pub fn from_config(config: PlaceholderConfig) -> Result<Self> {
        let cache = PlaceholderCache::from_config(&config.performance).shared();
        let prober = HttpProber::from_config(&config.performance)?;
        Ok(Self::new(config, cache, Arc::new(prober)))
    }

    pub fn cache(&self) -> &SharedCache {
        &self.pipeline.cache
    }

    // == Generate ==
    /// Produces a usable placeholder for `request`. Never fails.
    ///
    /// The pipeline runs on its own task: dropping the returned future (client
    /// disconnect, caller timeout) leaves generation running, and its result
    /// still lands in the cache. Errors and panics inside the pipeline yield an
    /// uncached emergency fallback so a transient fault cannot poison a key.
    pub async fn generate_placeholder(&self, request: PlaceholderRequest) -> GeneratedPlaceholder {
        let resolved = ResolvedConfig::resolve(&request, &self.pipeline.config);

        let pipeline = Arc::clone(&self.pipeline);
        let job = resolved.clone();
        let outcome = tokio::spawn(async move { pipeline.run(&job).await }).await;

        match outcome {
            Ok(Ok(placeholder)) => placeholder,
            Ok(Err(e)) => {
                error!("Placeholder pipeline failed for {}: {}", resolved.category, e);
                self.pipeline.emergency_fallback(&resolved)
            }
            Err(e) => {
                error!("Placeholder pipeline aborted for {}: {}", resolved.category, e);
                self.pipeline.emergency_fallback(&resolved)
            }
        }
    }

    // == Preload ==
    /// Best-effort warmup of [`COMMON_PRESETS`]; individual results are ignored.
    pub async fn preload_common(&self) {
        let warmups = COMMON_PRESETS.iter().map(|(category, width, height)| {
            self.generate_placeholder(PlaceholderRequest::new(*category).with_size(*width, *height))
        });

        let results = futures::future::join_all(warmups).await;
        let synthesized = results
            .iter()
            .filter(|placeholder| placeholder.service == SVG_FALLBACK_SERVICE)
            .count();
        info!(
            "Preloaded {} common placeholders ({} synthesized)",
            results.len(),
            synthesized
        );
    }
}

impl Pipeline {
    async fn run(&self, resolved: &ResolvedConfig) -> Result<GeneratedPlaceholder> {
        let key = cache_key(resolved);

        let cached = self.cache.write().await.get(&key);
        if let Some(hit) = cached {
            debug!("Cache hit for {}", key);
            return Ok(hit);
        }

        let aesthetic = self.randomizer.sample();
        let timeout = Duration::from_millis(self.config.performance.timeout_ms);

        let placeholder = match first_success(self.provider_attempts(resolved), timeout).await {
            Ok(success) => GeneratedPlaceholder {
                url: success.value,
                fallback_url: Some(self.synthesizer.synthesize(resolved, &aesthetic)?),
                service: success.label,
                cached: false,
                aesthetic,
            },
            Err(PlaceholderError::AllProvidersExhausted { attempted }) => {
                info!(
                    "All {} placeholder services failed for {}, synthesizing SVG",
                    attempted, key
                );
                GeneratedPlaceholder {
                    url: self.synthesizer.synthesize(resolved, &aesthetic)?,
                    fallback_url: None,
                    service: SVG_FALLBACK_SERVICE.to_string(),
                    cached: false,
                    aesthetic,
                }
            }
            Err(e) => return Err(e),
        };

        self.cache.write().await.set(key, placeholder.clone());
        Ok(placeholder)
    }

    /// One probe attempt per enabled provider, in configured order.
    fn provider_attempts(&self, resolved: &ResolvedConfig) -> Vec<Attempt<'static, String>> {
        self.config
            .enabled_services()
            .map(|service| {
                let url = service.build_url(resolved);
                let prober = Arc::clone(&self.prober);
                let slots = Arc::clone(&self.probe_slots);

                Attempt::new(service.name.clone(), async move {
                    let _permit = slots
                        .acquire_owned()
                        .await
                        .map_err(|_| PlaceholderError::Internal("probe limiter closed".to_string()))?;
                    prober.probe(&url).await?;
                    Ok(url)
                })
            })
            .collect()
    }

    fn emergency_fallback(&self, resolved: &ResolvedConfig) -> GeneratedPlaceholder {
        let aesthetic = self.randomizer.sample();
        let url = self
            .synthesizer
            .synthesize(resolved, &aesthetic)
            .unwrap_or_else(|e| {
                error!("Emergency synthesis failed, serving static card: {}", e);
                to_data_uri(STATIC_FALLBACK_SVG)
            });

        GeneratedPlaceholder {
            url,
            fallback_url: None,
            service: EMERGENCY_FALLBACK_SERVICE.to_string(),
            cached: false,
            aesthetic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::config::{Bounds, ServiceDescriptor};
    use crate::generation::synthesizer::SVG_DATA_URI_PREFIX;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: u64 = 60_000;

    /// Fails every probe and counts calls
    #[derive(Default)]
    struct FailingProber {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Prober for FailingProber {
        async fn probe(&self, url: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(PlaceholderError::ServiceUnavailable {
                target: url.to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    /// Succeeds only for urls containing the marker
    struct SelectiveProber {
        marker: &'static str,
    }

    #[async_trait]
    impl Prober for SelectiveProber {
        async fn probe(&self, url: &str) -> Result<()> {
            if url.contains(self.marker) {
                Ok(())
            } else {
                Err(PlaceholderError::ServiceUnavailable {
                    target: url.to_string(),
                    reason: "HTTP 503".to_string(),
                })
            }
        }
    }

    /// Never answers
    struct HangingProber;

    #[async_trait]
    impl Prober for HangingProber {
        async fn probe(&self, _url: &str) -> Result<()> {
            std::future::pending::<()>().await;
            Ok(())
        }
    }

    /// Answers successfully after a delay
    struct SlowProber {
        delay: Duration,
    }

    #[async_trait]
    impl Prober for SlowProber {
        async fn probe(&self, _url: &str) -> Result<()> {
            tokio::time::sleep(self.delay).await;
            Ok(())
        }
    }

    struct PanickingProber;

    #[async_trait]
    impl Prober for PanickingProber {
        async fn probe(&self, _url: &str) -> Result<()> {
            panic!("prober bug");
        }
    }

    fn service(name: &str) -> ServiceDescriptor {
        ServiceDescriptor {
            name: name.to_string(),
            endpoint_template: format!("https://{}.test/{{width}}/{{height}}", name),
            style_params: BTreeMap::new(),
            enabled: true,
        }
    }

    fn test_config() -> PlaceholderConfig {
        let mut config = PlaceholderConfig::default();
        config.services = vec![service("alpha"), service("beta"), service("gamma")];
        config.performance.timeout_ms = 5_000;
        config
    }

    fn orchestrator(config: PlaceholderConfig, prober: Arc<dyn Prober>) -> (PlaceholderOrchestrator, ManualClock) {
        let clock = ManualClock::new(1_700_000_000_000);
        let cache = PlaceholderCache::with_clock(100, TTL, Arc::new(clock.clone())).shared();
        let randomizer = AestheticRandomizer::seeded(config.randomization.clone(), 21);
        (
            PlaceholderOrchestrator::with_randomizer(config, cache, prober, randomizer),
            clock,
        )
    }

    fn character_request() -> PlaceholderRequest {
        PlaceholderRequest::new(ContentCategory::Character).with_size(400, 300)
    }

    #[tokio::test]
    async fn test_all_providers_failing_synthesizes_svg() {
        let prober = Arc::new(FailingProber::default());
        let (orchestrator, _) = orchestrator(test_config(), prober.clone());

        let result = orchestrator.generate_placeholder(character_request()).await;

        assert_eq!(result.service, SVG_FALLBACK_SERVICE);
        assert!(result.url.starts_with(SVG_DATA_URI_PREFIX));
        assert!(!result.cached);
        assert!(Bounds::new(-5.0, 5.0).contains(result.aesthetic.rotation));
        assert_eq!(prober.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_second_identical_request_is_cached() {
        let (orchestrator, _) = orchestrator(test_config(), Arc::new(FailingProber::default()));

        let first = orchestrator.generate_placeholder(character_request()).await;
        let second = orchestrator.generate_placeholder(character_request()).await;

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(second.url, first.url);
        assert_eq!(second.aesthetic, first.aesthetic);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_providers() {
        let prober = Arc::new(FailingProber::default());
        let (orchestrator, _) = orchestrator(test_config(), prober.clone());

        orchestrator.generate_placeholder(character_request()).await;
        orchestrator.generate_placeholder(character_request()).await;

        assert_eq!(prober.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_expired_entry_regenerates() {
        let (orchestrator, clock) = orchestrator(test_config(), Arc::new(FailingProber::default()));

        orchestrator.generate_placeholder(character_request()).await;
        clock.advance(TTL + 1);
        let again = orchestrator.generate_placeholder(character_request()).await;

        assert!(!again.cached);
    }

    #[tokio::test]
    async fn test_first_reachable_provider_wins() {
        let (orchestrator, _) = orchestrator(test_config(), Arc::new(SelectiveProber { marker: "beta" }));

        let result = orchestrator.generate_placeholder(character_request()).await;

        assert_eq!(result.service, "beta");
        assert_eq!(result.url, "https://beta.test/400/300");
        let fallback = result.fallback_url.expect("provider results carry a fallback");
        assert!(fallback.starts_with(SVG_DATA_URI_PREFIX));

        let cache = orchestrator.cache().read().await;
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_providers_are_skipped() {
        let mut config = test_config();
        config.services[1].enabled = false;
        let (orchestrator, _) = orchestrator(config, Arc::new(SelectiveProber { marker: "beta" }));

        let result = orchestrator.generate_placeholder(character_request()).await;
        assert_eq!(result.service, SVG_FALLBACK_SERVICE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_providers_time_out() {
        let (orchestrator, _) = orchestrator(test_config(), Arc::new(HangingProber));
        let start = tokio::time::Instant::now();

        let result = orchestrator.generate_placeholder(character_request()).await;

        assert_eq!(result.service, SVG_FALLBACK_SERVICE);
        assert!(start.elapsed() <= Duration::from_millis(3 * 5_000 + 100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_caller_still_populates_cache() {
        let prober = Arc::new(SlowProber {
            delay: Duration::from_secs(1),
        });
        let (orchestrator, _) = orchestrator(test_config(), prober);

        let abandoned = tokio::time::timeout(
            Duration::from_millis(100),
            orchestrator.generate_placeholder(character_request()),
        )
        .await;
        assert!(abandoned.is_err(), "caller should give up before the provider answers");

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(orchestrator.cache().read().await.len(), 1);

        let again = orchestrator.generate_placeholder(character_request()).await;
        assert!(again.cached);
        assert_eq!(again.service, "alpha");
    }

    #[tokio::test]
    async fn test_panic_yields_uncached_emergency_fallback() {
        let (orchestrator, _) = orchestrator(test_config(), Arc::new(PanickingProber));

        let result = orchestrator.generate_placeholder(character_request()).await;

        assert_eq!(result.service, EMERGENCY_FALLBACK_SERVICE);
        assert!(result.url.starts_with(SVG_DATA_URI_PREFIX));
        assert!(orchestrator.cache().read().await.is_empty());
    }

    #[tokio::test]
    async fn test_synthesis_error_yields_static_emergency_card() {
        let mut config = test_config();
        config.svg.paper_colors.clear();
        let (orchestrator, _) = orchestrator(config, Arc::new(FailingProber::default()));

        let result = orchestrator.generate_placeholder(character_request()).await;

        assert_eq!(result.service, EMERGENCY_FALLBACK_SERVICE);
        assert_eq!(result.url, to_data_uri(STATIC_FALLBACK_SVG));
        assert!(orchestrator.cache().read().await.is_empty());
    }

    #[tokio::test]
    async fn test_no_enabled_providers_synthesizes() {
        let mut config = test_config();
        config.services.clear();
        let (orchestrator, _) = orchestrator(config, Arc::new(FailingProber::default()));

        let result = orchestrator.generate_placeholder(character_request()).await;
        assert_eq!(result.service, SVG_FALLBACK_SERVICE);
    }

    #[tokio::test]
    async fn test_preload_common_fills_cache() {
        let (orchestrator, _) = orchestrator(test_config(), Arc::new(FailingProber::default()));

        orchestrator.preload_common().await;

        assert_eq!(orchestrator.cache().read().await.len(), COMMON_PRESETS.len());
        let warmed = orchestrator.generate_placeholder(character_request()).await;
        assert!(warmed.cached);
    }
}
