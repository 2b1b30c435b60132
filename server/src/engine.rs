use crate::{
    analytics::AnalyticsSimulator,
    code::CodeGenerator,
    config::AppConfig,
    error::{EngineError, SessionError},
    link::LinkAssembler,
    models::{LinkRequest, Shortened},
    random::RandomSource,
    session::{BeginSubmit, Phase, SessionState},
    validator,
};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

// ── Backend seam ───────────────────────────────────────────────────────────

/// Turns an accepted request into a link. The simulation below is the only
/// implementation today; a real shortening service would slot in here.
#[async_trait]
pub trait LinkBackend: Send + Sync {
    async fn shorten(&self, request: &LinkRequest, premium: bool)
        -> Result<Shortened, EngineError>;
}

/// Fake network round-trip followed by local code generation, link assembly
/// and, for premium sessions, analytics simulation.
pub struct SimulatedBackend {
    latency: Duration,
    codes: CodeGenerator,
    assembler: LinkAssembler,
    simulator: AnalyticsSimulator,
    rng: Arc<dyn RandomSource>,
}

impl SimulatedBackend {
    pub fn new(
        latency: Duration,
        codes: CodeGenerator,
        assembler: LinkAssembler,
        rng: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            latency,
            codes,
            assembler,
            simulator: AnalyticsSimulator,
            rng,
        }
    }

    pub fn from_config(config: &AppConfig, rng: Arc<dyn RandomSource>) -> Self {
        Self::new(
            config.submit_delay,
            CodeGenerator::with_length(config.code_length),
            LinkAssembler::new(&config.short_base_url, &config.qr_endpoint, config.qr_size),
            rng,
        )
    }
}

#[async_trait]
impl LinkBackend for SimulatedBackend {
    async fn shorten(
        &self,
        request: &LinkRequest,
        premium: bool,
    ) -> Result<Shortened, EngineError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let code = self
            .codes
            .generate(request.custom_alias.as_deref(), self.rng.as_ref());
        let link = self.assembler.assemble(&code, &request.raw_url);

        // A misconfigured short base would hand out unusable links.
        if !validator::validate(&link.short_url) {
            return Err(EngineError::Backend(format!(
                "assembled short URL {:?} is not an absolute URL",
                link.short_url
            )));
        }

        let analytics = premium.then(|| self.simulator.simulate(self.rng.as_ref()));

        Ok(Shortened { link, analytics })
    }
}

// ── Orchestration ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The submission ran to completion; the session is now in this phase.
    Completed(Phase),
    Rejected(SessionError),
    /// A submission was already in flight.
    Ignored,
    /// The session was reset before the result arrived.
    Discarded,
}

/// Drives one submission through a session without holding the session lock
/// across the backend call, so readers still observe `Submitting`.
#[derive(Clone)]
pub struct Engine {
    backend: Arc<dyn LinkBackend>,
    timeout: Duration,
}

impl Engine {
    pub fn new(backend: Arc<dyn LinkBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub async fn submit(&self, session: &Mutex<SessionState>, request: LinkRequest) -> SubmitOutcome {
        let submission = match session.lock().await.begin_submit(request) {
            BeginSubmit::Started(submission) => submission,
            BeginSubmit::Rejected(err) => return SubmitOutcome::Rejected(err),
            BeginSubmit::Busy => return SubmitOutcome::Ignored,
        };

        let call = self
            .backend
            .shorten(&submission.request, submission.premium);
        let outcome = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::Timeout(self.timeout)),
        };

        let mut state = session.lock().await;
        if state.complete_submit(&submission, outcome) {
            SubmitOutcome::Completed(state.phase())
        } else {
            SubmitOutcome::Discarded
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analytics::{COUNTRY_PROFILE, DEVICE_PROFILE},
        code::ALPHABET,
        random::SeededRandom,
        session::ResetPolicy,
    };

    struct FailingBackend;

    #[async_trait]
    impl LinkBackend for FailingBackend {
        async fn shorten(&self, _: &LinkRequest, _: bool) -> Result<Shortened, EngineError> {
            Err(EngineError::Backend("upstream unavailable".into()))
        }
    }

    fn simulated(latency: Duration) -> Arc<dyn LinkBackend> {
        Arc::new(SimulatedBackend::new(
            latency,
            CodeGenerator::new(),
            LinkAssembler::default(),
            Arc::new(SeededRandom::new(11)),
        ))
    }

    fn engine(latency: Duration) -> Engine {
        Engine::new(simulated(latency), Duration::from_secs(5))
    }

    fn request(url: &str, alias: Option<&str>) -> LinkRequest {
        LinkRequest {
            raw_url: url.to_owned(),
            custom_alias: alias.map(str::to_owned),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn plain_submission_succeeds_without_analytics() {
        let session = Mutex::new(SessionState::new());
        let outcome = engine(Duration::from_secs(1))
            .submit(&session, request("https://example.com/a/b", None))
            .await;

        assert_eq!(outcome, SubmitOutcome::Completed(Phase::Success));
        let state = session.lock().await;
        let link = state.link().expect("link present");
        let code = link
            .short_url
            .strip_prefix("https://short.ly/")
            .expect("short prefix");
        assert_eq!(code.len(), 6);
        assert!(code.bytes().all(|b| ALPHABET.contains(&b)));
        assert_eq!(link.original_url, "https://example.com/a/b");
        assert!(state.analytics().is_none());
        assert!(!state.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn alias_becomes_the_code() {
        let session = Mutex::new(SessionState::new());
        engine(Duration::from_secs(1))
            .submit(&session, request("https://a.com", Some("mylink")))
            .await;

        let state = session.lock().await;
        assert_eq!(
            state.link().map(|l| l.short_url.as_str()),
            Some("https://short.ly/mylink")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn premium_submission_carries_analytics() {
        let session = Mutex::new(SessionState::new());
        session.lock().await.upgrade_to_premium();
        engine(Duration::from_secs(1))
            .submit(&session, request("https://example.com", None))
            .await;

        let state = session.lock().await;
        let analytics = state.analytics().expect("premium analytics");
        assert_eq!(analytics.countries.len(), 4);
        assert_eq!(analytics.devices.len(), 3);
        assert!(analytics.total_clicks < 1000);
        for (entry, (name, bound)) in analytics.countries.iter().zip(COUNTRY_PROFILE) {
            assert_eq!(entry.name, name);
            assert!(entry.clicks < bound);
        }
        for (entry, (kind, bound)) in analytics.devices.iter().zip(DEVICE_PROFILE) {
            assert_eq!(entry.device_type, kind);
            assert!(entry.clicks < bound);
        }
    }

    #[tokio::test]
    async fn rejections_never_reach_the_backend() {
        let session = Mutex::new(SessionState::new());
        let engine = Engine::new(Arc::new(FailingBackend), Duration::from_secs(5));

        assert_eq!(
            engine.submit(&session, request("", None)).await,
            SubmitOutcome::Rejected(SessionError::EmptyInput)
        );
        assert_eq!(
            engine.submit(&session, request("not a url", None)).await,
            SubmitOutcome::Rejected(SessionError::InvalidUrl)
        );
        let state = session.lock().await;
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.link().is_none());
    }

    #[tokio::test]
    async fn backend_failure_becomes_generic_error() {
        let session = Mutex::new(SessionState::new());
        let engine = Engine::new(Arc::new(FailingBackend), Duration::from_secs(5));

        let outcome = engine.submit(&session, request("https://a.com", None)).await;
        assert_eq!(outcome, SubmitOutcome::Completed(Phase::Failed));
        let state = session.lock().await;
        assert_eq!(state.error(), Some(SessionError::AssemblyFailure));
        assert!(!state.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_times_out() {
        let session = Mutex::new(SessionState::new());
        let engine = Engine::new(simulated(Duration::from_secs(60)), Duration::from_secs(5));

        let outcome = engine.submit(&session, request("https://a.com", None)).await;
        assert_eq!(outcome, SubmitOutcome::Completed(Phase::Failed));
        assert_eq!(
            session.lock().await.error(),
            Some(SessionError::AssemblyFailure)
        );
    }

    #[tokio::test]
    async fn bad_short_base_fails_assembly() {
        let backend = SimulatedBackend::new(
            Duration::ZERO,
            CodeGenerator::new(),
            LinkAssembler::new("short.ly", "https://qr.example/", 200),
            Arc::new(SeededRandom::new(1)),
        );
        let session = Mutex::new(SessionState::new());
        let engine = Engine::new(Arc::new(backend), Duration::from_secs(5));

        let outcome = engine.submit(&session, request("https://a.com", None)).await;
        assert_eq!(outcome, SubmitOutcome::Completed(Phase::Failed));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_submit_is_ignored_and_reset_discards() {
        let session = Arc::new(Mutex::new(SessionState::new()));
        let engine = engine(Duration::from_secs(1));

        let first = {
            let engine = engine.clone();
            let session = session.clone();
            tokio::spawn(async move { engine.submit(&session, request("https://a.com", None)).await })
        };
        // Let the first submission reach its delay.
        while !session.lock().await.is_loading() {
            tokio::task::yield_now().await;
        }

        let second = engine
            .submit(&session, request("https://b.com", Some("other")))
            .await;
        assert_eq!(second, SubmitOutcome::Ignored);

        session.lock().await.reset(ResetPolicy::default());
        assert_eq!(first.await.expect("task joins"), SubmitOutcome::Discarded);

        let state = session.lock().await;
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.link().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn resubmission_replaces_link_and_regenerates_analytics() {
        let session = Mutex::new(SessionState::new());
        session.lock().await.upgrade_to_premium();
        let engine = engine(Duration::from_secs(1));

        engine.submit(&session, request("https://a.com", Some("one"))).await;
        let first = session.lock().await.analytics().cloned();
        engine.submit(&session, request("https://b.com", Some("two"))).await;

        let state = session.lock().await;
        assert_eq!(state.link().map(|l| l.code.as_str()), Some("two"));
        assert_eq!(state.link().map(|l| l.original_url.as_str()), Some("https://b.com"));
        assert!(first.is_some());
        assert_ne!(state.analytics().cloned(), first);
    }
}
