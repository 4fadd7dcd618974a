//! The generation gateway every summarization call goes through.
//!
//! Enforces a soft rate limit through a single shared last-call timestamp
//! (a leaky bucket of one, not an admission queue: two racing callers can
//! both compute a small remaining delay and fire close together) and strips
//! reasoning segments from tagged model output.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use regex::Regex;
use tokio::time::Instant;

use recap_domain::config::GenerationConfig;
use recap_domain::error::Result;
use recap_domain::trace::TraceEvent;

use crate::traits::{ChatTurn, GenerateRequest, Generator};

/// Floor on inter-call spacing regardless of the configured rate.
const MIN_DELAY_MS: u64 = 500;

pub struct GenerationGateway {
    generator: Arc<dyn Generator>,
    rate_per_minute: u32,
    max_tokens: u32,
    temperature: f32,
    last_call: Mutex<Option<Instant>>,
    reasoning_re: Regex,
}

impl GenerationGateway {
    pub fn new(generator: Arc<dyn Generator>, cfg: &GenerationConfig) -> Self {
        Self {
            generator,
            rate_per_minute: cfg.rate_per_minute.max(1),
            max_tokens: cfg.max_response_tokens,
            temperature: cfg.temperature,
            last_call: Mutex::new(None),
            // DeepSeek-style reasoning blocks; non-greedy, spans newlines.
            reasoning_re: Regex::new(r"(?is)<think(?:ing)?>.*?</think(?:ing)?>")
                .expect("reasoning regex is valid"),
        }
    }

    /// Minimum spacing between calls.
    fn required_delay(&self) -> Duration {
        let spaced = 60_000 / u64::from(self.rate_per_minute);
        Duration::from_millis(spaced.max(MIN_DELAY_MS))
    }

    /// Produce a summary for `content` under `system_prompt`.
    ///
    /// Waits out the remaining rate-limit delay, issues exactly one
    /// generator call, and returns the trimmed output with any tagged
    /// reasoning segments removed. All failures surface as errors; no
    /// partial output is returned.
    pub async fn generate(&self, content: &str, system_prompt: &str) -> Result<String> {
        let wait = {
            let last = self.last_call.lock();
            match *last {
                Some(at) => self.required_delay().saturating_sub(at.elapsed()),
                None => Duration::ZERO,
            }
        };
        if !wait.is_zero() {
            TraceEvent::RateLimitWait {
                wait_ms: wait.as_millis() as u64,
            }
            .emit();
            tokio::time::sleep(wait).await;
        }
        *self.last_call.lock() = Some(Instant::now());

        let req = GenerateRequest {
            messages: vec![ChatTurn::system(system_prompt), ChatTurn::user(content)],
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
            model: None,
        };

        let started = Instant::now();
        let resp = self.generator.complete(&req).await?;
        let text = self.strip_reasoning(&resp.content);

        TraceEvent::GenerationCall {
            model: resp.model,
            duration_ms: started.elapsed().as_millis() as u64,
            output_chars: text.len(),
        }
        .emit();

        Ok(text)
    }

    fn strip_reasoning(&self, raw: &str) -> String {
        self.reasoning_re.replace_all(raw, "").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recap_domain::error::Error;

    use crate::traits::{GenerateResponse, Generator};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedGenerator {
        reply: String,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Generator for CannedGenerator {
        async fn complete(&self, _req: &GenerateRequest) -> Result<GenerateResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(GenerateResponse {
                content: self.reply.clone(),
                model: "mock".into(),
            })
        }

        fn backend_id(&self) -> &str {
            "mock"
        }
    }

    struct FailingGenerator;

    #[async_trait::async_trait]
    impl Generator for FailingGenerator {
        async fn complete(&self, _req: &GenerateRequest) -> Result<GenerateResponse> {
            Err(Error::Generation("backend down".into()))
        }

        fn backend_id(&self) -> &str {
            "failing"
        }
    }

    fn gateway_with(reply: &str, rate_per_minute: u32) -> GenerationGateway {
        let cfg = GenerationConfig {
            rate_per_minute,
            ..Default::default()
        };
        GenerationGateway::new(
            Arc::new(CannedGenerator {
                reply: reply.into(),
                calls: AtomicUsize::new(0),
            }),
            &cfg,
        )
    }

    #[tokio::test]
    async fn strips_reasoning_and_trims() {
        let gw = gateway_with("<think>hmm, let me see</think>\n  the summary  ", 60);
        let out = gw.generate("content", "sys").await.unwrap();
        assert_eq!(out, "the summary");
    }

    #[tokio::test]
    async fn strips_thinking_variant() {
        let gw = gateway_with("<thinking>a\nb</thinking>ok", 60);
        assert_eq!(gw.generate("c", "s").await.unwrap(), "ok");
    }

    #[tokio::test(start_paused = true)]
    async fn second_call_waits_rate_delay() {
        let gw = gateway_with("x", 60); // 1 call/second
        let t0 = Instant::now();
        gw.generate("a", "s").await.unwrap();
        gw.generate("b", "s").await.unwrap();
        // Paused clock only advances through sleeps, so the elapsed time is
        // exactly the enforced spacing.
        assert!(t0.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn min_delay_floor_applies() {
        let gw = gateway_with("x", 100_000);
        assert_eq!(gw.required_delay(), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn generator_failure_propagates() {
        let cfg = GenerationConfig::default();
        let gw = GenerationGateway::new(Arc::new(FailingGenerator), &cfg);
        let err = gw.generate("a", "s").await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }
}
