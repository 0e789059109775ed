//! Scripted stand-in for the agent backends

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use storyforge_orchestrator::{AgentCapability, AgentOutput, InvocationError, Specialist};

pub const RESEARCH: &str = "Mars has a thin CO2 atmosphere and two small moons.";
pub const IMAGE_PROMPT: &str = "A glass habitat dome on red dunes under Phobos";
pub const STORY_PROMPT: &str = "A botanist's first harvest on Mars";
pub const IMAGE: &str = "https://images.example/mars.png";
pub const STORY: &str = "The first tomato ripened on sol 212.";

#[derive(Clone)]
struct Script {
    output: Result<AgentOutput, String>,
    delay: Duration,
}

/// Per-specialist canned replies, delays and failures with call recording
pub struct StubCapability {
    scripts: HashMap<Specialist, Script>,
    calls: Mutex<Vec<(Specialist, String)>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl StubCapability {
    /// Every specialist succeeds immediately
    pub fn happy() -> Self {
        let mut scripts = HashMap::new();
        let mut script = |specialist, output| {
            scripts.insert(
                specialist,
                Script {
                    output: Ok(output),
                    delay: Duration::ZERO,
                },
            );
        };

        script(Specialist::Researcher, AgentOutput::Text(RESEARCH.to_string()));
        script(
            Specialist::PromptGenerator,
            AgentOutput::Structured(json!({
                "image_prompt": IMAGE_PROMPT,
                "story_prompt": STORY_PROMPT,
            })),
        );
        script(Specialist::Artist, AgentOutput::Text(IMAGE.to_string()));
        script(Specialist::Writer, AgentOutput::Text(STORY.to_string()));

        Self {
            scripts,
            calls: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, specialist: Specialist, delay: Duration) -> Self {
        if let Some(script) = self.scripts.get_mut(&specialist) {
            script.delay = delay;
        }
        self
    }

    pub fn with_output(mut self, specialist: Specialist, output: AgentOutput) -> Self {
        if let Some(script) = self.scripts.get_mut(&specialist) {
            script.output = Ok(output);
        }
        self
    }

    pub fn failing(mut self, specialist: Specialist, message: &str) -> Self {
        if let Some(script) = self.scripts.get_mut(&specialist) {
            script.output = Err(message.to_string());
        }
        self
    }

    pub fn calls(&self) -> Vec<(Specialist, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, specialist: Specialist) -> usize {
        self.calls().iter().filter(|(s, _)| *s == specialist).count()
    }

    /// Highest number of invocations in flight at once
    pub fn max_concurrency(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentCapability for StubCapability {
    async fn invoke(&self, specialist: Specialist, input: &str) -> Result<AgentOutput, InvocationError> {
        self.calls.lock().unwrap().push((specialist, input.to_string()));
        let script = self.scripts[&specialist].clone();

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(script.delay).await;
        self.active.fetch_sub(1, Ordering::SeqCst);

        script.output.map_err(InvocationError::Other)
    }
}
