//! Notification subscribers that render prompts and call the completion
//! service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::descriptor::ClassDescriptor;
use crate::error::Result;
use crate::llm::{ChatClient, ChatMessage};
use crate::pipeline::{ClassNotification, ClassSubscriber};
use crate::sink::{DocRecord, DocumentationSink};
use crate::templates::{PromptEngine, PromptKind};

/// Processing states of one documentation run, surfaced in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AgentState {
    Received,
    Rendered,
    Sent,
    AwaitingResponse,
    Completed,
    Failed,
}

impl AgentState {
    fn as_str(self) -> &'static str {
        match self {
            AgentState::Received => "received",
            AgentState::Rendered => "rendered",
            AgentState::Sent => "sent",
            AgentState::AwaitingResponse => "awaiting-response",
            AgentState::Completed => "completed",
            AgentState::Failed => "failed",
        }
    }
}

/// Documents one class per notification.
///
/// Rendering is two-stage: the descriptor becomes preprocessed class/method
/// info text, which the method-instruction template wraps into the final
/// prompt. The prompt is sent as the user turn with the fixed
/// documentation instructions as the system turn, and the response is
/// stored in the sink keyed by fully-qualified class name.
pub struct DocumentationAgent {
    engine: Arc<PromptEngine>,
    client: Arc<dyn ChatClient>,
    sink: Arc<dyn DocumentationSink>,
    max_rounds: usize,
}

impl DocumentationAgent {
    pub fn new(
        engine: Arc<PromptEngine>,
        client: Arc<dyn ChatClient>,
        sink: Arc<dyn DocumentationSink>,
        max_rounds: usize,
    ) -> Self {
        Self {
            engine,
            client,
            sink,
            max_rounds,
        }
    }

    async fn run(&self, descriptor: &ClassDescriptor) -> Result<()> {
        self.trace(descriptor, AgentState::Received);

        let class_info = self.engine.render(PromptKind::ClassInfo, descriptor)?;
        let prompt = self.engine.render(
            PromptKind::MethodInstruction,
            &json!({ "preprocessed_method_info": class_info }),
        )?;
        self.trace(descriptor, AgentState::Rendered);

        let messages = [
            ChatMessage::system(self.engine.instructions(PromptKind::DocumentationInstruction)),
            ChatMessage::user(prompt),
        ];
        self.trace(descriptor, AgentState::Sent);

        self.trace(descriptor, AgentState::AwaitingResponse);
        let replies = self.client.complete(&messages, self.max_rounds).await?;
        let content = replies
            .iter()
            .map(|reply| reply.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        self.sink
            .store(DocRecord::new(&descriptor.class_name, self.name(), content))
            .await?;
        info!(class = %descriptor.class_name, state = AgentState::Completed.as_str(), "documentation stored");
        Ok(())
    }

    fn trace(&self, descriptor: &ClassDescriptor, state: AgentState) {
        debug!(class = %descriptor.class_name, state = state.as_str(), "documentation run");
    }
}

#[async_trait]
impl ClassSubscriber for DocumentationAgent {
    fn name(&self) -> &'static str {
        "documentation"
    }

    async fn notify(&self, notification: &ClassNotification) -> Result<()> {
        match self.run(&notification.descriptor).await {
            Ok(()) => Ok(()),
            Err(err) => {
                debug!(
                    class = %notification.descriptor.class_name,
                    state = AgentState::Failed.as_str(),
                    "documentation run"
                );
                Err(err)
            }
        }
    }
}

/// Sends the reconstructed class source for structural analysis.
///
/// Classes whose source could not be reconstructed are skipped; missing
/// source text degrades the pass, it never fails it.
pub struct AnalysisAgent {
    engine: Arc<PromptEngine>,
    client: Arc<dyn ChatClient>,
    sink: Arc<dyn DocumentationSink>,
    max_rounds: usize,
}

impl AnalysisAgent {
    pub fn new(
        engine: Arc<PromptEngine>,
        client: Arc<dyn ChatClient>,
        sink: Arc<dyn DocumentationSink>,
        max_rounds: usize,
    ) -> Self {
        Self {
            engine,
            client,
            sink,
            max_rounds,
        }
    }
}

#[async_trait]
impl ClassSubscriber for AnalysisAgent {
    fn name(&self) -> &'static str {
        "analysis"
    }

    async fn notify(&self, notification: &ClassNotification) -> Result<()> {
        let descriptor = &notification.descriptor;
        let Some(source) = descriptor.source_code.as_deref() else {
            debug!(class = %descriptor.class_name, "no reconstructed source, skipping analysis");
            return Ok(());
        };

        let messages = [
            ChatMessage::system(self.engine.instructions(PromptKind::AnalysisInstruction)),
            ChatMessage::user(source),
        ];
        let replies = self.client.complete(&messages, self.max_rounds).await?;
        let content = replies
            .iter()
            .map(|reply| reply.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        self.sink
            .store(DocRecord::new(&descriptor.class_name, self.name(), content))
            .await?;
        info!(class = %descriptor.class_name, "analysis stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::descriptor::MethodDescriptor;
    use crate::error::AsmDocError;
    use crate::sink::MemoryDocStore;

    /// Records the messages it was sent and replies with canned text.
    struct MockChatClient {
        calls: AtomicUsize,
        last_messages: Mutex<Vec<ChatMessage>>,
        fail: bool,
    }

    impl MockChatClient {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last_messages: Mutex::new(Vec::new()),
                fail,
            })
        }
    }

    #[async_trait]
    impl ChatClient for MockChatClient {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            _max_rounds: usize,
        ) -> Result<Vec<ChatMessage>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_messages.lock().unwrap() = messages.to_vec();
            if self.fail {
                return Err(AsmDocError::Completion("service unavailable".into()));
            }
            Ok(vec![ChatMessage::assistant("generated documentation")])
        }

        fn model_name(&self) -> &str {
            "mock"
        }

        fn provider_name(&self) -> &str {
            "Mock"
        }
    }

    fn notification(source_code: Option<&str>) -> ClassNotification {
        ClassNotification {
            descriptor: ClassDescriptor {
                assembly: "App".into(),
                name: "Foo".into(),
                class_name: "App.Foo".into(),
                methods: vec![MethodDescriptor {
                    name: "Bar".into(),
                    method_name: "App.Foo.Bar".into(),
                    source_code: Some("void Bar() {}".into()),
                }],
                parent_type: None,
                source_code: source_code.map(String::from),
            },
        }
    }

    fn engine() -> Arc<PromptEngine> {
        Arc::new(PromptEngine::new().unwrap())
    }

    #[tokio::test]
    async fn test_documentation_agent_stores_response() {
        let client = MockChatClient::new(false);
        let store = Arc::new(MemoryDocStore::new());
        let agent = DocumentationAgent::new(engine(), client.clone(), store.clone(), 3);

        agent.notify(&notification(Some("class Foo {}"))).await.unwrap();

        let records = store.records_for("App.Foo").await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].agent, "documentation");
        assert_eq!(records[0].content, "generated documentation");

        let sent = client.last_messages.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].role, crate::llm::Role::System);
        assert!(sent[0].content.contains("technical writer"));
        assert!(sent[1].content.contains("App.Foo.Bar"));
    }

    #[tokio::test]
    async fn test_documentation_agent_propagates_completion_failure() {
        let client = MockChatClient::new(true);
        let store = Arc::new(MemoryDocStore::new());
        let agent = DocumentationAgent::new(engine(), client, store.clone(), 3);

        let outcome = agent.notify(&notification(Some("class Foo {}"))).await;
        assert!(matches!(outcome, Err(AsmDocError::Completion(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_analysis_agent_skips_missing_source() {
        let client = MockChatClient::new(false);
        let store = Arc::new(MemoryDocStore::new());
        let agent = AnalysisAgent::new(engine(), client.clone(), store.clone(), 3);

        agent.notify(&notification(None)).await.unwrap();

        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_analysis_agent_sends_class_source() {
        let client = MockChatClient::new(false);
        let store = Arc::new(MemoryDocStore::new());
        let agent = AnalysisAgent::new(engine(), client.clone(), store.clone(), 3);

        agent
            .notify(&notification(Some("class Foo { void Bar() {} }")))
            .await
            .unwrap();

        let sent = client.last_messages.lock().unwrap();
        assert_eq!(sent[1].content, "class Foo { void Bar() {} }");
        assert_eq!(store.records_for("App.Foo").await[0].agent, "analysis");
    }
}
