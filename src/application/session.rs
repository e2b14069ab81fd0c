#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::ChatRequest;
use crate::domain::models::ConversationSet;
use crate::domain::models::QnaLog;
use crate::domain::models::StreamEvent;
use crate::domain::models::WireMessage;
use crate::domain::services::HealthMonitor;
use crate::infrastructure::api::ApiClient;
use crate::infrastructure::api::FileDocument;
use crate::infrastructure::backends::Hosted;
use crate::infrastructure::backends::Local;

/// One conversational surface: a backend plus the conversation set it feeds.
/// Each surface owns its state exclusively; nothing is shared across
/// surfaces.
pub struct ChatSurface<B: Backend> {
    backend: B,
    pub conversations: ConversationSet,
    new_conversation_title: String,
    default_model: String,
    busy: bool,
}

impl<B: Backend> ChatSurface<B> {
    pub fn new(backend: B, new_conversation_title: &str, default_model: &str) -> ChatSurface<B> {
        return ChatSurface {
            backend,
            conversations: ConversationSet::default(),
            new_conversation_title: new_conversation_title.to_string(),
            default_model: default_model.to_string(),
            busy: false,
        };
    }

    /// Whether a send is in flight. The compose box is re-enabled when this
    /// drops back to false, which happens on completion and failure alike.
    pub fn is_busy(&self) -> bool {
        return self.busy;
    }

    pub fn default_model(&self) -> &str {
        return &self.default_model;
    }

    pub fn set_default_model(&mut self, model: &str) {
        self.default_model = model.to_string();
    }

    pub fn new_conversation(&mut self) -> String {
        let title = self.new_conversation_title.clone();
        let model = self.default_model.clone();
        return self.conversations.create_conversation(&title, &model);
    }

    /// Switches the active conversation. Streams already in flight keep
    /// writing to their own message regardless of the selection.
    pub fn select_conversation(&mut self, id: &str) -> bool {
        return self.conversations.set_active(id);
    }

    /// Sends one user message on the active conversation, creating a
    /// conversation on first use. The user message and the empty assistant
    /// placeholder are appended before the transport opens, so the UI has a
    /// stable target before any bytes arrive. Deltas are folded into the
    /// placeholder by id, so the stream keeps writing to its own message
    /// even if the user switches conversations mid-flight.
    pub async fn send(&mut self, text: &str) -> Result<()> {
        if self.busy || text.trim().is_empty() {
            return Ok(());
        }

        if self.conversations.active_id().is_none() {
            self.new_conversation();
        }

        // Unwraps are guarded by the create above; the active conversation
        // cannot disappear between these statements.
        let conversation_id = self.conversations.active_id().unwrap().to_string();
        let model = self.conversations.get(&conversation_id).unwrap().model.clone();

        let _ = self.conversations.push_user(&conversation_id, text);
        let history = self
            .conversations
            .get(&conversation_id)
            .unwrap()
            .messages
            .iter()
            .map(|msg| {
                return WireMessage {
                    role: msg.role,
                    content: msg.content.clone(),
                };
            })
            .collect::<Vec<WireMessage>>();
        let message_id = self
            .conversations
            .push_assistant_placeholder(&conversation_id, &model)
            .unwrap();

        self.busy = true;

        let (tx, mut rx) = mpsc::unbounded_channel::<StreamEvent>();
        let backend = &self.backend;
        let conversations = &mut self.conversations;

        let request = ChatRequest {
            model,
            messages: history,
        };
        let stream = async move {
            let res = backend.get_completion(request, &tx).await;
            drop(tx);
            return res;
        };
        let fold = async {
            while let Some(event) = rx.recv().await {
                match event {
                    StreamEvent::Delta { text, model } => {
                        conversations.mutate_message_content(
                            &conversation_id,
                            message_id,
                            |content| return content.push_str(&text),
                        );
                        if let Some(model) = model {
                            conversations.note_message_model(
                                &conversation_id,
                                message_id,
                                &model,
                            );
                        }
                    }
                    StreamEvent::Replace { text, model } => {
                        conversations.mutate_message_content(
                            &conversation_id,
                            message_id,
                            |content| {
                                content.clear();
                                content.push_str(&text);
                            },
                        );
                        if let Some(model) = model {
                            conversations.note_message_model(
                                &conversation_id,
                                message_id,
                                &model,
                            );
                        }
                    }
                    StreamEvent::Completed => {}
                    StreamEvent::Failed(err) => {
                        conversations.fail_message(
                            &conversation_id,
                            message_id,
                            &format!("API error: {err}"),
                        );
                    }
                }
            }
        };

        let (res, _) = tokio::join!(stream, fold);
        self.busy = false;

        return res;
    }
}

/// The document Q&A surface: a flat question/answer log instead of
/// conversations, against the local backend's Q&A route.
pub struct QnaSurface {
    backend: Local,
    pub log: QnaLog,
    default_model: String,
    busy: bool,
}

impl QnaSurface {
    pub fn new(backend: Local, default_model: &str) -> QnaSurface {
        return QnaSurface {
            backend,
            log: QnaLog::default(),
            default_model: default_model.to_string(),
            busy: false,
        };
    }

    pub fn is_busy(&self) -> bool {
        return self.busy;
    }

    pub fn set_default_model(&mut self, model: &str) {
        self.default_model = model.to_string();
    }

    pub async fn ask(&mut self, question: &str) -> Result<()> {
        if self.busy || question.trim().is_empty() {
            return Ok(());
        }

        let model = self.default_model.clone();
        let entry_id = self.log.ask(question, &model);

        self.busy = true;

        let (tx, mut rx) = mpsc::unbounded_channel::<StreamEvent>();
        let backend = &self.backend;
        let log = &mut self.log;
        let question = question.to_string();

        let stream = async move {
            let res = backend.get_answer(&question, &model, &tx).await;
            drop(tx);
            return res;
        };
        let fold = async {
            while let Some(event) = rx.recv().await {
                match event {
                    StreamEvent::Delta { text, .. } => log.append_answer(&entry_id, &text),
                    StreamEvent::Replace { text, .. } => log.replace_answer(&entry_id, &text),
                    StreamEvent::Completed => {}
                    StreamEvent::Failed(err) => {
                        log.fail_answer(&entry_id, &format!("API error: {err}"));
                    }
                }
            }
        };

        let (res, _) = tokio::join!(stream, fold);
        self.busy = false;

        return res;
    }
}

/// Top level owner of all session state: the three surfaces, the document
/// cache, the health monitor, and the models-loaded-once guard. Explicit
/// rather than ambient so tests can construct isolated sessions.
pub struct SessionContext {
    pub local: ChatSurface<Local>,
    pub hosted: ChatSurface<Hosted>,
    pub qna: QnaSurface,
    pub documents: Vec<FileDocument>,
    client: ApiClient,
    health: HealthMonitor,
    models: Vec<String>,
    models_loaded: bool,
}

impl Default for SessionContext {
    fn default() -> SessionContext {
        return SessionContext::with_client(ApiClient::default());
    }
}

impl SessionContext {
    pub fn with_client(client: ApiClient) -> SessionContext {
        let local_model = Config::get(ConfigKey::DefaultLocalModel);
        let hosted_model = Config::get(ConfigKey::DefaultHostedModel);

        return SessionContext {
            local: ChatSurface::new(
                Local::with_client(client.clone()),
                "New chat",
                &local_model,
            ),
            hosted: ChatSurface::new(
                Hosted::with_client(client.clone()),
                "New online chat",
                &hosted_model,
            ),
            qna: QnaSurface::new(Local::with_client(client.clone()), &local_model),
            documents: vec![],
            health: HealthMonitor::new(client.clone()),
            client,
            models: vec![],
            models_loaded: false,
        };
    }

    pub fn health(&self) -> &HealthMonitor {
        return &self.health;
    }

    pub fn models(&self) -> &[String] {
        return &self.models;
    }

    /// Fetches the local model list at most once per session. When no
    /// default local model is configured, the first listed model becomes the
    /// default for the local and Q&A surfaces.
    pub async fn load_models_once(&mut self) -> Result<&[String]> {
        if self.models_loaded {
            return Ok(&self.models);
        }

        let models = self.client.list_models().await?;
        self.models_loaded = true;

        if self.local.default_model().is_empty() {
            if let Some(first) = models.first() {
                self.local.set_default_model(first);
                self.qna.set_default_model(first);
            }
        }

        self.models = models;
        return Ok(&self.models);
    }

    pub async fn refresh_documents(&mut self) -> Result<()> {
        self.documents = self.client.list_files().await?;
        return Ok(());
    }

    /// Deletes a document server side, then drops it from the cache.
    pub async fn delete_document(&mut self, id: &str) -> Result<bool> {
        let deleted = self.client.delete_file(id).await?;
        if deleted {
            self.documents.retain(|doc| return doc.id != id);
        }
        return Ok(deleted);
    }
}
