#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::Local;
use uuid::Uuid;

use super::Message;
use super::Role;

pub fn create_id() -> String {
    return Uuid::new_v4()
        .to_string()
        .split('-')
        .enumerate()
        .filter_map(|(idx, str)| {
            if idx > 1 {
                return None;
            }
            return Some(str);
        })
        .collect::<Vec<&str>>()
        .join("-");
}

pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub model: String,
    pub created_at: DateTime<Local>,
    next_message_id: u64,
}

impl Conversation {
    pub fn new(title: &str, model: &str) -> Conversation {
        return Conversation {
            id: create_id(),
            title: title.to_string(),
            messages: vec![],
            model: model.to_string(),
            created_at: Local::now(),
            next_message_id: 1,
        };
    }

    /// Appends a message, assigning it the next id. Messages are never
    /// reordered or removed.
    pub fn push(&mut self, mut message: Message) -> u64 {
        let id = self.next_message_id;
        self.next_message_id += 1;
        message.id = id;
        self.messages.push(message);
        return id;
    }

    fn message_mut(&mut self, message_id: u64) -> Option<&mut Message> {
        return self
            .messages
            .iter_mut()
            .find(|msg| return msg.id == message_id);
    }
}

/// Ordered collection of conversations, newest first, with at most one
/// active selection. Mutations targeting unknown ids are no-ops so a stream
/// can keep applying deltas after the user replaces or navigates away from
/// its conversation.
#[derive(Default)]
pub struct ConversationSet {
    conversations: Vec<Conversation>,
    active_id: Option<String>,
}

impl ConversationSet {
    pub fn create_conversation(&mut self, title: &str, model: &str) -> String {
        let conversation = Conversation::new(title, model);
        let id = conversation.id.clone();
        self.conversations.insert(0, conversation);
        self.active_id = Some(id.clone());
        return id;
    }

    pub fn conversations(&self) -> &[Conversation] {
        return &self.conversations;
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        return self.conversations.iter().find(|conv| return conv.id == id);
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        return self
            .conversations
            .iter_mut()
            .find(|conv| return conv.id == id);
    }

    pub fn active_id(&self) -> Option<&str> {
        return self.active_id.as_deref();
    }

    pub fn active(&self) -> Option<&Conversation> {
        let id = self.active_id.clone()?;
        return self.get(&id);
    }

    /// Selects a conversation. Selection is unconstrained by loading state,
    /// but an unknown id leaves the current selection in place.
    pub fn set_active(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }

        self.active_id = Some(id.to_string());
        return true;
    }

    /// Appends to the named conversation, returning the assigned message id.
    /// A no-op returning `None` when the conversation is gone.
    pub fn append_message(&mut self, conversation_id: &str, message: Message) -> Option<u64> {
        let conversation = self.get_mut(conversation_id)?;
        return Some(conversation.push(message));
    }

    pub fn push_user(&mut self, conversation_id: &str, content: &str) -> Option<u64> {
        return self.append_message(conversation_id, Message::new(Role::User, content));
    }

    /// Creates the empty assistant message a stream accumulates into, before
    /// any bytes arrive.
    pub fn push_assistant_placeholder(&mut self, conversation_id: &str, model: &str) -> Option<u64> {
        return self.append_message(
            conversation_id,
            Message::new(Role::Assistant, "").with_model(model),
        );
    }

    /// Applies a transformation to one message's content in place. A no-op
    /// when either id is unknown. Deltas for one message are applied in call
    /// order, nothing here reorders them.
    pub fn mutate_message_content(
        &mut self,
        conversation_id: &str,
        message_id: u64,
        f: impl FnOnce(&mut String),
    ) {
        if let Some(conversation) = self.get_mut(conversation_id) {
            if let Some(message) = conversation.message_mut(message_id) {
                f(&mut message.content);
            }
        }
    }

    /// Records the model echo a backend attaches to its chunks, for display
    /// next to the message. Only fills the field when it is still unset.
    pub fn note_message_model(&mut self, conversation_id: &str, message_id: u64, model: &str) {
        if let Some(conversation) = self.get_mut(conversation_id) {
            if let Some(message) = conversation.message_mut(message_id) {
                if message.model.is_none() && !model.is_empty() {
                    message.model = Some(model.to_string());
                }
            }
        }
    }

    /// Turns a message into the user visible rendering of a stream failure.
    pub fn fail_message(&mut self, conversation_id: &str, message_id: u64, reason: &str) {
        if let Some(conversation) = self.get_mut(conversation_id) {
            if let Some(message) = conversation.message_mut(message_id) {
                message.set_error(reason);
            }
        }
    }
}
