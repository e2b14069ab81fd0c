#[cfg(test)]
#[path = "qna_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::Local;

use super::conversation::create_id;
use super::ERROR_MARKER;

/// One question/answer pair on the document Q&A surface. The question is
/// immutable once asked; the answer accumulates streamed deltas the same way
/// an assistant message does.
pub struct QnaEntry {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub model: String,
    pub timestamp: DateTime<Local>,
}

/// Flat, append-only list of Q&A entries, oldest first.
#[derive(Default)]
pub struct QnaLog {
    entries: Vec<QnaEntry>,
}

impl QnaLog {
    pub fn ask(&mut self, question: &str, model: &str) -> String {
        let entry = QnaEntry {
            id: create_id(),
            question: question.to_string(),
            answer: "".to_string(),
            model: model.to_string(),
            timestamp: Local::now(),
        };
        let id = entry.id.clone();
        self.entries.push(entry);
        return id;
    }

    pub fn entries(&self) -> &[QnaEntry] {
        return &self.entries;
    }

    pub fn get(&self, id: &str) -> Option<&QnaEntry> {
        return self.entries.iter().find(|entry| return entry.id == id);
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut QnaEntry> {
        return self.entries.iter_mut().find(|entry| return entry.id == id);
    }

    /// No-op on unknown ids, mirroring the conversation store.
    pub fn append_answer(&mut self, id: &str, delta: &str) {
        if let Some(entry) = self.get_mut(id) {
            entry.answer += delta;
        }
    }

    /// Overwrites the accumulated answer with a whole-answer retry result.
    pub fn replace_answer(&mut self, id: &str, answer: &str) {
        if let Some(entry) = self.get_mut(id) {
            entry.answer = answer.to_string();
        }
    }

    pub fn fail_answer(&mut self, id: &str, reason: &str) {
        if let Some(entry) = self.get_mut(id) {
            entry.answer = format!("{ERROR_MARKER}{reason}");
        }
    }
}
