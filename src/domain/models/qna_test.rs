use super::QnaLog;

#[test]
fn it_appends_entries_in_ask_order() {
    let mut log = QnaLog::default();
    let first = log.ask("What is in the handbook?", "llama3.2:1b");
    let second = log.ask("Summarize chapter two.", "llama3.2:1b");

    assert_eq!(log.entries().len(), 2);
    assert_eq!(log.entries()[0].id, first);
    assert_eq!(log.entries()[1].id, second);
    assert_eq!(log.entries()[0].answer, "");
}

#[test]
fn it_accumulates_answer_deltas() {
    let mut log = QnaLog::default();
    let id = log.ask("What is in the handbook?", "llama3.2:1b");

    log.append_answer(&id, "Hello");
    log.append_answer(&id, " world");

    assert_eq!(log.get(&id).unwrap().answer, "Hello world");
}

#[test]
fn it_replaces_partial_answers() {
    let mut log = QnaLog::default();
    let id = log.ask("What is in the handbook?", "llama3.2:1b");
    log.append_answer(&id, "partial");

    log.replace_answer(&id, "Hello world");

    assert_eq!(log.get(&id).unwrap().answer, "Hello world");
}

#[test]
fn it_ignores_unknown_entry_ids() {
    let mut log = QnaLog::default();
    let id = log.ask("What is in the handbook?", "llama3.2:1b");

    log.append_answer("does-not-exist", "lost");
    log.replace_answer("does-not-exist", "lost");
    log.fail_answer("does-not-exist", "lost");

    assert_eq!(log.get(&id).unwrap().answer, "");
    assert_eq!(log.entries().len(), 1);
}

#[test]
fn it_fails_answers_with_marker() {
    let mut log = QnaLog::default();
    let id = log.ask("What is in the handbook?", "llama3.2:1b");
    log.append_answer(&id, "partial");

    log.fail_answer(&id, "API error: could not reach the backend.");

    let entry = log.get(&id).unwrap();
    assert!(entry.answer.starts_with("❌ "));
    assert_eq!(entry.question, "What is in the handbook?");
}
