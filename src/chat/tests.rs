use super::*;
use crate::index::ChunkMetadata;
use crate::llm::ChatRole;

fn hit(content: &str) -> SearchResult {
    SearchResult {
        chunk: ChunkMetadata {
            source_file: "notes.txt".to_string(),
            page: None,
            chunk_index: 0,
            content: content.to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        },
        similarity_score: 0.9,
        distance: 0.1,
    }
}

fn turns(count: usize) -> Vec<ConversationTurn> {
    (0..count)
        .map(|i| {
            if i % 2 == 0 {
                ConversationTurn::user(format!("question {}", i))
            } else {
                ConversationTurn::assistant(format!("answer {}", i))
            }
        })
        .collect()
}

#[test]
fn window_keeps_last_turns() {
    let history = turns(8);

    let windowed = window_history(&history, 5);
    assert_eq!(windowed.len(), 5);
    assert_eq!(windowed[0].text, "answer 3");
    assert_eq!(windowed[4].text, "answer 7");
}

#[test]
fn window_of_short_history_is_whole_history() {
    let history = turns(3);
    assert_eq!(window_history(&history, 5).len(), 3);
    assert!(window_history(&[], 5).is_empty());
}

#[test]
fn answer_messages_contain_persona_context_and_question() {
    let context = vec![hit("Andrew's research is about knowledge representation.")];
    let messages = answer_messages(
        "You are a helpful guide.",
        &context,
        &[],
        5,
        "What is Andrew's research about?",
    );

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, ChatRole::System);
    assert!(messages[0].content.starts_with("You are a helpful guide."));
    assert!(messages[0].content.contains("CONTEXT:"));
    assert!(
        messages[0]
            .content
            .contains("Andrew's research is about knowledge representation.")
    );

    let last = messages.last().expect("should have messages");
    assert_eq!(last.role, ChatRole::User);
    assert_eq!(last.content, "What is Andrew's research about?");
}

#[test]
fn answer_messages_window_history() {
    let history = turns(8);
    let messages = answer_messages("persona", &[hit("context")], &history, 5, "next question");

    // system + 5 windowed turns + question
    assert_eq!(messages.len(), 7);
    assert_eq!(messages[1].content, "answer 3");
    assert_eq!(messages[5].content, "answer 7");
    assert_eq!(messages[6].content, "next question");
}

#[test]
fn answer_messages_join_multiple_chunks() {
    let context = vec![hit("first chunk"), hit("second chunk")];
    let messages = answer_messages("persona", &context, &[], 5, "q");

    assert!(messages[0].content.contains("first chunk\n\nsecond chunk"));
}

#[test]
fn rewrite_messages_carry_full_history() {
    let history = turns(8);
    let messages = rewrite_messages("and after that?", &history);

    // instruction + all 8 turns + question, unwindowed
    assert_eq!(messages.len(), 10);
    assert_eq!(messages[0].role, ChatRole::System);
    assert_eq!(messages[0].content, REWRITE_INSTRUCTION);
    assert_eq!(messages[1].content, "question 0");
    assert_eq!(messages[8].content, "answer 7");
    let last = messages.last().expect("should have messages");
    assert_eq!(last.content, "and after that?");
}

#[test]
fn turn_roles_map_to_chat_roles() {
    let history = vec![
        ConversationTurn::user("hello"),
        ConversationTurn::assistant("hi"),
    ];
    let messages = rewrite_messages("q", &history);

    assert_eq!(messages[1].role, ChatRole::User);
    assert_eq!(messages[2].role, ChatRole::Assistant);
}
