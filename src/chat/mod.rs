//! The answer pipeline: rewrite the question into standalone form, retrieve
//! the nearest chunks, generate an answer grounded in them. The three stages
//! are plain functions composed by ordinary calls; the embedding and
//! completion backends are trait objects so each stage can be exercised with
//! stubs.

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::Config;
use crate::embeddings::Embedder;
use crate::index::{SearchResult, VectorStore};
use crate::llm::{ChatMessage, CompletionModel};

/// Instruction for the standalone-question rewrite step.
pub const REWRITE_INSTRUCTION: &str = "Given a chat history and the latest user question \
which might reference context in the chat history, formulate a standalone question which \
can be understood without the chat history. Do NOT answer the question, just reformulate \
it if needed and otherwise return it as is.";

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Assistant,
}

/// One turn of the conversation. The ordered turn log is owned by the
/// caller; the core never stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ConversationTurn {
    #[inline]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    #[inline]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
        }
    }
}

/// Answers questions against a loaded index. Stateless per call apart from
/// the read-only index handle; conversation history is passed in by the
/// caller each turn.
pub struct Answerer<'a> {
    config: &'a Config,
    embedder: &'a dyn Embedder,
    model: &'a dyn CompletionModel,
    store: &'a VectorStore,
}

impl<'a> Answerer<'a> {
    #[inline]
    pub fn new(
        config: &'a Config,
        embedder: &'a dyn Embedder,
        model: &'a dyn CompletionModel,
        store: &'a VectorStore,
    ) -> Self {
        Self {
            config,
            embedder,
            model,
            store,
        }
    }

    /// Answer `question` given the prior conversation. Fails if retrieval or
    /// either model call fails; errors are not retried.
    #[inline]
    pub async fn answer(
        &self,
        question: &str,
        history: &[ConversationTurn],
    ) -> Result<String> {
        let standalone = self.rewrite(question, history)?;
        let context = self.retrieve(&standalone).await?;
        self.generate(question, &context, history)
    }

    /// Reformulate a follow-up question into standalone form using the raw
    /// conversation history. With no history the question is already
    /// standalone and the model is not consulted. The model's output is used
    /// verbatim.
    fn rewrite(&self, question: &str, history: &[ConversationTurn]) -> Result<String> {
        if history.is_empty() {
            return Ok(question.to_string());
        }

        let messages = rewrite_messages(question, history);
        let standalone = self
            .model
            .complete(&messages)
            .context("Failed to rewrite question into standalone form")?;

        debug!("Rewrote question {:?} into {:?}", question, standalone);
        Ok(standalone)
    }

    /// Embed the question with the index's embedding model and fetch the
    /// top-k nearest chunks. All k results are used; there is no relevance
    /// threshold.
    async fn retrieve(&self, question: &str) -> Result<Vec<SearchResult>> {
        let query_embedding = self
            .embedder
            .embed(question)
            .context("Failed to embed question")?;

        let results = self
            .store
            .search(&query_embedding, self.config.retrieval.top_k)
            .await?;

        debug!("Retrieved {} chunks for question", results.len());
        Ok(results)
    }

    /// Assemble the final prompt and invoke the completion model, returning
    /// its output verbatim.
    fn generate(
        &self,
        question: &str,
        context: &[SearchResult],
        history: &[ConversationTurn],
    ) -> Result<String> {
        let messages = answer_messages(
            &self.config.assistant.persona,
            context,
            history,
            self.config.assistant.history_window,
            question,
        );

        self.model
            .complete(&messages)
            .context("Failed to generate answer")
    }
}

/// Messages for the standalone-question rewrite: the rewrite instruction,
/// the raw full history, then the new question.
#[inline]
pub fn rewrite_messages(question: &str, history: &[ConversationTurn]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(REWRITE_INSTRUCTION));
    messages.extend(history.iter().map(turn_to_message));
    messages.push(ChatMessage::user(question));
    messages
}

/// Messages for answer generation: persona plus retrieved context as the
/// system message, the last `history_window` turns, then the question.
#[inline]
pub fn answer_messages(
    persona: &str,
    context: &[SearchResult],
    history: &[ConversationTurn],
    history_window: usize,
    question: &str,
) -> Vec<ChatMessage> {
    let mut system = String::from(persona);
    system.push_str("\n\nCONTEXT:\n");
    system.push_str(&format_context(context));

    let windowed = window_history(history, history_window);

    let mut messages = Vec::with_capacity(windowed.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(windowed.iter().map(turn_to_message));
    messages.push(ChatMessage::user(question));
    messages
}

/// The most recent `window` turns of the conversation.
#[inline]
pub fn window_history(history: &[ConversationTurn], window: usize) -> &[ConversationTurn] {
    let start = history.len().saturating_sub(window);
    &history[start..]
}

fn format_context(context: &[SearchResult]) -> String {
    context
        .iter()
        .map(|result| result.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn turn_to_message(turn: &ConversationTurn) -> ChatMessage {
    match turn.role {
        TurnRole::User => ChatMessage::user(turn.text.clone()),
        TurnRole::Assistant => ChatMessage::assistant(turn.text.clone()),
    }
}
