//! Free-text Q&A over the memo dataset.

use std::collections::VecDeque;

use crate::clients::{Advisor, AdvisorRequest, ChatMessage};
use crate::error::{MemoBoardError, Result};
use crate::hypothesis::Hypothesis;
use crate::memo::InvestmentMemo;
use crate::recommendation::dataset_context;
use crate::verdict;

/// In-memory conversation; history is never persisted.
#[derive(Debug, Clone)]
pub struct ChatSession {
    history: VecDeque<ChatMessage>,
    max_turns: usize,
}

impl ChatSession {
    pub fn new(max_turns: usize) -> Self {
        Self {
            history: VecDeque::new(),
            max_turns,
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &ChatMessage> {
        self.history.iter()
    }

    /// Request for `question` with the full dataset as system context.
    pub fn build_request(
        &self,
        question: &str,
        memo: &InvestmentMemo,
        hypotheses: &[Hypothesis],
    ) -> AdvisorRequest {
        let report = verdict::evaluate(hypotheses);
        let mut messages: Vec<ChatMessage> = self.history.iter().cloned().collect();
        messages.push(ChatMessage::user(question));
        AdvisorRequest {
            system: dataset_context(memo, hypotheses, &report),
            messages,
        }
    }

    /// Ask a question. On failure the history is left untouched.
    pub async fn ask(
        &mut self,
        advisor: &dyn Advisor,
        question: &str,
        memo: &InvestmentMemo,
        hypotheses: &[Hypothesis],
    ) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(MemoBoardError::InvalidParams {
                message: "question must not be empty".to_string(),
            });
        }

        let request = self.build_request(question, memo, hypotheses);
        let reply = advisor.complete(&request).await?;

        self.history.push_back(ChatMessage::user(question));
        self.history.push_back(ChatMessage::assistant(reply.text.clone()));
        while self.history.len() > self.max_turns * 2 {
            self.history.pop_front();
        }
        Ok(reply.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{AdvisorError, AdvisorReply, Role};
    use crate::memo::investment_memo;
    use crate::template::template;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl Advisor for Echo {
        fn provider(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            request: &AdvisorRequest,
        ) -> std::result::Result<AdvisorReply, AdvisorError> {
            let last = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(AdvisorReply {
                text: format!("echo: {} ({} msgs)", last, request.messages.len()),
                provider: "echo".into(),
                model: "echo-1".into(),
            })
        }
    }

    struct Down;

    #[async_trait]
    impl Advisor for Down {
        fn provider(&self) -> &str {
            "down"
        }

        async fn complete(
            &self,
            _request: &AdvisorRequest,
        ) -> std::result::Result<AdvisorReply, AdvisorError> {
            Err(AdvisorError::Http("HTTP 503".into()))
        }
    }

    #[tokio::test]
    async fn history_accumulates_and_is_bounded() {
        let mut chat = ChatSession::new(2);
        let hs = template();
        for q in ["a", "b", "c"] {
            chat.ask(&Echo, q, investment_memo(), &hs).await.unwrap();
        }
        let history: Vec<_> = chat.history().collect();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].content, "b");
        assert_eq!(history[0].role, Role::User);

        let answer = chat.ask(&Echo, "d", investment_memo(), &hs).await.unwrap();
        assert_eq!(answer, "echo: d (5 msgs)");
    }

    #[tokio::test]
    async fn failure_leaves_history_untouched() {
        let mut chat = ChatSession::new(5);
        let err = chat
            .ask(&Down, "why?", investment_memo(), &template())
            .await
            .unwrap_err();
        assert!(err.is_advisor_failure());
        assert_eq!(chat.history().count(), 0);
    }

    #[tokio::test]
    async fn blank_question_rejected() {
        let mut chat = ChatSession::new(5);
        let err = chat.ask(&Echo, "   ", investment_memo(), &template()).await.unwrap_err();
        assert!(matches!(err, MemoBoardError::InvalidParams { .. }));
    }
}
