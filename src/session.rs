//! Run-scoped conversation log.
//!
//! [`Session`] keeps every prompt and reply of a run in order. Turns must
//! alternate user → assistant → user …, starting with a user turn. The log
//! can only grow; there is no way to remove or edit a turn.
//!
//! The whole history is kept, not just the latest exchange, so a follow-up
//! request (e.g. "revise the draft given this feedback") can be built from
//! [`Session::request_messages`].

use anyhow::{bail, Result};

use crate::models::{PromptTurn, Role};

#[derive(Debug, Clone, Default)]
pub struct Session {
    turns: Vec<PromptTurn>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one turn, enforcing strict alternation.
    ///
    /// Fails, leaving the log unchanged, if the first turn is not a user
    /// turn or if `role` repeats the role of the previous turn.
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> Result<()> {
        match (self.turns.last().map(|t| t.role), role) {
            (None, Role::Assistant) => bail!("the first turn of a session must be a user turn"),
            (Some(prev), next) if prev == next => {
                bail!("turns must alternate roles, got two {} turns in a row", next)
            }
            _ => {}
        }
        self.turns.push(PromptTurn {
            role,
            content: content.into(),
        });
        Ok(())
    }

    /// Record a completed exchange: the prompt and the model's reply.
    ///
    /// Both turns are appended or neither is.
    pub fn record_exchange(&mut self, prompt: &str, reply: &str) -> Result<()> {
        if self.turns.last().map(|t| t.role) == Some(Role::User) {
            bail!("cannot record an exchange while a user turn is awaiting a reply");
        }
        self.append(Role::User, prompt)?;
        self.append(Role::Assistant, reply)
    }

    /// Messages for the next request: the full history plus a new user turn.
    ///
    /// Does not modify the log; the turn is recorded once a reply arrives.
    pub fn request_messages(&self, prompt: &str) -> Vec<PromptTurn> {
        let mut messages = self.turns.clone();
        messages.push(PromptTurn::user(prompt));
        messages
    }

    pub fn turns(&self) -> &[PromptTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&PromptTurn> {
        self.turns.last()
    }

    /// Content of the most recent assistant turn, if any.
    pub fn latest_reply(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::Assistant)
            .map(|t| t.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_turn_must_be_user() {
        let mut session = Session::new();
        assert!(session.append(Role::Assistant, "hi").is_err());
        assert!(session.is_empty());
        session.append(Role::User, "hello").unwrap();
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn rejects_consecutive_roles() {
        let mut session = Session::new();
        session.append(Role::User, "one").unwrap();
        assert!(session.append(Role::User, "two").is_err());
        session.append(Role::Assistant, "reply").unwrap();
        assert!(session.append(Role::Assistant, "again").is_err());
        session.append(Role::User, "three").unwrap();

        let roles: Vec<Role> = session.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
    }

    #[test]
    fn record_exchange_appends_pair() {
        let mut session = Session::new();
        session.record_exchange("prompt 1", "draft 1").unwrap();
        session.record_exchange("feedback", "draft 2").unwrap();
        assert_eq!(session.len(), 4);
        assert_eq!(session.latest_reply(), Some("draft 2"));
        assert_eq!(session.turns()[0], PromptTurn::user("prompt 1"));
        assert_eq!(session.turns()[1], PromptTurn::assistant("draft 1"));
    }

    #[test]
    fn record_exchange_refuses_dangling_user_turn() {
        let mut session = Session::new();
        session.append(Role::User, "pending").unwrap();
        assert!(session.record_exchange("p", "r").is_err());
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn request_messages_extend_history_without_mutation() {
        let mut session = Session::new();
        session.record_exchange("prompt", "draft").unwrap();

        let messages = session.request_messages("revise it");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2], PromptTurn::user("revise it"));
        assert_eq!(session.len(), 2);
        assert_eq!(session.last(), Some(&PromptTurn::assistant("draft")));
    }
}
