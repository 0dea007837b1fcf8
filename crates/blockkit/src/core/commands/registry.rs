//! Command Registry
//!
//! Name-to-handler directory for commands registered by independently loaded
//! plugins. Keeps registration order for introspection and notifies
//! observers on every registration change.

use std::collections::HashMap;
use std::sync::Arc;

use super::{CommandContext, CommandDescription, CommandHandler};
use crate::core::{
    notify::{Subscribable, SubscriberCallback, SubscriptionId},
    CommandLabel, CoreError, CoreResult,
};

/// Registry change notifications; the payload is the command label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandEvent {
    Register,
    Unregister,
}

/// Token for one specific registration.
///
/// Passing it to [`CommandRegistry::unregister_token`] removes that
/// registration only, never a later one under the same label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandToken {
    id: u64,
    label: CommandLabel,
}

impl CommandToken {
    pub fn label(&self) -> &str {
        &self.label
    }
}

struct CommandEntry {
    token_id: u64,
    handler: Arc<dyn CommandHandler>,
    description: Option<CommandDescription>,
}

/// Registry of named commands for one editor instance
pub struct CommandRegistry {
    entries: HashMap<CommandLabel, CommandEntry>,
    /// Labels in registration order
    order: Vec<CommandLabel>,
    notifier: Subscribable<CommandEvent, CommandLabel>,
    next_token: u64,
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.order)
            .field("notifier", &self.notifier)
            .finish()
    }
}

impl CommandRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            notifier: Subscribable::new(),
            next_token: 1,
        }
    }

    /// Registers `handler` under `label`.
    ///
    /// An existing entry with the same label is replaced and keeps its
    /// position in [`list_commands`](Self::list_commands). The entry is stored
    /// before observers are notified; an observer error is returned but does
    /// not roll the registration back.
    pub fn register_command(
        &mut self,
        label: &str,
        handler: Arc<dyn CommandHandler>,
        description: Option<CommandDescription>,
    ) -> CoreResult<CommandToken> {
        let token_id = self.next_token;
        self.next_token += 1;

        let entry = CommandEntry {
            token_id,
            handler,
            description,
        };

        if self.entries.insert(label.to_string(), entry).is_some() {
            tracing::warn!("Command '{}' was already registered; replacing it", label);
        } else {
            self.order.push(label.to_string());
            tracing::debug!("Registered command: {}", label);
        }

        let token = CommandToken {
            id: token_id,
            label: label.to_string(),
        };
        self.notifier.notify(CommandEvent::Register, &token.label)?;

        Ok(token)
    }

    /// Removes the command registered under `label`.
    ///
    /// Returns `false` (and notifies nobody) when nothing was registered.
    pub fn unregister_command(&mut self, label: &str) -> CoreResult<bool> {
        if self.entries.remove(label).is_none() {
            return Ok(false);
        }
        self.order.retain(|l| l != label);
        tracing::debug!("Unregistered command: {}", label);

        let label = label.to_string();
        self.notifier.notify(CommandEvent::Unregister, &label)?;
        Ok(true)
    }

    /// Removes the registration identified by `token`.
    ///
    /// A no-op when the label has since been re-registered or removed.
    pub fn unregister_token(&mut self, token: &CommandToken) -> CoreResult<bool> {
        let is_current = self
            .entries
            .get(&token.label)
            .is_some_and(|entry| entry.token_id == token.id);

        if !is_current {
            tracing::debug!(
                "Ignoring stale token for command '{}' (token {})",
                token.label,
                token.id
            );
            return Ok(false);
        }
        self.unregister_command(&token.label)
    }

    /// All registered labels in registration order
    pub fn list_commands(&self) -> Vec<CommandLabel> {
        self.order.clone()
    }

    /// Returns true if a command is registered under `label`
    pub fn has_command(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    /// Handler registered under `label`
    pub fn get_command_callback(&self, label: &str) -> Option<Arc<dyn CommandHandler>> {
        self.entries.get(label).map(|e| Arc::clone(&e.handler))
    }

    /// Description registered with `label`
    pub fn describe_command(&self, label: &str) -> Option<&CommandDescription> {
        self.entries.get(label).and_then(|e| e.description.as_ref())
    }

    /// Executes the command registered under `label`.
    ///
    /// Fails with [`CoreError::CommandNotFound`] for unknown labels; otherwise
    /// returns whatever the handler returns.
    pub async fn execute_command(
        &self,
        label: &str,
        ctx: &CommandContext,
        params: serde_json::Value,
    ) -> CoreResult<serde_json::Value> {
        let handler = self
            .get_command_callback(label)
            .ok_or_else(|| CoreError::CommandNotFound(label.to_string()))?;

        tracing::debug!("Executing command: {}", label);
        handler.call(ctx, params).await
    }

    /// Subscribes to registration changes
    pub fn subscribe<I>(
        &mut self,
        events: I,
        callback: SubscriberCallback<CommandLabel>,
    ) -> SubscriptionId
    where
        I: IntoIterator<Item = CommandEvent>,
    {
        self.notifier.subscribe(events, callback)
    }

    /// Removes a subscription; idempotent
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Number of registered commands
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
