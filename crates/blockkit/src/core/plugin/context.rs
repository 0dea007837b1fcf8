//! Editor Context
//!
//! One instance per host editor. Owns the command registry and translation
//! store that plugins register into, plus the engine handle commands run
//! against.

use std::sync::Arc;

use super::api::{Plugin, PluginInfo};
use crate::core::{
    commands::{CommandContext, CommandRegistry},
    engine::BlockEngine,
    i18n::{command_key, TranslationStore},
    settings::KitSettings,
    CoreError, CoreResult,
};

/// Per-editor plugin runtime
pub struct EditorContext {
    engine: Arc<dyn BlockEngine>,
    commands: CommandRegistry,
    i18n: TranslationStore,
    plugins: Vec<PluginInfo>,
}

impl std::fmt::Debug for EditorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorContext")
            .field("commands", &self.commands)
            .field("i18n", &self.i18n)
            .field("plugins", &self.plugins)
            .finish()
    }
}

impl EditorContext {
    /// Creates a context with empty registries
    pub fn new(engine: Arc<dyn BlockEngine>) -> Self {
        Self {
            engine,
            commands: CommandRegistry::new(),
            i18n: TranslationStore::new(),
            plugins: Vec::new(),
        }
    }

    /// Creates a context using the configured locale
    pub fn with_settings(engine: Arc<dyn BlockEngine>, settings: &KitSettings) -> Self {
        let mut ctx = Self::new(engine);
        ctx.i18n.set_locale(&settings.general.locale);
        ctx
    }

    pub fn engine(&self) -> &Arc<dyn BlockEngine> {
        &self.engine
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut CommandRegistry {
        &mut self.commands
    }

    pub fn i18n(&self) -> &TranslationStore {
        &self.i18n
    }

    pub fn i18n_mut(&mut self) -> &mut TranslationStore {
        &mut self.i18n
    }

    /// Installs a plugin into this editor
    pub fn add_plugin(&mut self, plugin: &dyn Plugin) -> CoreResult<()> {
        if self.plugins.iter().any(|p| p.id == plugin.id()) {
            return Err(CoreError::PluginAlreadyLoaded(plugin.id().to_string()));
        }

        plugin.initialize(self).map_err(|e| {
            tracing::error!("Failed to initialize plugin {}: {}", plugin.id(), e);
            e
        })?;

        self.plugins.push(PluginInfo {
            id: plugin.id().to_string(),
            version: plugin.version().to_string(),
        });
        tracing::info!("Loaded plugin: {} v{}", plugin.id(), plugin.version());

        Ok(())
    }

    /// Installed plugins in installation order
    pub fn plugins(&self) -> &[PluginInfo] {
        &self.plugins
    }

    /// Executes a registered command against this editor's engine
    pub async fn execute(
        &self,
        label: &str,
        params: serde_json::Value,
    ) -> CoreResult<serde_json::Value> {
        let ctx = CommandContext::new(Arc::clone(&self.engine));
        self.commands.execute_command(label, &ctx, params).await
    }

    /// Translated display name of a command, falling back to its label
    pub fn command_title(&self, label: &str) -> String {
        self.i18n.translate(&command_key(label), Some(label))
    }

    /// Registered commands without a `commands.<label>` entry in `locale`
    pub fn untranslated_commands(&self, locale: &str) -> Vec<String> {
        let labels = self.commands.list_commands();
        let keys: Vec<String> = labels.iter().map(|l| command_key(l)).collect();

        let missing = self
            .i18n
            .missing_keys(locale, keys.iter().map(String::as_str));

        labels
            .into_iter()
            .zip(keys)
            .filter(|(_, key)| missing.contains(key))
            .map(|(label, _)| label)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::commands::command_fn;
    use crate::core::engine::MemoryEngine;
    use serde_json::json;

    struct GreeterPlugin;

    impl Plugin for GreeterPlugin {
        fn id(&self) -> &str {
            "test.greeter"
        }

        fn initialize(&self, ctx: &mut EditorContext) -> CoreResult<()> {
            ctx.commands_mut().register_command(
                "test.greet",
                command_fn(|_ctx, params| async move {
                    let name = params["name"].as_str().unwrap_or("world").to_string();
                    Ok(json!(format!("Hello, {}!", name)))
                }),
                None,
            )?;
            ctx.commands_mut().register_command(
                "test.silent",
                command_fn(|_ctx, _params| async move { Ok(serde_json::Value::Null) }),
                None,
            )?;
            ctx.i18n_mut().set_translations(json!({
                "en": { "commands": { "test.greet": "Greet" } }
            }))
        }
    }

    struct BrokenPlugin;

    impl Plugin for BrokenPlugin {
        fn id(&self) -> &str {
            "test.broken"
        }

        fn initialize(&self, _ctx: &mut EditorContext) -> CoreResult<()> {
            Err(CoreError::PluginError("cannot start".into()))
        }
    }

    fn context() -> EditorContext {
        EditorContext::new(Arc::new(MemoryEngine::new()))
    }

    #[tokio::test]
    async fn test_plugin_commands_are_executable() {
        let mut ctx = context();
        ctx.add_plugin(&GreeterPlugin).unwrap();

        let result = ctx
            .execute("test.greet", json!({ "name": "Ada" }))
            .await
            .unwrap();
        assert_eq!(result, json!("Hello, Ada!"));
        assert_eq!(ctx.plugins()[0].id, "test.greeter");
    }

    #[test]
    fn test_duplicate_plugin_is_rejected() {
        let mut ctx = context();
        ctx.add_plugin(&GreeterPlugin).unwrap();

        let result = ctx.add_plugin(&GreeterPlugin);
        assert!(matches!(result, Err(CoreError::PluginAlreadyLoaded(_))));
        assert_eq!(ctx.plugins().len(), 1);
    }

    #[test]
    fn test_failed_plugin_is_not_recorded() {
        let mut ctx = context();
        assert!(ctx.add_plugin(&BrokenPlugin).is_err());
        assert!(ctx.plugins().is_empty());
    }

    #[test]
    fn test_contexts_do_not_share_state() {
        let mut first = context();
        let second = context();
        first.add_plugin(&GreeterPlugin).unwrap();

        assert_eq!(first.commands().len(), 2);
        assert!(second.commands().is_empty());
        assert_eq!(second.command_title("test.greet"), "test.greet");
    }

    #[test]
    fn test_untranslated_commands_and_titles() {
        let mut ctx = context();
        ctx.add_plugin(&GreeterPlugin).unwrap();

        assert_eq!(ctx.command_title("test.greet"), "Greet");
        assert_eq!(ctx.untranslated_commands("en"), vec!["test.silent"]);
        assert_eq!(
            ctx.untranslated_commands("fr"),
            vec!["test.greet", "test.silent"]
        );
    }

    #[test]
    fn test_with_settings_applies_locale() {
        let mut settings = KitSettings::default();
        settings.general.locale = "de".to_string();

        let ctx = EditorContext::with_settings(Arc::new(MemoryEngine::new()), &settings);
        assert_eq!(ctx.i18n().locale(), "de");
    }
}
