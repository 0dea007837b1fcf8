//! Blockkit CLI
//!
//! Runs built-in plugin commands headlessly against an in-memory scene,
//! exposes the translation tooling and edits persisted settings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use blockkit::core::{
    engine::{BlockSpec, MemoryEngine},
    i18n::{flatten, unflatten},
    logging::init_logging,
    plugin::{install_builtins, EditorContext},
    settings::{default_data_dir, KitSettings, SettingsManager},
};

#[derive(Parser)]
#[command(name = "blockkit")]
#[command(about = "Headless command execution and translation tooling")]
#[command(version)]
struct Cli {
    /// Scene file (JSON array of blocks) to load into the engine
    #[arg(long, global = true)]
    scene: Option<PathBuf>,

    /// Settings directory (defaults to the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override the configured locale
    #[arg(long, global = true)]
    locale: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List registered commands with their groups
    Commands,

    /// Execute a command and print its JSON result
    Exec {
        label: String,

        /// Command params as JSON
        #[arg(long)]
        params: Option<String>,
    },

    /// Translate a key
    Translate {
        key: String,

        /// Text returned when the key is missing
        #[arg(long)]
        fallback: Option<String>,

        /// Extra translation table (JSON, one top-level key per locale)
        #[arg(long)]
        translations: Option<PathBuf>,
    },

    /// List commands without a title in the active locale
    MissingTranslations,

    /// Print a nested JSON object as dotted keys
    Flatten { file: PathBuf },

    /// Print dotted keys as a nested JSON object
    Unflatten { file: PathBuf },

    /// Show or change persisted settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print every setting as `key = value`
    Show,

    /// Change one setting by dotted key (e.g. `arrange.spacing 8`)
    Set { key: String, value: String },

    /// Delete the settings file and restore defaults
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().or_else(default_data_dir);
    let mut settings = match &data_dir {
        Some(dir) => SettingsManager::new(dir.clone()).load(),
        None => KitSettings::default(),
    };
    if let Some(locale) = &cli.locale {
        settings.general.locale = locale.clone();
    }

    let log_dir = match (&data_dir, settings.logging.log_to_file) {
        (Some(dir), true) => Some(dir.join("logs")),
        _ => None,
    };
    init_logging(&settings.logging.level, log_dir.as_deref());

    match cli.command {
        Command::Flatten { file } => {
            let value = read_json(&file)?;
            let Some(object) = value.as_object() else {
                bail!("{} does not contain a JSON object", file.display());
            };
            print_json(&serde_json::to_value(flatten(object))?)
        }
        Command::Unflatten { file } => {
            let flat: BTreeMap<String, serde_json::Value> =
                serde_json::from_value(read_json(&file)?)
                    .with_context(|| format!("{} is not a flat JSON object", file.display()))?;
            print_json(&serde_json::Value::Object(unflatten(&flat)))
        }
        Command::Settings { action } => {
            let Some(dir) = data_dir else {
                bail!("No settings directory available; pass --data-dir");
            };
            let manager = SettingsManager::new(dir);
            let settings = run_settings_action(&manager, action)?;
            for (key, value) in settings.entries()? {
                println!("{} = {}", key, value);
            }
            Ok(())
        }
        command => {
            let mut ctx = editor(cli.scene.as_deref(), &settings)?;
            run_editor_command(&mut ctx, command).await
        }
    }
}

/// Applies a settings action and returns the resulting settings
fn run_settings_action(manager: &SettingsManager, action: SettingsAction) -> Result<KitSettings> {
    let settings = match action {
        SettingsAction::Show => manager.load(),
        SettingsAction::Set { key, value } => manager
            .update(&key, &value)
            .with_context(|| format!("Failed to set {}", key))?,
        SettingsAction::Reset => manager.reset()?,
    };
    Ok(settings)
}

/// Builds an editor with built-in plugins over the optional scene
fn editor(scene: Option<&Path>, settings: &KitSettings) -> Result<EditorContext> {
    let engine = match scene {
        Some(path) => {
            let specs: Vec<BlockSpec> = serde_json::from_value(read_json(path)?)
                .with_context(|| format!("Invalid scene file {}", path.display()))?;
            MemoryEngine::from_specs(specs)?
        }
        None => MemoryEngine::new(),
    };

    let mut ctx = EditorContext::with_settings(Arc::new(engine), settings);
    install_builtins(&mut ctx, settings)?;
    Ok(ctx)
}

async fn run_editor_command(ctx: &mut EditorContext, command: Command) -> Result<()> {
    match command {
        Command::Commands => {
            for label in ctx.commands().list_commands() {
                let group = ctx
                    .commands()
                    .describe_command(&label)
                    .and_then(|d| d.group.clone())
                    .unwrap_or_default();
                println!("{:<32} {:<12} {}", label, group, ctx.command_title(&label));
            }
            Ok(())
        }
        Command::Exec { label, params } => {
            let params = match params {
                Some(raw) => serde_json::from_str(&raw).context("--params is not valid JSON")?,
                None => serde_json::Value::Null,
            };
            let result = ctx
                .execute(&label, params)
                .await
                .with_context(|| format!("Command {} failed", label))?;
            print_json(&result)
        }
        Command::Translate {
            key,
            fallback,
            translations,
        } => {
            if let Some(path) = translations {
                ctx.i18n_mut().set_translations(read_json(&path)?)?;
            }
            println!("{}", ctx.i18n().translate(&key, fallback.as_deref()));
            Ok(())
        }
        Command::MissingTranslations => {
            let locale = ctx.i18n().locale().to_string();
            for label in ctx.untranslated_commands(&locale) {
                println!("{}", label);
            }
            Ok(())
        }
        Command::Flatten { .. } | Command::Unflatten { .. } | Command::Settings { .. } => {
            bail!("this command does not run against an editor")
        }
    }
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_exec_with_params() {
        let cli = Cli::parse_from([
            "blockkit",
            "--locale",
            "de",
            "exec",
            "blockkit.arrange.grid",
            "--params",
            r#"{"columns":2}"#,
        ]);

        assert_eq!(cli.locale.as_deref(), Some("de"));
        match cli.command {
            Command::Exec { label, params } => {
                assert_eq!(label, "blockkit.arrange.grid");
                assert_eq!(params.as_deref(), Some(r#"{"columns":2}"#));
            }
            _ => panic!("expected exec"),
        }
    }

    #[test]
    fn test_editor_installs_builtins_in_locale() {
        let mut settings = KitSettings::default();
        settings.general.locale = "de".to_string();

        let ctx = editor(None, &settings).unwrap();
        assert!(ctx.commands().has_command("blockkit.arrange.horizontal"));
        assert_eq!(ctx.command_title("blockkit.property.get"), "Eigenschaft lesen");
        assert!(ctx.untranslated_commands("de").is_empty());
    }

    #[test]
    fn test_settings_set_then_reset() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(temp_dir.path().to_path_buf());

        let cli = Cli::parse_from(["blockkit", "settings", "set", "arrange.spacing", "8"]);
        let Command::Settings { action } = cli.command else {
            panic!("expected settings");
        };
        let updated = run_settings_action(&manager, action).unwrap();
        assert_eq!(updated.arrange.spacing, 8.0);

        let shown = run_settings_action(&manager, SettingsAction::Show).unwrap();
        assert_eq!(shown, updated);

        let reset = run_settings_action(&manager, SettingsAction::Reset).unwrap();
        assert_eq!(reset, KitSettings::default());
        assert!(!manager.settings_path().exists());
    }

    #[test]
    fn test_settings_set_unknown_key_fails() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SettingsManager::new(temp_dir.path().to_path_buf());

        let action = SettingsAction::Set {
            key: "arrange.padding".to_string(),
            value: "1".to_string(),
        };
        assert!(run_settings_action(&manager, action).is_err());
        assert!(!manager.settings_path().exists());
    }
}
