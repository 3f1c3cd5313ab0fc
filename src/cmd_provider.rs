//! Provider subcommand handlers for deskpilot.

use std::io::BufRead;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::info;

use deskpilot_core::{ProviderEntry, ProviderRegistry};
use deskpilot_protocols::{Action, PlanningContext};

use crate::cli::KeyAction;

/// List providers with their status.
pub(crate) async fn providers_list(
    registry: &ProviderRegistry,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let entries = registry.list().await;

    if entries.is_empty() {
        println!("No providers registered.");
        return Ok(());
    }

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&entries)?;
            println!("{}", json);
        }
        _ => {
            println!(
                "  {:<20} {:<30} {:<12} {:<10} {}",
                "ID", "NAME", "CONFIGURED", "AVAILABLE", "CONTEXT"
            );
            println!("{}", "-".repeat(84));
            for entry in &entries {
                print_entry(entry);
            }
        }
    }

    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn print_entry(entry: &ProviderEntry) {
    let marker = if entry.active { "*" } else { " " };
    println!(
        "{} {:<20} {:<30} {:<12} {:<10} {}",
        marker,
        entry.descriptor.id,
        entry.descriptor.display_name,
        yes_no(entry.status.configured),
        yes_no(entry.status.available),
        entry.descriptor.context_window
    );
}

/// Make `provider_id` the active provider.
pub(crate) async fn use_provider(
    registry: &ProviderRegistry,
    provider_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if !registry.set_active(provider_id).await {
        return Err(format!(
            "Unknown provider: {}. Known providers: {}",
            provider_id,
            registry.ids().join(", ")
        )
        .into());
    }
    println!("Active provider: {}", provider_id);
    Ok(())
}

/// Handle key subcommands.
pub(crate) async fn handle_key_command(
    registry: &ProviderRegistry,
    action: KeyAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        KeyAction::Set { provider_id, key } => {
            let key = match key {
                Some(key) => key,
                None => read_key()?,
            };
            if key.is_empty() {
                return Err("API key is empty".into());
            }
            registry.configure_credential(&provider_id, &key).await?;
            println!("Stored API key for {}", provider_id);
        }
        KeyAction::Delete { provider_id } => {
            registry.remove_credential(&provider_id).await?;
            println!("Deleted API key for {}", provider_id);
        }
    }
    Ok(())
}

fn read_key() -> Result<String, Box<dyn std::error::Error>> {
    eprintln!("Paste the API key and press Enter:");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Assemble the planning context from the command-line inputs.
pub(crate) fn planning_context(
    request: &str,
    screenshot: Option<&Path>,
    ui_tree: Option<&Path>,
) -> Result<PlanningContext, Box<dyn std::error::Error>> {
    let request = request.trim();
    if request.is_empty() {
        return Err("Request is empty".into());
    }

    let mut context = PlanningContext::new(request);
    if let Some(path) = screenshot {
        let bytes = std::fs::read(path)?;
        context = context.with_screenshot(BASE64.encode(bytes));
    }
    if let Some(path) = ui_tree {
        let text = std::fs::read_to_string(path)?;
        context = context.with_ui_tree(serde_json::from_str(&text)?);
    }
    Ok(context)
}

/// Plan actions with the active provider and print them for confirmation.
pub(crate) async fn plan(
    registry: &ProviderRegistry,
    context: PlanningContext,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let actions = registry.get_actions(context).await?;
    info!("Planned {} actions", actions.len());

    if json {
        let values: Vec<_> = actions.iter().map(Action::to_value).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    println!("Proposed actions (nothing has been executed):");
    for (i, action) in actions.iter().enumerate() {
        println!("  {}. {}", i + 1, action);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_planning_context_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("screen.png");
        std::fs::write(&png, [0x89, b'P', b'N', b'G']).unwrap();
        let tree = dir.path().join("tree.json");
        std::fs::File::create(&tree)
            .unwrap()
            .write_all(br#"{"name": "Notepad"}"#)
            .unwrap();

        let context = planning_context("  save the file ", Some(&png), Some(&tree)).unwrap();
        assert_eq!(context.user_request, "save the file");
        assert_eq!(context.screenshot, "iVBORw==");
        assert_eq!(context.ui_tree["name"], "Notepad");
    }

    #[test]
    fn test_planning_context_rejects_empty_request() {
        assert!(planning_context("   ", None, None).is_err());
    }

    #[test]
    fn test_planning_context_bad_tree() {
        let dir = tempfile::tempdir().unwrap();
        let tree = dir.path().join("tree.json");
        std::fs::write(&tree, "not json").unwrap();
        assert!(planning_context("x", None, Some(&tree)).is_err());
    }
}
