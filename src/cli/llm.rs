//! Model endpoint inspection.

use console::style;

use super::helpers::build_client;
use crate::config::Settings;

pub async fn cmd_models(settings: &Settings) -> anyhow::Result<()> {
    let llm = &settings.llm;
    let client = build_client(settings)?;

    println!("\n{}", style("LLM Configuration").bold());
    println!("{}", "-".repeat(40));
    println!("{:<20} {}", "Endpoint:", llm.endpoint);
    println!("{:<20} {}", "Chat Model:", llm.chat_model);
    println!("{:<20} {}", "Reasoner Model:", llm.reasoner_model);
    println!(
        "{:<20} {}",
        "API Key:",
        if llm.api_key.as_deref().is_some_and(|k| !k.trim().is_empty()) {
            "set"
        } else {
            "missing"
        }
    );

    println!("\n{}", style("Available Models").bold());
    println!("{}", "-".repeat(40));

    match client.list_models().await {
        Ok(models) if models.is_empty() => println!("  No models reported"),
        Ok(models) => {
            for model in models {
                let marker = if model == llm.chat_model || model == llm.reasoner_model {
                    style("*").green().to_string()
                } else {
                    " ".to_string()
                };
                println!("  {} {}", marker, model);
            }
        }
        Err(e) => {
            println!("  {} Failed to list models: {}", style("✗").red(), e);
        }
    }

    Ok(())
}
