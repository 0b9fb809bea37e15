//! Config commands

use crate::config::Config;
use crate::ConfigCommands;

fn masked(key: &str) -> String {
    format!("{}****", key.chars().take(8).collect::<String>())
}

pub fn handle(action: ConfigCommands, profile: Option<&str>) -> Result<(), String> {
    let mut config = Config::load(profile)?;
    match action {
        ConfigCommands::Show => {
            let unset = || "(not set)".to_string();
            println!("profile: {}", Config::config_path(profile)?.display());
            println!("api_url: {}", config.api_url.unwrap_or_else(unset));
            println!("team_id: {}", config.team_id.unwrap_or_else(unset));
            println!("api_key: {}", config.api_key.as_deref().map(masked).unwrap_or_else(unset));
            println!("default_format: {}", config.default_format.unwrap_or_else(unset));
            println!(
                "report_config: {}",
                config.report_config.map(|p| p.display().to_string()).unwrap_or_else(unset)
            );
            return Ok(());
        }
        ConfigCommands::SetApiUrl { url } => config.api_url = Some(url),
        ConfigCommands::SetTeam { id } => {
            uuid::Uuid::parse_str(&id).map_err(|e| format!("Invalid team id '{}': {}", id, e))?;
            config.team_id = Some(id);
        }
        ConfigCommands::SetFormat { value } => {
            config.default_format = Some(format!("{:?}", value).to_lowercase());
        }
    }
    let path = config.save(profile)?;
    println!("Saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_key() {
        assert_eq!(masked("sk_live_abcdef123"), "sk_live_****");
        assert_eq!(masked("abc"), "abc****");
    }
}
