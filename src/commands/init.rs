use crate::commands::prompt;
use crate::config::{parse_base_url, Config};
use crate::error::{Result, UsersError};

pub async fn run() -> Result<()> {
    let config_path = Config::config_path()?;

    if config_path.exists()
        && !prompt::confirm(&format!(
            "Config file already exists at {}. Overwrite?",
            config_path.display()
        ))?
    {
        println!("Aborted.");
        return Ok(());
    }

    println!("Users CLI Configuration");
    println!("=======================\n");

    let api_url = prompt::ask("Enter the users API base URL (e.g., https://api.example.com)")?;
    if api_url.is_empty() {
        return Err(UsersError::MissingApiUrl);
    }
    let api_url = parse_base_url(&api_url)?;

    let api_token = prompt::ask("Enter an API token [optional]")?;
    let locations_path = prompt::ask("Path to a locations JSON file [optional]")?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| UsersError::ConfigRead {
            path: config_path.clone(),
            source: e,
        })?;
    }

    let contents = render(api_url.as_str(), &api_token, &locations_path);
    std::fs::write(&config_path, contents).map_err(|e| UsersError::ConfigRead {
        path: config_path.clone(),
        source: e,
    })?;

    println!("\nConfig saved to {}", config_path.display());
    println!("You can now use 'users' commands!");

    Ok(())
}

fn render(api_url: &str, api_token: &str, locations_path: &str) -> String {
    let mut contents = format!("api_url = {}\n", toml_string(api_url));
    if !api_token.is_empty() {
        contents.push_str(&format!("api_token = {}\n", toml_string(api_token)));
    }
    if !locations_path.is_empty() {
        contents.push_str(&format!("locations_path = {}\n", toml_string(locations_path)));
    }
    contents
}

fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}
