//! Handlers for the individual config keys.

use crate::core::config::data::Config;
use crate::core::model::ModelType;
use crate::ui::theme::is_known_theme;
use crate::utils::url::validate_base_url;

use super::error::SettingError;
use super::SettingHandler;

fn success_set(key: &str, value: &str) -> String {
    format!("✅ Set {key} to: {value}")
}

fn success_unset(key: &str) -> String {
    format!("✅ Unset {key}")
}

fn format_value(key: &str, value: Option<&str>) -> String {
    format!("  {key}: {}", value.unwrap_or("(unset)"))
}

/// Handler for the `theme` setting.
pub struct ThemeHandler;

impl SettingHandler for ThemeHandler {
    fn key(&self) -> &'static str {
        "theme"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        let input = args.join(" ");
        if input.trim().is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To set a theme, specify the theme name:",
                example: "quickgpt set theme light",
            });
        }
        if !is_known_theme(&input) {
            return Err(SettingError::UnknownTheme { input });
        }

        let theme = input.trim().to_ascii_lowercase();
        let message = success_set("theme", &theme);
        config.theme = Some(theme);
        Ok(message)
    }

    fn unset(&self, config: &mut Config) -> Result<String, SettingError> {
        config.theme = None;
        Ok(success_unset("theme"))
    }

    fn format(&self, config: &Config) -> String {
        format_value("theme", config.theme.as_deref())
    }
}

/// Handler for the `default-model` setting.
pub struct DefaultModelHandler;

impl SettingHandler for DefaultModelHandler {
    fn key(&self) -> &'static str {
        "default-model"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        let input = args.join(" ");
        if input.trim().is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To set a default model, specify the model:",
                example: "quickgpt set default-model pro",
            });
        }
        let model: ModelType = input
            .parse()
            .map_err(|_| SettingError::UnknownModel { input })?;

        config.default_model = Some(model);
        Ok(success_set("default-model", model.as_str()))
    }

    fn unset(&self, config: &mut Config) -> Result<String, SettingError> {
        config.default_model = None;
        Ok(success_unset("default-model"))
    }

    fn format(&self, config: &Config) -> String {
        format_value("default-model", config.default_model.map(ModelType::as_str))
    }
}

/// Handler for the `api-base-url` setting.
pub struct ApiBaseUrlHandler;

impl SettingHandler for ApiBaseUrlHandler {
    fn key(&self) -> &'static str {
        "api-base-url"
    }

    fn set(&self, args: &[String], config: &mut Config) -> Result<String, SettingError> {
        let Some(input) = args.first() else {
            return Err(SettingError::MissingArgs {
                hint: "To point quickgpt at another endpoint, specify the base URL:",
                example: "quickgpt set api-base-url https://generativelanguage.googleapis.com/v1beta",
            });
        };
        let url = validate_base_url(input).map_err(|reason| SettingError::InvalidUrl { reason })?;

        let message = success_set("api-base-url", &url);
        config.api_base_url = Some(url);
        Ok(message)
    }

    fn unset(&self, config: &mut Config) -> Result<String, SettingError> {
        config.api_base_url = None;
        Ok(success_unset("api-base-url"))
    }

    fn format(&self, config: &Config) -> String {
        format_value("api-base-url", config.api_base_url.as_deref())
    }
}
