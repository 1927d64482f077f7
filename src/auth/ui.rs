use std::fmt;
use std::io::{self, BufRead, Write};

const API_KEY_PROMPT: &str = "Enter your Gemini API key: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationChoice {
    Yes,
    No,
    Cancel,
}

#[derive(Debug, Clone)]
pub struct UiError {
    message: String,
}

impl UiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UiError {}

fn read_answer(prompt: &str, input: &mut impl BufRead) -> Result<String, UiError> {
    print!("{prompt}");
    io::stdout()
        .flush()
        .map_err(|err| UiError::new(err.to_string()))?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|err| UiError::new(err.to_string()))?;
    Ok(line)
}

pub fn prompt_api_key() -> Result<String, UiError> {
    println!("🔐 QuickGPT Authentication");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    read_api_key(&mut io::stdin().lock())
}

fn read_api_key(input: &mut impl BufRead) -> Result<String, UiError> {
    let token = read_answer(API_KEY_PROMPT, input)?.trim().to_string();
    if token.is_empty() {
        return Err(UiError::new("API key cannot be empty"));
    }
    Ok(token)
}

pub fn confirm(prompt: &str) -> Result<bool, UiError> {
    let answer = read_answer(prompt, &mut io::stdin().lock())?;
    Ok(parse_confirmation(&answer)? == ConfirmationChoice::Yes)
}

pub fn parse_confirmation(input: &str) -> Result<ConfirmationChoice, UiError> {
    let trimmed = input.trim().to_lowercase();
    if trimmed.is_empty() {
        return Ok(ConfirmationChoice::No);
    }
    match trimmed.as_str() {
        "y" | "yes" => Ok(ConfirmationChoice::Yes),
        "n" | "no" => Ok(ConfirmationChoice::No),
        "c" | "cancel" => Ok(ConfirmationChoice::Cancel),
        _ => Err(UiError::new("Invalid confirmation response")),
    }
}
