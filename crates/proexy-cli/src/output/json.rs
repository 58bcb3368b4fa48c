use proexy_core::error::ProexyError;
use serde::Serialize;

pub fn print<T: Serialize>(value: &T) -> Result<(), ProexyError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
