use crate::toc::source::supported_encodings;
use anyhow::Result;

pub fn run() -> Result<()> {
    println!("Available encodings:");
    for encoding in supported_encodings() {
        println!("  {}", encoding.name());
    }
    Ok(())
}
