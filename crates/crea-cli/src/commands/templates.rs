//! Template listing

use anyhow::Result;
use crea_gen::prompt::{COPY_TYPES, LAYOUT_STYLES};

pub fn run() -> Result<()> {
    println!("Copy types (--template):");
    for choice in COPY_TYPES {
        println!("  {:<16} {}", choice.label, choice.value);
    }

    println!();
    println!("Layout styles (--layout):");
    for choice in LAYOUT_STYLES {
        println!("  {:<16} {}", choice.label, choice.value);
    }
    Ok(())
}
