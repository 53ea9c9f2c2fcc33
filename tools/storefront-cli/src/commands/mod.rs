//! CLI command implementations.

pub mod cart;
pub mod config;

use clap::{Args, Subcommand};

/// Arguments for the add command.
#[derive(Args)]
pub struct AddArgs {
    /// Product id.
    pub id: String,

    /// Display name.
    #[arg(short, long)]
    pub title: String,

    /// Image URL.
    #[arg(short, long, default_value = "")]
    pub image_url: String,

    /// Unit price.
    #[arg(short, long, value_parser = parse_price)]
    pub price: f64,
}

/// Accept only prices the cart can store: finite and not negative.
fn parse_price(raw: &str) -> Result<f64, String> {
    let price: f64 = raw.parse().map_err(|e| format!("{}", e))?;
    if storefront_cart::is_valid_price(price) {
        Ok(price)
    } else {
        Err(format!("{} is not a finite, non-negative price", raw))
    }
}

/// Arguments for commands that target one line.
#[derive(Args)]
pub struct LineArgs {
    /// Product id.
    pub id: String,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Write a default config file to the working directory.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("10").unwrap(), 10.0);
        assert_eq!(parse_price("4.25").unwrap(), 4.25);
        for raw in ["NaN", "inf", "-inf", "-1", "ten"] {
            assert!(parse_price(raw).is_err(), "price {raw:?}");
        }
    }
}
