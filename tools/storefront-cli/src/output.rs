//! Output formatting for the CLI.

use console::style;
use serde::Serialize;
use storefront_cart::Cart;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Whether JSON output was requested.
    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a value as pretty JSON.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(e) => self.error(&format!("Failed to encode output: {}", e)),
        }
    }

    /// Print the cart as a table, or as JSON in JSON mode.
    pub fn cart(&self, cart: &Cart) {
        if self.json {
            self.json(cart);
            return;
        }

        self.header("Cart");
        if cart.is_empty() {
            self.info("The cart is empty.");
            return;
        }

        for line in render_lines(cart) {
            println!("{}", line);
        }
        println!(
            "{}",
            style(format!("{} item(s) in {} line(s)", cart.item_count(), cart.len())).dim()
        );
    }
}

/// One line per cart item: quantity, title, subtotal, id.
fn render_lines(cart: &Cart) -> Vec<String> {
    let width = cart.iter().map(|i| i.title.chars().count()).max().unwrap_or(0);
    cart.iter()
        .map(|item| {
            format!(
                "  {:>4} × {:<width$}  {:>10.2}  {}",
                item.quantity,
                item.title,
                item.subtotal(),
                style(&item.id).dim(),
                width = width
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_cart::NewLineItem;

    #[test]
    fn test_render_lines() {
        let mut cart = Cart::new();
        cart.add(NewLineItem::new("p1", "Shoe", "u", 10.0));
        cart.add(NewLineItem::new("p2", "Sunhat", "h", 2.5));
        cart.increment(&"p2".into());

        let lines = render_lines(&cart);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Shoe"));
        assert!(lines[0].contains("10.00"));
        assert!(lines[1].contains("5.00"));
    }
}
