//! Cart commands.

use anyhow::Result;
use storefront_cart::{CartError, CartStore, Change, NewLineItem, ProductId};

use super::{AddArgs, LineArgs};
use crate::context::Context;

/// Print the cart.
pub async fn show(ctx: &Context) -> Result<()> {
    let (_scope, cart) = ctx.mount_cart().await?;
    ctx.output.cart(&cart.snapshot()?);
    Ok(())
}

/// Add an item to the cart.
pub async fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    let (_scope, cart) = ctx.mount_cart().await?;
    let item = NewLineItem::new(args.id, args.title, args.image_url, args.price);
    let change = cart.add_to_cart(item).await;
    finish(ctx, &cart, change)
}

/// Increase a line's quantity.
pub async fn increment(args: LineArgs, ctx: &Context) -> Result<()> {
    let (_scope, cart) = ctx.mount_cart().await?;
    let change = cart.increment(&ProductId::new(args.id)).await;
    finish(ctx, &cart, change)
}

/// Decrease a line's quantity.
pub async fn decrement(args: LineArgs, ctx: &Context) -> Result<()> {
    let (_scope, cart) = ctx.mount_cart().await?;
    let change = cart.decrement(&ProductId::new(args.id)).await;
    finish(ctx, &cart, change)
}

/// Rewrite the stored cart from what was loaded.
pub async fn flush(ctx: &Context) -> Result<()> {
    let (_scope, cart) = ctx.mount_cart().await?;
    cart.flush().await?;
    ctx.output.success("Cart written.");
    Ok(())
}

fn finish(ctx: &Context, cart: &CartStore, change: Result<Change, CartError>) -> Result<()> {
    match change {
        Ok(change) => {
            ctx.output.success(&describe(&change));
            ctx.output.cart(&cart.snapshot()?);
            Ok(())
        }
        Err(CartError::Persistence(e)) => {
            // The in-memory cart changed, but nothing outlives this process.
            ctx.output.warn("The change was applied but could not be saved.");
            Err(CartError::Persistence(e).into())
        }
        Err(e) => Err(e.into()),
    }
}

fn describe(change: &Change) -> String {
    match change {
        Change::Added(id) => format!("Added {}", id),
        Change::Incremented { id, quantity } => format!("{} now ×{}", id, quantity),
        Change::Decremented { id, quantity } => format!("{} now ×{}", id, quantity),
        Change::Removed(id) => format!("Removed {}", id),
        Change::Missing(id) => format!("{} is not in the cart", id),
        Change::Hydrated { items } => format!("Loaded {} line(s)", items),
    }
}
