//! Login, profile, checkout and order history.

use secrecy::SecretString;
use tryla_client::types::{Address, CheckoutRequest, PaymentMethod, ProfileUpdate};
use tryla_client::{ApiError, Route};
use tryla_core::{Email, OrderId};

use super::Context;
use crate::output;
use crate::{CheckoutArgs, ProfileArgs};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Parse `--payment`.
pub fn parse_payment(value: &str) -> Result<PaymentMethod, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "cod" | "cash" => Ok(PaymentMethod::CashOnDelivery),
        "card" => Ok(PaymentMethod::Card),
        "upi" => Ok(PaymentMethod::Upi),
        other => Err(format!("unknown payment method '{other}' (expected cod, card or upi)")),
    }
}

pub async fn login(ctx: &Context, email: &str, password: String) -> CommandResult {
    let user = ctx
        .run(ctx.client.login(email, SecretString::from(password)))
        .await?;
    ctx.out.show(&user, output::user)?;
    Ok(())
}

pub async fn signup(ctx: &Context, name: &str, email: &str, password: String) -> CommandResult {
    let user = ctx
        .run(ctx.client.signup(name, email, SecretString::from(password)))
        .await?;
    ctx.out.show(&user, output::user)?;
    Ok(())
}

pub async fn logout(ctx: &Context) -> CommandResult {
    ctx.client.logout().await?;
    ctx.out.message("Logged out.");
    Ok(())
}

pub async fn whoami(ctx: &Context) -> CommandResult {
    let user = ctx
        .client
        .current_user()
        .await
        .ok_or(ApiError::NotAuthenticated)?;
    ctx.out.show(&user, output::user)?;
    Ok(())
}

pub async fn update_profile(ctx: &Context, args: ProfileArgs) -> CommandResult {
    let update = ProfileUpdate {
        name: args.name,
        email: args.email.as_deref().map(Email::parse).transpose()?,
        phone: args.phone,
        address: None,
    };
    if update.is_empty() {
        return Err("nothing to update: pass --name, --email or --phone".into());
    }

    let user = ctx.run(ctx.client.update_profile(&update)).await?;
    ctx.out.show(&user, output::user)?;
    Ok(())
}

pub async fn checkout(ctx: &Context, args: CheckoutArgs) -> CommandResult {
    if !ctx.client.session().is_authenticated().await {
        ctx.client.sink().navigate(Route::Login);
        return Err(ApiError::NotAuthenticated.into());
    }

    let request = CheckoutRequest {
        shipping_address: Address {
            full_name: args.full_name,
            street: args.street,
            city: args.city,
            state: args.state,
            postal_code: args.postal_code,
            country: args.country,
            phone: args.phone,
        },
        payment_method: args.payment,
    };
    let order = ctx.run(ctx.client.place_order(&request)).await?;
    ctx.out.show(&order, output::order)?;
    Ok(())
}

pub async fn list_orders(ctx: &Context) -> CommandResult {
    let orders = ctx.run(ctx.client.orders()).await?;
    ctx.out.show(&orders[..], output::orders)?;
    Ok(())
}

pub async fn show_order(ctx: &Context, id: &str) -> CommandResult {
    let order = ctx.run(ctx.client.order(&OrderId::new(id))).await?;
    ctx.out.show(&order, output::order)?;
    Ok(())
}
