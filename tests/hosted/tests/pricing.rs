use ticketwave_client::{
    config::{DEFAULT_NATIVE_UNITS_PER_MINOR_UNIT, NOMINAL_FALLBACK_AMOUNT},
    FallbackPayment, PurchaseErrorKind, PurchaseStatus, TierId,
};
use ticketwave_simulation::{assert_purchase_error, WalletMethod};
use ticketwave_wallet_client::ProviderError;

use hosted_tests::{context::default_config, PurchaseTestContext};

/// Every tier pays its listed price, converted to native units
#[tokio::test]
async fn each_tier_pays_its_listed_price() -> anyhow::Result<()> {
    for tier in default_config().tiers {
        let ctx = PurchaseTestContext::new();

        ctx.controller.submit_purchase(Some(tier.id)).await;

        let expected = u128::from(tier.price_in_minor_units) * DEFAULT_NATIVE_UNITS_PER_MINOR_UNIT;
        assert_eq!(ctx.controller.status(), PurchaseStatus::Submitted);
        assert_eq!(ctx.wallet.mints(), [(ctx.buyer, expected)]);
    }

    Ok(())
}

#[tokio::test]
async fn listed_prices() -> anyhow::Result<()> {
    let ctx = PurchaseTestContext::new();

    assert_eq!(
        ctx.controller.tier_price(Some(TierId::Standard))?,
        60_000_000_000_000_000
    );
    assert_eq!(
        ctx.controller.tier_price(Some(TierId::Vip))?,
        140_000_000_000_000_000
    );
    assert_eq!(
        ctx.controller.tier_price(Some(TierId::Metaverse))?,
        30_000_000_000_000_000
    );

    Ok(())
}

/// By default, a purchase with no tier pays for the standard tier
#[tokio::test]
async fn fallback_to_default_tier() -> anyhow::Result<()> {
    let ctx = PurchaseTestContext::new();

    ctx.controller.submit_purchase(None).await;

    let standard = ctx.controller.tier_price(Some(TierId::Standard))?;
    assert_eq!(ctx.wallet.mints(), [(ctx.buyer, standard)]);
    assert_eq!(ctx.controller.attempt().selected_tier, None);

    Ok(())
}

#[tokio::test]
async fn fallback_to_fixed_amount() -> anyhow::Result<()> {
    let mut config = default_config();
    config.fallback_payment = FallbackPayment::Fixed(NOMINAL_FALLBACK_AMOUNT);
    let ctx = PurchaseTestContext::with_config(config, None);

    ctx.controller.submit_purchase(None).await;
    assert_eq!(ctx.wallet.mints(), [(ctx.buyer, NOMINAL_FALLBACK_AMOUNT)]);

    // a chosen tier still pays its own price
    ctx.controller.submit_purchase(Some(TierId::Vip)).await;
    let vip = ctx.controller.tier_price(Some(TierId::Vip))?;
    assert_eq!(ctx.wallet.mints()[1], (ctx.buyer, vip));

    Ok(())
}

#[tokio::test]
async fn tier_not_on_sale() -> anyhow::Result<()> {
    let mut config = default_config();
    config.tiers.retain(|tier| tier.id != TierId::Metaverse);
    let ctx = PurchaseTestContext::with_config(config, None);

    ctx.controller.submit_purchase(Some(TierId::Metaverse)).await;

    let attempt = ctx.controller.attempt();
    assert_eq!(attempt.status, PurchaseStatus::Idle);
    assert_purchase_error(PurchaseErrorKind::InvalidTier, &attempt);
    assert!(ctx.wallet.calls().is_empty());

    Ok(())
}

#[tokio::test]
async fn price_conversion_overflow() -> anyhow::Result<()> {
    let mut config = default_config();
    config.native_units_per_minor_unit = u128::MAX;
    let ctx = PurchaseTestContext::with_config(config, None);

    ctx.controller.submit_purchase(Some(TierId::Standard)).await;

    assert_purchase_error(PurchaseErrorKind::AmountOverflow, &ctx.controller.attempt());
    assert!(ctx.wallet.calls().is_empty());

    Ok(())
}

#[tokio::test]
async fn refresh_ticket_price() -> anyhow::Result<()> {
    let ctx = PurchaseTestContext::new();
    ctx.wallet.set_ticket_price(42_000);

    assert_eq!(ctx.controller.refresh_ticket_price().await, Some(42_000));
    assert_eq!(ctx.controller.ticket_price(), Some(42_000));
    assert_eq!(ctx.controller.price_error(), None);
    assert_eq!(ctx.wallet.call_count(WalletMethod::TicketPrice), 1);

    Ok(())
}

/// A failed price lookup only hides the price, purchases still work
#[tokio::test]
async fn price_fetch_failure_is_not_fatal() -> anyhow::Result<()> {
    let ctx = PurchaseTestContext::new();
    ctx.wallet.set_ticket_price(42_000);
    ctx.controller.refresh_ticket_price().await;

    ctx.wallet.fail_next(
        WalletMethod::TicketPrice,
        ProviderError::new(-32000, "header not found"),
    );

    assert_eq!(ctx.controller.refresh_ticket_price().await, None);
    assert_eq!(ctx.controller.ticket_price(), None);

    let error = ctx.controller.price_error().unwrap();
    assert_eq!(error.kind, PurchaseErrorKind::PriceFetchFailed);
    assert!(error.message.contains("header not found"));

    ctx.controller.submit_purchase(Some(TierId::Standard)).await;
    let attempt = ctx.controller.attempt();
    assert_eq!(attempt.status, PurchaseStatus::Submitted);
    assert_eq!(attempt.error, None);

    Ok(())
}

#[tokio::test]
async fn price_without_wallet() -> anyhow::Result<()> {
    let controller = PurchaseTestContext::without_wallet(default_config());

    assert_eq!(controller.refresh_ticket_price().await, None);
    assert_eq!(
        controller.price_error().map(|e| e.kind),
        Some(PurchaseErrorKind::PriceFetchFailed)
    );

    Ok(())
}
