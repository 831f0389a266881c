use std::time::Duration;

use ticketwave_client::{PurchaseErrorKind, PurchaseStatus, TierId};
use ticketwave_simulation::{assert_purchase_error, assert_purchase_failed, WalletMethod};
use ticketwave_wallet_client::ProviderError;

use hosted_tests::{context::default_config, PurchaseTestContext};

#[tokio::test]
async fn missing_wallet_stays_idle() -> anyhow::Result<()> {
    let controller = PurchaseTestContext::without_wallet(default_config());

    controller.submit_purchase(Some(TierId::Vip)).await;

    let attempt = controller.attempt();
    assert_eq!(attempt.status, PurchaseStatus::Idle);
    assert_purchase_error(PurchaseErrorKind::WalletUnavailable, &attempt);
    assert_eq!(attempt.selected_tier, Some(TierId::Vip));
    assert!(!controller.has_wallet());

    Ok(())
}

#[tokio::test]
async fn user_rejects_account_access() -> anyhow::Result<()> {
    let ctx = PurchaseTestContext::new();
    ctx.wallet
        .fail_next(WalletMethod::RequestAccounts, ProviderError::user_rejected());

    ctx.controller.submit_purchase(Some(TierId::Standard)).await;

    let attempt = ctx.controller.attempt();
    assert_purchase_failed(PurchaseErrorKind::UserRejected, &attempt);
    assert_eq!(attempt.error_message(), Some("account access rejected by user"));
    assert_eq!(ctx.wallet.call_count(WalletMethod::ChainId), 0);
    assert!(!ctx.controller.session().connected);

    Ok(())
}

#[tokio::test]
async fn wallet_without_accounts() -> anyhow::Result<()> {
    let ctx = PurchaseTestContext::new();
    ctx.wallet.set_accounts(vec![]);

    ctx.controller.submit_purchase(Some(TierId::Standard)).await;

    assert_purchase_failed(PurchaseErrorKind::WalletUnavailable, &ctx.controller.attempt());
    assert_eq!(ctx.wallet.call_count(WalletMethod::MintTicket), 0);

    Ok(())
}

#[tokio::test]
async fn reverted_transaction() -> anyhow::Result<()> {
    let ctx = PurchaseTestContext::new();
    ctx.wallet.fail_next(
        WalletMethod::MintTicket,
        ProviderError::new(-32603, "execution reverted: sold out"),
    );

    ctx.controller.submit_purchase(Some(TierId::Vip)).await;

    let attempt = ctx.controller.attempt();
    assert_purchase_failed(PurchaseErrorKind::TransactionError, &attempt);
    assert_eq!(
        attempt.error_message(),
        Some("transaction failed: execution reverted: sold out")
    );
    assert_eq!(ctx.wallet.call_count(WalletMethod::MintTicket), 1);

    Ok(())
}

/// A prompt that is never answered fails the attempt once the configured limit passes
#[tokio::test]
async fn prompt_timeout() -> anyhow::Result<()> {
    let mut config = default_config();
    config.prompt_timeout_ms = Some(20);

    let ctx = PurchaseTestContext::with_config(config, None);
    let _pause = ctx.wallet.pause(WalletMethod::RequestAccounts);

    ctx.controller.submit_purchase(Some(TierId::Standard)).await;

    let attempt = ctx.controller.attempt();
    assert_purchase_failed(PurchaseErrorKind::Timeout, &attempt);
    assert_eq!(attempt.error_message(), Some("account access timed out after 20ms"));
    assert_eq!(ctx.wallet.call_count(WalletMethod::ChainId), 0);

    Ok(())
}

/// The timer does not depend on any particular async runtime
#[test]
fn prompt_timeout_without_tokio() {
    let mut config = default_config();
    config.prompt_timeout_ms = Some(20);

    let ctx = PurchaseTestContext::with_config(config, None);
    let _pause = ctx.wallet.pause(WalletMethod::RequestAccounts);

    futures::executor::block_on(ctx.controller.submit_purchase(Some(TierId::Vip)));

    assert_purchase_failed(PurchaseErrorKind::Timeout, &ctx.controller.attempt());
}

/// A slow mint is waited on past the limit, and no second mint can be started
/// while the first is still open in the wallet
#[tokio::test]
async fn mint_prompt_is_never_timed_out() -> anyhow::Result<()> {
    let mut config = default_config();
    config.prompt_timeout_ms = Some(20);

    let ctx = PurchaseTestContext::with_config(config, None);
    ctx.wallet.push_mint_hash("0xabc");
    let pause = ctx.wallet.pause(WalletMethod::MintTicket);

    let retry = async {
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(ctx.controller.status(), PurchaseStatus::Submitting);

        ctx.controller.submit_purchase(None).await;
        assert_eq!(ctx.wallet.call_count(WalletMethod::MintTicket), 1);

        pause.release();
    };

    futures::join!(ctx.controller.submit_purchase(Some(TierId::Vip)), retry);

    let attempt = ctx.controller.attempt();
    assert_eq!(attempt.status, PurchaseStatus::Submitted);
    assert_eq!(attempt.transaction_hash.unwrap().as_str(), "0xabc");
    assert_eq!(ctx.wallet.mints().len(), 1);

    Ok(())
}

/// Without a limit, a slow prompt is simply waited on
#[tokio::test]
async fn no_timeout_by_default() -> anyhow::Result<()> {
    let ctx = PurchaseTestContext::new();
    let pause = ctx.wallet.pause(WalletMethod::RequestAccounts);

    let release = async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(ctx.controller.status(), PurchaseStatus::AwaitingWallet);
        pause.release();
    };

    futures::join!(ctx.controller.submit_purchase(None), release);

    assert_eq!(ctx.controller.status(), PurchaseStatus::Submitted);

    Ok(())
}
