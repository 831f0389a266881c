use ticketwave_client::{PurchaseErrorKind, PurchaseStatus, TierId};
use ticketwave_simulation::{assert_purchase_failed, WalletCall, WalletMethod};
use ticketwave_wallet_client::{ChainId, ProviderError};

use hosted_tests::PurchaseTestContext;

/// The wallet knows the target chain, so one switch is enough
#[tokio::test]
async fn switch_to_known_chain() -> anyhow::Result<()> {
    let ctx = PurchaseTestContext::on_chain(ChainId::POLYGON);
    ctx.wallet.add_known_chain(ChainId::SEPOLIA);

    ctx.controller.submit_purchase(Some(TierId::Standard)).await;

    assert_eq!(ctx.controller.status(), PurchaseStatus::Submitted);
    assert_eq!(ctx.wallet.call_count(WalletMethod::SwitchChain), 1);
    assert_eq!(ctx.wallet.call_count(WalletMethod::AddChain), 0);
    assert_eq!(ctx.wallet.current_chain(), ChainId::SEPOLIA);

    Ok(())
}

/// An unknown chain is added, then switched to exactly once more
#[tokio::test]
async fn add_chain_then_switch_once() -> anyhow::Result<()> {
    let ctx = PurchaseTestContext::on_chain(ChainId::MAINNET);

    ctx.controller.submit_purchase(Some(TierId::Vip)).await;

    assert_eq!(ctx.controller.status(), PurchaseStatus::Submitted);
    assert!(ctx.wallet.knows_chain(ChainId::SEPOLIA));
    assert_eq!(
        ctx.wallet.calls()[..5],
        [
            WalletCall::RequestAccounts,
            WalletCall::ChainId,
            WalletCall::SwitchChain(ChainId::SEPOLIA),
            WalletCall::AddChain(ChainId::SEPOLIA),
            WalletCall::SwitchChain(ChainId::SEPOLIA),
        ]
    );

    Ok(())
}

/// If the switch after adding still fails, there is no further retry
#[tokio::test]
async fn no_second_retry_after_add() -> anyhow::Result<()> {
    let ctx = PurchaseTestContext::on_chain(ChainId::MAINNET);
    ctx.wallet
        .fail_next(WalletMethod::SwitchChain, ProviderError::unrecognized_chain(ChainId::SEPOLIA));
    ctx.wallet
        .fail_next(WalletMethod::SwitchChain, ProviderError::unrecognized_chain(ChainId::SEPOLIA));

    ctx.controller.submit_purchase(Some(TierId::Vip)).await;

    assert_purchase_failed(PurchaseErrorKind::ChainSwitchFailed, &ctx.controller.attempt());
    assert_eq!(ctx.wallet.call_count(WalletMethod::SwitchChain), 2);
    assert_eq!(ctx.wallet.call_count(WalletMethod::AddChain), 1);
    assert_eq!(ctx.wallet.call_count(WalletMethod::MintTicket), 0);

    Ok(())
}

#[tokio::test]
async fn user_rejects_switch() -> anyhow::Result<()> {
    let ctx = PurchaseTestContext::on_chain(ChainId::MAINNET);
    ctx.wallet
        .fail_next(WalletMethod::SwitchChain, ProviderError::user_rejected());

    ctx.controller.submit_purchase(Some(TierId::Standard)).await;

    let attempt = ctx.controller.attempt();
    assert_purchase_failed(PurchaseErrorKind::UserRejected, &attempt);
    assert_eq!(attempt.error_message(), Some("network switch rejected by user"));
    assert_eq!(ctx.wallet.call_count(WalletMethod::AddChain), 0);
    assert_eq!(ctx.wallet.call_count(WalletMethod::MintTicket), 0);

    Ok(())
}

#[tokio::test]
async fn user_rejects_add_chain() -> anyhow::Result<()> {
    let ctx = PurchaseTestContext::on_chain(ChainId::MAINNET);
    ctx.wallet
        .fail_next(WalletMethod::AddChain, ProviderError::user_rejected());

    ctx.controller.submit_purchase(Some(TierId::Standard)).await;

    assert_purchase_failed(PurchaseErrorKind::UserRejected, &ctx.controller.attempt());
    assert_eq!(ctx.wallet.call_count(WalletMethod::SwitchChain), 1);
    assert_eq!(ctx.wallet.call_count(WalletMethod::MintTicket), 0);
    assert_eq!(ctx.wallet.current_chain(), ChainId::MAINNET);

    Ok(())
}

/// Switch errors other than an unknown chain are not followed by an add
#[tokio::test]
async fn other_switch_failure() -> anyhow::Result<()> {
    let ctx = PurchaseTestContext::on_chain(ChainId::MAINNET);
    ctx.wallet.fail_next(
        WalletMethod::SwitchChain,
        ProviderError::new(-32002, "request already pending"),
    );

    ctx.controller.submit_purchase(Some(TierId::Standard)).await;

    let attempt = ctx.controller.attempt();
    assert_purchase_failed(PurchaseErrorKind::ChainSwitchFailed, &attempt);
    assert!(attempt
        .error_message()
        .unwrap()
        .contains("request already pending"));
    assert_eq!(ctx.wallet.call_count(WalletMethod::AddChain), 0);

    Ok(())
}

#[tokio::test]
async fn add_chain_failure() -> anyhow::Result<()> {
    let ctx = PurchaseTestContext::on_chain(ChainId::MAINNET);
    ctx.wallet.fail_next(
        WalletMethod::AddChain,
        ProviderError::new(-32602, "invalid rpc url"),
    );

    ctx.controller.submit_purchase(Some(TierId::Standard)).await;

    assert_purchase_failed(PurchaseErrorKind::ChainSwitchFailed, &ctx.controller.attempt());
    assert_eq!(ctx.wallet.call_count(WalletMethod::SwitchChain), 1);

    Ok(())
}

/// Account access was granted, so the session is connected even though the
/// chain could not be read
#[tokio::test]
async fn chain_query_failure() -> anyhow::Result<()> {
    let ctx = PurchaseTestContext::new();
    ctx.wallet.fail_next(
        WalletMethod::ChainId,
        ProviderError::new(-32603, "internal json-rpc error"),
    );

    ctx.controller.submit_purchase(Some(TierId::Standard)).await;

    let attempt = ctx.controller.attempt();
    assert_purchase_failed(PurchaseErrorKind::ChainSwitchFailed, &attempt);
    assert_eq!(
        attempt.error_message(),
        Some("network check failed: internal json-rpc error")
    );

    let session = ctx.controller.session();
    assert!(session.connected);
    assert_eq!(session.account_address, Some(ctx.buyer));
    assert_eq!(session.chain_id, None);

    assert_eq!(ctx.wallet.call_count(WalletMethod::SwitchChain), 0);
    assert_eq!(ctx.wallet.call_count(WalletMethod::MintTicket), 0);

    Ok(())
}
