use std::sync::atomic::{AtomicU64, Ordering};

use ticketwave_client::{PurchaseAttempt, PurchaseErrorKind, PurchaseStatus};
use ticketwave_wallet_client::Address;

pub mod wallet;

pub use wallet::{PauseHandle, SimulatedContract, SimulatedWallet, WalletCall, WalletMethod};

/// Generate a new address, unique within the process
pub fn generate_address() -> Address {
    static NEXT: AtomicU64 = AtomicU64::new(1);

    let n = NEXT.fetch_add(1, Ordering::Relaxed);
    let mut bytes = [0u8; 20];
    bytes[0] = 0xee;
    bytes[12..].copy_from_slice(&n.to_be_bytes());

    Address(bytes)
}

/// Asserts that an attempt ended in failure with the expected kind of error
pub fn assert_purchase_failed(expected: PurchaseErrorKind, attempt: &PurchaseAttempt) {
    assert_eq!(
        attempt.status,
        PurchaseStatus::Failed,
        "expected a failed purchase, got {attempt:?}"
    );
    assert_purchase_error(expected, attempt);
}

/// Asserts that an attempt recorded an error of the expected kind
pub fn assert_purchase_error(expected: PurchaseErrorKind, attempt: &PurchaseAttempt) {
    let actual = attempt
        .error
        .as_ref()
        .unwrap_or_else(|| panic!("expected {expected:?} but no error recorded: {attempt:?}"));

    assert_eq!(
        expected, actual.kind,
        "expected error {:?} but got {:?}: {}",
        expected, actual.kind, actual.message
    );
}
