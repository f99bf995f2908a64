//! # Announcement Flows
//!
//! Announce, aggregate bonded, and hash-lock flows against the simulated
//! node and the in-memory confirmation listener.

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use tokio::time::timeout;

    use futures::future::join_all;
    use qc_transaction_service::{
        ConfirmationError, SubmissionError, TransactionServiceApi, TransactionServiceError,
    };
    use shared_types::entities::{
        MosaicId, TransactionKind, UnresolvedAddress, UnresolvedMosaicId,
    };

    use crate::integration::fixtures::{aggregate_bonded, hash_lock, sign, transfer, Harness};

    const WAIT: Duration = Duration::from_secs(5);
    const ALICE: [u8; 24] = [0xA1; 24];
    const BOB: [u8; 24] = [0xB0; 24];
    const CURRENCY: UnresolvedMosaicId = UnresolvedMosaicId::Mosaic(MosaicId(0x6BED_913F_A202_23F8));

    fn payment(amount: u64) -> shared_types::entities::Transaction {
        transfer(ALICE, UnresolvedAddress::Address(BOB), CURRENCY, amount)
    }

    // =========================================================================
    // ANNOUNCE
    // =========================================================================

    #[tokio::test]
    async fn test_announce_waits_for_confirmation() {
        let harness = Harness::new();
        let signed = sign(&payment(1));

        let confirmed = timeout(WAIT, harness.service.announce(&signed))
            .await
            .expect("timeout")
            .expect("confirmed");

        assert_eq!(confirmed.hash(), Some(signed.hash));
        assert!(confirmed.info.map_or(false, |info| info.height >= 100));
        assert!(harness.node.is_confirmed(&signed.hash));
        assert_eq!(harness.bus.active_correlations(), 0);
    }

    #[tokio::test]
    async fn test_announce_ledger_rejection() {
        let harness = Harness::new();
        let signed = sign(&payment(1));
        harness
            .node
            .fail_with_status(signed.hash, "Failure_Core_Insufficient_Balance");

        let error = timeout(WAIT, harness.service.announce(&signed))
            .await
            .expect("timeout")
            .expect_err("rejected");

        match error {
            TransactionServiceError::Confirmation(ConfirmationError::Rejected { hash, status }) => {
                assert_eq!(hash, signed.hash);
                assert_eq!(status.code, "Failure_Core_Insufficient_Balance");
            }
            other => panic!("expected ledger rejection, got {other:?}"),
        }
        assert!(!harness.node.is_confirmed(&signed.hash));
    }

    #[tokio::test]
    async fn test_announce_undecodable_payload() {
        let harness = Harness::new();
        let mut signed = sign(&payment(1));
        signed.payload = vec![0xFF, 0x00];

        let error = harness.service.announce(&signed).await.expect_err("rejected");

        assert!(matches!(
            error,
            TransactionServiceError::Submission(SubmissionError::Rejected { .. })
        ));
        assert_eq!(harness.bus.active_correlations(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_waiters_only_see_their_own_outcome() {
        let harness = Harness::new();
        let signed: Vec<_> = (1..=8).map(|amount| sign(&payment(amount))).collect();
        // Same signer; one of them is rejected by the ledger
        harness
            .node
            .fail_with_status(signed[3].hash, "Failure_Core_Past_Deadline");

        let handles = signed.iter().cloned().map(|tx| {
            let service = harness.service.clone();
            tokio::spawn(async move { service.announce(&tx).await })
        });
        let results = timeout(WAIT, join_all(handles)).await.expect("timeout");

        for (tx, result) in signed.iter().zip(results) {
            let result = result.expect("task");
            if tx.hash == signed[3].hash {
                assert_eq!(
                    result.expect_err("rejected").transaction_hash(),
                    Some(tx.hash)
                );
            } else {
                assert_eq!(result.expect("confirmed").hash(), Some(tx.hash));
            }
        }
        assert_eq!(harness.bus.active_correlations(), 0);
    }

    #[tokio::test]
    async fn test_dropping_in_flight_announce_releases_correlation() {
        let harness = Harness::new();
        let signed = sign(&payment(1));
        harness.node.hold(signed.hash);

        let outcome = timeout(Duration::from_millis(50), harness.service.announce(&signed)).await;

        assert!(outcome.is_err(), "held transaction must not complete");
        assert_eq!(harness.node.announced(), vec![signed.hash]);
        assert_eq!(harness.bus.active_correlations(), 0);
        assert_eq!(harness.bus.subscriber_count(), 0);
    }

    // =========================================================================
    // AGGREGATE BONDED
    // =========================================================================

    #[tokio::test]
    async fn test_announce_aggregate_bonded_waits_for_partial_cache() {
        let harness = Harness::new();
        let aggregate = sign(&aggregate_bonded(ALICE, vec![payment(1)]));

        let added = timeout(WAIT, harness.service.announce_aggregate_bonded(&aggregate))
            .await
            .expect("timeout")
            .expect("added");

        assert_eq!(added.kind(), TransactionKind::AggregateBonded);
        assert_eq!(added.hash(), Some(aggregate.hash));
        assert_eq!(harness.node.aggregate_bonded_calls(), 1);
        assert_eq!(harness.node.announce_calls(), 0);
        // Partial transactions are not on the ledger yet
        assert!(!harness.node.is_confirmed(&aggregate.hash));
    }

    // =========================================================================
    // HASH LOCK + AGGREGATE BONDED
    // =========================================================================

    #[tokio::test]
    async fn test_hash_lock_then_aggregate() {
        let harness = Harness::new();
        let aggregate = sign(&aggregate_bonded(ALICE, vec![payment(1), payment(2)]));
        let lock = sign(&hash_lock(ALICE, &aggregate));

        let added = timeout(
            WAIT,
            harness
                .service
                .announce_hash_lock_aggregate_bonded(&lock, &aggregate),
        )
        .await
        .expect("timeout")
        .expect("added");

        assert_eq!(added.hash(), Some(aggregate.hash));
        assert_eq!(harness.node.announced(), vec![lock.hash, aggregate.hash]);
        assert!(harness.node.is_confirmed(&lock.hash));
        assert_eq!(harness.bus.active_correlations(), 0);
    }

    #[tokio::test]
    async fn test_hash_lock_rejected_by_ledger_stops_flow() {
        let harness = Harness::new();
        let aggregate = sign(&aggregate_bonded(ALICE, vec![payment(1)]));
        let lock = sign(&hash_lock(ALICE, &aggregate));
        harness
            .node
            .fail_with_status(lock.hash, "Failure_LockHash_Hash_Already_Exists");

        let error = timeout(
            WAIT,
            harness
                .service
                .announce_hash_lock_aggregate_bonded(&lock, &aggregate),
        )
        .await
        .expect("timeout")
        .expect_err("lock rejected");

        assert_eq!(error.transaction_hash(), Some(lock.hash));
        assert_eq!(harness.node.aggregate_bonded_calls(), 0);
        assert_eq!(harness.node.announced(), vec![lock.hash]);
    }

    #[tokio::test]
    async fn test_hash_lock_aggregate_rejection_keeps_lock() {
        let harness = Harness::new();
        let aggregate = sign(&aggregate_bonded(ALICE, vec![payment(1)]));
        let lock = sign(&hash_lock(ALICE, &aggregate));
        harness
            .node
            .fail_with_status(aggregate.hash, "Failure_Aggregate_Ineligible_Cosignatories");

        let error = timeout(
            WAIT,
            harness
                .service
                .announce_hash_lock_aggregate_bonded(&lock, &aggregate),
        )
        .await
        .expect("timeout")
        .expect_err("aggregate rejected");

        assert_eq!(error.transaction_hash(), Some(aggregate.hash));
        assert!(harness.node.is_confirmed(&lock.hash));
    }

    #[tokio::test]
    async fn test_hash_lock_arguments_swapped() {
        let harness = Harness::new();
        let aggregate = sign(&aggregate_bonded(ALICE, vec![payment(1)]));
        let lock = sign(&hash_lock(ALICE, &aggregate));

        let error = harness
            .service
            .announce_hash_lock_aggregate_bonded(&aggregate, &lock)
            .await
            .expect_err("invalid kind");

        assert!(matches!(
            error,
            TransactionServiceError::Submission(SubmissionError::InvalidKind { .. })
        ));
        assert!(harness.node.announced().is_empty());
    }
}
