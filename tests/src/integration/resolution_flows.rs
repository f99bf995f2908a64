//! # Resolution Flows
//!
//! Batch alias resolution over blocks seeded with resolution receipts.

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use qc_transaction_service::{
        FetchError, ResolutionError, TransactionServiceApi, TransactionServiceConfig,
        TransactionServiceError,
    };
    use shared_types::entities::{
        Address, Hash, MosaicId, NamespaceId, ReceiptSource, ResolvedTransaction, Statement,
        TransactionBody, UnresolvedAddress, UnresolvedMosaicId,
    };

    use crate::integration::fixtures::{address_links, mosaic_link, transfer, Harness};

    const HEIGHT: u64 = 42;
    const ALICE: [u8; 24] = [0xA1; 24];
    const BOB: Address = [0xB0; 24];
    const CAROL: Address = [0xC0; 24];
    const BOB_NS: NamespaceId = NamespaceId(0x9550_CA3F_C9B4_1FC5);
    const CURRENCY_NS: NamespaceId = NamespaceId(0xE74B_99BA_4147_00E8);
    const CURRENCY: MosaicId = MosaicId(0x6BED_913F_A202_23F8);

    /// Block where the alias moves from Bob to Carol at index 5.
    fn seed(harness: &Harness, count: u64) -> Vec<Hash> {
        let transactions = (0..count)
            .map(|amount| {
                transfer(
                    ALICE,
                    UnresolvedAddress::Alias(BOB_NS),
                    UnresolvedMosaicId::Alias(CURRENCY_NS),
                    amount,
                )
            })
            .collect();
        let statement = Statement {
            height: HEIGHT,
            address_resolutions: vec![address_links(
                HEIGHT,
                BOB_NS,
                vec![
                    (ReceiptSource::top_level(0).unwrap(), BOB),
                    (ReceiptSource::top_level(5).unwrap(), CAROL),
                ],
            )],
            mosaic_resolutions: vec![mosaic_link(HEIGHT, CURRENCY_NS, CURRENCY)],
        };
        harness.node.seed_block(HEIGHT, transactions, statement)
    }

    fn by_hash(resolved: Vec<ResolvedTransaction>) -> HashMap<Hash, ResolvedTransaction> {
        resolved
            .into_iter()
            .filter_map(|tx| tx.hash().map(|hash| (hash, tx)))
            .collect()
    }

    #[tokio::test]
    async fn test_batch_resolves_every_transaction() {
        let harness = Harness::new();
        let ids = seed(&harness, 10);

        let resolved = harness.service.resolve_aliases(&ids).await.expect("resolved");

        assert_eq!(resolved.len(), ids.len());
        let resolved = by_hash(resolved);
        let expected: HashSet<Hash> = ids.iter().copied().collect();
        assert_eq!(resolved.keys().copied().collect::<HashSet<_>>(), expected);

        for (index, id) in ids.iter().enumerate() {
            let tx = resolved[id].transaction();
            assert!(!tx.has_unresolved_references());
            let recipient = if index < 5 { BOB } else { CAROL };
            match &tx.body {
                TransactionBody::Transfer {
                    recipient: actual,
                    mosaics,
                    ..
                } => {
                    assert_eq!(*actual, UnresolvedAddress::Address(recipient));
                    assert_eq!(mosaics[0].id, UnresolvedMosaicId::Mosaic(CURRENCY));
                }
                other => panic!("unexpected body {other:?}"),
            }
        }
        assert_eq!(harness.node.receipt_lookups(), ids.len());
    }

    #[tokio::test]
    async fn test_resolution_is_repeatable() {
        let harness = Harness::new();
        let ids = seed(&harness, 6);

        let first = harness.service.resolve_aliases(&ids).await.expect("first");
        let second = harness.service.resolve_aliases(&ids).await.expect("second");

        assert_eq!(by_hash(first), by_hash(second));
    }

    #[tokio::test]
    async fn test_unbounded_concurrency() {
        let harness = Harness::with_config(TransactionServiceConfig {
            max_concurrent_resolutions: 0,
            ..TransactionServiceConfig::for_testing()
        });
        let ids = seed(&harness, 50);

        let resolved = harness.service.resolve_aliases(&ids).await.expect("resolved");

        assert_eq!(resolved.len(), 50);
    }

    #[tokio::test]
    async fn test_one_unresolvable_alias_fails_the_batch() {
        let harness = Harness::new();
        let mut ids = seed(&harness, 3);
        let unknown = NamespaceId(7);
        let orphan = harness.node.seed_block(
            HEIGHT + 1,
            vec![transfer(
                ALICE,
                UnresolvedAddress::Alias(unknown),
                UnresolvedMosaicId::Mosaic(CURRENCY),
                1,
            )],
            Statement {
                height: HEIGHT + 1,
                ..Statement::default()
            },
        );
        ids.extend(orphan);

        let result = harness.service.resolve_aliases(&ids).await;

        assert_eq!(
            result,
            Err(TransactionServiceError::Resolution(
                ResolutionError::UnresolvedAlias {
                    namespace: unknown,
                    height: HEIGHT + 1,
                }
            ))
        );
    }

    #[tokio::test]
    async fn test_unknown_id_fails_the_batch() {
        let harness = Harness::new();
        let mut ids = seed(&harness, 2);
        ids.push([0xEE; 32]);

        let result = harness.service.resolve_aliases(&ids).await;

        assert_eq!(
            result,
            Err(FetchError::UnknownTransaction([0xEE; 32]).into())
        );
        assert_eq!(harness.node.receipt_lookups(), 0);
    }

    #[tokio::test]
    async fn test_announced_transaction_is_resolvable() {
        let harness = Harness::new();
        let signed = crate::integration::fixtures::sign(&transfer(
            ALICE,
            UnresolvedAddress::Address(BOB),
            UnresolvedMosaicId::Mosaic(CURRENCY),
            9,
        ));

        harness.service.announce(&signed).await.expect("confirmed");
        let resolved = harness
            .service
            .resolve_aliases(&[signed.hash])
            .await
            .expect("resolved");

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].hash(), Some(signed.hash));
        // No aliases, no receipt lookup
        assert_eq!(harness.node.receipt_lookups(), 0);
    }
}
