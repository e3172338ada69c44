//! Transaction lifecycle classification.

use futures::future::try_join;
use tracing::debug;

use crate::error::NeoError;
use crate::service::NeoService;
use crate::types::TransactionStatus;
use crate::validation::validate_tx_hash;

/// Classifies a transaction hash as not found, pending or confirmed.
///
/// Nothing is remembered between calls; every check asks the node again.
pub struct TransactionStatusChecker<'a> {
    service: &'a NeoService,
}

impl<'a> TransactionStatusChecker<'a> {
    pub fn new(service: &'a NeoService) -> Self {
        Self { service }
    }

    pub async fn check(&self, txid: &str) -> Result<TransactionStatus, NeoError> {
        let hash = validate_tx_hash(txid)?;

        let Some(tx) = self.service.get_transaction(hash.as_str()).await? else {
            debug!(tx = %hash, "transaction not found");
            return Ok(TransactionStatus::NotFound {
                message: format!(
                    "transaction {hash} is unknown to the {} node",
                    self.service.network()
                ),
            });
        };

        // Past `valid_until_block` but still unconfirmed is reported as
        // pending; the node decides when to drop it.
        let Some(block_hash) = tx.block_hash else {
            return Ok(TransactionStatus::Pending {
                sender: tx.sender,
                system_fee: tx.system_fee,
                network_fee: tx.network_fee,
                valid_until_block: tx.valid_until_block,
            });
        };

        let (header, count) = try_join(
            self.service.get_block_header(&block_hash),
            self.service.get_block_count(),
        )
        .await?;
        let tip = count.saturating_sub(1);
        let confirmations = tip.saturating_sub(header.index).saturating_add(1);

        Ok(TransactionStatus::Confirmed {
            confirmations,
            block_height: header.index,
            block_hash,
            block_time: tx.block_time.or(Some(header.time)),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::network::Network;
    use crate::rpc::mock::MockRpc;
    use crate::service::ServiceConfig;
    use crate::test_util::*;
    use crate::types::GasAmount;

    fn service(rpc: MockRpc) -> NeoService {
        NeoService::new(Network::Mainnet, Arc::new(rpc), ServiceConfig::default())
    }

    #[tokio::test]
    async fn confirmed_counts_blocks_since_inclusion() {
        let block = block_hash(1);
        let tx = confirmed_tx(tx_hash(1), block.clone());
        // Tip at 109 = inclusion height 100 + 9.
        let service = service(
            MockRpc::builder()
                .with_block(make_block(100, block.clone()))
                .with_tx(tx.clone())
                .with_block_count(110)
                .build(),
        );

        let status = TransactionStatusChecker::new(&service)
            .check(tx.hash.as_str())
            .await
            .unwrap();
        assert_eq!(
            status,
            TransactionStatus::Confirmed {
                confirmations: 10,
                block_height: 100,
                block_hash: block,
                block_time: tx.block_time,
            }
        );
    }

    #[tokio::test]
    async fn confirmations_never_drop_below_one() {
        let block = block_hash(2);
        let tx = confirmed_tx(tx_hash(2), block.clone());
        // A lagging node whose tip is behind the block it just served.
        let service = service(
            MockRpc::builder()
                .with_block(make_block(500, block))
                .with_tx(tx.clone())
                .with_block_count(400)
                .build(),
        );

        let status = TransactionStatusChecker::new(&service)
            .check(tx.hash.as_str())
            .await
            .unwrap();
        assert!(matches!(status, TransactionStatus::Confirmed { confirmations: 1, .. }));
    }

    #[tokio::test]
    async fn pending_reports_fees_and_validity() {
        let tx = pending_tx(tx_hash(3), 6_000);
        let service = service(MockRpc::builder().with_tx(tx.clone()).build());

        let status = TransactionStatusChecker::new(&service)
            .check(tx.hash.as_str())
            .await
            .unwrap();
        assert_eq!(
            status,
            TransactionStatus::Pending {
                sender: tx.sender.clone(),
                system_fee: GasAmount(997_775),
                network_fee: GasAmount(1_235_610),
                valid_until_block: 6_000,
            }
        );
    }

    #[tokio::test]
    async fn expired_but_unconfirmed_is_still_pending() {
        let tx = pending_tx(tx_hash(4), 10);
        let service = service(
            MockRpc::builder()
                .with_tx(tx.clone())
                .with_block_count(1_000)
                .build(),
        );
        let status = TransactionStatusChecker::new(&service)
            .check(tx.hash.as_str())
            .await
            .unwrap();
        assert!(matches!(status, TransactionStatus::Pending { .. }));
    }

    #[tokio::test]
    async fn unknown_hash_is_not_found() {
        let service = service(MockRpc::builder().build());
        let status = TransactionStatusChecker::new(&service)
            .check(tx_hash(5).as_str())
            .await
            .unwrap();
        match status {
            TransactionStatus::NotFound { message } => assert!(!message.is_empty()),
            other => panic!("expected not_found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_hash_is_rejected_without_a_call() {
        let rpc = Arc::new(MockRpc::builder().build());
        let service = NeoService::new(Network::Mainnet, rpc.clone(), ServiceConfig::default());
        let err = TransactionStatusChecker::new(&service)
            .check("0xnothex")
            .await
            .unwrap_err();
        assert!(matches!(err, NeoError::Validation(_)));
        assert_eq!(rpc.total_calls(), 0);
    }
}
