// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for row state and the revoke-all batch

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use helpers::{addr, tokens, MockChain};
use revokescan::{
    AllowanceProbe, BatchItemOutcome, BatchRevoker, RevokeConfig, RevokeConfigBuilder,
    RevokeError, RevokeErrorKind, RowHandle, RowState, ScanTicket, WriteError,
};

const TOKEN: Address = revokescan::constants::CLAWD_TOKEN;

async fn loaded_rows(chain: &MockChain, spenders: &[Address]) -> Vec<RowHandle> {
    let probe = AllowanceProbe::from_config(&RevokeConfig::minimal(), addr(0x01));
    let mut rows = Vec::new();
    for spender in spenders {
        let row = RowHandle::new(*spender);
        row.load_allowance(&probe, chain).await;
        rows.push(row);
    }
    rows
}

#[tokio::test]
async fn test_batch_isolation() {
    let (a, b, c) = (addr(0xa1), addr(0xb2), addr(0xc3));
    let chain = MockChain::new(0)
        .with_allowance(a, tokens(1))
        .with_allowance(b, U256::MAX)
        .with_allowance(c, tokens(3))
        .with_failing_revoke(b, WriteError::transaction_failed("execution reverted"));
    let rows = loaded_rows(&chain, &[a, b, c]).await;

    let batch = BatchRevoker::new(TOKEN);
    let report = batch.revoke_all(&rows, &chain, &ScanTicket::detached()).await.unwrap();

    assert_eq!(chain.approvals(), vec![a, b, c]);
    assert_eq!(rows[0].state(), RowState::Revoked);
    assert_eq!(rows[1].state(), RowState::Active);
    assert_eq!(
        rows[1].snapshot().last_error,
        Some(RevokeErrorKind::TransactionFailed)
    );
    assert_eq!(rows[2].state(), RowState::Revoked);

    assert_eq!(report.attempted(), 3);
    assert_eq!(report.revoked.len(), 2);
    assert!(report.revoked.contains(&a) && report.revoked.contains(&c));
    assert_eq!(
        report.failed().collect::<Vec<_>>(),
        vec![(b, RevokeErrorKind::TransactionFailed)]
    );
    assert!(!batch.is_in_progress());
}

#[tokio::test]
async fn test_batch_rerun_only_retries_failures() {
    let (a, b) = (addr(0xa1), addr(0xb2));
    let chain = MockChain::new(0)
        .with_allowance(a, tokens(1))
        .with_allowance(b, tokens(2))
        .with_failing_revoke(b, WriteError::classify("User rejected the request."));
    let rows = loaded_rows(&chain, &[a, b]).await;
    let batch = BatchRevoker::new(TOKEN);

    let first = batch.revoke_all(&rows, &chain, &ScanTicket::detached()).await.unwrap();
    assert_eq!(
        first.items[1].outcome,
        BatchItemOutcome::Failed(RevokeErrorKind::UserRejected)
    );

    let second = batch.revoke_all(&rows, &chain, &ScanTicket::detached()).await.unwrap();
    assert_eq!(
        second.items[0].outcome,
        BatchItemOutcome::Skipped(RowState::Revoked)
    );
    assert!(matches!(second.items[1].outcome, BatchItemOutcome::Revoked(_)));
    assert_eq!(chain.approvals(), vec![a, b, b]);
    assert_eq!(rows[1].snapshot().last_error, None);
}

#[tokio::test(start_paused = true)]
async fn test_batch_is_strictly_sequential_and_flags_progress() {
    let spenders: Vec<Address> = (1..=4).map(addr).collect();
    let mut chain = MockChain::new(0).with_approve_delay(Duration::from_secs(1));
    for spender in &spenders {
        chain = chain.with_allowance(*spender, tokens(1));
    }
    let chain = Arc::new(chain);
    let rows = loaded_rows(&chain, &spenders).await;
    let batch = Arc::new(BatchRevoker::new(TOKEN));
    let mut progress = batch.subscribe();

    let task = tokio::spawn({
        let batch = Arc::clone(&batch);
        let chain = Arc::clone(&chain);
        let rows = rows.clone();
        async move { batch.revoke_all(&rows, &*chain, &ScanTicket::detached()).await }
    });

    progress.wait_for(|running| *running).await.unwrap();
    assert!(batch.is_in_progress());

    // A second trigger while running is refused
    let err = batch.revoke_all(&rows, &*chain, &ScanTicket::detached()).await.unwrap_err();
    assert_eq!(err, RevokeError::BatchInProgress);

    let report = task.await.unwrap().unwrap();
    assert_eq!(report.revoked.len(), 4);
    assert_eq!(chain.max_concurrent_approvals(), 1);
    assert_eq!(chain.approvals(), spenders);
    assert!(!batch.is_in_progress());
}

#[tokio::test]
async fn test_batch_skips_zero_and_revokes_unknown() {
    let (zero, unknown) = (addr(0x10), addr(0x20));
    let chain = MockChain::new(0)
        .with_allowance(zero, U256::ZERO)
        .with_failing_allowance(unknown);
    let rows = loaded_rows(&chain, &[zero, unknown]).await;
    assert_eq!(rows[0].state(), RowState::ZeroAllowance);
    assert_eq!(rows[1].state(), RowState::Unknown);

    let report = BatchRevoker::new(TOKEN)
        .revoke_all(&rows, &chain, &ScanTicket::detached())
        .await
        .unwrap();

    assert_eq!(chain.approvals(), vec![unknown]);
    assert_eq!(
        report.items[0].outcome,
        BatchItemOutcome::Skipped(RowState::ZeroAllowance)
    );
    assert_eq!(rows[1].state(), RowState::Revoked);
}

#[tokio::test]
async fn test_revoked_row_ignores_later_reads() {
    let spender = addr(0xa1);
    let chain = MockChain::new(0).with_allowance(spender, tokens(5));
    let rows = loaded_rows(&chain, &[spender]).await;
    rows[0].revoke(&chain, TOKEN).await.unwrap();

    rows[0].apply_reading(U256::MAX);
    assert_eq!(rows[0].state(), RowState::Revoked);

    let err = rows[0].revoke(&chain, TOKEN).await.unwrap_err();
    assert_eq!(
        err,
        RevokeError::NotRevocable {
            spender,
            state: RowState::Revoked
        }
    );
    assert_eq!(chain.approvals().len(), 1);
}

#[tokio::test]
async fn test_allowance_retries_before_giving_up() {
    let spender = addr(0xa1);
    let chain = MockChain::new(0).with_failing_allowance(spender);
    let config = RevokeConfigBuilder::new()
        .allowance_retries(2, Duration::ZERO)
        .build();
    let probe = AllowanceProbe::from_config(&config, addr(0x01));

    let row = RowHandle::new(spender);
    row.load_allowance(&probe, &chain).await;

    assert_eq!(chain.allowance_calls(), 3);
    assert_eq!(row.state(), RowState::Unknown);
    assert_eq!(row.snapshot().display_allowance(config.decimals), "...");
}
