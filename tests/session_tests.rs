// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests for the owner-scoped approval session

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::U256;
use helpers::{addr, tokens, MockChain};
use revokescan::{
    ApprovalSession, BatchItemOutcome, RevokeConfig, RevokeError, RowState, ScanErrorKind,
};

fn session(chain: MockChain) -> (Arc<MockChain>, ApprovalSession<MockChain>) {
    let chain = Arc::new(chain);
    let session = ApprovalSession::new(Arc::clone(&chain), RevokeConfig::minimal());
    (chain, session)
}

#[tokio::test]
async fn test_zero_allowance_hidden_and_revoke_completes_banner() {
    let owner = addr(0x01);
    let (x, y) = (addr(0xaa), addr(0xbb));
    let (chain, session) = session(
        MockChain::new(1_000)
            .with_event(owner, x, 10)
            .with_event(owner, y, 20)
            .with_allowance(x, U256::ZERO)
            .with_allowance(y, tokens(5)),
    );

    session.set_owner(Some(owner));
    let scan = session.wait_for_scan().await;
    assert_eq!(scan.spenders.len(), 2);
    assert_eq!(scan.error, None);
    session.wait_for_allowances().await;

    let visible = session.visible_rows();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].spender, y);
    assert_eq!(
        visible[0].display_allowance(session.config().decimals),
        "5.0000"
    );

    let summary = session.summary();
    assert_eq!(summary.outstanding, 1);
    assert!(!summary.all_revoked);
    assert_eq!(summary.headline(), "1 Active Approval Found");

    session.revoke(y).await.unwrap();

    assert_eq!(session.row(y).unwrap().state(), RowState::Revoked);
    assert_eq!(chain.approvals(), vec![y]);
    let summary = session.summary();
    assert!(summary.all_revoked);
    assert_eq!(summary.headline(), "All Approvals Revoked");
    // Revoked rows stay visible
    assert_eq!(session.visible_rows().len(), 1);
}

#[tokio::test]
async fn test_revoke_all_through_session() {
    let owner = addr(0x01);
    let spenders = [addr(0xa1), addr(0xa2), addr(0xa3)];
    let mut chain = MockChain::new(100);
    for (block, spender) in spenders.iter().enumerate() {
        chain = chain
            .with_event(owner, *spender, block as u64)
            .with_allowance(*spender, U256::MAX);
    }
    let (chain, session) = session(chain);

    session.set_owner(Some(owner));
    session.wait_for_scan().await;

    let report = session.revoke_all().await.unwrap();
    assert_eq!(report.revoked.len(), 3);
    assert_eq!(chain.approvals(), spenders.to_vec());
    assert!(session.summary().all_revoked);
    assert!(!session.is_revoking_all());
}

#[tokio::test(start_paused = true)]
async fn test_owner_change_discards_previous_scan() {
    let (first, second) = (addr(0x01), addr(0x02));
    let (_chain, session) = session(
        MockChain::new(1_000)
            .with_log_delay(Duration::from_secs(1))
            .with_event(first, addr(0xa1), 1)
            .with_event(second, addr(0xb1), 2)
            .with_allowance(addr(0xa1), tokens(1))
            .with_allowance(addr(0xb1), tokens(1)),
    );

    session.set_owner(Some(first));
    tokio::time::sleep(Duration::from_millis(500)).await;
    session.set_owner(Some(second));

    let scan = session.wait_for_scan().await;
    assert_eq!(scan.owner, Some(second));
    assert_eq!(scan.spenders.len(), 1);
    assert!(scan.spenders.contains(&addr(0xb1)));

    // Give the abandoned scan time to finish if it were still running
    tokio::time::sleep(Duration::from_secs(5)).await;
    let rows = session.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].spender(), addr(0xb1));
    assert_eq!(session.scan_result().owner, Some(second));
}

#[tokio::test(start_paused = true)]
async fn test_owner_change_ends_revoke_all_waiting_on_allowance() {
    let (first, second) = (addr(0x01), addr(0x02));
    let (fast, slow) = (addr(0xa1), addr(0xa2));
    let (chain, session) = session(
        MockChain::new(100)
            .with_event(first, fast, 1)
            .with_event(first, slow, 2)
            .with_allowance(fast, tokens(1))
            .with_allowance(slow, tokens(1))
            .with_allowance_delay(slow, Duration::from_secs(20)),
    );
    let session = Arc::new(session);

    session.set_owner(Some(first));
    session.wait_for_scan().await;

    let batch = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.revoke_all().await }
    });
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(session.is_revoking_all());
    assert_eq!(chain.approvals(), vec![fast]);

    session.set_owner(Some(second));
    let report = tokio::time::timeout(Duration::from_secs(5), batch)
        .await
        .expect("owner change should end the batch")
        .unwrap()
        .unwrap();

    assert_eq!(report.revoked.len(), 1);
    assert_eq!(report.items.len(), 2);
    assert_eq!(
        report.items[1].outcome,
        BatchItemOutcome::Skipped(RowState::Unknown)
    );
    assert_eq!(chain.approvals(), vec![fast]);
    assert!(!session.is_revoking_all());

    session.wait_for_scan().await;
    let next = session.revoke_all().await.unwrap();
    assert!(next.items.is_empty());
}

#[tokio::test]
async fn test_scan_failure_surfaces_error_without_rows() {
    let (_chain, session) = session(MockChain::new(0).with_failing_head());

    session.set_owner(Some(addr(0x01)));
    let scan = session.wait_for_scan().await;

    assert!(!scan.loading);
    let error = scan.error.expect("scan should fail");
    assert_eq!(error.kind, ScanErrorKind::BlockHeight);
    assert!(error.message.contains("chain height"));
    assert!(scan.spenders.is_empty());
    assert!(session.rows().is_empty());
    assert!(!session.summary().all_revoked);
}

#[tokio::test]
async fn test_rescan_keeps_revoked_rows() {
    let owner = addr(0x01);
    let spender = addr(0xa1);
    let (chain, session) = session(
        MockChain::new(10)
            .with_event(owner, spender, 1)
            .with_allowance(spender, tokens(2)),
    );

    session.set_owner(Some(owner));
    session.wait_for_scan().await;
    session.wait_for_allowances().await;
    session.revoke(spender).await.unwrap();
    let reads = chain.allowance_calls();

    session.rescan();
    session.wait_for_scan().await;
    session.wait_for_allowances().await;

    assert_eq!(session.row(spender).unwrap().state(), RowState::Revoked);
    // The surviving row is not probed again
    assert_eq!(chain.allowance_calls(), reads);
}

#[tokio::test]
async fn test_revoke_unknown_spender() {
    let (_chain, session) = session(MockChain::new(10));
    session.set_owner(Some(addr(0x01)));
    session.wait_for_scan().await;

    let err = session.revoke(addr(0xee)).await.unwrap_err();
    assert_eq!(err, RevokeError::UnknownSpender(addr(0xee)));
}

#[tokio::test]
async fn test_clearing_owner_resets_session() {
    let owner = addr(0x01);
    let (_chain, session) = session(
        MockChain::new(10)
            .with_event(owner, addr(0xa1), 1)
            .with_allowance(addr(0xa1), tokens(1)),
    );

    session.set_owner(Some(owner));
    session.wait_for_scan().await;
    assert_eq!(session.rows().len(), 1);

    session.set_owner(None);
    let scan = session.scan_result();
    assert_eq!(scan.owner, None);
    assert!(!scan.loading);
    assert!(session.rows().is_empty());
}
