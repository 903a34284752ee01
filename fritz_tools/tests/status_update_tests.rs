//! Status update workflow.

mod support;

use mockito::Matcher;
use serde_json::json;

use fritz_tools::models::{AllocationId, RequestId, RequestStatus};
use fritz_tools::portal::{HttpPortal, LocalPortal, PortalCall, PortalError};
use fritz_tools::services::{update_request_status, UpdateMode};

#[tokio::test]
async fn test_fetch_merge_submit_over_http() {
    let mut server = mockito::Server::new_async().await;
    let get = server
        .mock("GET", "/api/followup_request/42")
        .with_status(200)
        .with_body(
            r#"{"status":"success","data":{"id":42,"allocation_id":7,"obj_id":"ZTF21abc","status":"submitted","payload":{}}}"#,
        )
        .create_async()
        .await;
    let put = server
        .mock("PUT", "/api/followup_request/42")
        .match_body(Matcher::JsonString(
            r#"{"allocation_id":7,"obj_id":"ZTF21abc","status":"Complete"}"#.to_string(),
        ))
        .with_status(200)
        .with_body(r#"{"status":"success"}"#)
        .create_async()
        .await;

    let portal = HttpPortal::new(&support::config_for(&server.url())).unwrap();
    let outcome = update_request_status(&portal, RequestId(42), 0, UpdateMode::default())
        .await
        .unwrap();

    assert_eq!(outcome.update.status, RequestStatus::Complete);
    get.assert_async().await;
    put.assert_async().await;
}

#[tokio::test]
async fn test_invalid_code_makes_no_calls() {
    let portal = LocalPortal::new();
    let err = update_request_status(&portal, RequestId(1), 5, UpdateMode::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PortalError::ValidationError { .. }));
    assert!(portal.calls().is_empty());
}

#[tokio::test]
async fn test_stored_identity_wins_over_operator_values() {
    let portal = LocalPortal::new();
    let id = portal.seed_followup(AllocationId(7), "ZTF21abc", RequestStatus::Submitted);

    let mode = UpdateMode::FetchMerge {
        expected_allocation: Some(AllocationId(99)),
        expected_obj_id: Some("ZTF21zzz".to_string()),
    };
    let outcome = update_request_status(&portal, id, 1, mode).await.unwrap();

    assert_eq!(outcome.update.allocation_id, AllocationId(7));
    assert_eq!(outcome.update.obj_id, "ZTF21abc");
    assert_eq!(portal.status_of(id), Some(RequestStatus::Interrupted));
}

#[tokio::test]
async fn test_direct_mode_skips_fetch() {
    let portal = LocalPortal::new();
    let id = portal.seed_followup(AllocationId(7), "ZTF21abc", RequestStatus::Submitted);

    let mode = UpdateMode::Direct {
        allocation_id: AllocationId(7),
        obj_id: "ZTF21abc".to_string(),
    };
    update_request_status(&portal, id, 2, mode).await.unwrap();

    let calls = portal.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(calls[0], PortalCall::PutStatus(..)));
    assert_eq!(portal.status_of(id), Some(RequestStatus::Skipped));
}

#[tokio::test]
async fn test_direct_mode_mismatch_is_remote_error() {
    let portal = LocalPortal::new();
    let id = portal.seed_followup(AllocationId(7), "ZTF21abc", RequestStatus::Submitted);

    let mode = UpdateMode::Direct {
        allocation_id: AllocationId(8),
        obj_id: "ZTF21abc".to_string(),
    };
    let err = update_request_status(&portal, id, 0, mode).await.unwrap_err();

    assert!(matches!(err, PortalError::RemoteError { .. }));
    assert_eq!(portal.status_of(id), Some(RequestStatus::Submitted));
}

#[tokio::test]
async fn test_unknown_request_is_not_found() {
    let portal = LocalPortal::new();
    let err = update_request_status(&portal, RequestId(404), 0, UpdateMode::default())
        .await
        .unwrap_err();

    assert!(matches!(err, PortalError::NotFound { .. }));
    // nothing was written
    assert!(portal.calls().iter().all(|c| !c.is_write()));
}

#[tokio::test]
async fn test_error_envelope_on_put_over_http() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("PUT", "/api/followup_request/3")
        .match_body(Matcher::PartialJson(json!({"status": "Skipped"})))
        .with_status(400)
        .with_body(r#"{"status":"error","message":"Insufficient permissions"}"#)
        .create_async()
        .await;

    let portal = HttpPortal::new(&support::config_for(&server.url())).unwrap();
    let mode = UpdateMode::Direct {
        allocation_id: AllocationId(1),
        obj_id: "ZTF21abc".to_string(),
    };
    let err = update_request_status(&portal, RequestId(3), 2, mode)
        .await
        .unwrap_err();

    assert!(matches!(err, PortalError::RemoteError { .. }));
    assert_eq!(err.message(), "Insufficient permissions");
}

#[tokio::test]
async fn test_terminal_request_can_be_corrected() {
    let portal = LocalPortal::new();
    let id = portal.seed_followup(AllocationId(7), "ZTF21abc", RequestStatus::Complete);

    update_request_status(&portal, id, 2, UpdateMode::default())
        .await
        .unwrap();
    assert_eq!(portal.status_of(id), Some(RequestStatus::Skipped));
}
