use std::time::Duration;

use serde_json::Value;

use super::*;
use crate::locator::FactsSource;
use crate::netpeering::prompt::ScriptedConfirm;
use crate::test_utils::*;
use oks_client::{Net, Quota};

const PEERING_ID: &str = "pcx-33e30194";

fn stdin_of(fixture: &Fixture, command_index: usize) -> Value {
    let call = &fixture.kubectl.calls()[command_index];
    serde_json::from_str(call.stdin.as_deref().unwrap()).unwrap()
}

/// Queue everything up to an accepted acceptance
fn push_until_acceptance(fixture: &Fixture) {
    fixture.push_until_request_created();
    fixture
        .kubectl
        .push_json(&request_with_status("ignored", Some(PEERING_ID), "pending-acceptance"));
    fixture.kubectl.push_success("{}");
}

#[tokio::test]
async fn test_overlapping_cidrs_abort_before_any_kubectl_call() {
    let fixture = Fixture::with_cidrs("10.50.0.0/16", "10.50.0.0/16");

    let err = fixture.orchestrator().create(&alpha_to_beta()).await.unwrap_err();

    assert!(matches!(err, CliError::Overlap { .. }));
    assert_eq!(err.to_string().matches("10.50.0.0/16").count(), 2);
    assert!(fixture.commands().is_empty());
}

#[tokio::test]
async fn test_overlap_is_checked_in_both_directions() {
    for (source, target) in [("10.0.0.0/8", "10.50.0.0/16"), ("10.50.0.0/16", "10.0.0.0/8")] {
        let fixture = Fixture::with_cidrs(source, target);
        let err = fixture.orchestrator().create(&alpha_to_beta()).await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains(source) && message.contains(target));
        assert!(fixture.commands().is_empty());
    }
}

#[tokio::test]
async fn test_active_duplicate_is_refused_without_creating() {
    let fixture = Fixture::new();
    fixture.push_facts();
    fixture
        .kubectl
        .push_json(&peering_list(vec![peering("pcx-existing", "active")]));

    let err = fixture.orchestrator().create(&alpha_to_beta()).await.unwrap_err();

    let message = err.to_string();
    assert!(matches!(err, CliError::AlreadyExists { .. }));
    assert!(message.contains("already exists"));
    assert!(message.contains("pcx-existing"));
    assert!(message.contains("alpha") && message.contains("beta"));
    assert_eq!(fixture.create_commands(), 0);
    assert_eq!(
        fixture.commands(),
        vec!["get nodepool -o json", "get nodepool -o json", "get netpeerings -o json"]
    );
}

#[tokio::test]
async fn test_inactive_or_unrelated_peerings_do_not_block() {
    let fixture = Fixture::new();
    fixture.push_facts();
    let mut other_network = peering("pcx-other", "active");
    other_network["status"]["accepterNetId"] = Value::from("vpc-zzz");
    fixture.kubectl.push_json(&peering_list(vec![
        peering("pcx-deleted", "deleted"),
        other_network,
    ]));
    fixture.kubectl.push_success("{}");
    fixture
        .kubectl
        .push_json(&request_with_status("ignored", Some(PEERING_ID), "pending-acceptance"));
    fixture.kubectl.push_success("{}");
    fixture.kubectl.push_json(&peering(PEERING_ID, "active"));

    let outcome = fixture.orchestrator().create(&alpha_to_beta()).await.unwrap();
    assert!(matches!(outcome, CreateOutcome::Created { .. }));
}

#[tokio::test]
async fn test_request_in_wrong_state_stops_before_acceptance() {
    let fixture = Fixture::new();
    fixture.push_until_request_created();
    fixture
        .kubectl
        .push_json(&request_with_status("ignored", Some(PEERING_ID), "wrong-state"));

    let err = fixture.orchestrator().create(&alpha_to_beta()).await.unwrap_err();

    assert!(matches!(err, CliError::UnexpectedState { .. }));
    assert!(err.to_string().contains("wrong-state"));
    assert_eq!(fixture.create_commands(), 1);
}

#[tokio::test]
async fn test_success_after_third_poll() {
    let fixture = Fixture::new();
    push_until_acceptance(&fixture);
    fixture.kubectl.push_json(&peering(PEERING_ID, "pending-acceptance"));
    fixture.kubectl.push_json(&peering(PEERING_ID, "pending-acceptance"));
    fixture.kubectl.push_json(&peering(PEERING_ID, "active"));

    let outcome = fixture.orchestrator().create(&alpha_to_beta()).await.unwrap();

    let CreateOutcome::Created {
        net_peering,
        message,
    } = outcome
    else {
        panic!("expected a created peering");
    };
    assert_eq!(net_peering.peering_id(), Some(PEERING_ID));
    assert!(message.contains(PEERING_ID));
    assert!(message.contains("'alpha'") && message.contains("'beta'"));

    let commands = fixture.commands();
    assert_eq!(commands.len(), 9);
    assert_eq!(commands[3], "create -o json -f -");
    assert!(commands[4].starts_with("get netpeeringrequests -o json alpha-to-beta-"));
    assert_eq!(commands[5], "create -o json -f -");
    assert_eq!(
        &commands[6..],
        vec![format!("get netpeering {} -o json", PEERING_ID); 3].as_slice()
    );
    assert_eq!(fixture.kubectl.remaining(), 0);

    // settle delay, then one pause between each of the three polls
    assert_eq!(fixture.sleeper.sleeps(), vec![Duration::from_secs(3); 3]);
}

#[tokio::test]
async fn test_objects_are_sent_to_the_right_clusters() {
    let fixture = Fixture::new();
    push_until_acceptance(&fixture);
    fixture.kubectl.push_json(&peering(PEERING_ID, "active"));

    fixture.orchestrator().create(&alpha_to_beta()).await.unwrap();

    let calls = fixture.kubectl.calls();
    assert_eq!(calls[0].target.cluster_id, "cl-a");
    assert_eq!(calls[1].target.cluster_id, "cl-b");
    assert_eq!(calls[2].target.cluster_id, "cl-a");
    assert_eq!(calls[3].target.cluster_id, "cl-a");
    assert_eq!(calls[4].target.cluster_id, "cl-a");
    assert_eq!(calls[5].target.cluster_id, "cl-b");
    assert_eq!(calls[6].target.cluster_id, "cl-b");

    let request = stdin_of(&fixture, 3);
    assert_eq!(request["kind"], "NetPeeringRequest");
    assert_eq!(request["spec"]["accepterNetId"], TARGET_NET);
    assert_eq!(request["spec"]["accepterOwnerId"], TARGET_ACCOUNT);
    let request_name = request["metadata"]["name"].as_str().unwrap().to_string();
    assert!(request_name.ends_with("-npr"));
    assert!(fixture.commands()[4].ends_with(&request_name));

    let acceptance = stdin_of(&fixture, 5);
    assert_eq!(acceptance["kind"], "NetPeeringAcceptance");
    assert_eq!(acceptance["spec"]["netPeeringId"], PEERING_ID);
    let acceptance_name = acceptance["metadata"]["name"].as_str().unwrap();
    assert_eq!(
        acceptance_name.trim_end_matches("-npa"),
        request_name.trim_end_matches("-npr")
    );
}

#[tokio::test]
async fn test_dry_run_mutates_nothing() {
    let fixture = Fixture::new();
    fixture.push_facts();
    fixture.kubectl.push_json(&peering_list(vec![]));

    let request = CreateRequest {
        name: Some("mynetpeering-name".to_string()),
        dry_run: true,
        auto_approve: false,
        ..alpha_to_beta()
    };
    let outcome = fixture.orchestrator().create(&request).await.unwrap();

    let CreateOutcome::DryRun { request } = outcome else {
        panic!("expected a dry run");
    };
    let name = request.metadata.name.clone().unwrap();
    assert!(name.starts_with("mynetpeering-name-"));
    assert!(name.ends_with("-npr"));
    assert_eq!(request.spec.accepter_net_id, TARGET_NET);
    assert_eq!(fixture.create_commands(), 0);
    assert!(fixture.confirm.questions().is_empty());
    assert!(fixture.sleeper.sleeps().is_empty());
}

#[tokio::test]
async fn test_decline_before_request_creates_nothing() {
    let mut fixture = Fixture::new();
    fixture.confirm = ScriptedConfirm::answering(&[false]);
    fixture.push_facts();
    fixture.kubectl.push_json(&peering_list(vec![]));

    let request = CreateRequest {
        auto_approve: false,
        ..alpha_to_beta()
    };
    let outcome = fixture.orchestrator().create(&request).await.unwrap();

    assert!(matches!(outcome, CreateOutcome::Declined { .. }));
    assert_eq!(fixture.create_commands(), 0);
    assert_eq!(
        fixture.confirm.questions(),
        vec!["Are you sure you want to create NetPeering between projects alpha and beta?"]
    );
}

#[tokio::test]
async fn test_confirmed_before_request_proceeds() {
    let mut fixture = Fixture::new();
    fixture.confirm = ScriptedConfirm::answering(&[true]);
    push_until_acceptance(&fixture);
    fixture.kubectl.push_json(&peering(PEERING_ID, "active"));

    let request = CreateRequest {
        auto_approve: false,
        ..alpha_to_beta()
    };
    let outcome = fixture.orchestrator().create(&request).await.unwrap();

    assert!(matches!(outcome, CreateOutcome::Created { .. }));
    assert_eq!(fixture.confirm.questions().len(), 1);
}

#[tokio::test]
async fn test_decline_before_acceptance_deletes_request() {
    let mut fixture = Fixture::new();
    fixture.confirm = ScriptedConfirm::answering(&[false]);
    fixture.settings.confirm_stage = ConfirmStage::BeforeAcceptance;
    fixture.push_until_request_created();
    fixture
        .kubectl
        .push_json(&request_with_status("ignored", Some(PEERING_ID), "pending-acceptance"));
    fixture.kubectl.push_success("deleted");

    let request = CreateRequest {
        auto_approve: false,
        ..alpha_to_beta()
    };
    let outcome = fixture.orchestrator().create(&request).await.unwrap();

    let CreateOutcome::Declined { message } = outcome else {
        panic!("expected a declined outcome");
    };
    assert!(message.contains("deleted due to abort"));

    let request_name = stdin_of(&fixture, 3)["metadata"]["name"]
        .as_str()
        .unwrap()
        .to_string();
    let commands = fixture.commands();
    assert_eq!(
        commands.last().unwrap(),
        &format!("delete netpeeringrequests {}", request_name)
    );
    assert!(message.contains(&request_name));
    assert_eq!(fixture.create_commands(), 1);
    assert_eq!(fixture.kubectl.calls().last().unwrap().target.cluster_id, "cl-a");
}

#[tokio::test]
async fn test_failed_cleanup_after_decline_is_not_an_error() {
    let mut fixture = Fixture::new();
    fixture.settings.confirm_stage = ConfirmStage::BeforeAcceptance;
    fixture.push_until_request_created();
    fixture
        .kubectl
        .push_json(&request_with_status("ignored", Some(PEERING_ID), "pending-acceptance"));
    fixture.kubectl.push_failure("forbidden");

    let request = CreateRequest {
        auto_approve: false,
        ..alpha_to_beta()
    };
    let outcome = fixture.orchestrator().create(&request).await.unwrap();
    assert!(matches!(outcome, CreateOutcome::Declined { .. }));
}

#[tokio::test]
async fn test_request_create_failure_carries_stderr() {
    let fixture = Fixture::new();
    fixture.push_facts();
    fixture.kubectl.push_json(&peering_list(vec![]));
    fixture
        .kubectl
        .push_failure("error: the server doesn't have a resource type \"netpeeringrequests\"");

    let err = fixture.orchestrator().create(&alpha_to_beta()).await.unwrap_err();

    assert!(matches!(err, CliError::Create { .. }));
    assert!(err.to_string().contains("doesn't have a resource type"));
    assert!(fixture.sleeper.sleeps().is_empty());
}

#[tokio::test]
async fn test_request_fetch_failure_is_fatal() {
    let fixture = Fixture::new();
    fixture.push_until_request_created();
    fixture.kubectl.push_failure("NotFound");

    let err = fixture.orchestrator().create(&alpha_to_beta()).await.unwrap_err();

    assert!(matches!(&err, CliError::Fetch { detail, .. } if detail == "NotFound"));
    assert_eq!(fixture.create_commands(), 1);
}

#[tokio::test]
async fn test_request_without_peering_id_is_fetch_error() {
    let fixture = Fixture::new();
    fixture.push_until_request_created();
    fixture
        .kubectl
        .push_json(&request_with_status("ignored", None, "pending-acceptance"));

    let err = fixture.orchestrator().create(&alpha_to_beta()).await.unwrap_err();

    assert!(matches!(&err, CliError::Fetch { detail, .. } if detail.contains("netPeeringId")));
    assert_eq!(fixture.create_commands(), 1);
}

#[tokio::test]
async fn test_acceptance_create_failure() {
    let fixture = Fixture::new();
    fixture.push_until_request_created();
    fixture
        .kubectl
        .push_json(&request_with_status("ignored", Some(PEERING_ID), "pending-acceptance"));
    fixture.kubectl.push_failure("admission webhook denied the request");

    let err = fixture.orchestrator().create(&alpha_to_beta()).await.unwrap_err();

    assert!(matches!(&err, CliError::Create { object, .. } if object.starts_with("NetPeeringAcceptance")));
    assert!(err.to_string().contains("admission webhook"));
}

#[tokio::test]
async fn test_poll_fetch_failure_is_fatal() {
    let fixture = Fixture::new();
    push_until_acceptance(&fixture);
    fixture.kubectl.push_json(&peering(PEERING_ID, "pending-acceptance"));
    fixture.kubectl.push_failure("connection refused");

    let err = fixture.orchestrator().create(&alpha_to_beta()).await.unwrap_err();

    assert!(matches!(&err, CliError::Fetch { detail, .. } if detail == "connection refused"));
    assert_eq!(fixture.kubectl.remaining(), 0);
}

#[tokio::test]
async fn test_terminal_state_while_polling() {
    let fixture = Fixture::new();
    push_until_acceptance(&fixture);
    fixture.kubectl.push_json(&peering(PEERING_ID, "rejected"));

    let err = fixture.orchestrator().create(&alpha_to_beta()).await.unwrap_err();

    assert!(matches!(err, CliError::UnexpectedState { .. }));
    assert!(err.to_string().contains("rejected"));
    assert!(err.to_string().contains(PEERING_ID));
}

#[tokio::test]
async fn test_timeout_is_distinct_and_names_last_state() {
    let mut fixture = Fixture::new();
    fixture.settings = fast_settings();
    push_until_acceptance(&fixture);
    for _ in 0..4 {
        fixture.kubectl.push_json(&peering(PEERING_ID, "pending-acceptance"));
    }

    let err = fixture.orchestrator().create(&alpha_to_beta()).await.unwrap_err();

    match &err {
        CliError::Timeout {
            object,
            waited_secs,
            last_state,
        } => {
            assert!(object.contains(PEERING_ID));
            assert_eq!(*waited_secs, 9);
            assert_eq!(last_state, "pending-acceptance");
        }
        other => panic!("expected a timeout, got {:?}", other),
    }
    assert_eq!(fixture.kubectl.remaining(), 0);
    // settle delay plus three poll intervals
    assert_eq!(fixture.sleeper.total(), Duration::from_secs(12));
}

#[tokio::test]
async fn test_zero_poll_interval_is_bounded_by_timeout() {
    let mut fixture = Fixture::new();
    fixture.settings = NetPeeringSettings {
        poll_interval: Duration::ZERO,
        timeout: Duration::from_secs(2),
        ..NetPeeringSettings::default()
    };
    push_until_acceptance(&fixture);
    for _ in 0..3 {
        fixture.kubectl.push_json(&peering(PEERING_ID, "pending-acceptance"));
    }

    let err = fixture.orchestrator().create(&alpha_to_beta()).await.unwrap_err();

    assert!(matches!(err, CliError::Timeout { waited_secs: 2, .. }));
    assert_eq!(fixture.kubectl.remaining(), 0);
}

#[tokio::test]
async fn test_provider_api_facts_skip_node_pools() {
    let mut fixture = Fixture::new();
    fixture.settings.facts_source = FactsSource::ProviderApi;
    for (project, net, account) in [
        ("proj-a", SOURCE_NET, SOURCE_ACCOUNT),
        ("proj-b", TARGET_NET, TARGET_ACCOUNT),
    ] {
        fixture.oks.set_nets(
            project,
            vec![Net {
                net_id: net.to_string(),
                ..Default::default()
            }],
        );
        fixture.oks.set_quotas(
            project,
            vec![Quota {
                account_id: Some(account.to_string()),
                ..Default::default()
            }],
        );
    }
    fixture
        .kubectl
        .push_json(&peering_list(vec![peering("pcx-existing", "active")]));

    let err = fixture.orchestrator().create(&alpha_to_beta()).await.unwrap_err();

    assert!(matches!(err, CliError::AlreadyExists { .. }));
    assert_eq!(fixture.commands(), vec!["get netpeerings -o json"]);
}

#[tokio::test]
async fn test_delete_dry_run_never_deletes() {
    let fixture = Fixture::new();

    let outcome = fixture
        .orchestrator()
        .delete(&alpha_selection(), "pcx-dryrun1", true, false)
        .await
        .unwrap();

    assert!(matches!(outcome, DeleteOutcome::DryRun { .. }));
    assert_eq!(
        outcome.message(),
        "Dry run: The netpeering pcx-dryrun1 would be deleted."
    );
    assert!(fixture.commands().is_empty());
}

#[tokio::test]
async fn test_delete_with_force() {
    let fixture = Fixture::new();
    fixture.kubectl.push_success("netpeering.oks.dev \"pcx-1\" deleted");

    let outcome = fixture
        .orchestrator()
        .delete(&alpha_selection(), "pcx-1", false, true)
        .await
        .unwrap();

    assert!(matches!(outcome, DeleteOutcome::Deleted { .. }));
    assert!(outcome.message().contains("pcx-1"));
    assert!(outcome.message().contains("both projects"));
    assert_eq!(fixture.commands(), vec!["delete netpeering pcx-1"]);
    assert_eq!(fixture.kubectl.calls()[0].target.cluster_id, "cl-a");
    assert!(fixture.confirm.questions().is_empty());
}

#[tokio::test]
async fn test_delete_declined() {
    let fixture = Fixture::new();

    let outcome = fixture
        .orchestrator()
        .delete(&alpha_selection(), "pcx-1", false, false)
        .await
        .unwrap();

    assert!(matches!(outcome, DeleteOutcome::Declined { .. }));
    assert!(fixture.commands().is_empty());
    assert_eq!(fixture.confirm.questions().len(), 1);
}

#[tokio::test]
async fn test_delete_failure_carries_stderr() {
    let fixture = Fixture::new();
    fixture
        .kubectl
        .push_failure("Error from server (NotFound): netpeerings.oks.dev \"pcx-1\" not found");

    let err = fixture
        .orchestrator()
        .delete(&alpha_selection(), "pcx-1", false, true)
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::Delete { .. }));
    assert!(err.to_string().contains("not found"));
}

fn push_mixed_list(fixture: &Fixture) {
    fixture.kubectl.push_json(&peering_list(vec![
        peering("pcx-active", "active"),
        peering("pcx-deleted", "deleted"),
    ]));
}

async fn list_ids(fixture: &Fixture, filter: StatusFilter) -> Vec<String> {
    match fixture
        .orchestrator()
        .list(&alpha_selection(), filter, false)
        .await
        .unwrap()
    {
        Fetched::Parsed(peerings) => peerings
            .iter()
            .filter_map(|p| p.peering_id().map(str::to_string))
            .collect(),
        Fetched::Raw(_) => panic!("expected parsed peerings"),
    }
}

#[tokio::test]
async fn test_list_status_filter() {
    let fixture = Fixture::new();
    push_mixed_list(&fixture);
    push_mixed_list(&fixture);
    push_mixed_list(&fixture);

    assert_eq!(list_ids(&fixture, StatusFilter::Active).await, vec!["pcx-active"]);
    assert_eq!(list_ids(&fixture, StatusFilter::Deleted).await, vec!["pcx-deleted"]);
    assert_eq!(
        list_ids(&fixture, StatusFilter::All).await,
        vec!["pcx-active", "pcx-deleted"]
    );
    assert_eq!(fixture.commands(), vec!["get netpeerings -o json"; 3]);
}

#[tokio::test]
async fn test_list_wide_is_verbatim() {
    let fixture = Fixture::new();
    let table = "NAME           STATE    AGE\npcx-active     active   3d\n";
    fixture.kubectl.push_success(table);

    let listing = fixture
        .orchestrator()
        .list(&alpha_selection(), StatusFilter::Active, true)
        .await
        .unwrap();

    assert!(matches!(listing, Fetched::Raw(raw) if raw == table));
    assert_eq!(fixture.commands(), vec!["get netpeerings -o wide"]);
}

#[tokio::test]
async fn test_list_failure() {
    let fixture = Fixture::new();
    fixture.kubectl.push_failure("Unauthorized");

    let err = fixture
        .orchestrator()
        .list(&alpha_selection(), StatusFilter::All, false)
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::Fetch { .. }));
}

#[tokio::test]
async fn test_get_single_peering() {
    let fixture = Fixture::new();
    fixture.kubectl.push_json(&peering(PEERING_ID, "active"));

    let fetched = fixture
        .orchestrator()
        .get(&alpha_selection(), PEERING_ID, false)
        .await
        .unwrap();

    let Fetched::Parsed(peering) = fetched else {
        panic!("expected a parsed peering");
    };
    assert_eq!(peering.state_str(), Some("active"));
    assert_eq!(
        fixture.commands(),
        vec![format!("get netpeering {} -o json", PEERING_ID)]
    );
}

#[tokio::test]
async fn test_unknown_context_project() {
    let fixture = Fixture::new();

    let err = fixture
        .orchestrator()
        .list(&ClusterSelection::new("gamma", "gamma-k8s"), StatusFilter::All, false)
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::NotFound(_)));
    assert!(fixture.commands().is_empty());
}

#[test]
fn test_filter_by_status_keeps_order() {
    let peerings: Vec<NetPeering> = ["active", "deleted", "active"]
        .iter()
        .enumerate()
        .map(|(i, state)| parse_net_peering(peering(&format!("pcx-{}", i), state)).unwrap())
        .collect();

    let active = filter_by_status(peerings, StatusFilter::Active);
    let ids: Vec<_> = active.iter().filter_map(NetPeering::peering_id).collect();
    assert_eq!(ids, vec!["pcx-0", "pcx-2"]);
}

#[test]
fn test_state_names() {
    assert_eq!(CreateState::AwaitingPendingState.to_string(), "AwaitingPendingState");
    assert_eq!(CreateState::Aborted.to_string(), "Aborted");
}
