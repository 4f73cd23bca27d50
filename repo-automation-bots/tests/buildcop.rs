mod common;

use chrono::TimeDelta;
use common::{closed_issue, fixture, now, open_issue, xunit_payload, FakeTracker};
use repo_automation_bots::buildcop::{BuildCop, FLAKY_LABEL};
use repo_automation_bots::events::BuildResultPayload;
use repo_automation_bots::{BuildCopSettings, IssueState, ParseError};
use std::sync::Arc;

const REPO: &str = "tbpg/golang-samples";
const SAMPLE: &str = "spanner/spanner_snippets: TestSample failed";
const CREATE_DATABASE: &str = "spanner/spanner_snippets: TestCreateDatabase failed";

fn buildcop(tracker: &Arc<FakeTracker>) -> BuildCop {
    BuildCop::new(tracker.clone(), &BuildCopSettings::default())
}

#[tokio::test]
async fn new_failure_opens_issue() {
    let tracker = Arc::new(FakeTracker::default());
    let payload = xunit_payload(REPO, &fixture("go_one_failed.xml"));

    let (repo, summary) = buildcop(&tracker).handle(&payload, now()).await.unwrap();

    assert_eq!(repo.full_name(), REPO);
    assert_eq!(summary.opened, 1);
    assert_eq!(summary.skipped, 1);

    let state = tracker.state();
    assert_eq!(state.created.len(), 1);
    let issue = &state.created[0];
    assert_eq!(issue.title, SAMPLE);
    assert_eq!(
        issue.body,
        "This test failed!\n\nTo configure my behavior, see [the Build Cop Bot documentation](https://github.com/googleapis/repo-automation-bots/tree/master/packages/buildcop).\n\nIf I'm commenting on this issue too often, add the `buildcop: quiet` label and\nI will stop commenting.\n\n---\n\ncommit: 123\nbuildURL: http://example.com\nstatus: failed"
    );
    assert_eq!(issue.labels, ["type: bug", "priority: p1", "buildcop: issue"]);
    assert!(state.comments.is_empty());
}

#[tokio::test]
async fn repeated_failure_comments_on_open_issue() {
    let tracker = Arc::new(FakeTracker::new(vec![open_issue(
        16,
        SAMPLE,
        &["buildcop: issue"],
    )]));
    let payload = xunit_payload(REPO, &fixture("go_one_failed.xml"));

    let (_, summary) = buildcop(&tracker).handle(&payload, now()).await.unwrap();

    assert_eq!(summary.commented, 1);
    assert_eq!(summary.opened, 0);
    assert_eq!(
        tracker.state().comments,
        vec![(
            16,
            "commit: 123\nbuildURL: http://example.com\nstatus: failed".to_string()
        )]
    );
}

#[tokio::test]
async fn pass_closes_open_issue() {
    let tracker = Arc::new(FakeTracker::new(vec![open_issue(
        16,
        SAMPLE,
        &["buildcop: issue"],
    )]));
    let payload = xunit_payload(REPO, &fixture("go_all_passed.xml"));

    let (_, summary) = buildcop(&tracker).handle(&payload, now()).await.unwrap();

    assert_eq!(summary.closed, 1);
    let state = tracker.state();
    assert_eq!(
        state.comments,
        vec![(
            16,
            "Test passed for commit 123 (http://example.com)! Closing this issue.".to_string()
        )]
    );
    assert_eq!(state.state_changes, vec![(16, IssueState::Closed)]);
    assert!(state.created.is_empty());
}

#[tokio::test]
async fn mixed_result_marks_open_issue_flaky() {
    let tracker = Arc::new(FakeTracker::new(vec![open_issue(
        16,
        SAMPLE,
        &["buildcop: issue"],
    )]));
    let payload = xunit_payload(REPO, &fixture("go_flaky.xml"));

    let (_, summary) = buildcop(&tracker).handle(&payload, now()).await.unwrap();

    assert_eq!(summary.marked_flaky, 1);
    assert!(tracker.issue(16).is_open());
    assert!(tracker.issue(16).has_label(FLAKY_LABEL));

    let state = tracker.state();
    assert_eq!(state.added_labels, vec![(16, vec![FLAKY_LABEL.to_string()])]);
    assert_eq!(
        state.comments[0].1,
        "Looks like this issue is flaky. :worried:\n\nI'm going to leave this open and stop commenting.\n\nA human should fix and close this.\n\n---\n\ncommit: 123\nbuildURL: http://example.com\nstatus: passed"
    );
}

#[tokio::test]
async fn failure_on_recently_closed_issue_reopens_it_as_flaky() {
    let tracker = Arc::new(FakeTracker::new(vec![closed_issue(
        16,
        SAMPLE,
        TimeDelta::days(3),
    )]));
    let payload = xunit_payload(REPO, &fixture("go_one_failed.xml"));

    let (_, summary) = buildcop(&tracker).handle(&payload, now()).await.unwrap();

    assert_eq!(summary.reopened, 1);
    assert_eq!(summary.opened, 0);

    let issue = tracker.issue(16);
    assert!(issue.is_open());
    assert!(issue.has_label(FLAKY_LABEL));

    let state = tracker.state();
    assert_eq!(state.state_changes, vec![(16, IssueState::Open)]);
    assert_eq!(
        state.comments[0].1,
        "Oops! Looks like this issue is still flaky. :grimacing:\n\nI reopened the issue, but a human will need to close it again.\n\n---\n\ncommit: 123\nbuildURL: http://example.com\nstatus: failed"
    );
}

#[tokio::test]
async fn flaky_window_boundary_is_inclusive() {
    let tracker = Arc::new(FakeTracker::new(vec![closed_issue(
        16,
        SAMPLE,
        TimeDelta::days(10),
    )]));
    let payload = xunit_payload(REPO, &fixture("go_one_failed.xml"));

    let (_, summary) = buildcop(&tracker).handle(&payload, now()).await.unwrap();

    assert_eq!(summary.reopened, 1);
    assert!(tracker.state().created.is_empty());
}

#[tokio::test]
async fn failure_on_stale_closed_issue_opens_new_issue_with_note() {
    let tracker = Arc::new(FakeTracker::new(vec![closed_issue(
        16,
        SAMPLE,
        TimeDelta::days(11),
    )]));
    let payload = xunit_payload(REPO, &fixture("go_one_failed.xml"));

    let (_, summary) = buildcop(&tracker).handle(&payload, now()).await.unwrap();

    assert_eq!(summary.opened, 1);
    assert!(!tracker.issue(16).is_open());

    let state = tracker.state();
    assert_eq!(state.created[0].title, SAMPLE);
    assert_eq!(
        state.created[0].body,
        "Note: #16 was also for this test, but it was closed more than 10 days ago. So, I didn't mark it flaky.\n\n----\n\ncommit: 123\nbuildURL: http://example.com\nstatus: failed"
    );
}

#[tokio::test]
async fn failure_on_locked_closed_issue_opens_new_issue_with_note() {
    let mut locked = closed_issue(16, SAMPLE, TimeDelta::days(1));
    locked.locked = true;
    let tracker = Arc::new(FakeTracker::new(vec![locked]));
    let payload = xunit_payload(REPO, &fixture("go_one_failed.xml"));

    let (_, summary) = buildcop(&tracker).handle(&payload, now()).await.unwrap();

    assert_eq!(summary.opened, 1);
    let state = tracker.state();
    assert!(state.comments.is_empty());
    assert!(state.state_changes.is_empty());
    assert_eq!(
        state.created[0].body,
        "Note: #16 was also for this test, but it is locked\n\n----\n\ncommit: 123\nbuildURL: http://example.com\nstatus: failed"
    );
}

#[tokio::test]
async fn failure_on_locked_open_issue_opens_replacement() {
    let mut locked = open_issue(16, SAMPLE, &["buildcop: issue"]);
    locked.locked = true;
    let tracker = Arc::new(FakeTracker::new(vec![locked]));
    let bot = buildcop(&tracker);
    let payload = xunit_payload(REPO, &fixture("go_one_failed.xml"));

    let (_, first) = bot.handle(&payload, now()).await.unwrap();

    assert_eq!(first.opened, 1);
    {
        let state = tracker.state();
        assert!(state.comments.is_empty());
        assert_eq!(state.created[0].title, SAMPLE);
        assert_eq!(
            state.created[0].body,
            "Note: #16 was also for this test, but it is locked\n\n----\n\ncommit: 123\nbuildURL: http://example.com\nstatus: failed"
        );
    }

    let (_, second) = bot.handle(&payload, now()).await.unwrap();

    assert_eq!(second.opened, 0);
    assert_eq!(second.commented, 1);
    assert_eq!(second.duplicates_closed, 0);
    assert!(tracker.issue(16).is_open());
    let state = tracker.state();
    assert_eq!(state.created.len(), 1);
    assert_eq!(state.comments[0].0, 17);
}

#[tokio::test]
async fn duplicate_open_issues_are_closed() {
    let tracker = Arc::new(FakeTracker::new(vec![
        open_issue(16, SAMPLE, &["buildcop: issue"]),
        open_issue(19, SAMPLE, &["buildcop: issue"]),
    ]));
    let payload = xunit_payload(REPO, &fixture("go_one_failed.xml"));

    let (_, summary) = buildcop(&tracker).handle(&payload, now()).await.unwrap();

    assert_eq!(summary.duplicates_closed, 1);
    assert_eq!(summary.commented, 1);
    assert!(!tracker.issue(16).is_open());
    assert!(tracker.issue(19).is_open());

    let state = tracker.state();
    assert_eq!(
        state.comments[0],
        (16, "Closing as a duplicate of #19".to_string())
    );
    assert_eq!(state.comments[1].0, 19);
}

#[tokio::test]
async fn replaying_a_report_does_not_open_a_second_issue() {
    let tracker = Arc::new(FakeTracker::default());
    let bot = buildcop(&tracker);
    let payload = xunit_payload(REPO, &fixture("go_one_failed.xml"));

    let (_, first) = bot.handle(&payload, now()).await.unwrap();
    let (_, second) = bot.handle(&payload, now()).await.unwrap();

    assert_eq!(first.opened, 1);
    assert_eq!(second.opened, 0);
    assert_eq!(second.commented, 1);
    assert_eq!(tracker.state().created.len(), 1);
}

#[tokio::test]
async fn pull_requests_are_never_matched() {
    let mut pull_request = open_issue(16, SAMPLE, &["buildcop: issue"]);
    pull_request.is_pull_request = true;
    let tracker = Arc::new(FakeTracker::new(vec![pull_request]));
    let payload = xunit_payload(REPO, &fixture("go_one_failed.xml"));

    let (_, summary) = buildcop(&tracker).handle(&payload, now()).await.unwrap();

    assert_eq!(summary.opened, 1);
    assert!(tracker.state().comments.is_empty());
}

#[tokio::test]
async fn whole_build_failure_uses_build_title() {
    let tracker = Arc::new(FakeTracker::default());
    let payload = BuildResultPayload {
        repo: Some(REPO.to_string()),
        tests_failed: Some(true),
        ..BuildResultPayload::default()
    };

    let (_, summary) = buildcop(&tracker).handle(&payload, now()).await.unwrap();

    assert_eq!(summary.opened, 1);
    let state = tracker.state();
    assert_eq!(state.created[0].title, "The build failed");
    assert!(state.created[0]
        .body
        .ends_with("commit: unknown\nbuildURL: unknown\nstatus: failed"));
}

#[tokio::test]
async fn malformed_report_takes_no_action() {
    let tracker = Arc::new(FakeTracker::new(vec![open_issue(
        16,
        SAMPLE,
        &["buildcop: issue"],
    )]));
    let bot = buildcop(&tracker);

    let truncated = xunit_payload(REPO, &fixture("truncated.xml"));
    assert!(bot.handle(&truncated, now()).await.is_err());

    let mut not_base64 = xunit_payload(REPO, "");
    not_base64.xunit_xml = Some("not base64!".to_string());
    assert!(matches!(
        bot.handle(&not_base64, now()).await,
        Err(ParseError::Base64(_))
    ));

    let no_repo = BuildResultPayload {
        tests_failed: Some(true),
        ..BuildResultPayload::default()
    };
    assert!(matches!(
        bot.handle(&no_repo, now()).await,
        Err(ParseError::MissingRepository)
    ));

    assert_eq!(tracker.state().writes(), 0);
}

#[tokio::test]
async fn api_failure_does_not_stop_the_batch() {
    let tracker = Arc::new(FakeTracker::new(vec![open_issue(
        16,
        SAMPLE,
        &["buildcop: issue"],
    )]));
    tracker.state().fail_comments_on.insert(16);
    let payload = xunit_payload(REPO, &fixture("go_two_failed.xml"));

    let (_, summary) = buildcop(&tracker).handle(&payload, now()).await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.opened, 1);
    assert!(summary.has_failures());
    assert_eq!(tracker.state().created[0].title, CREATE_DATABASE);
}

#[tokio::test]
async fn failed_issue_listing_still_files_failures() {
    let tracker = Arc::new(FakeTracker::default());
    tracker.state().fail_list = true;
    let payload = xunit_payload(REPO, &fixture("go_one_failed.xml"));

    let (_, summary) = buildcop(&tracker).handle(&payload, now()).await.unwrap();

    assert_eq!(summary.opened, 1);
}
