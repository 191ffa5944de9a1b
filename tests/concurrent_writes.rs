mod common;

use bracket_matchbot::models::{AdminClaim, MatchStatus, Side, SlotSource};
use bracket_matchbot::{Bracket, BracketError};
use chrono::Utc;
use common::{seeded, Interleaved, FINAL, SEMI};

#[tokio::test]
async fn feeders_finishing_together_both_fill_the_final() {
    let bracket = Bracket::new(Interleaved::new(seeded()));
    let mut sibling = bracket.get_match(FINAL).await.unwrap();
    sibling.resolve_slot(Side::B, 3);
    bracket.store().before_next_write(sibling);

    bracket.submit_score(SEMI, "p1", 11, 7).await.unwrap();
    let outcome = bracket.confirm_score(SEMI, "p2").await.unwrap();
    assert!(outcome.warnings.is_empty());
    let propagation = outcome.propagation.unwrap();
    assert_eq!(propagation.resolved, vec![(FINAL, Side::A)]);
    assert_eq!(propagation.promoted, vec![FINAL]);

    let last = bracket.get_match(FINAL).await.unwrap();
    assert_eq!(last.team_a, Some(1));
    assert_eq!(last.team_b, Some(3));
    assert_eq!(last.slot_a, SlotSource::Team(1));
    assert_eq!(last.status, MatchStatus::Scheduled);
}

#[tokio::test]
async fn admin_result_landing_first_turns_confirmation_into_conflict() {
    let bracket = Bracket::new(Interleaved::new(seeded()));
    bracket.submit_score(SEMI, "p1", 11, 7).await.unwrap();

    let mut forced = bracket.get_match(SEMI).await.unwrap();
    forced.score_a = Some(2);
    forced.score_b = Some(11);
    forced.confirmed_a = true;
    forced.confirmed_b = true;
    forced.finalized_by_admin = true;
    forced.admin_final_by = Some("mod".to_string());
    forced.admin_final_at = Some(Utc::now());
    forced.status = MatchStatus::Completed;
    forced.winner = Some(2);
    bracket.store().before_next_write(forced);

    let err = bracket.confirm_score(SEMI, "p2").await.unwrap_err();
    assert!(matches!(err, BracketError::Conflict(SEMI)));
    assert_eq!(err.code(), "wrong_state");

    let current = bracket.get_match(SEMI).await.unwrap();
    assert!(current.finalized_by_admin);
    assert_eq!(current.winner, Some(2));
}

#[tokio::test]
async fn racing_submissions_leave_the_first_one_standing() {
    let bracket = Bracket::new(Interleaved::new(seeded()));
    let mut rival = bracket.get_match(SEMI).await.unwrap();
    rival.score_a = Some(3);
    rival.score_b = Some(11);
    rival.submitted_by = Some("p2".to_string());
    rival.confirmed_b = true;
    bracket.store().before_next_write(rival);

    let err = bracket.submit_score(SEMI, "p1", 11, 3).await.unwrap_err();
    assert!(matches!(err, BracketError::Conflict(SEMI)));
    assert_eq!(err.code(), "wrong_state");
    let current = bracket.get_match(SEMI).await.unwrap();
    assert_eq!(current.submitted_by.as_deref(), Some("p2"));
}

#[tokio::test]
async fn replaying_propagation_needs_a_decided_match_and_an_admin() {
    let bracket = Bracket::new(Interleaved::new(seeded()));
    let err = bracket
        .propagate_from(SEMI, &AdminClaim::global("root"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "wrong_state");

    bracket.submit_score(SEMI, "p1", 11, 7).await.unwrap();
    bracket.confirm_score(SEMI, "p2").await.unwrap();
    let err = bracket
        .propagate_from(SEMI, &AdminClaim::club("mod", 8))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "unauthorized");
}
