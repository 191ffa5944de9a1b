mod common;

use bracket_matchbot::captain::Captains;
use bracket_matchbot::completion;
use bracket_matchbot::consensus::{self, Score};
use bracket_matchbot::models::{AdminClaim, MatchStatus, Side, SlotSource, TournamentStatus};
use bracket_matchbot::store::{BracketStore, MatchGuard};
use bracket_matchbot::{Bracket, BracketError, ErrorKind};
use chrono::Utc;
use common::{seeded, CUP, FINAL, OTHER_SEMI, PHANTOM, SCORED_PHANTOM, SEMI};

#[tokio::test]
async fn submitter_cannot_confirm_their_own_score() {
    let bracket = Bracket::new(seeded());
    bracket.submit_score(SEMI, "p1", 11, 7).await.unwrap();
    let err = bracket.confirm_score(SEMI, "p1").await.unwrap_err();
    assert!(matches!(err, BracketError::SelfConfirmation));
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[tokio::test]
async fn non_captain_member_cannot_submit() {
    let bracket = Bracket::new(seeded());
    let err = bracket.submit_score(SEMI, "p9", 11, 7).await.unwrap_err();
    assert!(matches!(err, BracketError::NotCaptain(_)));
}

#[tokio::test]
async fn resubmission_requires_fresh_confirmation() {
    let bracket = Bracket::new(seeded());
    bracket.submit_score(SEMI, "p1", 11, 7).await.unwrap();
    let outcome = bracket.submit_score(SEMI, "p2", 7, 11).await.unwrap();
    assert!(outcome.updated.confirmed_b);
    assert!(!outcome.updated.confirmed_a);
    assert_eq!(outcome.updated.submitted_by.as_deref(), Some("p2"));

    let err = bracket.confirm_score(SEMI, "p2").await.unwrap_err();
    assert!(matches!(err, BracketError::SelfConfirmation));
    let done = bracket.confirm_score(SEMI, "p1").await.unwrap();
    assert_eq!(done.updated.winner, Some(2));
}

#[tokio::test]
async fn tied_scores_are_refused() {
    let bracket = Bracket::new(seeded());
    let err = bracket.submit_score(SEMI, "p1", 9, 9).await.unwrap_err();
    assert!(matches!(err, BracketError::InvalidScore(9, 9)));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = bracket
        .admin_finalize(SEMI, &AdminClaim::global("root"), 4, 4)
        .await
        .unwrap_err();
    assert!(matches!(err, BracketError::TiedScoreNotAllowed(4)));
    let untouched = bracket.get_match(SEMI).await.unwrap();
    assert_eq!(untouched.status, MatchStatus::InPlay);
    assert_eq!(untouched.score_a, None);
}

#[tokio::test]
async fn negative_scores_are_invalid_input() {
    let bracket = Bracket::new(seeded());
    let err = bracket.submit_score(SEMI, "p1", -3, 1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn empty_team_leaves_captains_unresolved() {
    let store = seeded();
    store.remove_member(2, "p2").unwrap();
    store.remove_member(2, "p8").unwrap();
    let bracket = Bracket::new(store);
    let err = bracket.submit_score(SEMI, "p1", 11, 7).await.unwrap_err();
    assert!(matches!(err, BracketError::CaptainsUnresolved(2)));
}

#[tokio::test]
async fn captain_moves_to_next_smallest_member() {
    let store = seeded();
    store.remove_member(1, "p1").unwrap();
    let bracket = Bracket::new(store);
    let roster = bracket.roster(1).await.unwrap();
    assert_eq!(roster.captain.as_deref(), Some("p9"));
    bracket.submit_score(SEMI, "p9", 11, 7).await.unwrap();
}

#[tokio::test]
async fn stale_write_is_rejected() {
    let bracket = Bracket::new(seeded());
    let stale = bracket.get_match(SEMI).await.unwrap();
    bracket.submit_score(SEMI, "p2", 3, 11).await.unwrap();

    let captains = Captains::resolve(bracket.store(), &stale).await.unwrap();
    let late = consensus::submit(&stale, &captains, "p1", Score { a: 11, b: 3 }, Utc::now())
        .unwrap();
    let written = bracket
        .store()
        .update_match(&MatchGuard::of(&stale), &late)
        .await
        .unwrap();
    assert_eq!(written, None);
    let current = bracket.get_match(SEMI).await.unwrap();
    assert_eq!(current.submitted_by.as_deref(), Some("p2"));
}

#[tokio::test]
async fn admin_outside_the_club_is_refused() {
    let bracket = Bracket::new(seeded());
    let err = bracket
        .admin_finalize(SEMI, &AdminClaim::club("mod", 8), 11, 7)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[tokio::test]
async fn bracket_runs_to_a_champion() {
    let bracket = Bracket::new(seeded());

    bracket.submit_score(SEMI, "p1", 11, 7).await.unwrap();
    let outcome = bracket.confirm_score(SEMI, "p2").await.unwrap();
    assert_eq!(outcome.updated.status, MatchStatus::Completed);
    assert_eq!(outcome.updated.winner, Some(1));
    assert!(outcome.warnings.is_empty());

    let propagation = outcome.propagation.unwrap();
    assert_eq!(propagation.resolved, vec![(FINAL, Side::A)]);
    assert!(propagation.promoted.is_empty());

    let report = outcome.completion.unwrap();
    assert_eq!(report.deleted, vec![PHANTOM]);
    assert!(!report.completion.completed);
    assert_eq!(report.completion.final_round, Some(2));
    assert!(!report.closed);
    assert!(bracket.get_match(PHANTOM).await.is_err());
    assert!(bracket.get_match(SCORED_PHANTOM).await.is_ok());

    let last = bracket.get_match(FINAL).await.unwrap();
    assert_eq!(last.status, MatchStatus::Open);
    assert_eq!(last.team_a, Some(1));
    assert_eq!(last.slot_a, SlotSource::Team(1));
    assert_eq!(last.slot_b, SlotSource::WinnerOfMatch(OTHER_SEMI));

    bracket.submit_score(OTHER_SEMI, "p3", 13, 4).await.unwrap();
    let outcome = bracket.confirm_score(OTHER_SEMI, "p4").await.unwrap();
    let propagation = outcome.propagation.unwrap();
    assert_eq!(propagation.resolved, vec![(FINAL, Side::B)]);
    assert_eq!(propagation.promoted, vec![FINAL]);
    assert_eq!(
        bracket.get_match(FINAL).await.unwrap().status,
        MatchStatus::Scheduled
    );

    let matches = bracket.store().matches_in_tournament(CUP).await.unwrap();
    assert!(!completion::derive(&matches).completed);

    let admin = AdminClaim::club("mod", 7);
    bracket.start_match(FINAL, &admin).await.unwrap();
    bracket.submit_score(FINAL, "p3", 5, 11).await.unwrap();
    let outcome = bracket.confirm_score(FINAL, "p1").await.unwrap();
    assert_eq!(outcome.updated.winner, Some(3));

    let report = outcome.completion.unwrap();
    assert!(report.completion.completed);
    assert_eq!(report.champion, Some(3));
    assert!(report.closed);
    let cup = bracket.store().get_tournament(CUP).await.unwrap().unwrap();
    assert_eq!(cup.status, TournamentStatus::Completed);

    let again = bracket.check_completion(CUP).await.unwrap();
    assert!(again.completion.completed);
    assert!(!again.closed);
}

#[tokio::test]
async fn admin_result_is_final() {
    let bracket = Bracket::new(seeded());
    bracket.submit_score(SEMI, "p1", 11, 7).await.unwrap();
    let outcome = bracket
        .admin_finalize(SEMI, &AdminClaim::global("root"), 3, 11)
        .await
        .unwrap();
    assert!(outcome.updated.finalized_by_admin);
    assert_eq!(outcome.updated.winner, Some(2));
    assert_eq!(
        bracket.get_match(FINAL).await.unwrap().team_a,
        Some(2)
    );

    let err = bracket.confirm_score(SEMI, "p2").await.unwrap_err();
    assert!(matches!(err, BracketError::AlreadyFinalized(SEMI)));
    let err = bracket
        .admin_finalize(SEMI, &AdminClaim::global("root"), 11, 3)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WrongState);
}

#[tokio::test]
async fn propagation_can_be_replayed() {
    let bracket = Bracket::new(seeded());
    bracket.submit_score(SEMI, "p1", 11, 7).await.unwrap();
    bracket.confirm_score(SEMI, "p2").await.unwrap();
    let replay = bracket.propagate_from(SEMI, &AdminClaim::club("mod", 7)).await.unwrap();
    assert!(replay.resolved.is_empty());
    assert!(replay.promoted.is_empty());
    assert!(replay.warnings.is_empty());
}

#[tokio::test]
async fn unknown_match_is_not_found() {
    let bracket = Bracket::new(seeded());
    let err = bracket.confirm_score(99, "p1").await.unwrap_err();
    assert_eq!(err.code(), "not_found");
}
