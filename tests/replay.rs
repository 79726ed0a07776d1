use liquid_sort::gameplay::{ControlAction, GameSession};
use liquid_sort::generator::generate_level;
use liquid_sort::mode::Mode;
use liquid_sort::rules;
use proptest::prelude::*;

fn play(session: &mut GameSession, picks: &[usize]) -> usize {
    let mut played = 0;
    for pick in picks {
        let moves = rules::legal_moves(session.layout());
        if moves.is_empty() || session.is_won() {
            break;
        }
        let m = moves[pick % moves.len()];
        assert!(session.request_pour(m.from, m.to));
        played += 1;
    }
    played
}

proptest! {
    #[test]
    fn random_pours_keep_layer_totals(
        index in 1u32..200,
        picks in proptest::collection::vec(0usize..64, 0..40),
    ) {
        let level = generate_level(index, Mode::Normal);
        let capacity = level.metadata.layer_capacity;
        let colors = level.layout.colors();
        let mut session = GameSession::new(level).with_pour_delay(0.0);
        let played = play(&mut session, &picks);

        prop_assert_eq!(session.moves() as usize, played);
        for color in colors {
            prop_assert_eq!(session.layout().count_color(color), capacity);
        }
        for container in session.layout().get_containers() {
            prop_assert!(container.len() <= capacity);
        }
        prop_assert_eq!(session.is_won(), rules::is_solved(session.layout()));
    }

    #[test]
    fn undo_walks_back_to_the_start(
        index in 1u32..200,
        picks in proptest::collection::vec(0usize..64, 1..20),
    ) {
        let level = generate_level(index, Mode::Quick);
        let start = level.layout.clone();
        let mut session = GameSession::new(level).with_pour_delay(0.0);
        let played = play(&mut session, &picks);
        let end = session.layout().clone();

        for _ in 0..played {
            session.handle_action(ControlAction::Undo);
        }
        prop_assert_eq!(session.layout(), &start);
        prop_assert_eq!(session.moves(), 0);
        prop_assert!(!session.can_undo());

        for _ in 0..played {
            session.handle_action(ControlAction::Redo);
        }
        prop_assert_eq!(session.layout(), &end);
        prop_assert_eq!(session.moves() as usize, played);
    }
}

#[test]
fn mismatched_tops_reject_both_ways_in_a_session() {
    let layout: liquid_sort::model::Layout = "AB\nBA\n..\n..".parse().expect("layout");
    assert!(!rules::can_pour_at(&layout, 0, 1));
    assert!(!rules::can_pour_at(&layout, 1, 0));

    let mut level = generate_level(1, Mode::Normal);
    level.layout = layout;
    let mut session = GameSession::new(level).with_pour_delay(0.0);
    assert!(!session.request_pour(0, 1));
    assert!(!session.request_pour(1, 0));
    assert_eq!(session.moves(), 0);
    assert!(session.request_pour(0, 2));
    assert_eq!(session.layout().get_text_representation(), "A.\nBA\nB.\n..");
}
