//! Integration tests for the Natak game engine.
//!
//! These tests drive complete turns through the public API on a fixed board
//! where every tile is wood numbered 5, except the desert in the middle.
//! Hands are arranged by editing a JSON snapshot, and dice totals are forced
//! by picking a seed that rolls them.

use natak_core::board::Port;
use natak_core::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

fn p(x: i32, y: i32) -> Point {
    Point::new(x, y)
}

/// First setup village and road for each seat
const FIRST: [((i32, i32), (i32, i32)); 4] = [
    ((0, 2), (1, 2)),
    ((1, 4), (2, 4)),
    ((4, 0), (5, 0)),
    ((8, 0), (8, 1)),
];

/// Second setup village and road for each seat
const SECOND: [((i32, i32), (i32, i32)); 4] = [
    ((2, 0), (3, 0)),
    ((9, 3), (10, 3)),
    ((6, 5), (7, 5)),
    ((8, 4), (9, 4)),
];

fn board() -> Board {
    let tiles = Point::tiles()
        .map(|t| {
            if t == p(2, 2) {
                Tile::new(TileKind::Desert, 0, t)
            } else {
                Tile::new(TileKind::Resource(Resource::Wood), 5, t)
            }
        })
        .collect();
    let wood = PortKind::Specific(Resource::Wood);
    let ports = vec![
        Port {
            kind: wood,
            position: p(2, 0),
        },
        Port {
            kind: wood,
            position: p(3, 0),
        },
    ];
    Board::new(tiles, ports)
}

fn place(game: &mut Game, seat: usize, spot: ((i32, i32), (i32, i32))) {
    let colour = Colour::ALL[seat];
    assert_eq!(game.current_colour(), colour, "setup order");
    let ((vx, vy), (rx, ry)) = spot;
    game.place_village(colour, p(vx, vy)).unwrap();
    game.place_road(colour, p(vx, vy), p(rx, ry)).unwrap();
}

/// A game with setup finished and Red about to roll
fn setup_game(players: usize) -> Game {
    let mut game = Game::with_board(board(), players).unwrap();
    for seat in 0..players {
        place(&mut game, seat, FIRST[seat]);
    }
    for seat in (0..players).rev() {
        place(&mut game, seat, SECOND[seat]);
    }
    game
}

/// Rewrite part of the game through its snapshot
fn edit(game: &Game, f: impl FnOnce(&mut Value)) -> Game {
    let mut value = serde_json::to_value(game).unwrap();
    f(&mut value);
    serde_json::from_value(value).unwrap()
}

fn set_resources(game: &Game, seat: usize, cards: Value) -> Game {
    edit(game, |v| v["players"][seat]["resources"] = cards)
}

fn set_playable(game: &Game, seat: usize, cards: Value) -> Game {
    edit(game, |v| v["players"][seat]["growth_cards"]["playable"] = cards)
}

/// A seed whose first two dice add up to `total`
fn seed_for_total(total: u8) -> u64 {
    (0..10_000)
        .find(|&seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let a: u8 = rng.gen_range(1..=6);
            let b: u8 = rng.gen_range(1..=6);
            a + b == total
        })
        .expect("some seed rolls every total")
}

fn roll(game: &mut Game, colour: Colour, total: u8) {
    let mut rng = StdRng::seed_from_u64(seed_for_total(total));
    let dice = game.roll_dice(colour, &mut rng).unwrap();
    assert_eq!(dice.0 + dice.1, total);
}

fn wood(game: &Game, colour: Colour) -> u32 {
    game.player(colour).unwrap().resources.get(Resource::Wood)
}

#[test]
fn test_setup_then_first_turns() {
    let mut game = setup_game(4);
    assert!(!game.is_setup());
    assert_eq!(game.state(), State::BeforeRoll);
    assert_eq!(game.current_colour(), Colour::Red);

    for player in game.players() {
        assert_eq!(player.score.visible, 2);
        assert_eq!(player.pieces.get(Piece::Village), 3);
        assert_eq!(player.pieces.get(Piece::Road), 13);
    }
    // Red's second village sits on the wood port
    assert!(game
        .player(Colour::Red)
        .unwrap()
        .ports
        .contains(&PortKind::Specific(Resource::Wood)));

    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(
        game.roll_dice(Colour::Blue, &mut rng),
        Err(StateError::NotYourTurn.into())
    );

    roll(&mut game, Colour::Red, 6);
    assert_eq!(game.state(), State::AfterRoll);
    game.end_turn(Colour::Red).unwrap();
    assert_eq!(game.current_colour(), Colour::Blue);
    assert_eq!(game.state(), State::BeforeRoll);
}

#[test]
fn test_roll_pays_every_adjacent_house() {
    let mut game = setup_game(2);
    let before = (wood(&game, Colour::Red), wood(&game, Colour::Blue));
    roll(&mut game, Colour::Red, 5);

    // Corner vertices (0,2), (2,0) and (1,4) touch one tile, (9,3) two
    assert_eq!(wood(&game, Colour::Red), before.0 + 2);
    assert_eq!(wood(&game, Colour::Blue), before.1 + 3);
}

#[test]
fn test_seven_forces_discard_then_thief() {
    let game = setup_game(4);
    let mut game = set_resources(&game, 1, json!({"Wood": 5, "Ore": 4}));
    assert_eq!(game.player(Colour::Blue).unwrap().resources.total(), 9);

    roll(&mut game, Colour::Red, 7);
    assert_eq!(game.state(), State::DiscardResources);
    assert_eq!(game.player(Colour::Blue).unwrap().cards_to_discard, 4);
    assert_eq!(game.player(Colour::Red).unwrap().cards_to_discard, 0);

    // Nothing owed, nothing to discard
    assert_eq!(
        game.discard_resources(Colour::Red, ItemManager::new())
            .unwrap_err()
            .code(),
        "invalid_action"
    );
    assert_eq!(game.state(), State::DiscardResources);

    assert_eq!(
        game.move_thief(Colour::Red, p(0, 3)).unwrap_err().code(),
        "invalid_action"
    );
    assert_eq!(
        game.discard_resources(Colour::Blue, ItemManager::with([(Resource::Ore, 3)])),
        Err(PlayerError::IncorrectDiscardCount {
            expected: 4,
            actual: 3
        }
        .into())
    );

    game.discard_resources(Colour::Blue, ItemManager::with([(Resource::Ore, 4)]))
        .unwrap();
    assert_eq!(game.player(Colour::Blue).unwrap().cards_to_discard, 0);
    assert_eq!(game.state(), State::MoveThief);
    assert_eq!(
        game.end_turn(Colour::Red).unwrap_err().code(),
        "invalid_action"
    );

    // Tile (0,3) touches Blue's village at (1,4)
    game.move_thief(Colour::Red, p(0, 3)).unwrap();
    assert_eq!(game.state(), State::StealResource);

    let mut rng = StdRng::seed_from_u64(5);
    assert_eq!(
        game.steal_resource(Colour::Red, Colour::Red, &mut rng),
        Err(PlayerError::CannotStealFromSelf.into())
    );
    assert_eq!(
        game.steal_resource(Colour::Red, Colour::Green, &mut rng),
        Err(PlayerError::InvalidVictim(Colour::Green).into())
    );

    let red_before = game.player(Colour::Red).unwrap().resources.total();
    let stolen = game
        .steal_resource(Colour::Red, Colour::Blue, &mut rng)
        .unwrap();
    assert_eq!(stolen, Some(Resource::Wood));
    assert_eq!(game.player(Colour::Blue).unwrap().resources.total(), 4);
    assert_eq!(game.player(Colour::Red).unwrap().resources.total(), red_before + 1);
    assert_eq!(game.state(), State::AfterRoll);
}

#[test]
fn test_thief_without_victims_skips_steal() {
    let mut game = setup_game(2);
    roll(&mut game, Colour::Red, 7);
    assert_eq!(game.state(), State::MoveThief, "nobody holds more than 7");

    assert_eq!(
        game.move_thief(Colour::Red, p(2, 2)),
        Err(BoardError::SameLocation.into())
    );
    // Tile (0,0) only touches Red's own village
    game.move_thief(Colour::Red, p(0, 0)).unwrap();
    assert_eq!(game.state(), State::AfterRoll);
    assert_eq!(game.board().thief(), p(0, 0));

    // The thief now blocks (0,0) for Red
    game.end_turn(Colour::Red).unwrap();
    let red = wood(&game, Colour::Red);
    roll(&mut game, Colour::Blue, 5);
    assert_eq!(wood(&game, Colour::Red), red + 1);
}

#[test]
fn test_steal_from_empty_hand() {
    let game = setup_game(2);
    let mut game = set_resources(&game, 1, json!({}));
    roll(&mut game, Colour::Red, 7);
    game.move_thief(Colour::Red, p(0, 3)).unwrap();

    let mut rng = StdRng::seed_from_u64(1);
    let stolen = game
        .steal_resource(Colour::Red, Colour::Blue, &mut rng)
        .unwrap();
    assert_eq!(stolen, None);
    assert_eq!(game.state(), State::AfterRoll);
}

#[test]
fn test_port_trade() {
    let game = setup_game(2);
    let mut game = set_resources(&game, 0, json!({"Wood": 2}));
    roll(&mut game, Colour::Red, 6);

    game.trade_with_bank(Colour::Red, Resource::Wood, Resource::Ore, 1)
        .unwrap();
    let red = game.player(Colour::Red).unwrap();
    assert_eq!(red.resources, ItemManager::with([(Resource::Ore, 1)]));
    game.end_turn(Colour::Red).unwrap();

    // Blue has no port and trades at 4:1
    let mut game = set_resources(&game, 1, json!({"Wood": 2}));
    roll(&mut game, Colour::Blue, 6);
    assert_eq!(
        game.trade_with_bank(Colour::Blue, Resource::Wood, Resource::Ore, 1),
        Err(PlayerError::MissingResources.into())
    );
}

#[test]
fn test_longest_road_tie_keeps_holder() {
    let game = setup_game(2);
    let mut game = set_resources(&game, 0, json!({"Brick": 4, "Wood": 4}));
    roll(&mut game, Colour::Red, 6);
    for x in 1..5 {
        game.place_road(Colour::Red, p(x, 2), p(x + 1, 2)).unwrap();
    }
    assert_eq!(game.board().road_length(Colour::Red), 5);
    let red = game.player(Colour::Red).unwrap();
    assert!(red.score.longest_road);
    assert_eq!(red.score.visible, 4);
    game.end_turn(Colour::Red).unwrap();

    let mut game = set_resources(&game, 1, json!({"Brick": 5, "Wood": 5}));
    roll(&mut game, Colour::Blue, 6);
    for x in 2..6 {
        game.place_road(Colour::Blue, p(x, 4), p(x + 1, 4)).unwrap();
    }
    assert_eq!(game.board().road_length(Colour::Blue), 5);
    assert!(game.player(Colour::Red).unwrap().score.longest_road, "tie keeps holder");
    assert_eq!(game.player(Colour::Blue).unwrap().score.visible, 2);

    game.place_road(Colour::Blue, p(6, 4), p(7, 4)).unwrap();
    assert!(!game.player(Colour::Red).unwrap().score.longest_road);
    assert_eq!(game.player(Colour::Red).unwrap().score.visible, 2);
    assert_eq!(game.player(Colour::Blue).unwrap().score.visible, 4);
}

#[test]
fn test_third_soldier_grants_largest_army() {
    let game = setup_game(2);
    let mut game = set_playable(&game, 0, json!({"Soldier": 3}));

    // Soldiers may be played before rolling and are not limited per turn
    for tile in [p(0, 0), p(1, 0), p(2, 0)] {
        game.play_soldier_card(Colour::Red).unwrap();
        assert_eq!(game.state(), State::MoveThief);
        game.move_thief(Colour::Red, tile).unwrap();
        assert_eq!(game.state(), State::BeforeRoll);
    }

    let red = game.player(Colour::Red).unwrap();
    assert_eq!(red.soldiers_played, 3);
    assert!(red.score.largest_army);
    assert_eq!(red.score.visible, 4);
    assert!(!game.growth_card_played());
    assert_eq!(
        game.play_soldier_card(Colour::Red),
        Err(PlayerError::NoPlayableCard(GrowthCard::Soldier).into())
    );
}

#[test]
fn test_largest_army_needs_strictly_more_soldiers() {
    let game = setup_game(2);
    let game = set_playable(&game, 0, json!({"Soldier": 3}));
    let mut game = set_playable(&game, 1, json!({"Soldier": 4}));

    for tile in [p(0, 0), p(1, 0), p(2, 0)] {
        game.play_soldier_card(Colour::Red).unwrap();
        game.move_thief(Colour::Red, tile).unwrap();
    }
    roll(&mut game, Colour::Red, 6);
    game.end_turn(Colour::Red).unwrap();

    // None of these tiles touch a house, so no steal is due
    for tile in [p(1, 0), p(1, 1), p(2, 1)] {
        game.play_soldier_card(Colour::Blue).unwrap();
        game.move_thief(Colour::Blue, tile).unwrap();
        assert_eq!(game.state(), State::BeforeRoll);
    }

    // Drawing level leaves the bonus where it is
    let red = game.player(Colour::Red).unwrap();
    let blue = game.player(Colour::Blue).unwrap();
    assert_eq!(blue.soldiers_played, 3);
    assert!(red.score.largest_army);
    assert!(!blue.score.largest_army);
    assert_eq!((red.score.visible, blue.score.visible), (4, 2));

    game.play_soldier_card(Colour::Blue).unwrap();
    game.move_thief(Colour::Blue, p(1, 0)).unwrap();

    let red = game.player(Colour::Red).unwrap();
    let blue = game.player(Colour::Blue).unwrap();
    assert!(!red.score.largest_army);
    assert!(blue.score.largest_army);
    assert_eq!((red.score.visible, blue.score.visible), (2, 4));
}

#[test]
fn test_growth_cards_once_per_turn_and_on_hold() {
    let game = setup_game(2);
    let game = set_playable(&game, 0, json!({"Wealth": 1, "Gatherer": 1}));
    let mut game = set_resources(&game, 0, json!({"Ore": 1, "Grain": 1, "Wool": 1}));
    roll(&mut game, Colour::Red, 6);

    let mut rng = StdRng::seed_from_u64(8);
    let card = game.buy_growth_card(Colour::Red, &mut rng).unwrap();
    let red = game.player(Colour::Red).unwrap();
    assert_eq!(red.growth_cards.on_hold.get(card), 1);
    assert!(red.resources.is_empty());
    assert_eq!(game.bank().growth_cards.total(), 24);

    game.play_wealth_card(Colour::Red, Resource::Ore, Resource::Ore)
        .unwrap();
    assert_eq!(game.player(Colour::Red).unwrap().resources.get(Resource::Ore), 2);
    assert_eq!(
        game.play_gatherer_card(Colour::Red, Resource::Wood),
        Err(StateError::DevelopmentCardAlreadyPlayed.into())
    );
    game.end_turn(Colour::Red).unwrap();

    roll(&mut game, Colour::Blue, 6);
    game.end_turn(Colour::Blue).unwrap();

    // Red's bought card became playable when Red's turn began
    let red = game.player(Colour::Red).unwrap();
    assert!(red.growth_cards.on_hold.is_empty());
    assert_eq!(red.growth_cards.playable.get(card), 1 + u32::from(card == GrowthCard::Gatherer));

    roll(&mut game, Colour::Red, 6);
    let blue_wood = wood(&game, Colour::Blue);
    let gathered = game.play_gatherer_card(Colour::Red, Resource::Wood).unwrap();
    assert_eq!(gathered, blue_wood);
    assert_eq!(wood(&game, Colour::Blue), 0);
}

#[test]
fn test_roaming_card_builds_two_free_roads() {
    let game = setup_game(2);
    let game = set_playable(&game, 0, json!({"Roaming": 1}));
    let mut game = set_resources(&game, 0, json!({}));
    roll(&mut game, Colour::Red, 6);

    game.play_roaming_card(Colour::Red).unwrap();
    assert_eq!(game.free_roads(), 2);
    assert_eq!(
        game.upgrade_to_town(Colour::Red, p(0, 2)).unwrap_err().code(),
        "invalid_action"
    );

    game.place_road(Colour::Red, p(1, 2), p(2, 2)).unwrap();
    assert_eq!(game.free_roads(), 1);
    game.place_road(Colour::Red, p(2, 2), p(3, 2)).unwrap();
    assert_eq!(game.free_roads(), 0);
    assert_eq!(game.state(), State::AfterRoll);
    assert_eq!(game.player(Colour::Red).unwrap().pieces.get(Piece::Road), 11);

    assert_eq!(
        game.place_road(Colour::Red, p(3, 2), p(4, 2)),
        Err(PlayerError::MissingResources.into())
    );
}

#[test]
fn test_roaming_card_with_one_road_left() {
    let game = setup_game(2);
    let game = edit(&game, |v| v["players"][0]["pieces"]["Road"] = json!(1));
    let mut game = set_playable(&game, 0, json!({"Roaming": 1}));
    roll(&mut game, Colour::Red, 6);

    game.play_roaming_card(Colour::Red).unwrap();
    assert_eq!(game.free_roads(), 1);

    game.place_road(Colour::Red, p(1, 2), p(2, 2)).unwrap();
    assert_eq!(game.free_roads(), 0);
    assert_eq!(game.state(), State::AfterRoll);
    assert_eq!(game.player(Colour::Red).unwrap().pieces.get(Piece::Road), 0);
}

#[test]
fn test_player_trade_with_embargo() {
    let game = setup_game(2);
    let game = set_resources(&game, 0, json!({"Wood": 1}));
    let mut game = set_resources(&game, 1, json!({"Ore": 1}));
    roll(&mut game, Colour::Red, 6);

    assert_eq!(
        game.accept_trade_offer(Colour::Blue),
        Err(TradeError::NoActiveOffer.into())
    );
    game.make_trade_offer(
        Colour::Red,
        ItemManager::with([(Resource::Wood, 1)]),
        ItemManager::with([(Resource::Ore, 1)]),
    )
    .unwrap();
    assert_eq!(
        game.accept_trade_offer(Colour::Red),
        Err(TradeError::CannotTradeWithSelf.into())
    );

    game.add_embargo(Colour::Blue, Colour::Red).unwrap();
    assert_eq!(
        game.accept_trade_offer(Colour::Blue),
        Err(TradeError::Embargoed.into())
    );
    game.remove_embargo(Colour::Blue, Colour::Red).unwrap();

    game.accept_trade_offer(Colour::Blue).unwrap();
    assert_eq!(game.player(Colour::Red).unwrap().resources.get(Resource::Ore), 1);
    assert_eq!(wood(&game, Colour::Blue), 1);
    assert!(game.trade_offer().is_none());

    // Ending the turn clears an open offer
    game.make_trade_offer(
        Colour::Red,
        ItemManager::with([(Resource::Ore, 1)]),
        ItemManager::with([(Resource::Wood, 1)]),
    )
    .unwrap();
    game.reject_trade_offer(Colour::Blue).unwrap();
    game.end_turn(Colour::Red).unwrap();
    assert!(game.trade_offer().is_none());
}

#[test]
fn test_building_a_village_wins() {
    let game = setup_game(2);
    let game = edit(&game, |v| v["players"][0]["score"]["visible"] = json!(9));
    let mut game = set_resources(
        &game,
        0,
        json!({"Brick": 2, "Wood": 2, "Grain": 1, "Wool": 1}),
    );
    roll(&mut game, Colour::Red, 6);

    game.place_road(Colour::Red, p(1, 2), p(2, 2)).unwrap();
    assert_eq!(
        game.place_village(Colour::Red, p(1, 2)),
        Err(BoardError::TooClose.into())
    );
    game.place_village(Colour::Red, p(2, 2)).unwrap();

    assert_eq!(game.winner(), Some(Colour::Red));
    assert_eq!(game.state(), State::Finish);
    assert_eq!(
        game.end_turn(Colour::Red),
        Err(StateError::InvalidAction {
            action: Action::EndTurn,
            state: State::Finish
        }
        .into())
    );
}

#[test]
fn test_town_upgrade() {
    let game = setup_game(2);
    let mut game = set_resources(&game, 0, json!({"Ore": 3, "Grain": 2}));
    roll(&mut game, Colour::Red, 6);

    assert_eq!(
        game.upgrade_to_town(Colour::Red, p(1, 4)),
        Err(BoardError::NotOwned.into())
    );
    game.upgrade_to_town(Colour::Red, p(0, 2)).unwrap();

    let red = game.player(Colour::Red).unwrap();
    assert_eq!(red.score.visible, 3);
    assert_eq!(red.pieces.get(Piece::Town), 3);
    assert_eq!(red.pieces.get(Piece::Village), 4);
    assert!(red.resources.is_empty());
}

#[test]
fn test_apply_action_from_json() {
    let mut game = Game::with_board(board(), 2).unwrap();
    let mut rng = StdRng::seed_from_u64(0);

    let action: GameAction =
        serde_json::from_str(r#"{"type":"PlaceVillage","payload":{"point":{"x":2,"y":0}}}"#)
            .unwrap();
    let outcome = game.apply_action(Colour::Red, action, &mut rng).unwrap();
    assert_eq!(
        outcome,
        ActionOutcome::VillagePlaced {
            port: Some(PortKind::Specific(Resource::Wood))
        }
    );

    let action: GameAction = serde_json::from_str(r#"{"type":"RollDice"}"#).unwrap();
    let err = game.apply_action(Colour::Red, action, &mut rng).unwrap_err();
    assert_eq!(err.code(), "invalid_action");
}

#[test]
fn test_snapshot_round_trip_mid_game() {
    let mut game = setup_game(3);
    roll(&mut game, Colour::Red, 5);
    game.end_turn(Colour::Red).unwrap();

    let snapshot = game.to_snapshot().unwrap();
    let restored = Game::from_snapshot(&snapshot).unwrap();
    assert_eq!(restored, game);
    assert_eq!(restored.rolls(), game.rolls());
    assert_eq!(restored.current_colour(), Colour::Blue);
}
