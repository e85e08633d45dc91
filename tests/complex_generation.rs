use rand::rngs::StdRng;
use rand::SeedableRng;

use roguegate::common::constants::GameConstants;
use roguegate::common::entity::EntityKind;
use roguegate::common::grid::{Cell, Direction};
use roguegate::common::snapshot::GameSnapshot;
use roguegate::{generate_complex, Game};

#[test]
fn test_complex_has_full_grid_of_stacks() {
    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        let complex = generate_complex(&mut rng);

        assert_eq!((complex.width(), complex.height()), (5, 3));
        let built = complex.built_blocks().count();
        assert!((7..=10).contains(&built), "seed {seed}: {built} built blocks");

        for floor in complex.floors() {
            assert_eq!(floor.width(), GameConstants::FLOOR_WIDTH);
            assert_eq!(floor.height(), GameConstants::FLOOR_HEIGHT);
            assert!(floor.entities.iter().all(|e| floor.cells.in_bounds(e.x, e.y)));
            assert!(floor.cell(floor.center.0, floor.center.1).is_walkable());
        }
    }
}

#[test]
fn test_rooms_are_numbered_by_level() {
    let mut rng = StdRng::seed_from_u64(40);
    let complex = generate_complex(&mut rng);
    for floor in complex.floors().filter(|f| !f.outdoor) {
        let base = 100 * (floor.id.level as u32 + 1);
        for (index, room) in floor.rooms.iter().enumerate() {
            assert_eq!(room.number, base + index as u32);
        }
    }
}

#[test]
fn test_rooms_have_at_most_one_door() {
    let mut rng = StdRng::seed_from_u64(41);
    let complex = generate_complex(&mut rng);
    for floor in complex.floors() {
        for room in &floor.rooms {
            let doors = floor.doors_of_room(room);
            assert!(doors.len() <= 1, "room {} has {} doors", room.number, doors.len());
            for door in doors {
                assert_eq!(floor.cell(door.x, door.y), Cell::Tile);
            }
        }
    }
}

#[test]
fn test_walk_through_door_and_back() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut game = Game::new(&mut rng);
    let floor = game.active_floor().unwrap();
    let Some(door) = floor.entities.iter().find(|e| e.is_door()).cloned() else {
        return;
    };
    let EntityKind::Door { facing, .. } = door.kind else {
        unreachable!()
    };
    let (dx, dy) = facing.delta();
    game.player.x = door.x + dx;
    game.player.y = door.y + dy;
    game.recompute();

    assert!(!game.move_player(-dx, -dy));
    assert!(game.open_door());
    assert!(!game.open_door());
    assert!(game.move_player(-dx, -dy));
    assert!(game.move_player(-dx, -dy), "room interior behind the door");
    assert!(game.move_player(dx, dy));
    assert_eq!((game.player.x, game.player.y), (door.x, door.y));
}

#[test]
fn test_stairs_round_trip_in_every_stack() {
    let mut rng = StdRng::seed_from_u64(43);
    let mut game = Game::new(&mut rng);
    let grounds: Vec<_> = game.complex.built_blocks().filter(|f| !f.stairs.is_empty()).map(|f| (f.id, f.stairs[0])).collect();

    for (id, (x, y)) in grounds {
        game.player.floor = id;
        game.player.x = x;
        game.player.y = y;

        let height = game.complex.stack(id.bx, id.by).len();
        for level in 1..height {
            assert!(game.take_stairs(true));
            assert_eq!(game.player.floor.level, level);
        }
        assert!(!game.take_stairs(true));
        for _ in 1..height {
            assert!(game.take_stairs(false));
        }
        assert_eq!(game.player.floor, id);
        assert_eq!((game.player.x, game.player.y), (x, y));
    }
}

#[test]
fn test_walking_off_an_edge_and_back() {
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = Game::new(&mut rng);
        let start = game.player.floor;
        let floor = game.active_floor().unwrap();
        let Some(edge) = [Direction::East, Direction::West].into_iter().find(|d| floor.link(*d).is_some()) else {
            continue;
        };
        let (dx, dy) = edge.delta();
        let hallway_y = floor.hallways.unwrap().horizontal.y + 1;
        game.player.y = hallway_y;
        game.recompute();

        let steps = game.sprint(dx, dy, 200);
        assert!(steps > 0);
        assert_ne!(game.player.floor, start);

        game.sprint(-dx, -dy, 200);
        assert_eq!(game.player.floor, start, "seed {seed}: came back through the same edge");
        return;
    }
    panic!("no east or west link from block A in 20 seeds");
}

#[test]
fn test_snapshot_reproduces_door_state() {
    let mut rng = StdRng::seed_from_u64(44);
    let mut game = Game::new(&mut rng);
    let id = game.player.floor;
    let Some(index) = game.active_floor().unwrap().entities.iter().position(|e| e.is_door()) else {
        return;
    };
    if let EntityKind::Door { open, .. } = &mut game.complex.floor_mut(id).unwrap().entities[index].kind {
        *open = true;
    }

    let json = game.snapshot().to_json().unwrap();
    let mut rng = StdRng::seed_from_u64(45);
    let mut other = Game::new(&mut rng);
    other.restore(GameSnapshot::from_json(&json).unwrap());

    assert_eq!(other.player, game.player);
    assert!(!other.active_floor().unwrap().entities[index].is_closed_door());
}
